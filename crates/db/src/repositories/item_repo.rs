//! Repository for the `items` and `item_categories` tables.
//!
//! Read-only: items are owned by the content subsystem.

use herald_core::types::DbId;
use sqlx::PgPool;

use crate::models::item::{Item, ItemWithCategories};

/// Column list for `items` queries.
const COLUMNS: &str = "id, title, permalink, author, status";

/// Read access to content items.
pub struct ItemRepo;

impl ItemRepo {
    /// Fetch a single item by id.
    pub async fn get(pool: &PgPool, id: DbId) -> Result<Option<Item>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM items WHERE id = $1");
        sqlx::query_as::<_, Item>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch an item together with its category ids.
    ///
    /// Returns `None` when the item does not exist; an existing item with no
    /// category rows yields an empty `category_ids` vector.
    pub async fn get_with_categories(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ItemWithCategories>, sqlx::Error> {
        let Some(item) = Self::get(pool, id).await? else {
            return Ok(None);
        };

        let category_ids: Vec<DbId> = sqlx::query_scalar(
            "SELECT category_id FROM item_categories \
             WHERE item_id = $1 \
             ORDER BY category_id",
        )
        .bind(id)
        .fetch_all(pool)
        .await?;

        Ok(Some(ItemWithCategories { item, category_ids }))
    }
}
