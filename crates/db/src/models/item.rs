//! Content item models.

use herald_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// Status value an item must hold to be eligible for broadcast.
pub const STATUS_PUBLISHED: &str = "published";

/// A row from the `items` table.
///
/// Owned by the content subsystem; read-only to the broadcast engine.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Item {
    pub id: DbId,
    pub title: String,
    pub permalink: String,
    pub author: String,
    pub status: String,
}

impl Item {
    /// Whether this item may be broadcast at all.
    pub fn is_published(&self) -> bool {
        self.status == STATUS_PUBLISHED
    }
}

/// An item together with the category ids it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct ItemWithCategories {
    pub item: Item,
    pub category_ids: Vec<DbId>,
}
