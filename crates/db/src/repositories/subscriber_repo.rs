//! Repository for the `subscribers` and `subscriber_categories` tables.
//!
//! The broadcast engine only reads these tables; subscriber lifecycle
//! (signup, confirmation, deletion) belongs to the subscription subsystem.

use herald_core::types::DbId;
use sqlx::PgPool;

use crate::models::subscriber::{Recipient, Subscriber};

/// Reserved category id meaning "all categories".
///
/// A subscriber holding this preference row is part of every audience,
/// whatever the published item's categories are -- including none at all.
pub const SENTINEL_ALL_CATEGORIES: DbId = 0;

/// Column list for `subscribers` queries.
const COLUMNS: &str = "id, email_addr, first_name, confirmed, authcode, created_at";

/// Read access to subscribers and their category preferences.
pub struct SubscriberRepo;

impl SubscriberRepo {
    /// Resolve the audience for an item with the given category ids.
    ///
    /// A subscriber is included when confirmed and holding at least one
    /// preference row whose category id is the sentinel `0` or a member of
    /// `category_ids`. Implemented as one set-membership join; `DISTINCT`
    /// collapses subscribers matching through several rows (e.g. sentinel
    /// plus an overlapping real category) into a single recipient, and
    /// `ORDER BY id` fixes the fan-out order.
    pub async fn resolve_audience(
        pool: &PgPool,
        category_ids: &[DbId],
    ) -> Result<Vec<Recipient>, sqlx::Error> {
        sqlx::query_as::<_, Recipient>(
            "SELECT DISTINCT s.id, s.email_addr, s.first_name, s.authcode \
             FROM subscribers s \
             JOIN subscriber_categories sc ON sc.subscriber_id = s.id \
             WHERE s.confirmed \
               AND (sc.category_id = $1 OR sc.category_id = ANY($2)) \
             ORDER BY s.id",
        )
        .bind(SENTINEL_ALL_CATEGORIES)
        .bind(category_ids)
        .fetch_all(pool)
        .await
    }

    /// Fetch a single subscriber by id.
    pub async fn get(pool: &PgPool, id: DbId) -> Result<Option<Subscriber>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM subscribers WHERE id = $1");
        sqlx::query_as::<_, Subscriber>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List the category preference rows for a subscriber, sentinel included.
    pub async fn category_preferences(
        pool: &PgPool,
        subscriber_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT category_id FROM subscriber_categories \
             WHERE subscriber_id = $1 \
             ORDER BY category_id",
        )
        .bind(subscriber_id)
        .fetch_all(pool)
        .await
    }
}
