//! Repository for the `dispatch_log` table -- the append-only ledger of
//! completed broadcast attempts.
//!
//! A ledger row is the sole signal that an item has been notified: it drives
//! the Send-vs-Resend UI state and the sent-notification log. Rows are
//! written only after the fan-out attempt, never before.

use herald_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::dispatch::{DispatchRecord, SentNotification};

/// Column list for `dispatch_log` queries.
const COLUMNS: &str = "id, item_id, sent_at, sent_by";

/// Append and query access to the dispatch ledger.
pub struct DispatchRepo;

impl DispatchRepo {
    /// Append one ledger row for a completed broadcast attempt.
    ///
    /// The timestamp is assigned server-side. Always inserts; a resend for
    /// the same item produces an additional row.
    pub async fn record(
        pool: &PgPool,
        item_id: DbId,
        operator_id: DbId,
    ) -> Result<DispatchRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO dispatch_log (item_id, sent_by) \
             VALUES ($1, $2) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DispatchRecord>(&query)
            .bind(item_id)
            .bind(operator_id)
            .fetch_one(pool)
            .await
    }

    /// The most recent `sent_at` among the item's ledger rows, or `None`
    /// if the item has never been notified.
    pub async fn last_sent(
        pool: &PgPool,
        item_id: DbId,
    ) -> Result<Option<Timestamp>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT MAX(sent_at) FROM dispatch_log WHERE item_id = $1",
        )
        .bind(item_id)
        .fetch_one(pool)
        .await
    }

    /// All ledger rows for one item, newest first.
    pub async fn list_for_item(
        pool: &PgPool,
        item_id: DbId,
    ) -> Result<Vec<DispatchRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM dispatch_log \
             WHERE item_id = $1 \
             ORDER BY sent_at DESC, id DESC"
        );
        sqlx::query_as::<_, DispatchRecord>(&query)
            .bind(item_id)
            .fetch_all(pool)
            .await
    }

    /// The sent-notification log: every ledger row joined with the item's
    /// title/author and the triggering operator's login, newest first.
    pub async fn list_sent(pool: &PgPool) -> Result<Vec<SentNotification>, sqlx::Error> {
        sqlx::query_as::<_, SentNotification>(
            "SELECT d.item_id, i.title AS item_title, i.author, d.sent_at, o.login AS sent_by_login \
             FROM dispatch_log d \
             JOIN items i ON i.id = d.item_id \
             JOIN operators o ON o.id = d.sent_by \
             ORDER BY d.sent_at DESC, d.id DESC",
        )
        .fetch_all(pool)
        .await
    }
}
