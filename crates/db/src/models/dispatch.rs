//! Dispatch ledger models.

use herald_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `dispatch_log` table.
///
/// One row per completed broadcast attempt for an item. Append-only: a
/// resend inserts a new row, it never overwrites.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DispatchRecord {
    pub id: DbId,
    pub item_id: DbId,
    pub sent_at: Timestamp,
    pub sent_by: DbId,
}

/// A ledger row joined with item and operator display data, for the
/// read-only sent-notification log.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SentNotification {
    pub item_id: DbId,
    pub item_title: String,
    pub author: String,
    pub sent_at: Timestamp,
    pub sent_by_login: String,
}
