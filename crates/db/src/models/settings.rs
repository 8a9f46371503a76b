//! Broadcast settings models and DTOs.

use herald_core::types::Timestamp;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The single row of the `broadcast_settings` table.
///
/// Loaded once at broadcast start; a broadcast never observes a settings
/// change made while it is running.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BroadcastSettings {
    pub subject_template: String,
    pub body_template: String,
    pub signature: String,
    pub sender_name: String,
    pub sender_addr: String,
    pub updated_at: Timestamp,
}

/// DTO for updating the broadcast settings row. All fields optional;
/// only `Some` fields are overwritten.
#[derive(Debug, Deserialize)]
pub struct UpdateBroadcastSettings {
    pub subject_template: Option<String>,
    pub body_template: Option<String>,
    pub signature: Option<String>,
    pub sender_name: Option<String>,
    pub sender_addr: Option<String>,
}
