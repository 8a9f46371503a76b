//! Repository for the single-row `broadcast_settings` table.

use sqlx::PgPool;

use crate::models::settings::{BroadcastSettings, UpdateBroadcastSettings};

/// Column list for `broadcast_settings` queries.
const COLUMNS: &str =
    "subject_template, body_template, signature, sender_name, sender_addr, updated_at";

/// Access to the broadcast settings row.
pub struct SettingsRepo;

impl SettingsRepo {
    /// Load the settings row.
    ///
    /// The row is seeded by migration, so absence is a deployment fault and
    /// surfaces as `RowNotFound`.
    pub async fn get(pool: &PgPool) -> Result<BroadcastSettings, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM broadcast_settings WHERE id = 1");
        sqlx::query_as::<_, BroadcastSettings>(&query)
            .fetch_one(pool)
            .await
    }

    /// Update the settings row, overwriting only the fields that are `Some`.
    ///
    /// Uses `COALESCE` so a partial update is a single round-trip.
    pub async fn update(
        pool: &PgPool,
        update: &UpdateBroadcastSettings,
    ) -> Result<BroadcastSettings, sqlx::Error> {
        let query = format!(
            "UPDATE broadcast_settings SET \
                subject_template = COALESCE($1, subject_template), \
                body_template = COALESCE($2, body_template), \
                signature = COALESCE($3, signature), \
                sender_name = COALESCE($4, sender_name), \
                sender_addr = COALESCE($5, sender_addr), \
                updated_at = NOW() \
             WHERE id = 1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BroadcastSettings>(&query)
            .bind(&update.subject_template)
            .bind(&update.body_template)
            .bind(&update.signature)
            .bind(&update.sender_name)
            .bind(&update.sender_addr)
            .fetch_one(pool)
            .await
    }
}
