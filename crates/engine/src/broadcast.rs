//! The broadcast coordinator.
//!
//! [`BroadcastCoordinator::broadcast`] is the one entry point that turns
//! "operator pressed Send for item X" into emails and a ledger row:
//! check the publish precondition, take the system-wide lock, resolve the
//! audience, render once, fan out sequentially, append the dispatch record,
//! release the lock. Nothing else in the workspace touches the lock.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use herald_core::types::{DbId, Timestamp};
use herald_db::models::item::ItemWithCategories;
use herald_db::repositories::{DispatchRepo, ItemRepo, SettingsRepo, SubscriberRepo};
use herald_db::DbPool;

use crate::lock::{self, BROADCAST_LOCK_NAME, DEFAULT_ACQUIRE_TIMEOUT};
use crate::mailer::{Mailer, OutgoingEmail};
use crate::render;

// ---------------------------------------------------------------------------
// Outcome and error
// ---------------------------------------------------------------------------

/// What a broadcast attempt amounted to, reported back to the operator.
///
/// All four cases are expected, reportable results; none of them are
/// process-fatal.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BroadcastOutcome {
    /// The audience was notified and the ledger row written.
    Sent { recipients: usize, sent_at: Timestamp },
    /// The lock was not acquired within its timeout: another broadcast is
    /// in flight. No side effects.
    AlreadyInProgress,
    /// The item is not in published status. Rejected before any lock
    /// attempt; no side effects.
    NotPublished,
    /// The audience was notified but the ledger write failed. Recipients
    /// may have received mail with no ledger trace, so the UI will keep
    /// offering "Send" and a retry can notify them again.
    Failed { reason: String },
}

/// Infrastructure failures while broadcasting.
///
/// The reportable outcomes (not published, already in progress, ledger
/// write failure) are data, carried in [`BroadcastOutcome`]; this type is
/// for faults that prevent producing an outcome at all.
#[derive(Debug, thiserror::Error)]
pub enum BroadcastError {
    /// No item with this id exists.
    #[error("Item not found: {0}")]
    ItemNotFound(DbId),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Installation-level values the engine needs for rendering and locking.
#[derive(Debug, Clone)]
pub struct BroadcastConfig {
    /// Public base URL of the site, used to build self-service links.
    pub site_url: String,
    /// Site display name substituted for the site-name token.
    pub site_name: String,
    /// Bound on how long a broadcast waits for the single-flight lock.
    pub lock_timeout: Duration,
}

impl BroadcastConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var     | Default                 |
    /// |-------------|-------------------------|
    /// | `SITE_URL`  | `http://localhost:3000` |
    /// | `SITE_NAME` | `Herald`                |
    pub fn from_env() -> Self {
        let site_url = std::env::var("SITE_URL").unwrap_or_else(|_| "http://localhost:3000".into());
        // A trailing slash would double up when the link paths are appended.
        let site_url = site_url.trim_end_matches('/').to_string();

        Self {
            site_url,
            site_name: std::env::var("SITE_NAME").unwrap_or_else(|_| "Herald".into()),
            lock_timeout: DEFAULT_ACQUIRE_TIMEOUT,
        }
    }
}

// ---------------------------------------------------------------------------
// BroadcastCoordinator
// ---------------------------------------------------------------------------

/// Orchestrates one broadcast end to end.
pub struct BroadcastCoordinator {
    pool: DbPool,
    mailer: Arc<dyn Mailer>,
    config: BroadcastConfig,
}

impl BroadcastCoordinator {
    /// Create a coordinator over the given pool and mail transport.
    pub fn new(pool: DbPool, mailer: Arc<dyn Mailer>, config: BroadcastConfig) -> Self {
        Self { pool, mailer, config }
    }

    /// Broadcast the published item to its resolved audience.
    ///
    /// Serialized against every other broadcast in the install through the
    /// single fixed-name advisory lock; callers that lose the lock race get
    /// [`BroadcastOutcome::AlreadyInProgress`] and should try again shortly.
    pub async fn broadcast(
        &self,
        item_id: DbId,
        operator_id: DbId,
    ) -> Result<BroadcastOutcome, BroadcastError> {
        let Some(item) = ItemRepo::get_with_categories(&self.pool, item_id).await? else {
            return Err(BroadcastError::ItemNotFound(item_id));
        };

        // Publish-status precondition comes before any lock traffic.
        if !item.item.is_published() {
            tracing::info!(item_id, "Broadcast rejected, item is not published");
            return Ok(BroadcastOutcome::NotPublished);
        }

        let Some(guard) =
            lock::acquire(&self.pool, BROADCAST_LOCK_NAME, self.config.lock_timeout).await?
        else {
            tracing::info!(item_id, "Broadcast lock busy, another broadcast is in flight");
            return Ok(BroadcastOutcome::AlreadyInProgress);
        };

        // Run the locked section, then release on success and failure alike.
        // If this task panics instead, the guard's connection closes and the
        // server reclaims the lock.
        let result = self.run_locked(&item, operator_id).await;

        if let Err(e) = guard.release().await {
            tracing::warn!(item_id, error = %e, "Failed to release broadcast lock cleanly");
        }

        result
    }

    /// The broadcast body: everything that happens while the lock is held.
    async fn run_locked(
        &self,
        item: &ItemWithCategories,
        operator_id: DbId,
    ) -> Result<BroadcastOutcome, BroadcastError> {
        let item_id = item.item.id;

        let recipients = SubscriberRepo::resolve_audience(&self.pool, &item.category_ids).await?;

        // Settings are read once; a concurrent settings change does not
        // affect a broadcast already under way.
        let settings = SettingsRepo::get(&self.pool).await?;
        let rendered = render::render_item(&settings, &self.config.site_name, &item.item);

        for recipient in &recipients {
            let email = OutgoingEmail {
                to: recipient.email_addr.clone(),
                subject: rendered.subject.clone(),
                html_body: render::personalize(&rendered.body, &self.config.site_url, recipient),
                sender_name: settings.sender_name.clone(),
                sender_addr: settings.sender_addr.clone(),
            };

            // Best-effort fan-out: log and move on to the next recipient.
            if let Err(e) = self.mailer.send(&email).await {
                tracing::warn!(
                    item_id,
                    subscriber_id = recipient.id,
                    error = %e,
                    "Failed to send notification email, continuing"
                );
            }
        }

        match DispatchRepo::record(&self.pool, item_id, operator_id).await {
            Ok(record) => {
                tracing::info!(
                    item_id,
                    operator_id,
                    recipients = recipients.len(),
                    "Broadcast sent and recorded"
                );
                Ok(BroadcastOutcome::Sent {
                    recipients: recipients.len(),
                    sent_at: record.sent_at,
                })
            }
            Err(e) => {
                // Dangerous partial state: emails may be out with no ledger
                // trace. Surfaced to the operator; there is no compensating
                // retry of the ledger write.
                tracing::error!(
                    item_id,
                    operator_id,
                    error = %e,
                    "Audience was notified but the dispatch record write failed"
                );
                Ok(BroadcastOutcome::Failed {
                    reason: "notification was attempted but could not be recorded".into(),
                })
            }
        }
    }
}
