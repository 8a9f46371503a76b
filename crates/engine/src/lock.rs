//! System-wide broadcast lock on a PostgreSQL advisory lock.
//!
//! Every broadcast in the install competes for one fixed lock name, so
//! broadcasts of *different* items are serialized too. The lock lives in the
//! database rather than in process memory, which makes it visible to every
//! API instance sharing the pool.
//!
//! Acquisition is bounded: [`acquire`] polls `pg_try_advisory_lock` until it
//! wins or the timeout passes, and a timeout is an ordinary "someone else is
//! broadcasting" result, not an error.

use std::time::Duration;

use sqlx::{Connection, PgConnection, PgPool};
use tokio::time::Instant;

use herald_core::hashing::stable_key64;

/// The single lock name shared by all broadcasts.
pub const BROADCAST_LOCK_NAME: &str = "broadcast_send_lock";

/// How long a caller waits for the lock before giving up.
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(2);

/// Pause between `pg_try_advisory_lock` attempts.
const ACQUIRE_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Map a lock name onto the advisory lock's 64-bit key space.
fn advisory_key(name: &str) -> i64 {
    stable_key64(name.as_bytes())
}

/// A held advisory lock.
///
/// The guard owns a connection detached from the pool: advisory locks are
/// session-scoped, and a pooled connection returned while still holding one
/// would poison every future checkout. Call [`release`](LockGuard::release)
/// on normal exit paths; if the guard is instead dropped (error or panic
/// between acquire and release), the owned connection closes and the server
/// reclaims the lock.
pub struct LockGuard {
    conn: Option<PgConnection>,
    key: i64,
}

impl LockGuard {
    /// Unlock and close the connection gracefully.
    pub async fn release(mut self) -> Result<(), sqlx::Error> {
        if let Some(mut conn) = self.conn.take() {
            let unlocked: bool = sqlx::query_scalar("SELECT pg_advisory_unlock($1)")
                .bind(self.key)
                .fetch_one(&mut conn)
                .await?;
            if !unlocked {
                tracing::warn!(key = self.key, "Advisory unlock reported no lock held");
            }
            conn.close().await?;
        }
        Ok(())
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if self.conn.is_some() {
            // The connection drops with us; the server releases the lock
            // when the session ends.
            tracing::warn!(
                key = self.key,
                "Broadcast lock guard dropped without release, closing its connection"
            );
        }
    }
}

/// Try to acquire the named lock within `timeout`.
///
/// Returns `Ok(Some(guard))` once the lock is held, `Ok(None)` when the
/// timeout elapses first (another broadcast is in flight), and `Err` only
/// for database failures.
pub async fn acquire(
    pool: &PgPool,
    name: &str,
    timeout: Duration,
) -> Result<Option<LockGuard>, sqlx::Error> {
    let key = advisory_key(name);
    let deadline = Instant::now() + timeout;

    let mut conn = pool.acquire().await?.detach();

    loop {
        let locked: bool = sqlx::query_scalar("SELECT pg_try_advisory_lock($1)")
            .bind(key)
            .fetch_one(&mut conn)
            .await?;

        if locked {
            tracing::debug!(name, key, "Broadcast lock acquired");
            return Ok(Some(LockGuard { conn: Some(conn), key }));
        }

        if Instant::now() >= deadline {
            tracing::debug!(name, key, "Broadcast lock acquisition timed out");
            conn.close().await?;
            return Ok(None);
        }

        tokio::time::sleep(ACQUIRE_POLL_INTERVAL).await;
    }
}
