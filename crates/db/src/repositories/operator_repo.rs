//! Repository for the `operators` table.
//!
//! Operators are owned by the host environment; the API layer only checks
//! that a claimed operator id is real before attributing a broadcast to it.

use herald_core::types::DbId;
use sqlx::PgPool;

/// Read access to operator accounts.
pub struct OperatorRepo;

impl OperatorRepo {
    /// Whether an operator with this id exists.
    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let count: Option<i64> =
            sqlx::query_scalar("SELECT COUNT(*) FROM operators WHERE id = $1")
                .bind(id)
                .fetch_one(pool)
                .await?;
        Ok(count.unwrap_or(0) > 0)
    }
}
