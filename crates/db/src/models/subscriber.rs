//! Subscriber entity models.

use herald_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `subscribers` table.
///
/// Owned by the subscription subsystem; the broadcast engine never writes it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Subscriber {
    pub id: DbId,
    pub email_addr: String,
    pub first_name: String,
    pub confirmed: bool,
    pub authcode: String,
    pub created_at: Timestamp,
}

/// One resolved broadcast recipient.
///
/// The projection of a subscriber that the fan-out loop needs: address for
/// the transport, name for the salutation, authcode for the self-service
/// links.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Recipient {
    pub id: DbId,
    pub email_addr: String,
    pub first_name: String,
    pub authcode: String,
}
