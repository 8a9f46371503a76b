//! Herald notification broadcast engine.
//!
//! The moving parts behind "notify every interested subscriber that this
//! item was published, exactly one broadcast at a time":
//!
//! - [`lock`] — system-wide single-flight lock on a Postgres advisory lock.
//! - [`mailer`] — the outbound mail transport trait and its SMTP and
//!   logging implementations.
//! - [`render`] — item-level and per-recipient template composition.
//! - [`broadcast`] — the coordinator orchestrating
//!   lock → resolve → render → send → ledger → release.

pub mod broadcast;
pub mod lock;
pub mod mailer;
pub mod render;

pub use broadcast::{BroadcastConfig, BroadcastCoordinator, BroadcastError, BroadcastOutcome};
pub use mailer::{EmailConfig, LogMailer, MailError, Mailer, OutgoingEmail, SmtpMailer};
