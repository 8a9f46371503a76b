//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods
//! that accept `&PgPool` as the first argument.

pub mod dispatch_repo;
pub mod item_repo;
pub mod operator_repo;
pub mod settings_repo;
pub mod subscriber_repo;

pub use dispatch_repo::DispatchRepo;
pub use item_repo::ItemRepo;
pub use operator_repo::OperatorRepo;
pub use settings_repo::SettingsRepo;
pub use subscriber_repo::SubscriberRepo;
