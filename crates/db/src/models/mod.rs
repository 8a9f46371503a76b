//! Row models and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the database row, plus any DTOs the API layer needs.

pub mod dispatch;
pub mod item;
pub mod settings;
pub mod subscriber;
