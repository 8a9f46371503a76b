//! HTTP handler functions, grouped by surface area.

pub mod broadcast;
pub mod dispatch_log;
pub mod settings;
