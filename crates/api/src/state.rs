use std::sync::Arc;

use herald_engine::BroadcastCoordinator;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: herald_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// The broadcast coordinator; the only component that touches the
    /// single-flight lock.
    pub coordinator: Arc<BroadcastCoordinator>,
}
