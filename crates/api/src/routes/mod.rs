pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /items/{id}/broadcast      trigger a broadcast (POST)
/// /items/{id}/last-sent      most recent dispatch timestamp (GET)
///
/// /dispatches                sent-notification log (GET)
///
/// /settings/broadcast        read settings (GET), partial update (PUT)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/items/{id}/broadcast",
            post(handlers::broadcast::trigger_broadcast),
        )
        .route("/items/{id}/last-sent", get(handlers::broadcast::last_sent))
        .route("/dispatches", get(handlers::dispatch_log::list_sent))
        .route(
            "/settings/broadcast",
            get(handlers::settings::get_settings).put(handlers::settings::update_settings),
        )
}
