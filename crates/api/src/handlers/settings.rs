//! Handlers for reading and updating the broadcast settings row.
//!
//! A broadcast that is already running keeps the settings it loaded at
//! start; updates here affect the next broadcast.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use herald_db::models::settings::UpdateBroadcastSettings;
use herald_db::repositories::SettingsRepo;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /settings/broadcast
pub async fn get_settings(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let settings = SettingsRepo::get(&state.pool).await?;
    Ok(Json(DataResponse { data: settings }))
}

/// PUT /settings/broadcast
///
/// Partial update: only fields present in the body are overwritten.
pub async fn update_settings(
    State(state): State<AppState>,
    Json(body): Json<UpdateBroadcastSettings>,
) -> AppResult<impl IntoResponse> {
    let settings = SettingsRepo::update(&state.pool, &body).await?;
    Ok(Json(DataResponse { data: settings }))
}
