//! Handler for the read-only sent-notification log.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use herald_db::repositories::DispatchRepo;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /dispatches
///
/// Every completed broadcast, newest first, joined with item title/author
/// and the triggering operator's login.
pub async fn list_sent(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let sent = DispatchRepo::list_sent(&state.pool).await?;
    Ok(Json(DataResponse { data: sent }))
}
