//! Handlers for triggering broadcasts and reading Send-vs-Resend state.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use herald_core::types::{DbId, Timestamp};
use herald_db::repositories::{DispatchRepo, OperatorRepo};
use herald_engine::BroadcastOutcome;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for triggering a broadcast.
///
/// The operator id is supplied explicitly by the host admin layer, which
/// owns authentication of the admin surface.
#[derive(Debug, Deserialize)]
pub struct TriggerBroadcastRequest {
    pub operator_id: DbId,
}

/// Response for a broadcast attempt: the structured outcome plus a short
/// human-readable message for the admin UI.
#[derive(Debug, Serialize)]
pub struct BroadcastResponse {
    pub message: String,
    #[serde(flatten)]
    pub outcome: BroadcastOutcome,
}

/// Response for the last-sent query. `null` means never notified, and the
/// UI should offer "Send" rather than "Resend".
#[derive(Debug, Serialize)]
pub struct LastSentResponse {
    pub last_sent_at: Option<Timestamp>,
}

/// The one-line message shown to the triggering operator.
fn outcome_message(outcome: &BroadcastOutcome) -> String {
    match outcome {
        BroadcastOutcome::Sent { recipients, .. } => {
            format!("Notification has been sent for this item ({recipients} recipients)!")
        }
        BroadcastOutcome::AlreadyInProgress => {
            "Another notification is being sent; try again shortly.".to_string()
        }
        BroadcastOutcome::NotPublished => "Item has not yet been published.".to_string(),
        BroadcastOutcome::Failed { .. } => "Notification FAILED for this item!".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /items/{id}/broadcast
///
/// Trigger a broadcast for the item. The HTTP status tracks the outcome:
/// 200 sent, 409 already in progress or not published, 500 when the ledger
/// write failed after the fan-out.
pub async fn trigger_broadcast(
    State(state): State<AppState>,
    Path(item_id): Path<DbId>,
    Json(body): Json<TriggerBroadcastRequest>,
) -> AppResult<impl IntoResponse> {
    // The ledger attributes the send to this operator; reject ids the host
    // environment never issued.
    if !OperatorRepo::exists(&state.pool, body.operator_id).await? {
        return Err(AppError::BadRequest(format!(
            "unknown operator id {}",
            body.operator_id
        )));
    }

    let outcome = state
        .coordinator
        .broadcast(item_id, body.operator_id)
        .await?;

    let status = match &outcome {
        BroadcastOutcome::Sent { .. } => StatusCode::OK,
        BroadcastOutcome::AlreadyInProgress | BroadcastOutcome::NotPublished => {
            StatusCode::CONFLICT
        }
        BroadcastOutcome::Failed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let response = BroadcastResponse {
        message: outcome_message(&outcome),
        outcome,
    };

    Ok((status, Json(DataResponse { data: response })))
}

/// GET /items/{id}/last-sent
///
/// Most recent dispatch timestamp for the item, or `null` if it has never
/// been notified.
pub async fn last_sent(
    State(state): State<AppState>,
    Path(item_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let last_sent_at = DispatchRepo::last_sent(&state.pool, item_id).await?;

    Ok(Json(DataResponse {
        data: LastSentResponse { last_sent_at },
    }))
}
