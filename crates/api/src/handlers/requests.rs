//! Handlers for the `/requests` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use rentora_core::types::DbId;
use rentora_db::models::rental_request::CreateRentalRequest;

use crate::error::AppResult;
use crate::identity::Identity;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/requests
///
/// Create a rental request and open its auction. Returns 201 with the
/// created request, or 409 when no partnered owner holds eligible
/// equipment.
pub async fn create_request(
    identity: Identity,
    State(state): State<AppState>,
    Json(input): Json<CreateRentalRequest>,
) -> AppResult<impl IntoResponse> {
    let request = state.lifecycle.create(identity.user_id, &input).await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: request })))
}

/// GET /api/v1/requests
///
/// List requests visible to the caller: admins see all, managers their
/// own, owners the open auctions they can bid on.
pub async fn list_requests(
    identity: Identity,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let requests = state.lifecycle.list_for_viewer(identity.user_id).await?;
    Ok(Json(DataResponse { data: requests }))
}

/// GET /api/v1/requests/{id}
pub async fn get_request(
    identity: Identity,
    State(state): State<AppState>,
    Path(request_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let request = state
        .lifecycle
        .find_for_viewer(identity.user_id, request_id)
        .await?;
    Ok(Json(DataResponse { data: request }))
}

/// POST /api/v1/requests/{id}/complete
///
/// Mark a closed rental as completed once the rental period ends.
/// Permitted for the request's manager and administrators.
pub async fn complete_request(
    identity: Identity,
    State(state): State<AppState>,
    Path(request_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let request = state
        .lifecycle
        .complete(request_id, identity.user_id)
        .await?;
    Ok(Json(DataResponse { data: request }))
}

/// POST /api/v1/requests/{id}/close
///
/// Administrator-forced closure, permitted regardless of deadline while
/// the auction is still open. Idempotent: repeating the call returns the
/// recorded outcome.
pub async fn force_close(
    identity: Identity,
    State(state): State<AppState>,
    Path(request_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let outcome = state
        .lifecycle
        .force_close(request_id, identity.user_id)
        .await?;

    tracing::info!(
        request_id,
        admin_id = identity.user_id,
        winner = ?outcome.winner.as_ref().map(|b| b.id),
        "Auction force-closed"
    );

    Ok(Json(DataResponse { data: outcome }))
}
