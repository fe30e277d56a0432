//! Handlers for bid submission, amendment, and listing.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use rentora_auction::ledger::BidLedger;
use rentora_core::types::DbId;
use rentora_db::models::rental_bid::{SubmitBid, UpdateBid};
use rentora_db::repositories::RentalBidRepo;

use crate::error::AppResult;
use crate::identity::Identity;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/requests/{id}/bids
///
/// Submit a bid against an open auction. Returns 201 with the created
/// bid; 409 when the auction is closed, the deadline elapsed, or the
/// owner already bid; 403 when the equipment is not theirs to offer.
pub async fn submit_bid(
    identity: Identity,
    State(state): State<AppState>,
    Path(request_id): Path<DbId>,
    Json(input): Json<SubmitBid>,
) -> AppResult<impl IntoResponse> {
    let bid = BidLedger::submit(&state.pool, identity.user_id, request_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: bid })))
}

/// GET /api/v1/requests/{id}/bids
///
/// List what the caller may see of a request's bids: count only for the
/// manager while the auction is open, full priced bids after closure,
/// own bid only for owners.
pub async fn list_bids(
    identity: Identity,
    State(state): State<AppState>,
    Path(request_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let listing = BidLedger::find_for_request(&state.pool, identity.user_id, request_id).await?;
    Ok(Json(DataResponse { data: listing }))
}

/// GET /api/v1/bids
///
/// List the caller's own bids across all requests.
pub async fn list_own_bids(
    identity: Identity,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let bids = RentalBidRepo::list_by_owner(&state.pool, identity.user_id).await?;
    Ok(Json(DataResponse { data: bids }))
}

/// PUT /api/v1/bids/{id}
///
/// Amend a bid while its auction is still open and before the deadline.
pub async fn update_bid(
    identity: Identity,
    State(state): State<AppState>,
    Path(bid_id): Path<DbId>,
    Json(input): Json<UpdateBid>,
) -> AppResult<impl IntoResponse> {
    let bid = BidLedger::update(&state.pool, identity.user_id, bid_id, &input).await?;
    Ok(Json(DataResponse { data: bid }))
}

/// DELETE /api/v1/bids/{id}
///
/// Withdraw a bid while its auction is still open. Returns 204.
pub async fn delete_bid(
    identity: Identity,
    State(state): State<AppState>,
    Path(bid_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    BidLedger::delete(&state.pool, identity.user_id, bid_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
