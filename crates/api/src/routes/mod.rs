pub mod health;

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{bids, equipment, requests};
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /requests                      GET list, POST create
/// /requests/{id}                 GET fetch one
/// /requests/{id}/close           POST forced closure (admin)
/// /requests/{id}/complete        POST rental period ended (manager)
/// /requests/{id}/bids            GET listing, POST submit
/// /bids                          GET own bids
/// /bids/{id}                     PUT amend, DELETE withdraw
/// /equipment                     GET own, POST register
/// /equipment/eligible            GET partnership-scoped matching
/// /equipment/{id}/status         PUT set availability
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/requests",
            get(requests::list_requests).post(requests::create_request),
        )
        .route("/requests/{id}", get(requests::get_request))
        .route("/requests/{id}/close", post(requests::force_close))
        .route("/requests/{id}/complete", post(requests::complete_request))
        .route(
            "/requests/{id}/bids",
            get(bids::list_bids).post(bids::submit_bid),
        )
        .route("/bids", get(bids::list_own_bids))
        .route(
            "/bids/{id}",
            put(bids::update_bid).delete(bids::delete_bid),
        )
        .route(
            "/equipment",
            get(equipment::list_own).post(equipment::register),
        )
        .route("/equipment/eligible", get(equipment::list_eligible))
        .route("/equipment/{id}/status", put(equipment::set_status))
}
