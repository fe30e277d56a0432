//! Handlers for the `/equipment` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use rentora_auction::catalog::EquipmentCatalog;
use rentora_auction::directory::PartnershipDirectory;
use rentora_core::types::DbId;
use rentora_core::CoreError;
use rentora_db::models::equipment::CreateEquipment;
use rentora_db::models::status::EquipmentStatus;

use crate::error::{AppError, AppResult};
use crate::identity::Identity;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/equipment
///
/// List the caller's own equipment.
pub async fn list_own(
    identity: Identity,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let equipment = EquipmentCatalog::find_by_owner(&state.pool, identity.user_id).await?;
    Ok(Json(DataResponse { data: equipment }))
}

/// POST /api/v1/equipment
///
/// Register a new piece of equipment for the calling owner.
pub async fn register(
    identity: Identity,
    State(state): State<AppState>,
    Json(input): Json<CreateEquipment>,
) -> AppResult<impl IntoResponse> {
    let equipment = EquipmentCatalog::register(&state.pool, identity.user_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: equipment })))
}

/// Body of `PUT /api/v1/equipment/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct SetStatusBody {
    /// One of `available`, `busy`, `maintenance`.
    pub status: String,
}

/// PUT /api/v1/equipment/{id}/status
///
/// Set an item's availability status (the manual release path for busy
/// equipment). Permitted for the item's owner and administrators.
pub async fn set_status(
    identity: Identity,
    State(state): State<AppState>,
    Path(equipment_id): Path<DbId>,
    Json(body): Json<SetStatusBody>,
) -> AppResult<impl IntoResponse> {
    let status = EquipmentStatus::from_name(&body.status).ok_or_else(|| {
        AppError::Core(CoreError::Validation(format!(
            "unknown equipment status: {}",
            body.status
        )))
    })?;

    EquipmentCatalog::set_status(&state.pool, identity.user_id, equipment_id, status).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Query parameters for `GET /api/v1/equipment/eligible`.
#[derive(Debug, Deserialize)]
pub struct EligibleQuery {
    pub equipment_type: String,
    pub equipment_subtype: String,
}

/// GET /api/v1/equipment/eligible
///
/// Equipment visible to the calling manager through active partnerships,
/// filtered to the given type/subtype.
pub async fn list_eligible(
    identity: Identity,
    State(state): State<AppState>,
    Query(query): Query<EligibleQuery>,
) -> AppResult<impl IntoResponse> {
    let equipment = PartnershipDirectory::eligible_equipment(
        &state.pool,
        identity.user_id,
        &query.equipment_type,
        &query.equipment_subtype,
    )
    .await?;
    Ok(Json(DataResponse { data: equipment }))
}
