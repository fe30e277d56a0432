//! Caller identity resolution.
//!
//! Session authentication is performed upstream by the API gateway, which
//! forwards the authenticated user id in the `x-user-id` header. This
//! extractor trusts that header, loads the user row, and rejects
//! deactivated accounts. Role and ownership checks stay in the auction
//! engine; the extractor only establishes *who* is calling.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use rentora_core::types::DbId;
use rentora_core::CoreError;
use rentora_db::repositories::UserRepo;

use crate::error::AppError;
use crate::state::AppState;

/// Header set by the upstream gateway after session authentication.
const USER_ID_HEADER: &str = "x-user-id";

/// The resolved caller.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: DbId,
    pub role_id: DbId,
    pub company_id: Option<DbId>,
}

impl FromRequestParts<AppState> for Identity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "missing x-user-id header".into(),
                ))
            })?
            .to_str()
            .map_err(|_| {
                AppError::Core(CoreError::Unauthorized("malformed x-user-id header".into()))
            })?;

        let user_id: DbId = header.parse().map_err(|_| {
            AppError::Core(CoreError::Unauthorized("malformed x-user-id header".into()))
        })?;

        let user = UserRepo::find_by_id(&state.pool, user_id)
            .await?
            .ok_or_else(|| CoreError::Unauthorized("unknown user".into()))
            .map_err(AppError::Core)?;

        if !user.is_active {
            return Err(AppError::Core(CoreError::Unauthorized(
                "user account is deactivated".into(),
            )));
        }

        Ok(Identity {
            user_id: user.id,
            role_id: user.role_id,
            company_id: user.company_id,
        })
    }
}
