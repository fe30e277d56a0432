//! Caller resolution and role checks shared by the auction services.

use sqlx::PgPool;

use rentora_core::roles::{ROLE_ADMIN_ID, ROLE_MANAGER_ID, ROLE_OWNER_ID};
use rentora_core::types::DbId;
use rentora_core::CoreError;
use rentora_db::models::status::CompanyStatus;
use rentora_db::models::user::User;
use rentora_db::repositories::{CompanyRepo, UserRepo};

use crate::error::map_db_err;

/// Load an active user or fail with `NotFound` / `Forbidden`.
pub async fn resolve_user(pool: &PgPool, user_id: DbId) -> Result<User, CoreError> {
    let user = UserRepo::find_by_id(pool, user_id)
        .await
        .map_err(map_db_err)?
        .ok_or(CoreError::not_found("User", user_id))?;

    if !user.is_active {
        return Err(CoreError::Forbidden("user account is deactivated".into()));
    }
    Ok(user)
}

/// Resolve a caller that must be a rental manager attached to an active
/// company. Returns the user together with their company id.
pub async fn resolve_manager(pool: &PgPool, user_id: DbId) -> Result<(User, DbId), CoreError> {
    let user = resolve_user(pool, user_id).await?;
    if user.role_id != ROLE_MANAGER_ID {
        return Err(CoreError::Forbidden(
            "only rental managers may perform this action".into(),
        ));
    }
    let company_id = require_active_company(pool, &user).await?;
    Ok((user, company_id))
}

/// Resolve a caller that must be an equipment owner attached to an active
/// company.
pub async fn resolve_owner(pool: &PgPool, user_id: DbId) -> Result<(User, DbId), CoreError> {
    let user = resolve_user(pool, user_id).await?;
    if user.role_id != ROLE_OWNER_ID {
        return Err(CoreError::Forbidden(
            "only equipment owners may perform this action".into(),
        ));
    }
    let company_id = require_active_company(pool, &user).await?;
    Ok((user, company_id))
}

/// Resolve a caller that must be an administrator.
pub async fn resolve_admin(pool: &PgPool, user_id: DbId) -> Result<User, CoreError> {
    let user = resolve_user(pool, user_id).await?;
    if user.role_id != ROLE_ADMIN_ID {
        return Err(CoreError::Forbidden(
            "only administrators may perform this action".into(),
        ));
    }
    Ok(user)
}

/// The user's company id, provided the company exists and is active.
async fn require_active_company(pool: &PgPool, user: &User) -> Result<DbId, CoreError> {
    let company_id = user.company_id.ok_or_else(|| {
        CoreError::Forbidden("user is not attached to a company".into())
    })?;

    let company = CompanyRepo::find_by_id(pool, company_id)
        .await
        .map_err(map_db_err)?
        .ok_or(CoreError::not_found("Company", company_id))?;

    if company.status_id != CompanyStatus::Active.id() {
        return Err(CoreError::Forbidden("company is not active".into()));
    }
    Ok(company_id)
}
