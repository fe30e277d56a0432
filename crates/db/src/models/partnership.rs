//! Partnership entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use rentora_core::types::{DbId, Timestamp};

use super::status::StatusId;

/// A row from the `partnerships` table: a directed permission edge from
/// an owner-side company to a manager-side company.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Partnership {
    pub id: DbId,
    pub owner_company_id: DbId,
    pub manager_company_id: DbId,
    pub status_id: StatusId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a partnership edge.
#[derive(Debug, Deserialize)]
pub struct CreatePartnership {
    pub owner_company_id: DbId,
    pub manager_company_id: DbId,
}
