//! Company entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use rentora_core::types::{DbId, Timestamp};

use super::status::StatusId;

/// A row from the `companies` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Company {
    pub id: DbId,
    pub name: String,
    pub status_id: StatusId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a company.
#[derive(Debug, Deserialize)]
pub struct CreateCompany {
    pub name: String,
}
