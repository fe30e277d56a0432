//! Equipment entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use rentora_core::types::{DbId, Money, Timestamp};

use super::status::StatusId;

/// A row from the `equipment` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Equipment {
    pub id: DbId,
    pub owner_id: DbId,
    pub equipment_type: String,
    pub equipment_subtype: String,
    pub status_id: StatusId,
    pub hourly_rate: Money,
    pub daily_rate: Money,
    pub location: Option<String>,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for registering a piece of equipment.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateEquipment {
    #[validate(length(min = 1))]
    pub equipment_type: String,
    #[validate(length(min = 1))]
    pub equipment_subtype: String,
    #[validate(range(min = 1))]
    pub hourly_rate: Money,
    #[validate(range(min = 1))]
    pub daily_rate: Money,
    pub location: Option<String>,
    pub description: Option<String>,
}

/// One row of the eligible-owner join used to solicit bids: the owner
/// user, a matching piece of their equipment, and how to reach them.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EligibleOwner {
    pub owner_id: DbId,
    pub equipment_id: DbId,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
}
