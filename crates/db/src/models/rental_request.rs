//! Rental request entity models and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use rentora_core::types::{DbId, Timestamp};

use super::status::StatusId;

/// A row from the `rental_requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RentalRequest {
    pub id: DbId,
    pub manager_id: DbId,
    pub equipment_type: String,
    pub equipment_subtype: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub location: Option<String>,
    pub description: Option<String>,
    pub budget_range: Option<String>,
    pub status_id: StatusId,
    pub auction_deadline: Timestamp,
    pub winning_bid_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a rental request.
///
/// The date-range ordering is checked at the service layer (and by a
/// CHECK constraint) because `validator` cannot compare two fields.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRentalRequest {
    #[validate(length(min = 1))]
    pub equipment_type: String,
    #[validate(length(min = 1))]
    pub equipment_subtype: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub location: Option<String>,
    pub description: Option<String>,
    pub budget_range: Option<String>,
}
