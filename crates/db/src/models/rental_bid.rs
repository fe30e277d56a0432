//! Rental bid entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use rentora_core::types::{DbId, Money, Timestamp};

use super::status::StatusId;

/// A row from the `rental_bids` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RentalBid {
    pub id: DbId,
    pub request_id: DbId,
    pub owner_id: DbId,
    pub equipment_id: DbId,
    pub hourly_rate: Money,
    pub daily_rate: Money,
    pub total_price: Money,
    pub comment: Option<String>,
    pub status_id: StatusId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for submitting a bid against a request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitBid {
    pub equipment_id: DbId,
    #[validate(range(min = 1))]
    pub hourly_rate: Money,
    #[validate(range(min = 1))]
    pub daily_rate: Money,
    #[validate(range(min = 1))]
    pub total_price: Money,
    pub comment: Option<String>,
}

/// DTO for amending a bid while its auction is still open.
/// Only non-`None` fields are applied.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateBid {
    #[validate(range(min = 1))]
    pub hourly_rate: Option<Money>,
    #[validate(range(min = 1))]
    pub daily_rate: Option<Money>,
    #[validate(range(min = 1))]
    pub total_price: Option<Money>,
    pub comment: Option<String>,
}

/// What a viewer is allowed to see of a request's bids.
///
/// While the auction is open the manager and admins see the bid count
/// only; full priced bids become visible after closure.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BidListing {
    Count { count: i64 },
    Bids { bids: Vec<RentalBid> },
}
