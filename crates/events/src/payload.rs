//! Typed payloads carried by each [`MarketEvent`](crate::bus::MarketEvent).
//!
//! The auction engine serializes one of these into the event payload at
//! publish time; the dispatcher deserializes it back. Keeping everything
//! the fan-out needs inside the payload means the dispatcher never touches
//! the database.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use rentora_core::types::{DbId, Money, Timestamp};

/// Payload of [`EVENT_REQUEST_CREATED`](crate::bus::EVENT_REQUEST_CREATED):
/// a new auction is open and the listed owners should be solicited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestCreated {
    pub request_id: DbId,
    pub manager_id: DbId,
    pub equipment_type: String,
    pub equipment_subtype: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub auction_deadline: Timestamp,
    /// Deduplicated owner user ids holding eligible equipment.
    pub owner_ids: Vec<DbId>,
}

/// Contact details of the winning owner, forwarded to the manager.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WinnerContact {
    pub user_id: DbId,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
}

/// Payload of [`EVENT_AUCTION_CLOSED`](crate::bus::EVENT_AUCTION_CLOSED):
/// the auction produced a winner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuctionClosed {
    pub request_id: DbId,
    pub manager_id: DbId,
    pub equipment_type: String,
    pub equipment_subtype: String,
    pub winning_bid_id: DbId,
    pub winning_price: Money,
    pub winner: WinnerContact,
    /// Owners whose pending bids were rejected.
    pub losing_owner_ids: Vec<DbId>,
}

/// Payload of [`EVENT_AUCTION_CANCELLED`](crate::bus::EVENT_AUCTION_CANCELLED):
/// the deadline elapsed (or an admin forced closure) with zero bids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuctionCancelled {
    pub request_id: DbId,
    pub manager_id: DbId,
    pub equipment_type: String,
    pub equipment_subtype: String,
}
