//! Bid validation and persistence.
//!
//! Every mutation locks the owning request row for its transaction, so a
//! bid submitted milliseconds before closure either commits before the
//! closing transaction reads bids (and is considered for the win) or
//! observes the closed status and fails with a conflict. A bid is never
//! silently lost. The deadline is re-validated at submit time, inside the
//! same transaction, not just at request-read time.

use chrono::Utc;
use sqlx::PgPool;
use validator::Validate;

use rentora_core::roles::ROLE_ADMIN_ID;
use rentora_core::types::DbId;
use rentora_core::CoreError;
use rentora_db::models::rental_bid::{BidListing, RentalBid, SubmitBid, UpdateBid};
use rentora_db::models::rental_request::RentalRequest;
use rentora_db::models::status::{EquipmentStatus, RequestStatus};
use rentora_db::repositories::{EquipmentRepo, RentalBidRepo, RentalRequestRepo};

use crate::access;
use crate::catalog::EquipmentCatalog;
use crate::error::{is_duplicate_bid, map_db_err};

/// Validated bid operations against open auctions.
pub struct BidLedger;

impl BidLedger {
    /// Submit a bid for the calling owner.
    ///
    /// Fails with `NotFound` for a missing request, `Conflict` for a
    /// closed auction / elapsed deadline / duplicate bid, `Forbidden` for
    /// equipment that is not the owner's, not available, or of the wrong
    /// type, and `Validation` for non-positive prices.
    pub async fn submit(
        pool: &PgPool,
        owner_id: DbId,
        request_id: DbId,
        input: &SubmitBid,
    ) -> Result<RentalBid, CoreError> {
        input
            .validate()
            .map_err(|e| CoreError::Validation(e.to_string()))?;
        access::resolve_owner(pool, owner_id).await?;

        // Fail fast before opening a transaction; ownership, availability,
        // and type match are re-verified under the request lock below.
        if !EquipmentCatalog::is_available_and_owned_by(pool, input.equipment_id, owner_id)
            .await?
        {
            return Err(CoreError::Forbidden(
                "equipment is not available to the submitting owner".into(),
            ));
        }

        let mut tx = pool.begin().await.map_err(map_db_err)?;

        let request = RentalRequestRepo::lock_by_id(&mut tx, request_id)
            .await
            .map_err(map_db_err)?
            .ok_or(CoreError::not_found("RentalRequest", request_id))?;

        Self::ensure_open(&request)?;

        if RentalBidRepo::find_by_request_and_owner(&mut tx, request_id, owner_id)
            .await
            .map_err(map_db_err)?
            .is_some()
        {
            return Err(CoreError::Conflict(
                "owner already has a bid on this request".into(),
            ));
        }

        let equipment = EquipmentRepo::find_by_id_in(&mut tx, input.equipment_id)
            .await
            .map_err(map_db_err)?
            .ok_or(CoreError::not_found("Equipment", input.equipment_id))?;

        if equipment.owner_id != owner_id {
            return Err(CoreError::Forbidden(
                "equipment does not belong to the submitting owner".into(),
            ));
        }
        if equipment.status_id != EquipmentStatus::Available.id() {
            return Err(CoreError::Forbidden("equipment is not available".into()));
        }
        if equipment.equipment_type != request.equipment_type
            || equipment.equipment_subtype != request.equipment_subtype
        {
            return Err(CoreError::Forbidden(
                "equipment does not match the requested type".into(),
            ));
        }

        // The unique constraint is defense in depth behind the check above:
        // two submits racing past the pre-check serialize here.
        let bid = match RentalBidRepo::insert(&mut tx, request_id, owner_id, input).await {
            Ok(bid) => bid,
            Err(e) if is_duplicate_bid(&e) => {
                return Err(CoreError::Conflict(
                    "owner already has a bid on this request".into(),
                ));
            }
            Err(e) => return Err(map_db_err(e)),
        };

        tx.commit().await.map_err(map_db_err)?;

        tracing::info!(
            bid_id = bid.id,
            request_id,
            owner_id,
            total_price = bid.total_price,
            "Bid submitted"
        );
        Ok(bid)
    }

    /// Amend a bid while its auction is still open and undeadlined.
    pub async fn update(
        pool: &PgPool,
        owner_id: DbId,
        bid_id: DbId,
        input: &UpdateBid,
    ) -> Result<RentalBid, CoreError> {
        input
            .validate()
            .map_err(|e| CoreError::Validation(e.to_string()))?;

        let mut tx = pool.begin().await.map_err(map_db_err)?;

        let bid = Self::lock_owned_bid(&mut tx, bid_id, owner_id).await?;

        let updated = RentalBidRepo::update(&mut tx, bid.id, input)
            .await
            .map_err(map_db_err)?
            .ok_or(CoreError::not_found("RentalBid", bid_id))?;

        tx.commit().await.map_err(map_db_err)?;

        tracing::info!(bid_id, owner_id, "Bid updated");
        Ok(updated)
    }

    /// Withdraw a bid while its auction is still open and undeadlined.
    pub async fn delete(pool: &PgPool, owner_id: DbId, bid_id: DbId) -> Result<(), CoreError> {
        let mut tx = pool.begin().await.map_err(map_db_err)?;

        let bid = Self::lock_owned_bid(&mut tx, bid_id, owner_id).await?;

        RentalBidRepo::delete(&mut tx, bid.id)
            .await
            .map_err(map_db_err)?;

        tx.commit().await.map_err(map_db_err)?;

        tracing::info!(bid_id, owner_id, "Bid withdrawn");
        Ok(())
    }

    /// What the viewer may see of a request's bids.
    ///
    /// The request's manager and admins see the bid count while the
    /// auction is open and full priced bids only after closure (prices
    /// are concealed during the open window by design). Owners see their
    /// own bid only, at any time.
    pub async fn find_for_request(
        pool: &PgPool,
        viewer_id: DbId,
        request_id: DbId,
    ) -> Result<BidListing, CoreError> {
        let viewer = access::resolve_user(pool, viewer_id).await?;

        let request = RentalRequestRepo::find_by_id(pool, request_id)
            .await
            .map_err(map_db_err)?
            .ok_or(CoreError::not_found("RentalRequest", request_id))?;

        if viewer.role_id == ROLE_ADMIN_ID || request.manager_id == viewer_id {
            if request.status_id == RequestStatus::AuctionActive.id() {
                let count = RentalBidRepo::count_for_request(pool, request_id)
                    .await
                    .map_err(map_db_err)?;
                return Ok(BidListing::Count { count });
            }
            let bids = RentalBidRepo::list_for_request(pool, request_id)
                .await
                .map_err(map_db_err)?;
            return Ok(BidListing::Bids { bids });
        }

        // Owners: own bid only.
        let mut conn = pool.acquire().await.map_err(map_db_err)?;
        let own = RentalBidRepo::find_by_request_and_owner(&mut conn, request_id, viewer_id)
            .await
            .map_err(map_db_err)?;
        Ok(BidListing::Bids {
            bids: own.into_iter().collect(),
        })
    }

    /// Lock the bid's request row and verify the bid belongs to the
    /// caller, its request is still open, and the deadline has not
    /// elapsed. Shared by update and delete.
    async fn lock_owned_bid(
        tx: &mut sqlx::PgConnection,
        bid_id: DbId,
        owner_id: DbId,
    ) -> Result<RentalBid, CoreError> {
        let bid = RentalBidRepo::find_by_id_in(tx, bid_id)
            .await
            .map_err(map_db_err)?
            .ok_or(CoreError::not_found("RentalBid", bid_id))?;

        if bid.owner_id != owner_id {
            return Err(CoreError::Forbidden(
                "cannot modify another owner's bid".into(),
            ));
        }

        let request = RentalRequestRepo::lock_by_id(tx, bid.request_id)
            .await
            .map_err(map_db_err)?
            .ok_or(CoreError::not_found("RentalRequest", bid.request_id))?;

        Self::ensure_open(&request)?;
        Ok(bid)
    }

    /// The request must still be accepting bids.
    fn ensure_open(request: &RentalRequest) -> Result<(), CoreError> {
        if request.status_id != RequestStatus::AuctionActive.id() {
            return Err(CoreError::Conflict(
                "request is not open for bidding".into(),
            ));
        }
        if Utc::now() > request.auction_deadline {
            return Err(CoreError::Conflict("auction deadline has passed".into()));
        }
        Ok(())
    }
}
