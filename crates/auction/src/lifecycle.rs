//! The rental-request state machine: creation, closure, winner selection.
//!
//! Closure is idempotent. The conditional claim in
//! `RentalRequestRepo::mark_closing` (close only if still auction_active)
//! is the sole concurrency guard: the expiry watcher, an administrator's
//! forced closure, and any redundant caller may all race on the same
//! request and exactly one of them performs the transition. Everyone else
//! observes the recorded outcome. No external lock exists or is needed:
//! a single-row conditional update under the storage engine's own
//! transaction isolation is sufficient.
//!
//! Notification fan-out happens strictly after the closing transaction
//! commits, via the event bus; a failing notification channel can never
//! block or roll back a state transition.

use std::sync::Arc;

use chrono::Utc;
use sqlx::PgPool;
use validator::Validate;

use rentora_core::lifecycle::state_machine;
use rentora_core::selection::{select_winner, BidCandidate};
use rentora_core::types::DbId;
use rentora_core::CoreError;
use rentora_db::models::rental_bid::RentalBid;
use rentora_db::models::rental_request::{CreateRentalRequest, RentalRequest};
use rentora_db::models::status::{EquipmentStatus, RequestStatus};
use rentora_db::models::user::User;
use rentora_db::repositories::{EquipmentRepo, RentalBidRepo, RentalRequestRepo, UserRepo};
use rentora_events::bus::{
    EventBus, MarketEvent, EVENT_AUCTION_CANCELLED, EVENT_AUCTION_CLOSED, EVENT_REQUEST_CREATED,
};
use rentora_events::payload::{AuctionCancelled, AuctionClosed, RequestCreated, WinnerContact};

use crate::access;
use crate::config::AuctionConfig;
use crate::directory::PartnershipDirectory;
use crate::error::map_db_err;

/// What initiated a closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseTrigger {
    /// The auction deadline elapsed and the watcher swept it.
    Auto,
    /// An administrator forced closure before (or after) the deadline.
    Forced,
}

/// Result of closing a request: the final request row, the winning bid
/// (None when the auction drew no bids and was cancelled), and all bids
/// as they stand after closure.
#[derive(Debug, serde::Serialize)]
pub struct CloseOutcome {
    pub request: RentalRequest,
    pub winner: Option<RentalBid>,
    pub bids: Vec<RentalBid>,
}

/// The request lifecycle engine.
pub struct RequestLifecycle {
    pool: PgPool,
    bus: Arc<EventBus>,
    config: AuctionConfig,
}

impl RequestLifecycle {
    pub fn new(pool: PgPool, bus: Arc<EventBus>, config: AuctionConfig) -> Self {
        Self { pool, bus, config }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn config(&self) -> &AuctionConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Create
    // -----------------------------------------------------------------------

    /// Create a rental request and open its auction.
    ///
    /// Eligibility is resolved before anything is written: when no active
    /// partnership yields matching available equipment the call fails with
    /// `Conflict` and no request row is persisted. On success the request
    /// is created directly in auction_active with
    /// `deadline = now + auction_duration`, and a best-effort
    /// request.created event solicits every eligible owner.
    pub async fn create(
        &self,
        manager_id: DbId,
        input: &CreateRentalRequest,
    ) -> Result<RentalRequest, CoreError> {
        input
            .validate()
            .map_err(|e| CoreError::Validation(e.to_string()))?;
        if input.start_date > input.end_date {
            return Err(CoreError::Validation(
                "start_date must not be after end_date".into(),
            ));
        }

        let (_, manager_company_id) = access::resolve_manager(&self.pool, manager_id).await?;

        let eligible = PartnershipDirectory::eligible_owners_for_company(
            &self.pool,
            manager_company_id,
            &input.equipment_type,
            &input.equipment_subtype,
        )
        .await?;

        if eligible.is_empty() {
            return Err(CoreError::Conflict(
                "no eligible equipment available for this request".into(),
            ));
        }

        let deadline = Utc::now() + self.config.auction_duration;
        let request = RentalRequestRepo::create(&self.pool, manager_id, input, deadline)
            .await
            .map_err(map_db_err)?;

        tracing::info!(
            request_id = request.id,
            manager_id,
            equipment_type = %request.equipment_type,
            auction_deadline = %request.auction_deadline,
            eligible_owners = eligible.len(),
            "Rental request created, auction open"
        );

        // Post-commit fan-out: one notification per distinct owner.
        let mut owner_ids: Vec<DbId> = eligible.iter().map(|e| e.owner_id).collect();
        owner_ids.sort_unstable();
        owner_ids.dedup();

        let payload = RequestCreated {
            request_id: request.id,
            manager_id,
            equipment_type: request.equipment_type.clone(),
            equipment_subtype: request.equipment_subtype.clone(),
            start_date: request.start_date,
            end_date: request.end_date,
            auction_deadline: request.auction_deadline,
            owner_ids,
        };
        self.publish(
            MarketEvent::new(EVENT_REQUEST_CREATED)
                .with_source("rental_request", request.id)
                .with_actor(manager_id),
            &payload,
        );

        Ok(request)
    }

    // -----------------------------------------------------------------------
    // Close
    // -----------------------------------------------------------------------

    /// Close an auction, selecting a winner or cancelling it.
    ///
    /// Idempotent: when the request has already left auction_active the
    /// call is a no-op returning the recorded outcome of the closure that
    /// already happened.
    pub async fn close(
        &self,
        request_id: DbId,
        trigger: CloseTrigger,
    ) -> Result<CloseOutcome, CoreError> {
        let mut tx = self.pool.begin().await.map_err(map_db_err)?;

        let claimed = RentalRequestRepo::mark_closing(&mut tx, request_id)
            .await
            .map_err(map_db_err)?;

        if !claimed {
            drop(tx);
            return self.recorded_outcome(request_id).await;
        }

        let request = RentalRequestRepo::find_by_id_in(&mut tx, request_id)
            .await
            .map_err(map_db_err)?
            .ok_or(CoreError::not_found("RentalRequest", request_id))?;

        let pending = RentalBidRepo::list_pending_for_request(&mut tx, request_id)
            .await
            .map_err(map_db_err)?;

        if pending.is_empty() {
            RentalRequestRepo::finalize_cancelled(&mut tx, request_id)
                .await
                .map_err(map_db_err)?;
            tx.commit().await.map_err(map_db_err)?;

            tracing::info!(request_id, ?trigger, "Auction closed with no bids, cancelled");

            let payload = AuctionCancelled {
                request_id,
                manager_id: request.manager_id,
                equipment_type: request.equipment_type.clone(),
                equipment_subtype: request.equipment_subtype.clone(),
            };
            self.publish(
                MarketEvent::new(EVENT_AUCTION_CANCELLED)
                    .with_source("rental_request", request_id),
                &payload,
            );

            return self.load_outcome(request_id).await;
        }

        // Deterministic winner: minimum total price, earliest submission,
        // lowest id. The repository query orders the same way; the pure
        // selection makes the rule explicit and unit-testable.
        let candidates: Vec<BidCandidate> = pending
            .iter()
            .map(|b| BidCandidate {
                bid_id: b.id,
                total_price: b.total_price,
                created_at: b.created_at,
            })
            .collect();
        let winner_id = select_winner(&candidates)
            .map(|c| c.bid_id)
            .ok_or_else(|| CoreError::Internal("winner selection on empty set".into()))?;
        let winner = pending
            .iter()
            .find(|b| b.id == winner_id)
            .cloned()
            .ok_or_else(|| CoreError::Internal("selected winner not in pending set".into()))?;

        RentalBidRepo::mark_accepted(&mut tx, winner.id)
            .await
            .map_err(map_db_err)?;
        let rejected = RentalBidRepo::reject_other_pending(&mut tx, request_id, winner.id)
            .await
            .map_err(map_db_err)?;
        EquipmentRepo::set_status_in(&mut tx, winner.equipment_id, EquipmentStatus::Busy)
            .await
            .map_err(map_db_err)?;
        RentalRequestRepo::set_winning_bid(&mut tx, request_id, winner.id)
            .await
            .map_err(map_db_err)?;

        tx.commit().await.map_err(map_db_err)?;

        tracing::info!(
            request_id,
            ?trigger,
            winning_bid_id = winner.id,
            winning_price = winner.total_price,
            rejected_bids = rejected,
            "Auction closed with winner"
        );

        self.publish_closed(&request, &winner, &pending).await;

        self.load_outcome(request_id).await
    }

    /// Administrator-forced closure, permitted regardless of deadline
    /// while the request is still auction_active.
    pub async fn force_close(
        &self,
        request_id: DbId,
        admin_id: DbId,
    ) -> Result<CloseOutcome, CoreError> {
        access::resolve_admin(&self.pool, admin_id).await?;
        if !self.config.allow_force_close {
            return Err(CoreError::Forbidden(
                "forced closure is disabled by configuration".into(),
            ));
        }
        self.close(request_id, CloseTrigger::Forced).await
    }

    /// Mark a closed rental as completed, once the rental period has
    /// ended. Triggered externally by the request's manager (or an
    /// admin); the auction core itself never schedules this.
    pub async fn complete(
        &self,
        request_id: DbId,
        caller_id: DbId,
    ) -> Result<RentalRequest, CoreError> {
        let caller = access::resolve_user(&self.pool, caller_id).await?;

        let request = RentalRequestRepo::find_by_id(&self.pool, request_id)
            .await
            .map_err(map_db_err)?
            .ok_or(CoreError::not_found("RentalRequest", request_id))?;

        if caller.role_id != rentora_core::roles::ROLE_ADMIN_ID
            && request.manager_id != caller_id
        {
            return Err(CoreError::Forbidden(
                "only the request's manager may complete it".into(),
            ));
        }

        state_machine::validate_transition(request.status_id, RequestStatus::Completed.id())
            .map_err(CoreError::Conflict)?;

        // Conditional, like closure: a concurrent completion loses cleanly.
        if !RentalRequestRepo::mark_completed(&self.pool, request_id)
            .await
            .map_err(map_db_err)?
        {
            return Err(CoreError::Conflict(
                "request is no longer in auction_closed".into(),
            ));
        }

        tracing::info!(request_id, caller_id, "Rental marked completed");

        RentalRequestRepo::find_by_id(&self.pool, request_id)
            .await
            .map_err(map_db_err)?
            .ok_or(CoreError::not_found("RentalRequest", request_id))
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Requests visible to the viewer: admins see all, managers their
    /// own, owners the open auctions they are eligible to bid on.
    pub async fn list_for_viewer(&self, viewer_id: DbId) -> Result<Vec<RentalRequest>, CoreError> {
        let viewer = access::resolve_user(&self.pool, viewer_id).await?;
        let result = match viewer.role_id {
            rentora_core::roles::ROLE_ADMIN_ID => RentalRequestRepo::list_all(&self.pool).await,
            rentora_core::roles::ROLE_MANAGER_ID => {
                RentalRequestRepo::list_by_manager(&self.pool, viewer_id).await
            }
            _ => RentalRequestRepo::list_open_for_owner(&self.pool, viewer_id).await,
        };
        result.map_err(map_db_err)
    }

    /// A single request, subject to the same visibility rules. Owners may
    /// additionally fetch requests they have bid on (to see results).
    pub async fn find_for_viewer(
        &self,
        viewer_id: DbId,
        request_id: DbId,
    ) -> Result<RentalRequest, CoreError> {
        let viewer = access::resolve_user(&self.pool, viewer_id).await?;
        let request = RentalRequestRepo::find_by_id(&self.pool, request_id)
            .await
            .map_err(map_db_err)?
            .ok_or(CoreError::not_found("RentalRequest", request_id))?;

        let visible = match viewer.role_id {
            rentora_core::roles::ROLE_ADMIN_ID => true,
            rentora_core::roles::ROLE_MANAGER_ID => request.manager_id == viewer_id,
            _ => self.owner_may_view(&viewer, request_id).await?,
        };
        if !visible {
            return Err(CoreError::Forbidden(
                "request is not visible to this user".into(),
            ));
        }
        Ok(request)
    }

    async fn owner_may_view(&self, owner: &User, request_id: DbId) -> Result<bool, CoreError> {
        let mut conn = self.pool.acquire().await.map_err(map_db_err)?;
        let has_bid =
            RentalBidRepo::find_by_request_and_owner(&mut conn, request_id, owner.id)
                .await
                .map_err(map_db_err)?
                .is_some();
        if has_bid {
            return Ok(true);
        }
        RentalRequestRepo::is_open_for_owner(&self.pool, owner.id, request_id)
            .await
            .map_err(map_db_err)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// The no-op path of an idempotent close: report what the earlier
    /// closure decided.
    async fn recorded_outcome(&self, request_id: DbId) -> Result<CloseOutcome, CoreError> {
        let request = RentalRequestRepo::find_by_id(&self.pool, request_id)
            .await
            .map_err(map_db_err)?
            .ok_or(CoreError::not_found("RentalRequest", request_id))?;

        match request.status_id {
            s if s == RequestStatus::AuctionClosed.id()
                || s == RequestStatus::Completed.id()
                || s == RequestStatus::Cancelled.id() =>
            {
                tracing::debug!(request_id, "Closure no-op, request already closed");
                self.load_outcome(request_id).await
            }
            _ => Err(CoreError::Conflict(
                "request is not in an auction that can be closed".into(),
            )),
        }
    }

    /// Assemble a [`CloseOutcome`] from committed state.
    async fn load_outcome(&self, request_id: DbId) -> Result<CloseOutcome, CoreError> {
        let request = RentalRequestRepo::find_by_id(&self.pool, request_id)
            .await
            .map_err(map_db_err)?
            .ok_or(CoreError::not_found("RentalRequest", request_id))?;

        let bids = RentalBidRepo::list_for_request(&self.pool, request_id)
            .await
            .map_err(map_db_err)?;

        let winner = match request.winning_bid_id {
            Some(bid_id) => bids.iter().find(|b| b.id == bid_id).cloned(),
            None => None,
        };

        Ok(CloseOutcome {
            request,
            winner,
            bids,
        })
    }

    /// Publish the auction.closed event. Failures to assemble the payload
    /// (e.g. the winner's user row vanished) are logged, never surfaced:
    /// the state transition has already committed.
    async fn publish_closed(
        &self,
        request: &RentalRequest,
        winner: &RentalBid,
        pending: &[RentalBid],
    ) {
        let winner_user = match UserRepo::find_by_id(&self.pool, winner.owner_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                tracing::error!(
                    owner_id = winner.owner_id,
                    "Winning owner vanished, skipping closure notifications"
                );
                return;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load winning owner for notifications");
                return;
            }
        };

        let losing_owner_ids: Vec<DbId> = pending
            .iter()
            .filter(|b| b.id != winner.id)
            .map(|b| b.owner_id)
            .collect();

        let payload = AuctionClosed {
            request_id: request.id,
            manager_id: request.manager_id,
            equipment_type: request.equipment_type.clone(),
            equipment_subtype: request.equipment_subtype.clone(),
            winning_bid_id: winner.id,
            winning_price: winner.total_price,
            winner: WinnerContact {
                user_id: winner_user.id,
                username: winner_user.username,
                email: winner_user.email,
                phone: winner_user.phone,
            },
            losing_owner_ids,
        };
        self.publish(
            MarketEvent::new(EVENT_AUCTION_CLOSED).with_source("rental_request", request.id),
            &payload,
        );
    }

    /// Serialize a payload onto an event and publish it, best-effort.
    fn publish<P: serde::Serialize>(&self, event: MarketEvent, payload: &P) {
        match serde_json::to_value(payload) {
            Ok(value) => self.bus.publish(event.with_payload(value)),
            Err(e) => {
                tracing::error!(error = %e, event_type = %event.event_type, "Failed to serialize event payload");
            }
        }
    }
}
