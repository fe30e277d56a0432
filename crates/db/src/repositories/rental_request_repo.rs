//! Repository for the `rental_requests` table.
//!
//! Uses `RequestStatus` from `models::status` for all status transitions.
//! The closure-claim update ([`mark_closing`](RentalRequestRepo::mark_closing))
//! is the single concurrency guard for auction closure: whichever caller
//! flips auction_active -> auction_closed first wins; every other caller
//! sees zero rows affected.

use sqlx::{PgConnection, PgPool};

use rentora_core::types::{DbId, Timestamp};

use crate::models::rental_request::{CreateRentalRequest, RentalRequest};
use crate::models::status::RequestStatus;

/// Column list for `rental_requests` queries.
const COLUMNS: &str = "id, manager_id, equipment_type, equipment_subtype, \
    start_date, end_date, location, description, budget_range, \
    status_id, auction_deadline, winning_bid_id, created_at, updated_at";

/// `r`-aliased column list for JOIN queries.
const JOINED_COLUMNS: &str = "r.id, r.manager_id, r.equipment_type, r.equipment_subtype, \
    r.start_date, r.end_date, r.location, r.description, r.budget_range, \
    r.status_id, r.auction_deadline, r.winning_bid_id, r.created_at, r.updated_at";

/// Provides CRUD and lifecycle operations for rental requests.
pub struct RentalRequestRepo;

impl RentalRequestRepo {
    /// Insert a new request directly into auction_active with the given
    /// deadline.
    pub async fn create(
        pool: &PgPool,
        manager_id: DbId,
        input: &CreateRentalRequest,
        auction_deadline: Timestamp,
    ) -> Result<RentalRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO rental_requests \
                (manager_id, equipment_type, equipment_subtype, start_date, end_date, \
                 location, description, budget_range, status_id, auction_deadline) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RentalRequest>(&query)
            .bind(manager_id)
            .bind(&input.equipment_type)
            .bind(&input.equipment_subtype)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(&input.location)
            .bind(&input.description)
            .bind(&input.budget_range)
            .bind(RequestStatus::AuctionActive.id())
            .bind(auction_deadline)
            .fetch_one(pool)
            .await
    }

    /// Find a request by internal ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<RentalRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rental_requests WHERE id = $1");
        sqlx::query_as::<_, RentalRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Transaction-scoped variant of [`find_by_id`](Self::find_by_id).
    pub async fn find_by_id_in(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<RentalRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rental_requests WHERE id = $1");
        sqlx::query_as::<_, RentalRequest>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Whether the given open request is visible to the owner through the
    /// same partnership/equipment joins as
    /// [`list_open_for_owner`](Self::list_open_for_owner).
    pub async fn is_open_for_owner(
        pool: &PgPool,
        owner_id: DbId,
        request_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let visible: Option<i32> = sqlx::query_scalar(
            "SELECT 1 FROM rental_requests r \
             JOIN users m ON m.id = r.manager_id \
             JOIN companies mc ON mc.id = m.company_id AND mc.status_id = 1 \
             JOIN users o ON o.id = $1 \
             JOIN partnerships p ON p.manager_company_id = mc.id \
                 AND p.owner_company_id = o.company_id \
                 AND p.status_id = 1 \
             WHERE r.id = $2 \
               AND r.status_id = $3 \
               AND EXISTS ( \
                   SELECT 1 FROM equipment e \
                   WHERE e.owner_id = $1 \
                     AND e.status_id = 1 \
                     AND e.equipment_type = r.equipment_type \
                     AND e.equipment_subtype = r.equipment_subtype \
               )",
        )
        .bind(owner_id)
        .bind(request_id)
        .bind(RequestStatus::AuctionActive.id())
        .fetch_optional(pool)
        .await?;
        Ok(visible.is_some())
    }

    /// Load a request row and lock it for the duration of the caller's
    /// transaction (`SELECT ... FOR UPDATE`).
    ///
    /// Bid submission takes this lock before re-checking status and
    /// deadline, so a submit racing a closure serializes on the row:
    /// it either commits before the closure reads bids or observes the
    /// closed status.
    pub async fn lock_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<RentalRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rental_requests WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, RentalRequest>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Atomically claim a request for closure.
    ///
    /// Conditional transition auction_active -> auction_closed; returns
    /// `false` when the request was not in auction_active (already closed,
    /// cancelled, or never existed), in which case the caller must treat
    /// the closure as a no-op.
    pub async fn mark_closing(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE rental_requests \
             SET status_id = $2 \
             WHERE id = $1 AND status_id = $3",
        )
        .bind(id)
        .bind(RequestStatus::AuctionClosed.id())
        .bind(RequestStatus::AuctionActive.id())
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record the winning bid on a freshly closed request.
    pub async fn set_winning_bid(
        conn: &mut PgConnection,
        id: DbId,
        winning_bid_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE rental_requests SET winning_bid_id = $2 WHERE id = $1")
            .bind(id)
            .bind(winning_bid_id)
            .execute(conn)
            .await?;
        Ok(())
    }

    /// Conditional transition auction_closed -> completed, triggered when
    /// the rental period ends. Returns `false` when the request was not
    /// in auction_closed.
    pub async fn mark_completed(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE rental_requests \
             SET status_id = $2 \
             WHERE id = $1 AND status_id = $3",
        )
        .bind(id)
        .bind(RequestStatus::Completed.id())
        .bind(RequestStatus::AuctionClosed.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Finalize a no-bids closure: auction_closed -> cancelled.
    pub async fn finalize_cancelled(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE rental_requests SET status_id = $2 WHERE id = $1")
            .bind(id)
            .bind(RequestStatus::Cancelled.id())
            .execute(conn)
            .await?;
        Ok(())
    }

    /// All open auctions whose deadline has elapsed as of `now`.
    pub async fn list_expired_active(
        pool: &PgPool,
        now: Timestamp,
    ) -> Result<Vec<RentalRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rental_requests \
             WHERE status_id = $1 AND auction_deadline <= $2 \
             ORDER BY auction_deadline"
        );
        sqlx::query_as::<_, RentalRequest>(&query)
            .bind(RequestStatus::AuctionActive.id())
            .bind(now)
            .fetch_all(pool)
            .await
    }

    /// List a manager's own requests, newest first.
    pub async fn list_by_manager(
        pool: &PgPool,
        manager_id: DbId,
    ) -> Result<Vec<RentalRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rental_requests \
             WHERE manager_id = $1 \
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, RentalRequest>(&query)
            .bind(manager_id)
            .fetch_all(pool)
            .await
    }

    /// List all requests (admin view), newest first.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<RentalRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rental_requests ORDER BY created_at DESC");
        sqlx::query_as::<_, RentalRequest>(&query)
            .fetch_all(pool)
            .await
    }

    /// Open auctions the given owner can bid on: the owner's company has
    /// an active partnership with the manager's (active) company, and the
    /// owner holds available equipment matching the requested type.
    pub async fn list_open_for_owner(
        pool: &PgPool,
        owner_id: DbId,
    ) -> Result<Vec<RentalRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} FROM rental_requests r \
             JOIN users m ON m.id = r.manager_id \
             JOIN companies mc ON mc.id = m.company_id AND mc.status_id = 1 \
             JOIN users o ON o.id = $1 \
             JOIN partnerships p ON p.manager_company_id = mc.id \
                 AND p.owner_company_id = o.company_id \
                 AND p.status_id = 1 \
             WHERE r.status_id = $2 \
               AND EXISTS ( \
                   SELECT 1 FROM equipment e \
                   WHERE e.owner_id = $1 \
                     AND e.status_id = 1 \
                     AND e.equipment_type = r.equipment_type \
                     AND e.equipment_subtype = r.equipment_subtype \
               ) \
             ORDER BY r.created_at DESC"
        );
        sqlx::query_as::<_, RentalRequest>(&query)
            .bind(owner_id)
            .bind(RequestStatus::AuctionActive.id())
            .fetch_all(pool)
            .await
    }
}
