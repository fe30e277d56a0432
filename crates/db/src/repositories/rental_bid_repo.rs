//! Repository for the `rental_bids` table.
//!
//! The `uq_rental_bids_request_owner` unique constraint backs the
//! one-bid-per-owner rule; callers treat a 23505 on it as a duplicate-bid
//! conflict rather than an internal error.

use sqlx::{PgConnection, PgPool};

use rentora_core::types::DbId;

use crate::models::rental_bid::{RentalBid, SubmitBid, UpdateBid};
use crate::models::status::BidStatus;

/// Column list for `rental_bids` queries.
const COLUMNS: &str = "id, request_id, owner_id, equipment_id, hourly_rate, daily_rate, \
    total_price, comment, status_id, created_at, updated_at";

/// Provides CRUD and closure operations for bids.
pub struct RentalBidRepo;

impl RentalBidRepo {
    /// Insert a pending bid inside the caller's transaction.
    pub async fn insert(
        conn: &mut PgConnection,
        request_id: DbId,
        owner_id: DbId,
        input: &SubmitBid,
    ) -> Result<RentalBid, sqlx::Error> {
        let query = format!(
            "INSERT INTO rental_bids \
                (request_id, owner_id, equipment_id, hourly_rate, daily_rate, \
                 total_price, comment) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RentalBid>(&query)
            .bind(request_id)
            .bind(owner_id)
            .bind(input.equipment_id)
            .bind(input.hourly_rate)
            .bind(input.daily_rate)
            .bind(input.total_price)
            .bind(&input.comment)
            .fetch_one(conn)
            .await
    }

    /// Find a bid by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<RentalBid>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rental_bids WHERE id = $1");
        sqlx::query_as::<_, RentalBid>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Transaction-scoped variant of [`find_by_id`](Self::find_by_id).
    pub async fn find_by_id_in(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<RentalBid>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rental_bids WHERE id = $1");
        sqlx::query_as::<_, RentalBid>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// The owner's bid on a request, if any.
    pub async fn find_by_request_and_owner(
        conn: &mut PgConnection,
        request_id: DbId,
        owner_id: DbId,
    ) -> Result<Option<RentalBid>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM rental_bids WHERE request_id = $1 AND owner_id = $2");
        sqlx::query_as::<_, RentalBid>(&query)
            .bind(request_id)
            .bind(owner_id)
            .fetch_optional(conn)
            .await
    }

    /// All bids on a request, cheapest first.
    pub async fn list_for_request(
        pool: &PgPool,
        request_id: DbId,
    ) -> Result<Vec<RentalBid>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rental_bids \
             WHERE request_id = $1 \
             ORDER BY total_price, created_at, id"
        );
        sqlx::query_as::<_, RentalBid>(&query)
            .bind(request_id)
            .fetch_all(pool)
            .await
    }

    /// Pending bids on a request in deterministic winner order
    /// (total_price, created_at, id), inside the caller's transaction.
    pub async fn list_pending_for_request(
        conn: &mut PgConnection,
        request_id: DbId,
    ) -> Result<Vec<RentalBid>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rental_bids \
             WHERE request_id = $1 AND status_id = $2 \
             ORDER BY total_price, created_at, id"
        );
        sqlx::query_as::<_, RentalBid>(&query)
            .bind(request_id)
            .bind(BidStatus::Pending.id())
            .fetch_all(conn)
            .await
    }

    /// Number of bids on a request (shown to the manager while the
    /// auction is still open).
    pub async fn count_for_request(pool: &PgPool, request_id: DbId) -> Result<i64, sqlx::Error> {
        let count: Option<i64> =
            sqlx::query_scalar("SELECT COUNT(*) FROM rental_bids WHERE request_id = $1")
                .bind(request_id)
                .fetch_one(pool)
                .await?;
        Ok(count.unwrap_or(0))
    }

    /// Mark the winning bid accepted.
    pub async fn mark_accepted(conn: &mut PgConnection, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE rental_bids SET status_id = $2 WHERE id = $1")
            .bind(id)
            .bind(BidStatus::Accepted.id())
            .execute(conn)
            .await?;
        Ok(())
    }

    /// Reject every other pending bid on a request, returning how many
    /// rows were rejected.
    pub async fn reject_other_pending(
        conn: &mut PgConnection,
        request_id: DbId,
        accepted_bid_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE rental_bids \
             SET status_id = $3 \
             WHERE request_id = $1 AND id <> $2 AND status_id = $4",
        )
        .bind(request_id)
        .bind(accepted_bid_id)
        .bind(BidStatus::Rejected.id())
        .bind(BidStatus::Pending.id())
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Amend a bid's pricing fields inside the caller's transaction.
    /// Only non-`None` fields are applied. Returns `None` if the bid
    /// does not exist.
    pub async fn update(
        conn: &mut PgConnection,
        id: DbId,
        input: &UpdateBid,
    ) -> Result<Option<RentalBid>, sqlx::Error> {
        let query = format!(
            "UPDATE rental_bids SET \
                hourly_rate = COALESCE($2, hourly_rate), \
                daily_rate = COALESCE($3, daily_rate), \
                total_price = COALESCE($4, total_price), \
                comment = COALESCE($5, comment) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RentalBid>(&query)
            .bind(id)
            .bind(input.hourly_rate)
            .bind(input.daily_rate)
            .bind(input.total_price)
            .bind(&input.comment)
            .fetch_optional(conn)
            .await
    }

    /// Delete a bid inside the caller's transaction. Returns `true` if a
    /// row was removed.
    pub async fn delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM rental_bids WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List an owner's bids across all requests, newest first.
    pub async fn list_by_owner(
        pool: &PgPool,
        owner_id: DbId,
    ) -> Result<Vec<RentalBid>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rental_bids \
             WHERE owner_id = $1 \
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, RentalBid>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }
}
