//! Repository for the `partnerships` table.

use sqlx::PgPool;

use rentora_core::types::DbId;

use crate::models::partnership::{CreatePartnership, Partnership};
use crate::models::status::PartnershipStatus;

/// Column list for `partnerships` queries.
const COLUMNS: &str =
    "id, owner_company_id, manager_company_id, status_id, created_at, updated_at";

/// Provides CRUD operations for partnership edges.
pub struct PartnershipRepo;

impl PartnershipRepo {
    /// Insert a new active partnership edge.
    ///
    /// The `uq_partnerships_edge` constraint rejects duplicate edges and
    /// `ck_partnerships_no_self` rejects self-partnerships.
    pub async fn create(
        pool: &PgPool,
        input: &CreatePartnership,
    ) -> Result<Partnership, sqlx::Error> {
        let query = format!(
            "INSERT INTO partnerships (owner_company_id, manager_company_id) \
             VALUES ($1, $2) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Partnership>(&query)
            .bind(input.owner_company_id)
            .bind(input.manager_company_id)
            .fetch_one(pool)
            .await
    }

    /// Find a partnership by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Partnership>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM partnerships WHERE id = $1");
        sqlx::query_as::<_, Partnership>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List every edge touching a company, on either side.
    pub async fn list_for_company(
        pool: &PgPool,
        company_id: DbId,
    ) -> Result<Vec<Partnership>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM partnerships \
             WHERE owner_company_id = $1 OR manager_company_id = $1 \
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Partnership>(&query)
            .bind(company_id)
            .fetch_all(pool)
            .await
    }

    /// Set an edge's status (revocation / reinstatement).
    ///
    /// Returns `true` if a row was updated.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: PartnershipStatus,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE partnerships SET status_id = $2 WHERE id = $1")
            .bind(id)
            .bind(status.id())
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
