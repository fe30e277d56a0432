//! Repository for the `companies` table.

use sqlx::PgPool;

use rentora_core::types::DbId;

use crate::models::company::{Company, CreateCompany};
use crate::models::status::CompanyStatus;

/// Column list for `companies` queries.
const COLUMNS: &str = "id, name, status_id, created_at, updated_at";

/// Provides CRUD operations for companies.
pub struct CompanyRepo;

impl CompanyRepo {
    /// Insert a new active company, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateCompany) -> Result<Company, sqlx::Error> {
        let query = format!(
            "INSERT INTO companies (name) \
             VALUES ($1) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Company>(&query)
            .bind(&input.name)
            .fetch_one(pool)
            .await
    }

    /// Find a company by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Company>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM companies WHERE id = $1");
        sqlx::query_as::<_, Company>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all companies ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<Company>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM companies ORDER BY name");
        sqlx::query_as::<_, Company>(&query).fetch_all(pool).await
    }

    /// Set a company's status (soft delete / reactivation).
    ///
    /// Returns `true` if a row was updated. Idempotent: setting the same
    /// status twice is a no-op at the data level.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: CompanyStatus,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE companies SET status_id = $2 WHERE id = $1")
            .bind(id)
            .bind(status.id())
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
