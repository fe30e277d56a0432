//! Repository for the `equipment` table, including the partnership-scoped
//! eligibility joins.
//!
//! The eligibility queries are the marketplace's access-control boundary:
//! equipment is visible to a manager only through an active partnership
//! edge between the owner's company and the manager's company, and only
//! while owner, company, and equipment are all active/available.

use sqlx::{PgConnection, PgPool};

use rentora_core::types::DbId;

use crate::models::equipment::{CreateEquipment, EligibleOwner, Equipment};
use crate::models::status::EquipmentStatus;

/// Column list for `equipment` queries.
const COLUMNS: &str = "id, owner_id, equipment_type, equipment_subtype, status_id, \
    hourly_rate, daily_rate, location, description, created_at, updated_at";

/// Column list for eligibility JOIN queries (`e`-aliased).
const JOINED_COLUMNS: &str = "e.id, e.owner_id, e.equipment_type, e.equipment_subtype, \
    e.status_id, e.hourly_rate, e.daily_rate, e.location, e.description, \
    e.created_at, e.updated_at";

/// Shared join chain from available equipment to an active partnership
/// with the manager's company ($1).
const ELIGIBILITY_JOINS: &str = "\
    JOIN users o ON o.id = e.owner_id AND o.is_active \
    JOIN companies oc ON oc.id = o.company_id AND oc.status_id = 1 \
    JOIN partnerships p ON p.owner_company_id = oc.id \
        AND p.manager_company_id = $1 \
        AND p.status_id = 1";

/// Provides CRUD operations and eligibility queries for equipment.
pub struct EquipmentRepo;

impl EquipmentRepo {
    /// Register a new piece of equipment for an owner.
    pub async fn create(
        pool: &PgPool,
        owner_id: DbId,
        input: &CreateEquipment,
    ) -> Result<Equipment, sqlx::Error> {
        let query = format!(
            "INSERT INTO equipment \
                (owner_id, equipment_type, equipment_subtype, hourly_rate, daily_rate, \
                 location, description) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Equipment>(&query)
            .bind(owner_id)
            .bind(&input.equipment_type)
            .bind(&input.equipment_subtype)
            .bind(input.hourly_rate)
            .bind(input.daily_rate)
            .bind(&input.location)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    /// Find equipment by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Equipment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM equipment WHERE id = $1");
        sqlx::query_as::<_, Equipment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Transaction-scoped variant of [`find_by_id`](Self::find_by_id),
    /// used by bid submission to check equipment under the request lock.
    pub async fn find_by_id_in(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Equipment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM equipment WHERE id = $1");
        sqlx::query_as::<_, Equipment>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// List an owner's equipment, newest first.
    pub async fn list_by_owner(
        pool: &PgPool,
        owner_id: DbId,
    ) -> Result<Vec<Equipment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM equipment \
             WHERE owner_id = $1 \
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Equipment>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// Set an item's availability status. Idempotent, last-write-wins.
    ///
    /// Returns `true` if a row was updated.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: EquipmentStatus,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE equipment SET status_id = $2 WHERE id = $1")
            .bind(id)
            .bind(status.id())
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Transaction-scoped variant of [`set_status`](Self::set_status),
    /// used by auction closure to flip the winning equipment to busy
    /// atomically with the bid and request updates.
    pub async fn set_status_in(
        conn: &mut PgConnection,
        id: DbId,
        status: EquipmentStatus,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE equipment SET status_id = $2 WHERE id = $1")
            .bind(id)
            .bind(status.id())
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Available equipment of the given type/subtype visible to the
    /// manager's company ($1) through active partnerships.
    pub async fn list_eligible_for_manager(
        pool: &PgPool,
        manager_company_id: DbId,
        equipment_type: &str,
        equipment_subtype: &str,
    ) -> Result<Vec<Equipment>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} FROM equipment e \
             {ELIGIBILITY_JOINS} \
             WHERE e.status_id = $2 \
               AND e.equipment_type = $3 \
               AND e.equipment_subtype = $4 \
             ORDER BY e.id"
        );
        sqlx::query_as::<_, Equipment>(&query)
            .bind(manager_company_id)
            .bind(EquipmentStatus::Available.id())
            .bind(equipment_type)
            .bind(equipment_subtype)
            .fetch_all(pool)
            .await
    }

    /// Owners (with contact details) who hold eligible equipment for the
    /// manager's company ($1). One row per matching equipment item.
    pub async fn list_eligible_owners(
        pool: &PgPool,
        manager_company_id: DbId,
        equipment_type: &str,
        equipment_subtype: &str,
    ) -> Result<Vec<EligibleOwner>, sqlx::Error> {
        let query = format!(
            "SELECT o.id AS owner_id, e.id AS equipment_id, o.username, o.email, o.phone \
             FROM equipment e \
             {ELIGIBILITY_JOINS} \
             WHERE e.status_id = $2 \
               AND e.equipment_type = $3 \
               AND e.equipment_subtype = $4 \
             ORDER BY o.id, e.id"
        );
        sqlx::query_as::<_, EligibleOwner>(&query)
            .bind(manager_company_id)
            .bind(EquipmentStatus::Available.id())
            .bind(equipment_type)
            .bind(equipment_subtype)
            .fetch_all(pool)
            .await
    }
}
