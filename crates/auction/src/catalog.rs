//! Equipment catalog operations.
//!
//! Equipment status is the only channel through which a closed auction
//! affects future matching: once busy, an item disappears from the
//! eligibility joins until released here. Release is always manual;
//! there is no automatic busy -> available transition when a rental
//! period ends.

use sqlx::PgPool;
use validator::Validate;

use rentora_core::roles::ROLE_ADMIN_ID;
use rentora_core::types::DbId;
use rentora_core::CoreError;
use rentora_db::models::equipment::{CreateEquipment, Equipment};
use rentora_db::models::status::EquipmentStatus;
use rentora_db::repositories::EquipmentRepo;

use crate::access;
use crate::error::map_db_err;

/// Ownership-scoped catalog operations.
pub struct EquipmentCatalog;

impl EquipmentCatalog {
    /// Register a new piece of equipment for the calling owner.
    pub async fn register(
        pool: &PgPool,
        owner_id: DbId,
        input: &CreateEquipment,
    ) -> Result<Equipment, CoreError> {
        input
            .validate()
            .map_err(|e| CoreError::Validation(e.to_string()))?;
        access::resolve_owner(pool, owner_id).await?;
        EquipmentRepo::create(pool, owner_id, input)
            .await
            .map_err(map_db_err)
    }

    /// List an owner's equipment.
    pub async fn find_by_owner(pool: &PgPool, owner_id: DbId) -> Result<Vec<Equipment>, CoreError> {
        EquipmentRepo::list_by_owner(pool, owner_id)
            .await
            .map_err(map_db_err)
    }

    /// Set an item's status. Idempotent, last-write-wins.
    ///
    /// Permitted for the item's owner and for administrators. This is the
    /// manual release path for busy equipment.
    pub async fn set_status(
        pool: &PgPool,
        caller_id: DbId,
        equipment_id: DbId,
        status: EquipmentStatus,
    ) -> Result<(), CoreError> {
        let caller = access::resolve_user(pool, caller_id).await?;

        let equipment = EquipmentRepo::find_by_id(pool, equipment_id)
            .await
            .map_err(map_db_err)?
            .ok_or(CoreError::not_found("Equipment", equipment_id))?;

        if caller.role_id != ROLE_ADMIN_ID && equipment.owner_id != caller_id {
            return Err(CoreError::Forbidden(
                "cannot change status of another owner's equipment".into(),
            ));
        }

        EquipmentRepo::set_status(pool, equipment_id, status)
            .await
            .map_err(map_db_err)?;
        Ok(())
    }

    /// Whether the item exists, belongs to `owner_id`, and is available.
    /// Authorization primitive used by the bid ledger.
    pub async fn is_available_and_owned_by(
        pool: &PgPool,
        equipment_id: DbId,
        owner_id: DbId,
    ) -> Result<bool, CoreError> {
        let equipment = EquipmentRepo::find_by_id(pool, equipment_id)
            .await
            .map_err(map_db_err)?;
        Ok(equipment.is_some_and(|e| {
            e.owner_id == owner_id && e.status_id == EquipmentStatus::Available.id()
        }))
    }
}
