//! Partnership-scoped visibility queries.
//!
//! Which equipment (and which owners) a manager may see is decided
//! entirely by the join chain in `EquipmentRepo`: active partnership edge
//! from the owner's company to the manager's company, active owner user,
//! active owner company, available equipment of the requested type. This
//! is the marketplace's access-control invariant; nothing outside that
//! join may widen the result set.

use sqlx::PgPool;

use rentora_core::types::DbId;
use rentora_core::CoreError;
use rentora_db::models::equipment::{EligibleOwner, Equipment};
use rentora_db::repositories::EquipmentRepo;

use crate::access;
use crate::error::map_db_err;

/// Read-only eligibility resolution. Safe to call concurrently and
/// repeatedly; no side effects.
pub struct PartnershipDirectory;

impl PartnershipDirectory {
    /// Available equipment of the given type visible to the manager.
    pub async fn eligible_equipment(
        pool: &PgPool,
        manager_id: DbId,
        equipment_type: &str,
        equipment_subtype: &str,
    ) -> Result<Vec<Equipment>, CoreError> {
        let (_, company_id) = access::resolve_manager(pool, manager_id).await?;
        EquipmentRepo::list_eligible_for_manager(
            pool,
            company_id,
            equipment_type,
            equipment_subtype,
        )
        .await
        .map_err(map_db_err)
    }

    /// Owners (with contact info) holding eligible equipment for the
    /// manager's request. One entry per matching equipment item.
    pub async fn eligible_owners(
        pool: &PgPool,
        manager_id: DbId,
        equipment_type: &str,
        equipment_subtype: &str,
    ) -> Result<Vec<EligibleOwner>, CoreError> {
        let (_, company_id) = access::resolve_manager(pool, manager_id).await?;
        Self::eligible_owners_for_company(pool, company_id, equipment_type, equipment_subtype)
            .await
    }

    /// Company-keyed variant used by the lifecycle once the manager has
    /// already been resolved.
    pub(crate) async fn eligible_owners_for_company(
        pool: &PgPool,
        manager_company_id: DbId,
        equipment_type: &str,
        equipment_subtype: &str,
    ) -> Result<Vec<EligibleOwner>, CoreError> {
        EquipmentRepo::list_eligible_owners(
            pool,
            manager_company_id,
            equipment_type,
            equipment_subtype,
        )
        .await
        .map_err(map_db_err)
    }
}
