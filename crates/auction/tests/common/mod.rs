#![allow(dead_code)]

//! Shared fixtures for auction engine integration tests.

use std::sync::{Arc, Mutex};

use sqlx::PgPool;
use uuid::Uuid;

use rentora_auction::{AuctionConfig, RequestLifecycle};
use rentora_core::roles::{ROLE_ADMIN_ID, ROLE_MANAGER_ID, ROLE_OWNER_ID};
use rentora_core::types::DbId;
use rentora_db::models::company::CreateCompany;
use rentora_db::models::equipment::CreateEquipment;
use rentora_db::models::partnership::CreatePartnership;
use rentora_db::models::rental_bid::SubmitBid;
use rentora_db::models::rental_request::CreateRentalRequest;
use rentora_db::models::user::CreateUser;
use rentora_db::repositories::{CompanyRepo, EquipmentRepo, PartnershipRepo, UserRepo};
use rentora_events::gateway::{Notifier, NotifyError, NotifyRequest};
use rentora_events::EventBus;

pub const EXCAVATOR: &str = "Excavators";
pub const EXCAVATOR_SUB: &str = "20-25t tracked";

/// A seeded marketplace: one manager company, two owner companies with an
/// active partnership each, one admin, and one matching available
/// excavator per owner.
pub struct Marketplace {
    pub admin_id: DbId,
    pub manager_id: DbId,
    pub manager_company_id: DbId,
    pub owner_a: DbId,
    pub owner_b: DbId,
    pub owner_company_a: DbId,
    pub owner_company_b: DbId,
    pub equipment_a: DbId,
    pub equipment_b: DbId,
}

pub async fn create_company(pool: &PgPool, name: &str) -> DbId {
    CompanyRepo::create(
        pool,
        &CreateCompany {
            name: name.to_string(),
        },
    )
    .await
    .expect("create company")
    .id
}

pub async fn create_user(pool: &PgPool, username: &str, role_id: DbId, company_id: Option<DbId>) -> DbId {
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            phone: None,
            password_hash: "$argon2id$stub".to_string(),
            role_id,
            company_id,
        },
    )
    .await
    .expect("create user")
    .id
}

pub async fn create_partnership(pool: &PgPool, owner_company: DbId, manager_company: DbId) -> DbId {
    PartnershipRepo::create(
        pool,
        &CreatePartnership {
            owner_company_id: owner_company,
            manager_company_id: manager_company,
        },
    )
    .await
    .expect("create partnership")
    .id
}

pub async fn create_equipment(
    pool: &PgPool,
    owner_id: DbId,
    equipment_type: &str,
    equipment_subtype: &str,
) -> DbId {
    EquipmentRepo::create(
        pool,
        owner_id,
        &CreateEquipment {
            equipment_type: equipment_type.to_string(),
            equipment_subtype: equipment_subtype.to_string(),
            hourly_rate: 2_500,
            daily_rate: 18_000,
            location: None,
            description: None,
        },
    )
    .await
    .expect("create equipment")
    .id
}

pub async fn seed_marketplace(pool: &PgPool) -> Marketplace {
    let manager_company_id = create_company(pool, "Stroy Invest").await;
    let owner_company_a = create_company(pool, "TechRent A").await;
    let owner_company_b = create_company(pool, "TechRent B").await;

    create_partnership(pool, owner_company_a, manager_company_id).await;
    create_partnership(pool, owner_company_b, manager_company_id).await;

    let admin_id = create_user(pool, "admin", ROLE_ADMIN_ID, None).await;
    let manager_id = create_user(pool, "manager", ROLE_MANAGER_ID, Some(manager_company_id)).await;
    let owner_a = create_user(pool, "owner-a", ROLE_OWNER_ID, Some(owner_company_a)).await;
    let owner_b = create_user(pool, "owner-b", ROLE_OWNER_ID, Some(owner_company_b)).await;

    let equipment_a = create_equipment(pool, owner_a, EXCAVATOR, EXCAVATOR_SUB).await;
    let equipment_b = create_equipment(pool, owner_b, EXCAVATOR, EXCAVATOR_SUB).await;

    Marketplace {
        admin_id,
        manager_id,
        manager_company_id,
        owner_a,
        owner_b,
        owner_company_a,
        owner_company_b,
        equipment_a,
        equipment_b,
    }
}

/// A lifecycle engine wired to a fresh bus, with the default 30-minute
/// auction window.
pub fn engine(pool: &PgPool) -> (Arc<RequestLifecycle>, Arc<EventBus>) {
    engine_with(pool, AuctionConfig::default())
}

pub fn engine_with(pool: &PgPool, config: AuctionConfig) -> (Arc<RequestLifecycle>, Arc<EventBus>) {
    let bus = Arc::new(EventBus::default());
    let lifecycle = Arc::new(RequestLifecycle::new(pool.clone(), Arc::clone(&bus), config));
    (lifecycle, bus)
}

/// Config whose auctions are born already expired, for deadline tests.
pub fn expired_config() -> AuctionConfig {
    AuctionConfig {
        auction_duration: chrono::Duration::minutes(-5),
        ..AuctionConfig::default()
    }
}

pub fn excavator_request() -> CreateRentalRequest {
    CreateRentalRequest {
        equipment_type: EXCAVATOR.to_string(),
        equipment_subtype: EXCAVATOR_SUB.to_string(),
        start_date: chrono::NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
        end_date: chrono::NaiveDate::from_ymd_opt(2026, 9, 14).unwrap(),
        location: Some("site 4".to_string()),
        description: None,
        budget_range: None,
    }
}

pub fn bid(equipment_id: DbId, total_price: i64) -> SubmitBid {
    SubmitBid {
        equipment_id,
        hourly_rate: 2_500,
        daily_rate: 18_000,
        total_price,
        comment: None,
    }
}

/// Records every gateway send instead of talking to the network.
pub struct RecordingNotifier {
    sent: Mutex<Vec<(DbId, &'static str)>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn sent(&self) -> Vec<(DbId, &'static str)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, user_id: DbId, request: &NotifyRequest) -> Result<Uuid, NotifyError> {
        self.sent.lock().unwrap().push((user_id, request.kind));
        Ok(Uuid::new_v4())
    }
}
