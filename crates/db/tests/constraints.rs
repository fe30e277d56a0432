//! Integration tests for the schema's load-bearing constraints:
//! - one bid per (request, owner)
//! - no self- or duplicate partnerships
//! - positive rates and prices
//! - bids cascade when a request is deleted

use chrono::{Duration, NaiveDate, Utc};
use sqlx::PgPool;

use rentora_core::roles::{ROLE_MANAGER_ID, ROLE_OWNER_ID};
use rentora_core::types::DbId;
use rentora_db::models::company::CreateCompany;
use rentora_db::models::equipment::CreateEquipment;
use rentora_db::models::partnership::CreatePartnership;
use rentora_db::models::rental_bid::SubmitBid;
use rentora_db::models::rental_request::CreateRentalRequest;
use rentora_db::models::user::CreateUser;
use rentora_db::repositories::{
    CompanyRepo, EquipmentRepo, PartnershipRepo, RentalBidRepo, RentalRequestRepo, UserRepo,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.code().as_deref() == Some("23505")
                && db_err.constraint() == Some(constraint)
        }
        _ => false,
    }
}

fn check_violation(err: &sqlx::Error) -> bool {
    match err {
        // PostgreSQL CHECK constraint violation: SQLSTATE 23514
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23514"),
        _ => false,
    }
}

async fn seed_pair(pool: &PgPool) -> (DbId, DbId, DbId, DbId) {
    let owner_co = CompanyRepo::create(pool, &CreateCompany { name: "Owner Co".into() })
        .await
        .unwrap()
        .id;
    let manager_co = CompanyRepo::create(pool, &CreateCompany { name: "Manager Co".into() })
        .await
        .unwrap()
        .id;
    PartnershipRepo::create(
        pool,
        &CreatePartnership {
            owner_company_id: owner_co,
            manager_company_id: manager_co,
        },
    )
    .await
    .unwrap();

    let owner = UserRepo::create(
        pool,
        &CreateUser {
            username: "owner".into(),
            email: "owner@example.com".into(),
            phone: None,
            password_hash: "$argon2id$stub".into(),
            role_id: ROLE_OWNER_ID,
            company_id: Some(owner_co),
        },
    )
    .await
    .unwrap()
    .id;
    let manager = UserRepo::create(
        pool,
        &CreateUser {
            username: "manager".into(),
            email: "manager@example.com".into(),
            phone: None,
            password_hash: "$argon2id$stub".into(),
            role_id: ROLE_MANAGER_ID,
            company_id: Some(manager_co),
        },
    )
    .await
    .unwrap()
    .id;

    (owner_co, manager_co, owner, manager)
}

async fn seed_request(pool: &PgPool, manager: DbId) -> DbId {
    RentalRequestRepo::create(
        pool,
        manager,
        &CreateRentalRequest {
            equipment_type: "Excavators".into(),
            equipment_subtype: "20-25t tracked".into(),
            start_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 9, 14).unwrap(),
            location: None,
            description: None,
            budget_range: None,
        },
        Utc::now() + Duration::minutes(30),
    )
    .await
    .unwrap()
    .id
}

async fn seed_equipment(pool: &PgPool, owner: DbId) -> DbId {
    EquipmentRepo::create(
        pool,
        owner,
        &CreateEquipment {
            equipment_type: "Excavators".into(),
            equipment_subtype: "20-25t tracked".into(),
            hourly_rate: 2_500,
            daily_rate: 18_000,
            location: None,
            description: None,
        },
    )
    .await
    .unwrap()
    .id
}

fn bid(equipment_id: DbId, total_price: i64) -> SubmitBid {
    SubmitBid {
        equipment_id,
        hourly_rate: 2_500,
        daily_rate: 18_000,
        total_price,
        comment: None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_bid_per_owner_rejected(pool: PgPool) {
    let (_, _, owner, manager) = seed_pair(&pool).await;
    let request = seed_request(&pool, manager).await;
    let equipment = seed_equipment(&pool, owner).await;

    let mut conn = pool.acquire().await.unwrap();
    RentalBidRepo::insert(&mut conn, request, owner, &bid(equipment, 200_000))
        .await
        .unwrap();

    let err = RentalBidRepo::insert(&mut conn, request, owner, &bid(equipment, 190_000))
        .await
        .unwrap_err();
    assert!(unique_violation(&err, "uq_rental_bids_request_owner"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_self_partnership_rejected(pool: PgPool) {
    let company = CompanyRepo::create(&pool, &CreateCompany { name: "Solo Co".into() })
        .await
        .unwrap()
        .id;

    let err = PartnershipRepo::create(
        &pool,
        &CreatePartnership {
            owner_company_id: company,
            manager_company_id: company,
        },
    )
    .await
    .unwrap_err();
    assert!(check_violation(&err));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_partnership_edge_rejected(pool: PgPool) {
    let (owner_co, manager_co, _, _) = seed_pair(&pool).await;

    let err = PartnershipRepo::create(
        &pool,
        &CreatePartnership {
            owner_company_id: owner_co,
            manager_company_id: manager_co,
        },
    )
    .await
    .unwrap_err();
    assert!(unique_violation(&err, "uq_partnerships_edge"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_non_positive_bid_price_rejected_by_schema(pool: PgPool) {
    let (_, _, owner, manager) = seed_pair(&pool).await;
    let request = seed_request(&pool, manager).await;
    let equipment = seed_equipment(&pool, owner).await;

    let mut conn = pool.acquire().await.unwrap();
    let err = RentalBidRepo::insert(&mut conn, request, owner, &bid(equipment, 0))
        .await
        .unwrap_err();
    assert!(check_violation(&err));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_bids_cascade_with_their_request(pool: PgPool) {
    let (_, _, owner, manager) = seed_pair(&pool).await;
    let request = seed_request(&pool, manager).await;
    let equipment = seed_equipment(&pool, owner).await;

    let mut conn = pool.acquire().await.unwrap();
    let placed = RentalBidRepo::insert(&mut conn, request, owner, &bid(equipment, 200_000))
        .await
        .unwrap();
    drop(conn);

    sqlx::query("DELETE FROM rental_requests WHERE id = $1")
        .bind(request)
        .execute(&pool)
        .await
        .unwrap();

    let gone = RentalBidRepo::find_by_id(&pool, placed.id).await.unwrap();
    assert!(gone.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_updated_at_advances_on_update(pool: PgPool) {
    let (_, _, owner, _) = seed_pair(&pool).await;
    let equipment = seed_equipment(&pool, owner).await;

    let before = EquipmentRepo::find_by_id(&pool, equipment)
        .await
        .unwrap()
        .unwrap();

    EquipmentRepo::set_status(
        &pool,
        equipment,
        rentora_db::models::status::EquipmentStatus::Maintenance,
    )
    .await
    .unwrap();

    let after = EquipmentRepo::find_by_id(&pool, equipment)
        .await
        .unwrap()
        .unwrap();
    assert!(after.updated_at >= before.updated_at);
    assert_ne!(after.status_id, before.status_id);
}
