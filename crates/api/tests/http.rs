//! Router-level integration tests: identity extraction, status-code
//! mapping, and the request/bid flow over HTTP.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use rentora_api::config::ServerConfig;
use rentora_api::router::build_app_router;
use rentora_api::state::AppState;
use rentora_auction::{AuctionConfig, RequestLifecycle};
use rentora_core::roles::{ROLE_ADMIN_ID, ROLE_MANAGER_ID, ROLE_OWNER_ID};
use rentora_core::types::DbId;
use rentora_db::models::company::CreateCompany;
use rentora_db::models::equipment::CreateEquipment;
use rentora_db::models::partnership::CreatePartnership;
use rentora_db::models::user::CreateUser;
use rentora_db::repositories::{CompanyRepo, EquipmentRepo, PartnershipRepo, UserRepo};
use rentora_events::EventBus;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".into(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".into()],
        request_timeout_secs: 30,
        notify_gateway_url: None,
    }
}

fn app(pool: &PgPool) -> axum::Router {
    let config = test_config();
    let bus = Arc::new(EventBus::default());
    let lifecycle = Arc::new(RequestLifecycle::new(
        pool.clone(),
        Arc::clone(&bus),
        AuctionConfig::default(),
    ));
    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config.clone()),
        lifecycle,
        bus,
    };
    build_app_router(state, &config)
}

struct Seed {
    admin: DbId,
    manager: DbId,
    owner: DbId,
    equipment: DbId,
}

async fn seed(pool: &PgPool) -> Seed {
    let manager_co = CompanyRepo::create(pool, &CreateCompany { name: "Build Co".into() })
        .await
        .unwrap()
        .id;
    let owner_co = CompanyRepo::create(pool, &CreateCompany { name: "Rent Co".into() })
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

    let mk_user = |name: &str, role: DbId, company: Option<DbId>| CreateUser {
        username: name.to_string(),
        email: format!("{name}@example.com"),
        phone: None,
        password_hash: "$argon2id$stub".into(),
        role_id: role,
        company_id: company,
    };

    let admin = UserRepo::create(pool, &mk_user("admin", ROLE_ADMIN_ID, None))
        .await
        .unwrap()
        .id;
    let manager = UserRepo::create(pool, &mk_user("manager", ROLE_MANAGER_ID, Some(manager_co)))
        .await
        .unwrap()
        .id;
    let owner = UserRepo::create(pool, &mk_user("owner", ROLE_OWNER_ID, Some(owner_co)))
        .await
        .unwrap()
        .id;

    let equipment = EquipmentRepo::create(
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
    .id;

    Seed {
        admin,
        manager,
        owner,
        equipment,
    }
}

fn json_request(method: &str, uri: &str, user_id: DbId, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("x-user-id", user_id.to_string())
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str, user_id: DbId) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("x-user-id", user_id.to_string())
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn create_request_body() -> serde_json::Value {
    serde_json::json!({
        "equipment_type": "Excavators",
        "equipment_subtype": "20-25t tracked",
        "start_date": "2026-09-01",
        "end_date": "2026-09-14",
        "location": "site 4",
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn health_endpoint_reports_ok(pool: PgPool) {
    let app = app(&pool);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["db_healthy"], true);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_identity_header_is_unauthorized(pool: PgPool) {
    let app = app(&pool);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/requests")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn request_and_bid_flow_over_http(pool: PgPool) {
    let fixtures = seed(&pool).await;

    // Manager opens an auction.
    let response = app(&pool)
        .oneshot(json_request(
            "POST",
            "/api/v1/requests",
            fixtures.manager,
            create_request_body(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let request_id = created["data"]["id"].as_i64().unwrap();
    assert_eq!(created["data"]["status_id"], 2);

    // Owner bids.
    let response = app(&pool)
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/requests/{request_id}/bids"),
            fixtures.owner,
            serde_json::json!({
                "equipment_id": fixtures.equipment,
                "hourly_rate": 2500,
                "daily_rate": 18000,
                "total_price": 185000,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // Manager sees a bid count while the auction is open.
    let response = app(&pool)
        .oneshot(get_request(
            &format!("/api/v1/requests/{request_id}/bids"),
            fixtures.manager,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listing = body_json(response).await;
    assert_eq!(listing["data"]["kind"], "count");
    assert_eq!(listing["data"]["count"], 1);

    // A manager cannot force-close.
    let response = app(&pool)
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/requests/{request_id}/close"),
            fixtures.manager,
            serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // An admin can; the single bid wins.
    let response = app(&pool)
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/requests/{request_id}/close"),
            fixtures.admin,
            serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let outcome = body_json(response).await;
    assert_eq!(outcome["data"]["winner"]["owner_id"], fixtures.owner);

    // After closure the manager sees full priced bids.
    let response = app(&pool)
        .oneshot(get_request(
            &format!("/api/v1/requests/{request_id}/bids"),
            fixtures.manager,
        ))
        .await
        .unwrap();
    let listing = body_json(response).await;
    assert_eq!(listing["data"]["kind"], "bids");
    assert_eq!(listing["data"]["bids"][0]["total_price"], 185000);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn conflict_maps_to_409(pool: PgPool) {
    let fixtures = seed(&pool).await;

    // Bulldozers have no eligible owners: creation is rejected with 409.
    let response = app(&pool)
        .oneshot(json_request(
            "POST",
            "/api/v1/requests",
            fixtures.manager,
            serde_json::json!({
                "equipment_type": "Bulldozers",
                "equipment_subtype": "D9",
                "start_date": "2026-09-01",
                "end_date": "2026-09-14",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["code"], "CONFLICT");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_equipment_status_maps_to_400(pool: PgPool) {
    let fixtures = seed(&pool).await;

    let response = app(&pool)
        .oneshot(json_request(
            "PUT",
            &format!("/api/v1/equipment/{}/status", fixtures.equipment),
            fixtures.owner,
            serde_json::json!({"status": "retired"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
}
