//! Standalone auction worker: runs the expiry watcher and notification
//! dispatcher without the HTTP edge.
//!
//! Safe to run alongside the api process (or a second worker) because
//! auction closure is idempotent; redundant sweeps are no-ops.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rentora_auction::{AuctionConfig, ExpiryWatcher, RequestLifecycle};
use rentora_events::{EventBus, HttpNotificationGateway, NotificationDispatcher};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rentora_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let auction_config = AuctionConfig::from_env();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = rentora_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    rentora_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database connection established");

    let bus = Arc::new(EventBus::default());

    let dispatcher_handle = match std::env::var("NOTIFY_GATEWAY_URL").ok() {
        Some(url) => {
            let gateway = Arc::new(HttpNotificationGateway::new(&url));
            let dispatcher = NotificationDispatcher::new(gateway);
            let handle = tokio::spawn(dispatcher.run(bus.subscribe()));
            tracing::info!(gateway = %url, "Notification dispatcher started");
            Some(handle)
        }
        None => {
            tracing::warn!("NOTIFY_GATEWAY_URL unset, notification dispatch disabled");
            None
        }
    };

    let lifecycle = Arc::new(RequestLifecycle::new(
        pool,
        Arc::clone(&bus),
        auction_config,
    ));
    let watcher = ExpiryWatcher::new(lifecycle);

    let cancel = CancellationToken::new();
    let cancel_on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received shutdown signal");
            cancel_on_signal.cancel();
        }
    });

    tracing::info!("Worker started");
    watcher.run(cancel).await;

    drop(bus);
    if let Some(handle) = dispatcher_handle {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
    }
    tracing::info!("Worker stopped");
}
