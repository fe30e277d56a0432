use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rentora_api::config::ServerConfig;
use rentora_api::router::build_app_router;
use rentora_api::state::AppState;
use rentora_auction::{AuctionConfig, ExpiryWatcher, RequestLifecycle};
use rentora_events::{EventBus, HttpNotificationGateway, NotificationDispatcher};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rentora_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    let auction_config = AuctionConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = rentora_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    rentora_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    rentora_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Event bus ---
    let bus = Arc::new(EventBus::default());

    // Spawn the notification dispatcher when a gateway is configured.
    let dispatcher_handle = match &config.notify_gateway_url {
        Some(url) => {
            let gateway = Arc::new(HttpNotificationGateway::new(url));
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

    // --- Auction engine ---
    let lifecycle = Arc::new(RequestLifecycle::new(
        pool.clone(),
        Arc::clone(&bus),
        auction_config,
    ));

    // Spawn the expiry watcher (the single scheduled closure trigger).
    let watcher_cancel = CancellationToken::new();
    let watcher = ExpiryWatcher::new(Arc::clone(&lifecycle));
    let watcher_cancel_clone = watcher_cancel.clone();
    let watcher_handle = tokio::spawn(async move {
        watcher.run(watcher_cancel_clone).await;
    });
    tracing::info!("Expiry watcher started");

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        lifecycle,
        bus: Arc::clone(&bus),
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // Stop the expiry watcher.
    watcher_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), watcher_handle).await;
    tracing::info!("Expiry watcher stopped");

    // Drop the event bus sender to close the broadcast channel; this
    // signals the dispatcher to shut down once it drains.
    drop(bus);
    if let Some(handle) = dispatcher_handle {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
        tracing::info!("Notification dispatcher stopped");
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
