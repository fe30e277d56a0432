use std::sync::Arc;

use rentora_auction::RequestLifecycle;
use rentora_events::EventBus;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: rentora_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// The auction engine.
    pub lifecycle: Arc<RequestLifecycle>,
    /// Centralized event bus for publishing domain events.
    pub bus: Arc<EventBus>,
}
