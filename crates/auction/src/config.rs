//! Auction engine configuration loaded from environment variables.

use std::time::Duration;

/// Default auction duration: 30 minutes.
const DEFAULT_AUCTION_DURATION_MINS: i64 = 30;

/// Default expiry sweep interval: 60 seconds.
const DEFAULT_WATCHER_INTERVAL_SECS: u64 = 60;

/// Auction engine configuration.
///
/// All fields have defaults suitable for local development; override via
/// environment variables in production.
#[derive(Debug, Clone)]
pub struct AuctionConfig {
    /// How long an auction stays open after creation.
    pub auction_duration: chrono::Duration,
    /// How often the expiry watcher sweeps for elapsed deadlines.
    pub watcher_interval: Duration,
    /// Whether administrators may force-close an auction before its
    /// deadline.
    pub allow_force_close: bool,
}

impl AuctionConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default |
    /// |-------------------------|---------|
    /// | `AUCTION_DURATION_MINS` | `30`    |
    /// | `WATCHER_INTERVAL_SECS` | `60`    |
    /// | `ALLOW_FORCE_CLOSE`     | `true`  |
    pub fn from_env() -> Self {
        let duration_mins: i64 = std::env::var("AUCTION_DURATION_MINS")
            .unwrap_or_else(|_| DEFAULT_AUCTION_DURATION_MINS.to_string())
            .parse()
            .expect("AUCTION_DURATION_MINS must be a valid integer");

        let watcher_secs: u64 = std::env::var("WATCHER_INTERVAL_SECS")
            .unwrap_or_else(|_| DEFAULT_WATCHER_INTERVAL_SECS.to_string())
            .parse()
            .expect("WATCHER_INTERVAL_SECS must be a valid integer");

        let allow_force_close: bool = std::env::var("ALLOW_FORCE_CLOSE")
            .unwrap_or_else(|_| "true".into())
            .parse()
            .expect("ALLOW_FORCE_CLOSE must be true or false");

        Self {
            auction_duration: chrono::Duration::minutes(duration_mins),
            watcher_interval: Duration::from_secs(watcher_secs),
            allow_force_close,
        }
    }
}

impl Default for AuctionConfig {
    fn default() -> Self {
        Self {
            auction_duration: chrono::Duration::minutes(DEFAULT_AUCTION_DURATION_MINS),
            watcher_interval: Duration::from_secs(DEFAULT_WATCHER_INTERVAL_SECS),
            allow_force_close: true,
        }
    }
}
