//! Deadline-driven auction closure sweep.
//!
//! A single scheduled loop discovers auction_active requests whose
//! deadline has elapsed and drives each through `RequestLifecycle::close`.
//! Because closure is idempotent, the watcher tolerates redundant
//! concurrent callers (a second watcher process, an administrator's
//! force-close) without coordination.

use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use rentora_core::types::DbId;
use rentora_core::CoreError;
use rentora_db::repositories::RentalRequestRepo;

use crate::error::map_db_err;
use crate::lifecycle::{CloseOutcome, CloseTrigger, RequestLifecycle};

/// Recurring expiry sweep over open auctions.
pub struct ExpiryWatcher {
    lifecycle: Arc<RequestLifecycle>,
}

impl ExpiryWatcher {
    pub fn new(lifecycle: Arc<RequestLifecycle>) -> Self {
        Self { lifecycle }
    }

    /// One sweep: close every expired open auction, collecting per-request
    /// results independently. One request's failure never aborts the batch.
    pub async fn scan(&self) -> Result<Vec<(DbId, Result<CloseOutcome, CoreError>)>, CoreError> {
        let expired = RentalRequestRepo::list_expired_active(self.lifecycle.pool(), Utc::now())
            .await
            .map_err(map_db_err)?;

        let mut results = Vec::with_capacity(expired.len());
        for request in expired {
            let outcome = self.lifecycle.close(request.id, CloseTrigger::Auto).await;
            if let Err(e) = &outcome {
                tracing::error!(
                    request_id = request.id,
                    error = %e,
                    "Expiry sweep failed to close request"
                );
            }
            results.push((request.id, outcome));
        }
        Ok(results)
    }

    /// Run the sweep loop until the cancellation token is triggered.
    pub async fn run(&self, cancel: CancellationToken) {
        let interval = self.lifecycle.config().watcher_interval;
        let mut ticker = tokio::time::interval(interval);
        tracing::info!(
            interval_secs = interval.as_secs(),
            "Expiry watcher started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Expiry watcher shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    match self.scan().await {
                        Ok(results) => {
                            let closed = results.iter().filter(|(_, r)| r.is_ok()).count();
                            if !results.is_empty() {
                                tracing::info!(
                                    swept = results.len(),
                                    closed,
                                    "Expiry sweep completed"
                                );
                            }
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Expiry sweep failed");
                        }
                    }
                }
            }
        }
    }
}
