//! Outbound NotificationGateway client.
//!
//! The gateway is an external service reached over HTTP POST; this core
//! only depends on its send contract and never inspects delivery status
//! beyond logging. Failed sends are retried with exponential backoff
//! (1 s, 2 s, 4 s) inside the dispatcher task, never on a caller's path.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rentora_core::types::DbId;

/// Retry delays in seconds (exponential backoff: 1s, 2s, 4s).
const RETRY_DELAYS_SECS: [u64; 3] = [1, 2, 4];

/// HTTP request timeout for a single send attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Notification kind for soliciting bids on a new request.
pub const NOTIFY_NEW_REQUEST: &str = "new_request";
/// Notification kind for the winning owner.
pub const NOTIFY_BID_WON: &str = "bid_won";
/// Notification kind for losing owners.
pub const NOTIFY_BID_LOST: &str = "bid_lost";
/// Notification kind for the manager of a closed auction.
pub const NOTIFY_AUCTION_CLOSED: &str = "auction_closed";
/// Notification kind for the manager of a cancelled (no-bids) auction.
pub const NOTIFY_AUCTION_NO_BIDS: &str = "auction_no_bids";

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

/// A single notification to one user.
#[derive(Debug, Clone, Serialize)]
pub struct NotifyRequest {
    /// One of the `NOTIFY_*` kind constants.
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub title: String,
    pub message: String,
}

/// Error type for gateway send failures.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The gateway returned a non-2xx status code.
    #[error("Notification gateway returned HTTP {0}")]
    HttpStatus(u16),
}

/// Seam over the gateway so tests can record sends without a network.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one notification, returning the gateway-assigned id.
    async fn send(&self, user_id: DbId, request: &NotifyRequest) -> Result<Uuid, NotifyError>;
}

// ---------------------------------------------------------------------------
// HttpNotificationGateway
// ---------------------------------------------------------------------------

/// Shape of the gateway's accepted-notification response.
#[derive(Debug, Deserialize)]
struct NotifyResponse {
    id: Uuid,
}

/// Sends notifications to the external gateway over HTTP.
pub struct HttpNotificationGateway {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpNotificationGateway {
    /// Create a gateway client for the given base URL
    /// (e.g. `http://notify.internal:8080`).
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self {
            client,
            endpoint: format!("{}/notifications", base_url.trim_end_matches('/')),
        }
    }

    /// Execute a single POST and check the response status.
    async fn try_send(
        &self,
        user_id: DbId,
        request: &NotifyRequest,
    ) -> Result<Uuid, NotifyError> {
        let body = serde_json::json!({
            "user_id": user_id,
            "type": request.kind,
            "title": request.title,
            "message": request.message,
        });

        let response = self.client.post(&self.endpoint).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(NotifyError::HttpStatus(response.status().as_u16()));
        }
        let accepted: NotifyResponse = response.json().await?;
        Ok(accepted.id)
    }
}

#[async_trait::async_trait]
impl Notifier for HttpNotificationGateway {
    /// Deliver a notification with retry.
    ///
    /// Retries up to 3 times with exponential backoff before giving up.
    /// Returns the gateway id on the first successful attempt.
    async fn send(&self, user_id: DbId, request: &NotifyRequest) -> Result<Uuid, NotifyError> {
        let mut last_err: Option<NotifyError> = None;

        for (attempt, delay_secs) in RETRY_DELAYS_SECS.iter().enumerate() {
            match self.try_send(user_id, request).await {
                Ok(id) => return Ok(id),
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        user_id,
                        kind = request.kind,
                        error = %e,
                        "Notification send attempt failed, retrying"
                    );
                    last_err = Some(e);
                    tokio::time::sleep(Duration::from_secs(*delay_secs)).await;
                }
            }
        }

        // Final attempt after the last backoff.
        match self.try_send(user_id, request).await {
            Ok(id) => Ok(id),
            Err(e) => {
                tracing::error!(
                    user_id,
                    kind = request.kind,
                    error = %e,
                    "Notification send failed after all retries"
                );
                Err(last_err.unwrap_or(e))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_does_not_panic() {
        let _gateway = HttpNotificationGateway::new("http://localhost:9999");
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        let gateway = HttpNotificationGateway::new("http://notify.internal:8080/");
        assert_eq!(gateway.endpoint, "http://notify.internal:8080/notifications");
    }

    #[test]
    fn notify_request_serializes_kind_as_type() {
        let request = NotifyRequest {
            kind: NOTIFY_BID_WON,
            title: "Your bid won".into(),
            message: "…".into(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["type"], "bid_won");
    }

    #[test]
    fn notify_error_display_http_status() {
        let err = NotifyError::HttpStatus(502);
        assert_eq!(
            err.to_string(),
            "Notification gateway returned HTTP 502"
        );
    }
}
