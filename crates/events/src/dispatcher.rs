//! Post-commit notification fan-out.
//!
//! [`NotificationDispatcher`] subscribes to the
//! [`EventBus`](crate::bus::EventBus) broadcast channel and translates
//! each domain event into per-user gateway sends. It runs as a
//! long-lived background task and shuts down when the bus sender is
//! dropped. Send failures are logged and never propagated: a slow or
//! failing notification channel must never block or fail a state
//! transition.

use std::sync::Arc;

use tokio::sync::broadcast;

use rentora_core::types::DbId;

use crate::bus::{
    MarketEvent, EVENT_AUCTION_CANCELLED, EVENT_AUCTION_CLOSED, EVENT_REQUEST_CREATED,
};
use crate::gateway::{
    Notifier, NotifyRequest, NOTIFY_AUCTION_CLOSED, NOTIFY_AUCTION_NO_BIDS, NOTIFY_BID_LOST,
    NOTIFY_BID_WON, NOTIFY_NEW_REQUEST,
};
use crate::payload::{AuctionCancelled, AuctionClosed, RequestCreated};

/// Background service that fans domain events out as notifications.
pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    /// Run the dispatch loop.
    ///
    /// Consumes bus events via the provided `receiver` until the channel
    /// is closed (i.e. the [`EventBus`](crate::bus::EventBus) is dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<MarketEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    let sent = self.dispatch(&event).await;
                    tracing::debug!(
                        event_type = %event.event_type,
                        sent,
                        "Dispatched notifications for event"
                    );
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "Notification dispatcher lagged, some events were not delivered"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification dispatcher shutting down");
                    break;
                }
            }
        }
    }

    /// Translate one event into gateway sends.
    ///
    /// Returns the number of notifications successfully accepted by the
    /// gateway. Unknown event types and malformed payloads are logged
    /// and skipped.
    pub async fn dispatch(&self, event: &MarketEvent) -> usize {
        match event.event_type.as_str() {
            EVENT_REQUEST_CREATED => match serde_json::from_value::<RequestCreated>(
                event.payload.clone(),
            ) {
                Ok(payload) => self.dispatch_request_created(&payload).await,
                Err(e) => {
                    tracing::error!(error = %e, "Malformed request.created payload");
                    0
                }
            },
            EVENT_AUCTION_CLOSED => match serde_json::from_value::<AuctionClosed>(
                event.payload.clone(),
            ) {
                Ok(payload) => self.dispatch_auction_closed(&payload).await,
                Err(e) => {
                    tracing::error!(error = %e, "Malformed auction.closed payload");
                    0
                }
            },
            EVENT_AUCTION_CANCELLED => match serde_json::from_value::<AuctionCancelled>(
                event.payload.clone(),
            ) {
                Ok(payload) => self.dispatch_auction_cancelled(&payload).await,
                Err(e) => {
                    tracing::error!(error = %e, "Malformed auction.cancelled payload");
                    0
                }
            },
            other => {
                tracing::debug!(event_type = other, "No notification rule for event");
                0
            }
        }
    }

    /// Solicit bids from every eligible owner.
    async fn dispatch_request_created(&self, payload: &RequestCreated) -> usize {
        let message = format!(
            "A manager is looking for {} / {} from {} to {}. Bidding is open until {}.",
            payload.equipment_type,
            payload.equipment_subtype,
            payload.start_date,
            payload.end_date,
            payload.auction_deadline.format("%Y-%m-%d %H:%M UTC"),
        );

        let mut sent = 0;
        for owner_id in &payload.owner_ids {
            let request = NotifyRequest {
                kind: NOTIFY_NEW_REQUEST,
                title: "New rental request".into(),
                message: message.clone(),
            };
            sent += self.try_notify(*owner_id, request).await;
        }
        sent
    }

    /// Winner, manager, and each losing bidder.
    async fn dispatch_auction_closed(&self, payload: &AuctionClosed) -> usize {
        let mut sent = 0;

        let won = NotifyRequest {
            kind: NOTIFY_BID_WON,
            title: "Your bid won".into(),
            message: format!(
                "Your bid of {} on the {} / {} request was accepted.",
                payload.winning_price, payload.equipment_type, payload.equipment_subtype,
            ),
        };
        sent += self.try_notify(payload.winner.user_id, won).await;

        let phone = payload.winner.phone.as_deref().unwrap_or("no phone on file");
        let closed = NotifyRequest {
            kind: NOTIFY_AUCTION_CLOSED,
            title: "Auction closed".into(),
            message: format!(
                "Your {} / {} request closed at {}. Winning owner: {} ({}, {}).",
                payload.equipment_type,
                payload.equipment_subtype,
                payload.winning_price,
                payload.winner.username,
                payload.winner.email,
                phone,
            ),
        };
        sent += self.try_notify(payload.manager_id, closed).await;

        for owner_id in &payload.losing_owner_ids {
            let lost = NotifyRequest {
                kind: NOTIFY_BID_LOST,
                title: "Your bid was not selected".into(),
                message: format!(
                    "Another bid won the {} / {} request.",
                    payload.equipment_type, payload.equipment_subtype,
                ),
            };
            sent += self.try_notify(*owner_id, lost).await;
        }
        sent
    }

    /// Tell the manager their auction drew no bids.
    async fn dispatch_auction_cancelled(&self, payload: &AuctionCancelled) -> usize {
        let request = NotifyRequest {
            kind: NOTIFY_AUCTION_NO_BIDS,
            title: "Auction closed without bids".into(),
            message: format!(
                "Your {} / {} request received no bids and was cancelled.",
                payload.equipment_type, payload.equipment_subtype,
            ),
        };
        self.try_notify(payload.manager_id, request).await
    }

    /// Send one notification, swallowing (and logging) failures.
    async fn try_notify(&self, user_id: DbId, request: NotifyRequest) -> usize {
        match self.notifier.send(user_id, &request).await {
            Ok(notification_id) => {
                tracing::debug!(
                    user_id,
                    kind = request.kind,
                    %notification_id,
                    "Notification accepted by gateway"
                );
                1
            }
            Err(e) => {
                tracing::warn!(
                    user_id,
                    kind = request.kind,
                    error = %e,
                    "Notification send failed"
                );
                0
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
    use crate::gateway::NotifyError;
    use crate::payload::WinnerContact;
    use std::sync::Mutex;
    use uuid::Uuid;

    /// Records every send instead of talking to a gateway.
    struct RecordingNotifier {
        sent: Mutex<Vec<(DbId, &'static str)>>,
    }

    impl RecordingNotifier {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                sent: Mutex::new(Vec::new()),
            })
        }

        fn sent(&self) -> Vec<(DbId, &'static str)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(
            &self,
            user_id: DbId,
            request: &NotifyRequest,
        ) -> Result<Uuid, NotifyError> {
            self.sent.lock().unwrap().push((user_id, request.kind));
            Ok(Uuid::new_v4())
        }
    }

    fn closed_event() -> MarketEvent {
        let payload = AuctionClosed {
            request_id: 10,
            manager_id: 1,
            equipment_type: "Excavators".into(),
            equipment_subtype: "20-25t tracked".into(),
            winning_bid_id: 33,
            winning_price: 185_000,
            winner: WinnerContact {
                user_id: 5,
                username: "owner-b".into(),
                email: "b@example.com".into(),
                phone: None,
            },
            losing_owner_ids: vec![4],
        };
        MarketEvent::new(EVENT_AUCTION_CLOSED)
            .with_source("rental_request", 10)
            .with_payload(serde_json::to_value(payload).unwrap())
    }

    #[tokio::test]
    async fn auction_closed_notifies_winner_manager_and_losers() {
        let notifier = RecordingNotifier::new();
        let dispatcher = NotificationDispatcher::new(notifier.clone());

        let sent = dispatcher.dispatch(&closed_event()).await;

        assert_eq!(sent, 3);
        let recorded = notifier.sent();
        assert!(recorded.contains(&(5, NOTIFY_BID_WON)));
        assert!(recorded.contains(&(1, NOTIFY_AUCTION_CLOSED)));
        assert!(recorded.contains(&(4, NOTIFY_BID_LOST)));
    }

    #[tokio::test]
    async fn request_created_notifies_each_owner_once() {
        let notifier = RecordingNotifier::new();
        let dispatcher = NotificationDispatcher::new(notifier.clone());

        let payload = RequestCreated {
            request_id: 10,
            manager_id: 1,
            equipment_type: "Cranes".into(),
            equipment_subtype: "50t mobile".into(),
            start_date: chrono::NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            end_date: chrono::NaiveDate::from_ymd_opt(2026, 9, 14).unwrap(),
            auction_deadline: chrono::Utc::now(),
            owner_ids: vec![4, 5, 6],
        };
        let event = MarketEvent::new(EVENT_REQUEST_CREATED)
            .with_payload(serde_json::to_value(payload).unwrap());

        let sent = dispatcher.dispatch(&event).await;

        assert_eq!(sent, 3);
        assert_eq!(
            notifier.sent(),
            vec![
                (4, NOTIFY_NEW_REQUEST),
                (5, NOTIFY_NEW_REQUEST),
                (6, NOTIFY_NEW_REQUEST)
            ]
        );
    }

    #[tokio::test]
    async fn cancelled_auction_notifies_manager_only() {
        let notifier = RecordingNotifier::new();
        let dispatcher = NotificationDispatcher::new(notifier.clone());

        let payload = AuctionCancelled {
            request_id: 10,
            manager_id: 1,
            equipment_type: "Excavators".into(),
            equipment_subtype: "20-25t tracked".into(),
        };
        let event = MarketEvent::new(EVENT_AUCTION_CANCELLED)
            .with_payload(serde_json::to_value(payload).unwrap());

        let sent = dispatcher.dispatch(&event).await;

        assert_eq!(sent, 1);
        assert_eq!(notifier.sent(), vec![(1, NOTIFY_AUCTION_NO_BIDS)]);
    }

    #[tokio::test]
    async fn unknown_event_type_is_skipped() {
        let notifier = RecordingNotifier::new();
        let dispatcher = NotificationDispatcher::new(notifier.clone());

        let sent = dispatcher.dispatch(&MarketEvent::new("user.logged_in")).await;

        assert_eq!(sent, 0);
        assert!(notifier.sent().is_empty());
    }
}
