//! Rentora event bus and notification infrastructure.
//!
//! Auction state transitions publish domain events to an in-process bus
//! after their storage transaction commits; a dispatcher task drains the
//! bus and fans notifications out to the external gateway. The auction
//! engine therefore never waits on (or fails because of) the
//! notification channel.
//!
//! - [`EventBus`] — in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`MarketEvent`] — the canonical domain event envelope.
//! - [`payload`] — typed payload structs carried by each event kind.
//! - [`gateway`] — the outbound NotificationGateway client and the
//!   [`Notifier`] seam it implements.
//! - [`NotificationDispatcher`] — background service translating events
//!   into per-user notification sends.

pub mod bus;
pub mod dispatcher;
pub mod gateway;
pub mod payload;

pub use bus::{EventBus, MarketEvent};
pub use dispatcher::NotificationDispatcher;
pub use gateway::{HttpNotificationGateway, Notifier, NotifyRequest};
