//! Rentora auction engine.
//!
//! The rental-request auction lifecycle: partnership-scoped visibility
//! ([`directory`]), equipment availability ([`catalog`]), bid validation
//! and persistence ([`ledger`]), the request state machine with winner
//! selection ([`lifecycle`]), and the deadline sweep ([`watcher`]).
//!
//! Every state mutation that must be atomic runs inside one sqlx
//! transaction; auction closure is idempotent and safe to invoke
//! concurrently from the watcher, an administrator, and anything else.
//! Notifications leave through the event bus strictly after commit.

pub mod access;
pub mod catalog;
pub mod config;
pub mod directory;
mod error;
pub mod ledger;
pub mod lifecycle;
pub mod watcher;

pub use config::AuctionConfig;
pub use lifecycle::{CloseOutcome, CloseTrigger, RequestLifecycle};
pub use watcher::ExpiryWatcher;
