//! Rentora domain core.
//!
//! Pure domain types shared by every other crate: ID/timestamp aliases,
//! the error taxonomy, role constants, the rental-request state machine,
//! and the auction winner-selection algorithm. This crate has zero
//! internal dependencies so it can be used by the repository layer, the
//! auction engine, and any future CLI tooling alike.

pub mod error;
pub mod lifecycle;
pub mod roles;
pub mod selection;
pub mod types;

pub use error::CoreError;
