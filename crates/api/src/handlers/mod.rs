//! Handler implementations, one module per resource.

pub mod bids;
pub mod equipment;
pub mod requests;
