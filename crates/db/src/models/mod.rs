//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts (with `Validate` derives
//!   where the input carries ranges worth checking)

pub mod company;
pub mod equipment;
pub mod partnership;
pub mod rental_bid;
pub mod rental_request;
pub mod status;
pub mod user;
