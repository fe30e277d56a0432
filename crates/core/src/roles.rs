//! Well-known role constants.
//!
//! Names and IDs must match the seed data in
//! `db/migrations/20260801000001_create_lookup_tables.sql`.

use crate::types::DbId;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_OWNER: &str = "owner";
pub const ROLE_MANAGER: &str = "manager";

pub const ROLE_ADMIN_ID: DbId = 1;
pub const ROLE_OWNER_ID: DbId = 2;
pub const ROLE_MANAGER_ID: DbId = 3;
