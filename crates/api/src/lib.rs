//! Rentora API server library.
//!
//! Exposes the building blocks (config, state, error handling, routes)
//! so integration tests and the binary entrypoint can both access them.
//!
//! The HTTP edge is deliberately thin: session authentication happens
//! upstream at the API gateway, which forwards the authenticated user id
//! in the `x-user-id` header. This crate resolves the caller, translates
//! requests into auction-engine calls, and maps domain error kinds onto
//! status codes.

pub mod config;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
