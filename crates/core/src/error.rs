//! Domain error taxonomy.
//!
//! Every fallible operation below the HTTP edge returns [`CoreError`].
//! Callers dispatch on the variant, never on message text; the api crate
//! maps variants onto transport status codes.

use crate::types::DbId;

/// Domain-level error, distinguishable by kind.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A referenced entity does not exist.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    /// Malformed or out-of-range input.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The operation conflicts with current state (deadline passed,
    /// duplicate bid, request not in the required status, no eligible
    /// owners).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The caller lacks ownership or role for the action.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// An unexpected failure (storage, I/O). Logged at the point of
    /// classification; the message is safe to surface.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a [`CoreError::NotFound`].
    pub fn not_found(entity: &'static str, id: DbId) -> Self {
        Self::NotFound { entity, id }
    }
}
