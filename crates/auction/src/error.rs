//! Classification of storage errors into the domain taxonomy.

use rentora_core::CoreError;

/// Classify a sqlx error into a [`CoreError`].
///
/// Unique constraint violations (SQLSTATE 23505 on a constraint named
/// `uq_*`) become [`CoreError::Conflict`]; everything else is an
/// [`CoreError::Internal`], logged at the point of classification.
pub(crate) fn map_db_err(err: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            let constraint = db_err.constraint().unwrap_or("unknown");
            if constraint.starts_with("uq_") {
                return CoreError::Conflict(format!(
                    "Duplicate value violates unique constraint: {constraint}"
                ));
            }
        }
    }
    tracing::error!(error = %err, "Database error");
    CoreError::Internal("storage operation failed".into())
}

/// True when the error is a 23505 on the one-bid-per-owner constraint.
pub(crate) fn is_duplicate_bid(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.code().as_deref() == Some("23505")
                && db_err.constraint() == Some("uq_rental_bids_request_owner")
        }
        _ => false,
    }
}
