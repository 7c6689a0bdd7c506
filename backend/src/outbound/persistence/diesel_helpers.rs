//! Shared error mapping for the Diesel-backed document store.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::DocumentStoreError;

use super::pool::PoolError;

/// Pool failures mean the database is unreachable.
pub fn map_pool_error(error: PoolError) -> DocumentStoreError {
    DocumentStoreError::connection(error.message())
}

/// Whether the error is a unique constraint violation.
pub fn is_unique_violation(error: &DieselError) -> bool {
    matches!(
        error,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    )
}

/// Map Diesel errors to document store errors, logging the underlying cause.
pub fn map_diesel_error(error: DieselError, operation: &str) -> DocumentStoreError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), %operation, "diesel operation failed");
        }
        _ => debug!(error_message = %error, %operation, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            DocumentStoreError::connection("database connection error")
        }
        DieselError::DeserializationError(err) => {
            DocumentStoreError::invalid_document(format!("{operation}: {err}"))
        }
        _ => DocumentStoreError::query(format!("{operation} failed")),
    }
}
