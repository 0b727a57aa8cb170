//! Error handling utilities for repositories

use shelf_core::error::DomainError;
use sqlx::Error as SqlxError;

const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";

/// Convert SQLx error to DomainError.
///
/// Failures that a fresh attempt can get past (serialization failure,
/// deadlock, a racing insert on the same key) become `ConcurrentModification`.
pub fn map_db_error(e: SqlxError) -> DomainError {
    if let Some(db_err) = e.as_database_error() {
        let retryable = db_err.is_unique_violation()
            || matches!(
                db_err.code().as_deref(),
                Some(SERIALIZATION_FAILURE | DEADLOCK_DETECTED)
            );
        if retryable {
            return DomainError::ConcurrentModification(db_err.message().to_string());
        }
    }
    DomainError::DatabaseError(e.to_string())
}
