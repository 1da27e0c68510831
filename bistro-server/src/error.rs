//! Store errors
//!
//! `StoreError` is what the persistence layer returns (Postgres or in-memory).
//! It converts into the API-layer `AppError`, so services use `?` on both.

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Error returned by a store implementation
#[derive(Debug, Error)]
pub enum StoreError {
    /// Unique constraint violated (constraint or key name)
    #[error("conflict on {0}")]
    Conflict(String),
    /// Row referenced by a foreign key does not exist
    #[error("missing reference: {0}")]
    MissingReference(String),
    /// Any other database failure
    #[error("database error: {0}")]
    Database(sqlx::Error),
    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    /// Backend not reachable or refused the write
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db_err) = e.as_database_error() {
            let constraint = db_err.constraint().unwrap_or("unknown").to_string();
            if db_err.is_unique_violation() {
                return Self::Conflict(constraint);
            }
            if db_err.is_foreign_key_violation() {
                return Self::MissingReference(constraint);
            }
        }
        match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                Self::Unavailable(e.to_string())
            }
            other => Self::Database(other),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Unavailable(msg) => {
                tracing::error!(error = %msg, "Store unavailable");
                AppError::with_message(ErrorCode::DatabaseError, "Data store is unavailable")
                    .with_detail("partial", false)
            }
            other => {
                tracing::error!(error = %other, "Store error");
                AppError::new(ErrorCode::DatabaseError).with_detail("partial", false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_maps_to_database_error() {
        let err: AppError = StoreError::Unavailable("connection refused".into()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.is_partial_order());
        assert_eq!(err.http_status(), http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_pool_timeout_is_unavailable() {
        let err = StoreError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert!(!err.is_conflict());
    }
}
