//! Storage-specific error types for SQLite operations.
//!
//! Diesel and r2d2 errors are wrapped here and converted to the
//! database-agnostic error types of `cashflow_core` at the crate boundary.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;
use cashflow_core::errors::{DatabaseError, Error};

/// Storage-specific errors that wrap Diesel and r2d2 types.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection failed: {0}")]
    ConnectionFailed(#[from] diesel::ConnectionError),

    #[error("Connection pool error: {0}")]
    PoolError(#[from] r2d2::Error),

    #[error("Query execution failed: {0}")]
    QueryFailed(#[from] DieselError),

    /// A stored value that does not decode into its domain type.
    #[error("Invalid stored value in {column}: {message}")]
    InvalidData { column: String, message: String },
}

impl StorageError {
    pub fn invalid_data(column: &str, message: impl ToString) -> Self {
        StorageError::InvalidData {
            column: column.to_string(),
            message: message.to_string(),
        }
    }
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::ConnectionFailed(e) => {
                Error::Database(DatabaseError::ConnectionFailed(e.to_string()))
            }
            StorageError::PoolError(e) => {
                Error::Database(DatabaseError::PoolCreationFailed(e.to_string()))
            }
            StorageError::QueryFailed(DieselError::NotFound) => {
                Error::Database(DatabaseError::NotFound("Record not found".to_string()))
            }
            StorageError::QueryFailed(DieselError::DatabaseError(
                DatabaseErrorKind::UniqueViolation,
                info,
            )) => Error::Database(DatabaseError::UniqueViolation(info.message().to_string())),
            StorageError::QueryFailed(DieselError::DatabaseError(
                DatabaseErrorKind::ForeignKeyViolation,
                info,
            )) => Error::Database(DatabaseError::ForeignKeyViolation(
                info.message().to_string(),
            )),
            StorageError::QueryFailed(e) => {
                Error::Database(DatabaseError::QueryFailed(e.to_string()))
            }
            e @ StorageError::InvalidData { .. } => {
                Error::Database(DatabaseError::Internal(e.to_string()))
            }
        }
    }
}

/// Extension trait for converting Diesel and pool Results to core Results.
///
/// Since we can't implement `From<DieselError> for Error` due to orphan rules,
/// this provides a `.into_core()` method that goes through `StorageError`.
pub trait IntoCore<T> {
    fn into_core(self) -> cashflow_core::Result<T>;
}

impl<T> IntoCore<T> for std::result::Result<T, DieselError> {
    fn into_core(self) -> cashflow_core::Result<T> {
        self.map_err(|e| StorageError::from(e).into())
    }
}

impl<T> IntoCore<T> for std::result::Result<T, r2d2::Error> {
    fn into_core(self) -> cashflow_core::Result<T> {
        self.map_err(|e| StorageError::from(e).into())
    }
}
