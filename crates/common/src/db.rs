//! Shared database types for Statebench
//!
//! This module provides the error type used across storage backends.

use thiserror::Error;

/// Database-specific error types
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Record already exists")]
    AlreadyExists,

    #[error("Database connection error: {0}")]
    Connection(#[from] sqlx::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl RepositoryError {
    /// Map a driver error, folding unique-constraint violations into
    /// `AlreadyExists` so callers can match on the conflict directly.
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some("23505") {
                return RepositoryError::AlreadyExists;
            }
        }
        RepositoryError::Connection(err)
    }
}
