//! Repository Module
//!
//! Data access over the SQLite pool: free async functions per table, with
//! the transactional reservation engine in [`reservation`].

// Catalog
pub mod category;
pub mod product;

// Users & loyalty
pub mod point;
pub mod user;

// Marketing
pub mod coupon;

// Reservations
pub mod reservation;

// Calendar
pub mod business_day;

use crate::utils::AppError;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// State-machine conflict: transition attempted from a wrong source state,
    /// or a coupon already redeemed
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Business rejection the caller must re-decide: insufficient stock,
    /// shop closed, balance too low
    #[error("Unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepoError::NotFound("Row not found".into()),
            other => RepoError::Database(other.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::NotFound(msg),
            RepoError::Duplicate(msg) => AppError::Conflict(msg),
            RepoError::Conflict(msg) => AppError::Conflict(msg),
            RepoError::Unavailable(msg) => AppError::Invalid(msg),
            RepoError::Database(msg) => AppError::Database(msg),
            RepoError::Validation(msg) => AppError::Validation(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
