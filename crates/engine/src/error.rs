//! The module contains the error the engine can throw.
//!
//! Business-rule violations are raised before any row is touched:
//!
//! - [`EmptyCart`] when a checkout selects no cart rows.
//! - [`AlreadyOwned`] when every selected course is already enrolled.
//! - [`InsufficientBalance`] when a withdrawal would overdraw a balance.
//! - [`HasActivePayments`] when a course with payments is deleted or repriced.
//!
//! Store failures surface as [`Database`], except uniqueness and foreign key
//! violations caused by a concurrent writer, which become [`Conflict`].
//!
//!  [`EmptyCart`]: EngineError::EmptyCart
//!  [`AlreadyOwned`]: EngineError::AlreadyOwned
//!  [`InsufficientBalance`]: EngineError::InsufficientBalance
//!  [`HasActivePayments`]: EngineError::HasActivePayments
//!  [`Database`]: EngineError::Database
//!  [`Conflict`]: EngineError::Conflict
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Empty cart: {0}")]
    EmptyCart(String),
    #[error("Already owned: {0}")]
    AlreadyOwned(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Insufficient balance: {0}")]
    InsufficientBalance(String),
    #[error("Course has active payments: {0}")]
    HasActivePayments(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),
    #[error(transparent)]
    Database(DbErr),
}

impl EngineError {
    /// Stable, machine-readable code of the error.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptyCart(_) => "empty_cart",
            Self::AlreadyOwned(_) => "already_owned",
            Self::InvalidAmount(_) => "invalid_amount",
            Self::InsufficientBalance(_) => "insufficient_balance",
            Self::HasActivePayments(_) => "has_active_payments",
            Self::KeyNotFound(_) => "not_found",
            Self::ExistingKey(_) => "already_exists",
            Self::Forbidden(_) => "forbidden",
            Self::Conflict(_) => "conflict",
            Self::InvalidCursor(_) => "invalid_cursor",
            Self::Database(_) => "store_unavailable",
        }
    }

    /// Returns `true` when retrying the whole operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

impl From<DbErr> for EngineError {
    fn from(value: DbErr) -> Self {
        match value.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                tracing::warn!(%detail, "unique constraint violated");
                Self::Conflict("concurrent write on a unique key".to_string())
            }
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
                tracing::warn!(%detail, "foreign key constraint violated");
                Self::Conflict("referenced row changed concurrently".to_string())
            }
            _ => Self::Database(value),
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::EmptyCart(a), Self::EmptyCart(b)) => a == b,
            (Self::AlreadyOwned(a), Self::AlreadyOwned(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InsufficientBalance(a), Self::InsufficientBalance(b)) => a == b,
            (Self::HasActivePayments(a), Self::HasActivePayments(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::InvalidCursor(a), Self::InvalidCursor(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_stable() {
        assert_eq!(EngineError::EmptyCart("x".to_string()).kind(), "empty_cart");
        assert_eq!(
            EngineError::HasActivePayments("x".to_string()).kind(),
            "has_active_payments"
        );
        assert_eq!(
            EngineError::Database(DbErr::Custom("boom".to_string())).kind(),
            "store_unavailable"
        );
    }

    #[test]
    fn plain_db_errors_stay_database_errors() {
        let err = EngineError::from(DbErr::Custom("disk I/O error".to_string()));
        assert!(matches!(err, EngineError::Database(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn only_conflicts_are_retryable() {
        assert!(EngineError::Conflict("x".to_string()).is_retryable());
        assert!(!EngineError::InsufficientBalance("x".to_string()).is_retryable());
    }
}
