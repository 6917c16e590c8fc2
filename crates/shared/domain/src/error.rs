//! Domain-level errors.
//!
//! These errors represent business rule violations and domain logic failures.
//! They are independent of infrastructure concerns (HTTP, database).

use thiserror::Error;

/// Domain-specific errors for business rule violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed for a field or input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Password hashing failed
    #[error("Password error: {0}")]
    Password(String),

    /// Another account already uses this email
    #[error("Email {0} is taken")]
    DuplicateEmail(String),

    /// No account matches the given identity
    #[error("Account not found")]
    AccountNotFound,

    /// Email/password pair did not match any account
    #[error("Invalid Login credentials")]
    InvalidCredentials,

    /// Token could not be decoded as a JWT
    #[error("Malformed token")]
    MalformedToken,

    /// Internal domain error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }

    /// Create a password error
    pub fn password(msg: impl Into<String>) -> Self {
        DomainError::Password(msg.into())
    }

    /// Create a duplicate email error
    pub fn duplicate_email(email: impl Into<String>) -> Self {
        DomainError::DuplicateEmail(email.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        DomainError::Internal(msg.into())
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
