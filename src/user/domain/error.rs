//! Error types for user domain validation.

use crate::error::ErrorCode;
use thiserror::Error;

/// Errors returned while constructing user domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserDomainError {
    /// The display name is empty after trimming.
    #[error("user name must not be empty")]
    EmptyName,

    /// The display name exceeds the 100-character storage limit.
    #[error("user name exceeds 100 character limit: {0}")]
    NameTooLong(String),

    /// The email address is malformed.
    #[error("invalid email address '{0}'")]
    InvalidEmail(String),
}

impl UserDomainError {
    /// Returns the machine-readable failure class.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::InvalidArgument
    }
}
