//! Machine-readable error classification shared by every bounded context.
//!
//! Messages are meant for people and may change wording; codes are stable and
//! let callers branch on the failure class without parsing text.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable failure class attached to every service-level error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The referenced task or user does not exist.
    NotFound,
    /// The request carried a malformed or unknown value.
    InvalidArgument,
    /// Required workflow evidence is missing for the target status.
    ValidationFailed,
    /// The workflow does not permit the requested move.
    IllegalTransition,
    /// The request conflicts with the current stored state.
    Conflict,
    /// Storage did not answer within the configured deadline.
    Unavailable,
    /// Storage failed or returned data that cannot be trusted.
    Internal,
}

impl ErrorCode {
    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::InvalidArgument => "invalid_argument",
            Self::ValidationFailed => "validation_failed",
            Self::IllegalTransition => "illegal_transition",
            Self::Conflict => "conflict",
            Self::Unavailable => "unavailable",
            Self::Internal => "internal",
        }
    }

    /// Returns `true` when the failure was caused by the caller's request
    /// rather than by infrastructure or corrupt data.
    #[must_use]
    pub const fn is_client_error(self) -> bool {
        !matches!(self, Self::Unavailable | Self::Internal)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
