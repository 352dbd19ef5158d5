//! Error types for task domain validation, transitions, and parsing.

use super::{EvidenceField, TaskId, TaskStatus, TaskType};
use crate::error::ErrorCode;
use std::fmt;
use thiserror::Error;

/// Errors returned while constructing or mutating task domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The task title exceeds the storage limit.
    #[error("task title is {0} characters long, the limit is 100")]
    TitleTooLong(usize),

    /// Status values start at 1.
    #[error("invalid status {0}, expected a positive integer")]
    InvalidStatus(u32),

    /// A custom field name is blank or too long.
    #[error("invalid custom field name '{0}'")]
    InvalidFieldName(String),

    /// A transition note exceeds the storage limit.
    #[error("transition note is {0} characters long, the limit is 500")]
    NoteTooLong(usize),

    /// The task type's workflow has no such status.
    #[error("status {status} does not exist in the {task_type} workflow")]
    UnsupportedStatus {
        /// Task type whose workflow was consulted.
        task_type: TaskType,
        /// Requested status.
        status: TaskStatus,
    },

    /// Required evidence is missing for the target status.
    #[error(
        "moving a {task_type} task to status {status} ({label}) requires {missing}"
    )]
    MissingEvidence {
        /// Task being transitioned.
        task_id: TaskId,
        /// Task type whose rules were applied.
        task_type: TaskType,
        /// Target status.
        status: TaskStatus,
        /// Label of the target stage.
        label: &'static str,
        /// Evidence fields that were neither supplied nor stored.
        missing: MissingEvidence,
    },

    /// A forward move skipped one or more stages.
    #[error("task {task_id} cannot move forward from status {from} to {to}, forward moves must be sequential")]
    NonSequentialMove {
        /// Task being transitioned.
        task_id: TaskId,
        /// Current status.
        from: TaskStatus,
        /// Requested status.
        to: TaskStatus,
    },

    /// Closed tasks accept no further changes.
    #[error("cannot change status of closed task {0}")]
    TaskClosed(TaskId),

    /// The task has already been closed.
    #[error("task {0} is already closed")]
    AlreadyClosed(TaskId),

    /// The task has not yet reached its terminal status.
    #[error("task {task_id} can only be closed from status {terminal}, current status is {status}")]
    NotAtTerminalStatus {
        /// Task being closed.
        task_id: TaskId,
        /// Current status.
        status: TaskStatus,
        /// Status required for closure.
        terminal: TaskStatus,
    },
}

impl TaskDomainError {
    /// Returns the machine-readable failure class.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::EmptyTitle
            | Self::TitleTooLong(_)
            | Self::InvalidStatus(_)
            | Self::InvalidFieldName(_)
            | Self::NoteTooLong(_)
            | Self::UnsupportedStatus { .. } => ErrorCode::InvalidArgument,
            Self::MissingEvidence { .. } => ErrorCode::ValidationFailed,
            Self::NonSequentialMove { .. }
            | Self::TaskClosed(_)
            | Self::AlreadyClosed(_)
            | Self::NotAtTerminalStatus { .. } => ErrorCode::IllegalTransition,
        }
    }
}

/// Ordered list of evidence fields a transition lacked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingEvidence(Vec<EvidenceField>);

impl MissingEvidence {
    /// Wraps the missing fields in rule-table order.
    #[must_use]
    pub const fn new(fields: Vec<EvidenceField>) -> Self {
        Self(fields)
    }

    /// Returns the missing fields.
    #[must_use]
    pub fn fields(&self) -> &[EvidenceField] {
        &self.0
    }
}

impl fmt::Display for MissingEvidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut separator = "";
        for field in &self.0 {
            write!(f, "{separator}{field}")?;
            separator = ", ";
        }
        Ok(())
    }
}

/// Error returned while parsing task types from requests or persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid task type '{0}', expected Procurement or Development")]
pub struct ParseTaskTypeError(pub String);
