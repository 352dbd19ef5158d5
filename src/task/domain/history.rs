//! Append-only record of status changes.

use super::{TaskId, TaskStatus};
use crate::user::domain::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum note length, matching the `VARCHAR(500)` column.
pub(super) const MAX_NOTE_LENGTH: usize = 500;

/// Note recorded with the entry written on task creation.
pub const CREATION_NOTE: &str = "Task created";

/// One status change in a task's history.
///
/// `from_status` is `None` only for the entry written when the task is
/// created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    task_id: TaskId,
    from_status: Option<TaskStatus>,
    to_status: TaskStatus,
    assignee: UserId,
    changed_at: DateTime<Utc>,
    note: String,
}

impl StatusHistoryEntry {
    /// Creates a history entry.
    #[must_use]
    pub fn new(
        task_id: TaskId,
        from_status: Option<TaskStatus>,
        to_status: TaskStatus,
        assignee: UserId,
        changed_at: DateTime<Utc>,
        note: impl Into<String>,
    ) -> Self {
        Self {
            task_id,
            from_status,
            to_status,
            assignee,
            changed_at,
            note: note.into(),
        }
    }

    /// Returns the owning task identifier.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the status before the change.
    #[must_use]
    pub const fn from_status(&self) -> Option<TaskStatus> {
        self.from_status
    }

    /// Returns the status after the change.
    #[must_use]
    pub const fn to_status(&self) -> TaskStatus {
        self.to_status
    }

    /// Returns the user the task was assigned to by this change.
    #[must_use]
    pub const fn assignee(&self) -> UserId {
        self.assignee
    }

    /// Returns when the change happened.
    #[must_use]
    pub const fn changed_at(&self) -> DateTime<Utc> {
        self.changed_at
    }

    /// Returns the note.
    #[must_use]
    pub fn note(&self) -> &str {
        &self.note
    }
}
