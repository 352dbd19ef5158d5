//! Repository port for task persistence and lookup.

use crate::error::ErrorCode;
use crate::task::domain::{Task, TaskId};
use crate::user::domain::UserId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
///
/// Implementations persist the task row, its custom fields and its history
/// as one atomic unit.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID already
    /// exists or [`TaskRepositoryError::UnknownUser`] when the assignee does
    /// not exist in storages that enforce foreign keys.
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Persists a task after exactly one domain mutation.
    ///
    /// The stored version must equal `task.version() - 1`; any other stored
    /// version means another writer got there first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist
    /// or [`TaskRepositoryError::VersionConflict`] when the stored version
    /// does not precede the incoming one.
    async fn update(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Returns every task ordered by creation time.
    async fn list_all(&self) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns the tasks currently assigned to `assignee`, ordered by creation
    /// time.
    async fn find_by_assignee(&self, assignee: UserId) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns `true` when any task or history entry references `user`.
    async fn references_user(&self, user: UserId) -> TaskRepositoryResult<bool>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Another writer updated the task since it was loaded.
    #[error("task {task_id} was modified concurrently (expected stored version {expected}, found {found})")]
    VersionConflict {
        /// Task being updated.
        task_id: TaskId,
        /// Version the writer expected to replace.
        expected: u64,
        /// Version actually stored.
        found: u64,
    },

    /// The referenced user does not exist.
    #[error("user not found: {0}")]
    UnknownUser(UserId),

    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a data-quality or deserialization error from persisted rows.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Returns the machine-readable failure class.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::DuplicateTask(_) | Self::VersionConflict { .. } => ErrorCode::Conflict,
            Self::UnknownUser(_) => ErrorCode::InvalidArgument,
            Self::InvalidPersistedData(_) | Self::Persistence(_) => ErrorCode::Internal,
        }
    }
}
