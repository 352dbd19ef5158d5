//! Service layer for task creation, transitions, and closure.

use super::TaskLocks;
use crate::error::ErrorCode;
use crate::task::{
    domain::{
        ParseTaskTypeError, StatusTransition, Task, TaskDomainError, TaskId, TaskStatus,
        TaskTitle, TaskType,
    },
    ports::{TaskRepository, TaskRepositoryError},
};
use crate::user::{
    domain::UserId,
    ports::{UserRepository, UserRepositoryError},
};
use mockable::Clock;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{info, warn};

/// Storage deadline applied when none is configured.
pub const DEFAULT_STORAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    title: String,
    task_type: String,
    assignee: UserId,
}

impl CreateTaskRequest {
    /// Creates a request with the raw title and task type name.
    #[must_use]
    pub fn new(title: impl Into<String>, task_type: impl Into<String>, assignee: UserId) -> Self {
        Self {
            title: title.into(),
            task_type: task_type.into(),
            assignee,
        }
    }
}

/// Request payload for moving a task to another status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTaskRequest {
    task_id: TaskId,
    new_status: u32,
    assignee: UserId,
    custom_fields: Vec<(String, String)>,
    note: Option<String>,
}

impl TransitionTaskRequest {
    /// Creates a request without field values or note.
    #[must_use]
    pub const fn new(task_id: TaskId, new_status: u32, assignee: UserId) -> Self {
        Self {
            task_id,
            new_status,
            assignee,
            custom_fields: Vec::new(),
            note: None,
        }
    }

    /// Adds custom field values supplied with the transition.
    #[must_use]
    pub fn with_custom_fields<N, V>(mut self, fields: impl IntoIterator<Item = (N, V)>) -> Self
    where
        N: Into<String>,
        V: Into<String>,
    {
        self.custom_fields.extend(
            fields
                .into_iter()
                .map(|(name, value)| (name.into(), value.into())),
        );
        self
    }

    /// Sets the note recorded in the task history.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Returns the task being transitioned.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }
}

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// Domain validation or a workflow rule rejected the request.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// The requested task type does not exist.
    #[error(transparent)]
    InvalidTaskType(#[from] ParseTaskTypeError),

    /// No task has the requested identifier.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The requested assignee does not exist.
    #[error("assigned user not found: {0}")]
    UnknownUser(UserId),

    /// Task repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),

    /// User repository operation failed.
    #[error(transparent)]
    UserRepository(#[from] UserRepositoryError),

    /// Storage did not answer within the configured deadline.
    #[error("storage did not respond within {0:?}")]
    StorageTimeout(Duration),
}

impl TaskLifecycleError {
    /// Returns the machine-readable failure class.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Domain(err) => err.code(),
            Self::InvalidTaskType(_) | Self::UnknownUser(_) => ErrorCode::InvalidArgument,
            Self::TaskNotFound(_) => ErrorCode::NotFound,
            Self::Repository(err) => err.code(),
            Self::UserRepository(err) => err.code(),
            Self::StorageTimeout(_) => ErrorCode::Unavailable,
        }
    }
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Task lifecycle orchestration service.
///
/// Mutations of one task are serialized through a [`TaskLocks`] registry
/// shared by every clone of the service; writers in other processes are
/// caught by the repository's version check.
pub struct TaskLifecycleService<R, U, C>
where
    R: TaskRepository + ?Sized,
    U: UserRepository + ?Sized,
    C: Clock + Send + Sync,
{
    tasks: Arc<R>,
    users: Arc<U>,
    clock: Arc<C>,
    locks: Arc<TaskLocks>,
    storage_timeout: Duration,
}

impl<R, U, C> Clone for TaskLifecycleService<R, U, C>
where
    R: TaskRepository + ?Sized,
    U: UserRepository + ?Sized,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            tasks: Arc::clone(&self.tasks),
            users: Arc::clone(&self.users),
            clock: Arc::clone(&self.clock),
            locks: Arc::clone(&self.locks),
            storage_timeout: self.storage_timeout,
        }
    }
}

impl<R, U, C> TaskLifecycleService<R, U, C>
where
    R: TaskRepository + ?Sized,
    U: UserRepository + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service.
    #[must_use]
    pub fn new(tasks: Arc<R>, users: Arc<U>, clock: Arc<C>) -> Self {
        Self {
            tasks,
            users,
            clock,
            locks: Arc::new(TaskLocks::new()),
            storage_timeout: DEFAULT_STORAGE_TIMEOUT,
        }
    }

    /// Replaces the deadline applied to every repository call.
    #[must_use]
    pub fn with_storage_timeout(mut self, storage_timeout: Duration) -> Self {
        self.storage_timeout = storage_timeout;
        self
    }

    /// Creates a task in status 1 assigned to an existing user.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the title or task type is invalid,
    /// the assignee does not exist, or the repository rejects persistence.
    pub async fn create_task(&self, request: CreateTaskRequest) -> TaskLifecycleResult<Task> {
        let CreateTaskRequest {
            title,
            task_type,
            assignee,
        } = request;

        let task_title = TaskTitle::new(title)?;
        let kind = TaskType::try_from(task_type.as_str())?;
        self.ensure_user_exists(assignee).await?;

        let task = Task::new(task_title, kind, assignee, &*self.clock);
        self.bounded(self.tasks.store(&task)).await?;
        info!(task_id = %task.id(), task_type = %kind, assignee = %assignee, "task created");
        Ok(task)
    }

    /// Retrieves a task by identifier.
    ///
    /// Returns `Ok(None)` when no such task exists.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the lookup fails or times out.
    pub async fn find_task(&self, task_id: TaskId) -> TaskLifecycleResult<Option<Task>> {
        self.bounded(self.tasks.find_by_id(task_id)).await
    }

    /// Returns every task ordered by creation time.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the lookup fails or times out.
    pub async fn list_tasks(&self) -> TaskLifecycleResult<Vec<Task>> {
        self.bounded(self.tasks.list_all()).await
    }

    /// Returns the tasks currently assigned to `assignee`.
    ///
    /// Unknown users simply have no tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the lookup fails or times out.
    pub async fn tasks_for_user(&self, assignee: UserId) -> TaskLifecycleResult<Vec<Task>> {
        self.bounded(self.tasks.find_by_assignee(assignee)).await
    }

    /// Validates and applies a status transition.
    ///
    /// Checks run in order: the task exists, it is open, the assignee exists,
    /// the target status belongs to the task type's workflow, the move is
    /// sequential, and the target stage's evidence is present. Nothing is
    /// persisted unless every check passes.
    ///
    /// # Errors
    ///
    /// Returns the first [`TaskLifecycleError`] encountered.
    pub async fn transition_task(
        &self,
        request: TransitionTaskRequest,
    ) -> TaskLifecycleResult<Task> {
        let TransitionTaskRequest {
            task_id,
            new_status,
            assignee,
            custom_fields,
            note,
        } = request;

        let _guard = self.locks.acquire(task_id).await;
        let mut task = self.load_task(task_id).await?;
        task.ensure_open().map_err(|err| rejected(task_id, err))?;
        self.ensure_user_exists(assignee).await?;

        let mut transition = StatusTransition::new(TaskStatus::new(new_status)?, assignee)
            .with_fields(custom_fields)?;
        if let Some(text) = note {
            transition = transition.with_note(text)?;
        }

        let previous = task.status();
        task.apply_transition(transition, &*self.clock)
            .map_err(|err| rejected(task_id, err))?;
        self.bounded(self.tasks.update(&task)).await?;

        info!(
            task_id = %task_id,
            from = %previous,
            to = %task.status(),
            assignee = %assignee,
            "task status changed"
        );
        Ok(task)
    }

    /// Closes a task that has reached its terminal status.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::TaskNotFound`] for unknown tasks and a
    /// domain error when the task is already closed or not yet at its
    /// terminal status.
    pub async fn close_task(&self, task_id: TaskId) -> TaskLifecycleResult<Task> {
        let _guard = self.locks.acquire(task_id).await;
        let mut task = self.load_task(task_id).await?;
        task.close(&*self.clock)
            .map_err(|err| rejected(task_id, err))?;
        self.bounded(self.tasks.update(&task)).await?;

        info!(task_id = %task_id, status = %task.status(), "task closed");
        Ok(task)
    }

    async fn load_task(&self, task_id: TaskId) -> TaskLifecycleResult<Task> {
        self.bounded(self.tasks.find_by_id(task_id))
            .await?
            .ok_or(TaskLifecycleError::TaskNotFound(task_id))
    }

    async fn ensure_user_exists(&self, user_id: UserId) -> TaskLifecycleResult<()> {
        match self.bounded(self.users.find_by_id(user_id)).await? {
            Some(_) => Ok(()),
            None => Err(TaskLifecycleError::UnknownUser(user_id)),
        }
    }

    async fn bounded<T, E>(
        &self,
        operation: impl Future<Output = Result<T, E>>,
    ) -> TaskLifecycleResult<T>
    where
        TaskLifecycleError: From<E>,
    {
        match timeout(self.storage_timeout, operation).await {
            Ok(result) => result.map_err(TaskLifecycleError::from),
            Err(_elapsed) => Err(TaskLifecycleError::StorageTimeout(self.storage_timeout)),
        }
    }
}

fn rejected(task_id: TaskId, err: TaskDomainError) -> TaskLifecycleError {
    warn!(task_id = %task_id, code = %err.code(), error = %err, "task change rejected");
    TaskLifecycleError::Domain(err)
}
