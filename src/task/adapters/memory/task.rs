//! In-memory repository for task workflows.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{Task, TaskId},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use crate::user::{
    adapters::memory::InMemoryUserRepository, domain::UserId, ports::UserRepositoryError,
};

/// Thread-safe in-memory task repository.
///
/// When linked to an [`InMemoryUserRepository`], every stored assignee is
/// pinned there, so assignees must exist and pinned users cannot be deleted.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
    users: Option<InMemoryUserRepository>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty repository whose assignees are checked against and
    /// pinned in `users`.
    #[must_use]
    pub fn linked_to(users: InMemoryUserRepository) -> Self {
        Self {
            state: Arc::default(),
            users: Some(users),
        }
    }

    fn pin_assignee(&self, assignee: UserId) -> TaskRepositoryResult<()> {
        let Some(users) = &self.users else {
            return Ok(());
        };
        users.pin_reference(assignee).map_err(|err| match err {
            UserRepositoryError::NotFound(id) => TaskRepositoryError::UnknownUser(id),
            other => TaskRepositoryError::persistence(other),
        })
    }
}

fn lock_error(err: impl ToString) -> TaskRepositoryError {
    TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

/// Collects matching tasks ordered by creation time, then ID for ties.
fn sorted_tasks<'a>(tasks: impl Iterator<Item = &'a Task>) -> Vec<Task> {
    let mut found: Vec<Task> = tasks.cloned().collect();
    found.sort_by(|left, right| {
        left.created_at()
            .cmp(&right.created_at())
            .then_with(|| left.id().cmp(&right.id()))
    });
    found
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        self.pin_assignee(task.assignee())?;
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;

        let stored = state
            .tasks
            .get_mut(&task.id())
            .ok_or(TaskRepositoryError::NotFound(task.id()))?;

        let expected = task.version().saturating_sub(1);
        if stored.version() != expected {
            return Err(TaskRepositoryError::VersionConflict {
                task_id: task.id(),
                expected,
                found: stored.version(),
            });
        }

        self.pin_assignee(task.assignee())?;
        *stored = task.clone();
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn list_all(&self) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(sorted_tasks(state.tasks.values()))
    }

    async fn find_by_assignee(&self, assignee: UserId) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(sorted_tasks(
            state
                .tasks
                .values()
                .filter(|task| task.assignee() == assignee),
        ))
    }

    async fn references_user(&self, user: UserId) -> TaskRepositoryResult<bool> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.tasks.values().any(|task| {
            task.assignee() == user || task.history().iter().any(|entry| entry.assignee() == user)
        }))
    }
}
