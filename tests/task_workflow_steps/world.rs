//! Shared world state for task workflow BDD scenarios.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use taskflow::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::Task,
    services::{TaskLifecycleError, TaskLifecycleService},
};
use taskflow::user::{
    adapters::memory::InMemoryUserRepository,
    domain::User,
    services::UserDirectoryService,
};

/// Task service type used by the BDD world.
pub type TestTaskService =
    TaskLifecycleService<InMemoryTaskRepository, InMemoryUserRepository, DefaultClock>;

/// User service type used by the BDD world.
pub type TestUserService = UserDirectoryService<InMemoryUserRepository, InMemoryTaskRepository>;

/// Scenario world for task workflow behaviour tests.
pub struct TaskWorkflowWorld {
    pub tasks: TestTaskService,
    pub users: TestUserService,
    pub user: Option<User>,
    pub task: Option<Task>,
    pub pending_fields: Vec<(String, String)>,
    pub last_result: Option<Result<Task, TaskLifecycleError>>,
}

impl TaskWorkflowWorld {
    /// Creates a world backed by empty in-memory repositories.
    #[must_use]
    pub fn new() -> Self {
        let directory = InMemoryUserRepository::new();
        let task_repository = Arc::new(InMemoryTaskRepository::linked_to(directory.clone()));
        let user_repository = Arc::new(directory);

        Self {
            tasks: TaskLifecycleService::new(
                Arc::clone(&task_repository),
                Arc::clone(&user_repository),
                Arc::new(DefaultClock),
            ),
            users: UserDirectoryService::new(user_repository, task_repository),
            user: None,
            task: None,
            pending_fields: Vec::new(),
            last_result: None,
        }
    }

    /// Records an operation result, keeping the latest successful task.
    pub fn record(&mut self, result: Result<Task, TaskLifecycleError>) {
        if let Ok(ref updated) = result {
            self.task = Some(updated.clone());
        }
        self.last_result = Some(result);
    }
}

impl Default for TaskWorkflowWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TaskWorkflowWorld {
    TaskWorkflowWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
