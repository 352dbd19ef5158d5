//! HTTP surface: an axum router over the task and user services.
//!
//! Every failure is rendered as `{ "error": message, "code": code }` with the
//! status derived from [`crate::error::ErrorCode`].

mod dto;
mod error;
mod tasks;
mod users;
mod workflows;

pub use dto::{CreateTaskBody, CreateUserBody, TaskView, TransitionBody, UserView, WorkflowView};
pub use error::ApiError;

use crate::task::{ports::TaskRepository, services::TaskLifecycleService};
use crate::user::{ports::UserRepository, services::UserDirectoryService};
use axum::{
    Json, Router,
    routing::{get, put},
};
use mockable::DefaultClock;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

/// Task service type shared by the handlers.
pub type SharedTaskService = TaskLifecycleService<dyn TaskRepository, dyn UserRepository, DefaultClock>;

/// User service type shared by the handlers.
pub type SharedUserService = UserDirectoryService<dyn UserRepository, dyn TaskRepository>;

/// State handed to every handler.
#[derive(Clone)]
pub struct AppState {
    tasks: SharedTaskService,
    users: SharedUserService,
}

impl AppState {
    /// Creates state from already configured services.
    #[must_use]
    pub const fn new(tasks: SharedTaskService, users: SharedUserService) -> Self {
        Self { tasks, users }
    }

    /// Wires both services over the given repositories.
    #[must_use]
    pub fn from_repositories(
        task_repository: Arc<dyn TaskRepository>,
        user_repository: Arc<dyn UserRepository>,
        storage_timeout: Duration,
    ) -> Self {
        let tasks = TaskLifecycleService::new(
            Arc::clone(&task_repository),
            Arc::clone(&user_repository),
            Arc::new(DefaultClock),
        )
        .with_storage_timeout(storage_timeout);
        let users = UserDirectoryService::new(user_repository, task_repository)
            .with_storage_timeout(storage_timeout);
        Self::new(tasks, users)
    }

    /// Returns the task service.
    #[must_use]
    pub const fn tasks(&self) -> &SharedTaskService {
        &self.tasks
    }

    /// Returns the user service.
    #[must_use]
    pub const fn users(&self) -> &SharedUserService {
        &self.users
    }
}

/// Builds the application router.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .route("/api/tasks/{id}", get(tasks::get_task))
        .route("/api/tasks/user/{user_id}", get(tasks::tasks_for_user))
        .route("/api/tasks/{id}/status", put(tasks::transition_task))
        .route("/api/tasks/{id}/close", put(tasks::close_task))
        .route("/api/users", get(users::list_users).post(users::create_user))
        .route("/api/users/{id}", get(users::get_user).delete(users::delete_user))
        .route("/api/workflows", get(workflows::list_workflows))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
