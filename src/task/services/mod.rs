//! Application services for task lifecycle orchestration.

mod lifecycle;
mod locks;

pub use lifecycle::{
    CreateTaskRequest, DEFAULT_STORAGE_TIMEOUT, TaskLifecycleError, TaskLifecycleResult,
    TaskLifecycleService, TransitionTaskRequest,
};
pub use locks::TaskLocks;
