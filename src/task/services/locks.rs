//! Per-task lock registry serializing mutations within one process.

use crate::task::domain::TaskId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Registry handing out one async mutex per task.
///
/// Entries nobody holds are pruned whenever a new lock is requested, so the
/// map only grows with the number of tasks being mutated concurrently.
#[derive(Debug, Default)]
pub struct TaskLocks {
    entries: Mutex<HashMap<TaskId, Arc<AsyncMutex<()>>>>,
}

impl TaskLocks {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `task_id`.
    ///
    /// The returned guard releases the task when dropped.
    pub async fn acquire(&self, task_id: TaskId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            entries.retain(|id, entry| *id == task_id || Arc::strong_count(entry) > 1);
            Arc::clone(entries.entry(task_id).or_default())
        };
        lock.lock_owned().await
    }

    /// Returns the number of tasks with a live registry entry.
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
