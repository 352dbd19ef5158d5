//! In-memory adapters for task workflows.

mod task;

pub use task::InMemoryTaskRepository;
