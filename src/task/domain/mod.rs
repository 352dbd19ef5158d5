//! Domain model for task workflows.
//!
//! The task domain models the per-type rule table, the transition validator,
//! and the task aggregate that applies validated transitions and closure while
//! keeping all infrastructure concerns outside of the domain boundary.

mod custom_field;
mod error;
mod history;
mod ids;
mod task;
mod transition;
mod workflow;

pub use custom_field::{CustomField, DEFAULT_FIELD_TYPE, FieldName};
pub use error::{MissingEvidence, ParseTaskTypeError, TaskDomainError};
pub use history::{CREATION_NOTE, StatusHistoryEntry};
pub use ids::{TaskId, TaskTitle};
pub use task::{INITIAL_VERSION, PersistedTaskData, Task};
pub use transition::{StatusTransition, ensure_sequential, missing_evidence};
pub use workflow::{EvidenceField, TaskStatus, TaskType, WorkflowStage};
