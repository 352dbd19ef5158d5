//! JSON request and response bodies.
//!
//! Keys are camelCase on the wire.

use crate::task::domain::{
    CustomField, EvidenceField, StatusHistoryEntry, Task, TaskStatus, TaskType, WorkflowStage,
};
use crate::user::domain::{User, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Body of `POST /api/tasks`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskBody {
    /// Task title.
    pub title: String,
    /// Task type name, matched case-insensitively.
    pub task_type: String,
    /// Initial assignee.
    pub assigned_user_id: Uuid,
}

/// Body of `PUT /api/tasks/{id}/status`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionBody {
    /// Requested status.
    pub new_status: u32,
    /// Assignee after the transition.
    pub assigned_user_id: Uuid,
    /// Evidence supplied with the transition, keyed by field name. `null`
    /// and an absent key both mean no values.
    #[serde(default)]
    pub custom_fields: Option<BTreeMap<String, String>>,
    /// Optional history note.
    #[serde(default)]
    pub note: Option<String>,
}

/// Body of `POST /api/users`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserBody {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
}

/// Task representation returned by every task route.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    id: Uuid,
    title: String,
    task_type: TaskType,
    current_status: TaskStatus,
    status_label: Option<&'static str>,
    terminal_status: TaskStatus,
    is_closed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
    assigned_user_id: UserId,
    version: u64,
    custom_fields: Vec<CustomFieldView>,
    status_history: Vec<HistoryEntryView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct CustomFieldView {
    name: String,
    value: String,
    field_type: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct HistoryEntryView {
    from_status: Option<TaskStatus>,
    to_status: TaskStatus,
    assigned_user_id: UserId,
    changed_at: DateTime<Utc>,
    note: String,
}

impl From<&Task> for TaskView {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id().into_inner(),
            title: task.title().as_str().to_owned(),
            task_type: task.task_type(),
            current_status: task.status(),
            status_label: task.stage().map(|stage| stage.label),
            terminal_status: task.task_type().terminal_status(),
            is_closed: task.is_closed(),
            created_at: task.created_at(),
            updated_at: task.updated_at(),
            closed_at: task.closed_at(),
            assigned_user_id: task.assignee(),
            version: task.version(),
            custom_fields: task.custom_fields().iter().map(CustomFieldView::from).collect(),
            status_history: task.history().iter().map(HistoryEntryView::from).collect(),
        }
    }
}

impl From<&CustomField> for CustomFieldView {
    fn from(field: &CustomField) -> Self {
        Self {
            name: field.name().as_str().to_owned(),
            value: field.value().to_owned(),
            field_type: field.field_type().to_owned(),
            created_at: field.created_at(),
        }
    }
}

impl From<&StatusHistoryEntry> for HistoryEntryView {
    fn from(entry: &StatusHistoryEntry) -> Self {
        Self {
            from_status: entry.from_status(),
            to_status: entry.to_status(),
            assigned_user_id: entry.assignee(),
            changed_at: entry.changed_at(),
            note: entry.note().to_owned(),
        }
    }
}

/// User representation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    id: UserId,
    name: String,
    email: String,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id(),
            name: user.name().as_str().to_owned(),
            email: user.email().as_str().to_owned(),
        }
    }
}

/// Workflow of one task type.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowView {
    task_type: TaskType,
    terminal_status: TaskStatus,
    stages: Vec<StageView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct StageView {
    status: TaskStatus,
    label: &'static str,
    required_fields: Vec<&'static str>,
}

impl From<TaskType> for WorkflowView {
    fn from(task_type: TaskType) -> Self {
        Self {
            task_type,
            terminal_status: task_type.terminal_status(),
            stages: task_type.workflow().iter().map(StageView::from).collect(),
        }
    }
}

impl From<&WorkflowStage> for StageView {
    fn from(stage: &WorkflowStage) -> Self {
        Self {
            status: stage.status,
            label: stage.label,
            required_fields: stage
                .required
                .iter()
                .copied()
                .map(EvidenceField::as_str)
                .collect(),
        }
    }
}
