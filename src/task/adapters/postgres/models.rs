//! Diesel row models for task persistence.

use super::schema::{task_custom_fields, task_status_history, tasks};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// Task type name.
    pub task_type: String,
    /// Current workflow status.
    pub current_status: i32,
    /// Whether the task has been closed.
    pub is_closed: bool,
    /// Currently assigned user.
    pub assigned_user_id: uuid::Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
    /// Closing timestamp.
    pub closed_at: Option<DateTime<Utc>>,
    /// Optimistic concurrency version.
    pub version: i64,
}

/// Insert model for task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// Task type name.
    pub task_type: String,
    /// Current workflow status.
    pub current_status: i32,
    /// Whether the task has been closed.
    pub is_closed: bool,
    /// Currently assigned user.
    pub assigned_user_id: uuid::Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
    /// Closing timestamp.
    pub closed_at: Option<DateTime<Utc>>,
    /// Optimistic concurrency version.
    pub version: i64,
}

/// Row model for custom field values, used for both reads and upserts.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = task_custom_fields)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CustomFieldRow {
    /// Owning task.
    pub task_id: uuid::Uuid,
    /// Field name.
    pub field_name: String,
    /// Field value.
    pub field_value: String,
    /// Value type tag.
    pub field_type: String,
    /// Insertion order within the task.
    pub position: i32,
    /// First write timestamp.
    pub created_at: DateTime<Utc>,
}

/// Row model for status history entries, used for both reads and inserts.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = task_status_history)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct StatusHistoryRow {
    /// Owning task.
    pub task_id: uuid::Uuid,
    /// Position within the task's history, starting at 1.
    pub sequence: i32,
    /// Status before the change.
    pub from_status: Option<i32>,
    /// Status after the change.
    pub to_status: i32,
    /// Assignee recorded by the change.
    pub assigned_user_id: uuid::Uuid,
    /// Change timestamp.
    pub changed_at: DateTime<Utc>,
    /// Free-text note.
    pub note: String,
}
