//! Task aggregate root and its transition engine.

use super::{
    CustomField, FieldName, MissingEvidence, StatusHistoryEntry, StatusTransition,
    TaskDomainError, TaskId, TaskStatus, TaskTitle, TaskType, WorkflowStage,
    history::CREATION_NOTE,
    transition::{ensure_sequential, missing_evidence},
};
use crate::user::domain::UserId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Version assigned to a freshly created task.
pub const INITIAL_VERSION: u64 = 1;

/// Task aggregate root.
///
/// The task owns its custom fields and status history. Every successful
/// mutation bumps [`Task::version`] by one, which repositories use to detect
/// concurrent writers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    title: TaskTitle,
    task_type: TaskType,
    status: TaskStatus,
    assignee: UserId,
    custom_fields: Vec<CustomField>,
    history: Vec<StatusHistoryEntry>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
    version: u64,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted title.
    pub title: TaskTitle,
    /// Persisted task type.
    pub task_type: TaskType,
    /// Persisted current status.
    pub status: TaskStatus,
    /// Persisted current assignee.
    pub assignee: UserId,
    /// Persisted custom fields in insertion order.
    pub custom_fields: Vec<CustomField>,
    /// Persisted history in chronological order.
    pub history: Vec<StatusHistoryEntry>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest mutation timestamp.
    pub updated_at: DateTime<Utc>,
    /// Persisted closing timestamp, if closed.
    pub closed_at: Option<DateTime<Utc>>,
    /// Persisted optimistic concurrency version.
    pub version: u64,
}

impl Task {
    /// Creates a task in status 1 and records the creation in history.
    #[must_use]
    pub fn new(title: TaskTitle, task_type: TaskType, assignee: UserId, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        let id = TaskId::new();
        let creation = StatusHistoryEntry::new(
            id,
            None,
            TaskStatus::CREATED,
            assignee,
            timestamp,
            CREATION_NOTE,
        );

        Self {
            id,
            title,
            task_type,
            status: TaskStatus::CREATED,
            assignee,
            custom_fields: Vec::new(),
            history: vec![creation],
            created_at: timestamp,
            updated_at: timestamp,
            closed_at: None,
            version: INITIAL_VERSION,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            task_type: data.task_type,
            status: data.status,
            assignee: data.assignee,
            custom_fields: data.custom_fields,
            history: data.history,
            created_at: data.created_at,
            updated_at: data.updated_at,
            closed_at: data.closed_at,
            version: data.version,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.title
    }

    /// Returns the task type.
    #[must_use]
    pub const fn task_type(&self) -> TaskType {
        self.task_type
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the workflow stage matching the current status.
    #[must_use]
    pub fn stage(&self) -> Option<&'static WorkflowStage> {
        self.task_type.stage(self.status)
    }

    /// Returns the currently assigned user.
    #[must_use]
    pub const fn assignee(&self) -> UserId {
        self.assignee
    }

    /// Returns the custom fields in insertion order.
    #[must_use]
    pub fn custom_fields(&self) -> &[CustomField] {
        &self.custom_fields
    }

    /// Returns the stored value of a custom field, if present.
    #[must_use]
    pub fn custom_field(&self, name: &str) -> Option<&str> {
        self.custom_fields
            .iter()
            .find(|field| field.name().as_str() == name)
            .map(CustomField::value)
    }

    /// Returns the status history in chronological order.
    #[must_use]
    pub fn history(&self) -> &[StatusHistoryEntry] {
        &self.history
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the closing timestamp, if the task is closed.
    #[must_use]
    pub const fn closed_at(&self) -> Option<DateTime<Utc>> {
        self.closed_at
    }

    /// Returns `true` once the task has been closed.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed_at.is_some()
    }

    /// Returns the optimistic concurrency version.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Returns `true` when the task is at its type's terminal status.
    #[must_use]
    pub fn is_at_terminal_status(&self) -> bool {
        self.status == self.task_type.terminal_status()
    }

    /// Rejects any mutation of a closed task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::TaskClosed`] when the task is closed.
    pub const fn ensure_open(&self) -> Result<(), TaskDomainError> {
        if self.is_closed() {
            return Err(TaskDomainError::TaskClosed(self.id));
        }
        Ok(())
    }

    /// Validates `transition` against the workflow without mutating the task.
    ///
    /// Checks run in order: the task is open, the target status exists in the
    /// type's workflow, the move is sequential, and the target stage's
    /// evidence is satisfied.
    ///
    /// # Errors
    ///
    /// Returns the first [`TaskDomainError`] encountered.
    pub fn check_transition(
        &self,
        transition: &StatusTransition,
    ) -> Result<&'static WorkflowStage, TaskDomainError> {
        self.ensure_open()?;

        let target = transition.target();
        let stage = self
            .task_type
            .stage(target)
            .ok_or(TaskDomainError::UnsupportedStatus {
                task_type: self.task_type,
                status: target,
            })?;

        ensure_sequential(self.id, self.status, target)?;

        let missing = missing_evidence(stage, &self.custom_fields, transition.fields());
        if !missing.is_empty() {
            return Err(TaskDomainError::MissingEvidence {
                task_id: self.id,
                task_type: self.task_type,
                status: target,
                label: stage.label,
                missing: MissingEvidence::new(missing),
            });
        }

        Ok(stage)
    }

    /// Validates and applies a status transition.
    ///
    /// On success the supplied fields are merged (overwriting by name,
    /// appending new names), status and assignee are updated, and a history
    /// entry is appended. On failure the task is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError`] when [`Task::check_transition`] rejects the
    /// request.
    pub fn apply_transition(
        &mut self,
        transition: StatusTransition,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.check_transition(&transition)?;

        let timestamp = clock.utc();
        let previous = self.status;
        let target = transition.target();
        let assignee = transition.assignee();
        let (fields, note) = transition.into_parts();

        self.merge_fields(fields, timestamp);
        self.status = target;
        self.assignee = assignee;
        let note_text =
            note.unwrap_or_else(|| format!("Status changed from {previous} to {target}"));
        self.history.push(StatusHistoryEntry::new(
            self.id,
            Some(previous),
            target,
            assignee,
            timestamp,
            note_text,
        ));
        self.touch(timestamp);
        Ok(())
    }

    /// Closes the task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::AlreadyClosed`] when the task is closed or
    /// [`TaskDomainError::NotAtTerminalStatus`] when the task has not reached
    /// its type's terminal status.
    pub fn close(&mut self, clock: &impl Clock) -> Result<(), TaskDomainError> {
        if self.is_closed() {
            return Err(TaskDomainError::AlreadyClosed(self.id));
        }

        if !self.is_at_terminal_status() {
            return Err(TaskDomainError::NotAtTerminalStatus {
                task_id: self.id,
                status: self.status,
                terminal: self.task_type.terminal_status(),
            });
        }

        let timestamp = clock.utc();
        self.closed_at = Some(timestamp);
        self.touch(timestamp);
        Ok(())
    }

    /// Blank incoming values never replace stored evidence.
    fn merge_fields(&mut self, fields: BTreeMap<FieldName, String>, timestamp: DateTime<Utc>) {
        for (name, value) in fields {
            if value.trim().is_empty() {
                continue;
            }
            match self
                .custom_fields
                .iter_mut()
                .find(|existing| existing.name() == &name)
            {
                Some(existing) => existing.replace_value(value),
                None => self
                    .custom_fields
                    .push(CustomField::new(self.id, name, value, timestamp)),
            }
        }
    }

    fn touch(&mut self, timestamp: DateTime<Utc>) {
        self.updated_at = timestamp;
        self.version = self.version.saturating_add(1);
    }
}
