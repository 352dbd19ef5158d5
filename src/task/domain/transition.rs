//! Transition requests and the rules that decide whether they may be applied.
//!
//! Two independent checks guard every status change:
//!
//! - the sequential rule: forward moves advance exactly one stage, backward
//!   moves and same-status moves are unrestricted;
//! - the evidence rule: every field the target stage requires must be present
//!   and non-blank, either in the incoming values or already stored on the
//!   task.

use super::{
    CustomField, EvidenceField, FieldName, TaskDomainError, TaskId, TaskStatus, WorkflowStage,
    history::MAX_NOTE_LENGTH,
};
use crate::user::domain::UserId;
use std::collections::BTreeMap;

/// Requested status change together with the evidence supplied for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTransition {
    target: TaskStatus,
    assignee: UserId,
    fields: BTreeMap<FieldName, String>,
    note: Option<String>,
}

impl StatusTransition {
    /// Creates a transition without field values or note.
    #[must_use]
    pub const fn new(target: TaskStatus, assignee: UserId) -> Self {
        Self {
            target,
            assignee,
            fields: BTreeMap::new(),
            note: None,
        }
    }

    /// Adds one custom field value.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidFieldName`] when the name is invalid.
    pub fn with_field(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, TaskDomainError> {
        self.fields.insert(FieldName::new(name)?, value.into());
        Ok(self)
    }

    /// Adds several custom field values.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidFieldName`] for the first invalid
    /// name encountered.
    pub fn with_fields<N, V>(
        self,
        fields: impl IntoIterator<Item = (N, V)>,
    ) -> Result<Self, TaskDomainError>
    where
        N: Into<String>,
        V: Into<String>,
    {
        fields
            .into_iter()
            .try_fold(self, |transition, (name, value)| {
                transition.with_field(name, value)
            })
    }

    /// Sets the note recorded in history. Blank notes are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NoteTooLong`] when the trimmed note exceeds
    /// 500 characters.
    pub fn with_note(mut self, note: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = note.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            self.note = None;
            return Ok(self);
        }

        let length = trimmed.chars().count();
        if length > MAX_NOTE_LENGTH {
            return Err(TaskDomainError::NoteTooLong(length));
        }
        self.note = Some(trimmed.to_owned());
        Ok(self)
    }

    /// Returns the target status.
    #[must_use]
    pub const fn target(&self) -> TaskStatus {
        self.target
    }

    /// Returns the user the task will be assigned to.
    #[must_use]
    pub const fn assignee(&self) -> UserId {
        self.assignee
    }

    /// Returns the supplied field values keyed by name.
    #[must_use]
    pub const fn fields(&self) -> &BTreeMap<FieldName, String> {
        &self.fields
    }

    /// Returns the caller-supplied note, if any.
    #[must_use]
    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub(super) fn into_parts(self) -> (BTreeMap<FieldName, String>, Option<String>) {
        (self.fields, self.note)
    }
}

/// Enforces the sequential-move rule.
///
/// # Errors
///
/// Returns [`TaskDomainError::NonSequentialMove`] when `target` lies more than
/// one stage ahead of `current`.
pub fn ensure_sequential(
    task_id: TaskId,
    current: TaskStatus,
    target: TaskStatus,
) -> Result<(), TaskDomainError> {
    if target > current && current.next() != Some(target) {
        return Err(TaskDomainError::NonSequentialMove {
            task_id,
            from: current,
            to: target,
        });
    }
    Ok(())
}

/// Returns the evidence `stage` requires that is present neither in
/// `incoming` nor in `stored`, in rule-table order.
#[must_use]
pub fn missing_evidence(
    stage: &WorkflowStage,
    stored: &[CustomField],
    incoming: &BTreeMap<FieldName, String>,
) -> Vec<EvidenceField> {
    stage
        .required
        .iter()
        .copied()
        .filter(|field| !is_supplied(*field, stored, incoming))
        .collect()
}

fn is_supplied(
    field: EvidenceField,
    stored: &[CustomField],
    incoming: &BTreeMap<FieldName, String>,
) -> bool {
    let name = field.as_str();
    let in_request = incoming
        .get(name)
        .is_some_and(|value| !value.trim().is_empty());
    in_request
        || stored
            .iter()
            .any(|existing| existing.name().as_str() == name && existing.has_content())
}
