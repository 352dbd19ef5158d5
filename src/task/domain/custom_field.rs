//! Named string values attached to a task as workflow evidence.

use super::{TaskDomainError, TaskId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Maximum field name length, matching the `VARCHAR(100)` column.
const MAX_FIELD_NAME_LENGTH: usize = 100;

/// Type tag recorded when callers do not supply one.
pub const DEFAULT_FIELD_TYPE: &str = "string";

/// Validated custom field name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldName(String);

impl FieldName {
    /// Creates a validated field name.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidFieldName`] when the trimmed name is
    /// empty or longer than 100 characters.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let normalized = raw.trim();

        if normalized.is_empty() || normalized.chars().count() > MAX_FIELD_NAME_LENGTH {
            return Err(TaskDomainError::InvalidFieldName(raw));
        }

        Ok(Self(normalized.to_owned()))
    }

    /// Returns the field name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for FieldName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Borrow<str> for FieldName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Custom field value owned by a task.
///
/// A task holds at most one field per name; writing an existing name replaces
/// the value and keeps the original creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomField {
    task_id: TaskId,
    name: FieldName,
    value: String,
    field_type: String,
    created_at: DateTime<Utc>,
}

impl CustomField {
    /// Creates a string-typed field.
    #[must_use]
    pub fn new(
        task_id: TaskId,
        name: FieldName,
        value: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            task_id,
            name,
            value: value.into(),
            field_type: DEFAULT_FIELD_TYPE.to_owned(),
            created_at,
        }
    }

    /// Reconstructs a field from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        task_id: TaskId,
        name: FieldName,
        value: String,
        field_type: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            task_id,
            name,
            value,
            field_type,
            created_at,
        }
    }

    /// Returns the owning task identifier.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the field name.
    #[must_use]
    pub const fn name(&self) -> &FieldName {
        &self.name
    }

    /// Returns the stored value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns the type tag.
    #[must_use]
    pub fn field_type(&self) -> &str {
        &self.field_type
    }

    /// Returns when the field was first written.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns `true` when the value carries content after trimming.
    #[must_use]
    pub fn has_content(&self) -> bool {
        !self.value.trim().is_empty()
    }

    pub(super) fn replace_value(&mut self, value: String) {
        self.value = value;
    }
}
