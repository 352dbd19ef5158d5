//! Workflow rule table: task types, their ordered stages, and the evidence
//! each stage demands.
//!
//! Every task type owns a fixed, linear list of [`WorkflowStage`] values.
//! Stage `1` never requires evidence; the last stage is the terminal status a
//! task must reach before it can be closed.

use super::{ParseTaskTypeError, TaskDomainError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of work a task tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskType {
    /// Purchasing goods from a supplier.
    Procurement,
    /// Building and shipping software.
    Development,
}

/// Evidence field names the workflow can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvidenceField {
    /// First supplier price quote.
    PriceQuote1,
    /// Second supplier price quote.
    PriceQuote2,
    /// Purchase receipt reference.
    Receipt,
    /// Link or identifier of the agreed specification.
    Specification,
    /// Source-control branch carrying the work.
    BranchName,
    /// Released version identifier.
    VersionNumber,
}

impl EvidenceField {
    /// Returns the custom-field name that carries this evidence.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PriceQuote1 => "PriceQuote1",
            Self::PriceQuote2 => "PriceQuote2",
            Self::Receipt => "Receipt",
            Self::Specification => "Specification",
            Self::BranchName => "BranchName",
            Self::VersionNumber => "VersionNumber",
        }
    }
}

impl fmt::Display for EvidenceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of a task in its type's workflow.
///
/// Statuses are positive; `1` is the status every task is created in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskStatus(u32);

impl TaskStatus {
    /// Status assigned on creation and reachable from anywhere as a reset.
    pub const CREATED: Self = Self(1);

    /// Creates a validated status.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStatus`] when the value is zero.
    pub const fn new(value: u32) -> Result<Self, TaskDomainError> {
        if value == 0 {
            return Err(TaskDomainError::InvalidStatus(value));
        }
        Ok(Self(value))
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Returns the status one step further along, if representable.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One step of a task type's workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkflowStage {
    /// Status value this stage occupies.
    pub status: TaskStatus,
    /// Short description of what reaching the stage means.
    pub label: &'static str,
    /// Evidence that must be present before a task may enter the stage.
    pub required: &'static [EvidenceField],
}

static PROCUREMENT_WORKFLOW: [WorkflowStage; 3] = [
    WorkflowStage {
        status: TaskStatus(1),
        label: "Created",
        required: &[],
    },
    WorkflowStage {
        status: TaskStatus(2),
        label: "Supplier offers received",
        required: &[EvidenceField::PriceQuote1, EvidenceField::PriceQuote2],
    },
    WorkflowStage {
        status: TaskStatus(3),
        label: "Purchase completed",
        required: &[EvidenceField::Receipt],
    },
];

static DEVELOPMENT_WORKFLOW: [WorkflowStage; 4] = [
    WorkflowStage {
        status: TaskStatus(1),
        label: "Created",
        required: &[],
    },
    WorkflowStage {
        status: TaskStatus(2),
        label: "Specification completed",
        required: &[EvidenceField::Specification],
    },
    WorkflowStage {
        status: TaskStatus(3),
        label: "Development completed",
        required: &[EvidenceField::BranchName],
    },
    WorkflowStage {
        status: TaskStatus(4),
        label: "Distribution completed",
        required: &[EvidenceField::VersionNumber],
    },
];

impl TaskType {
    /// All supported task types.
    pub const ALL: [Self; 2] = [Self::Procurement, Self::Development];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Procurement => "Procurement",
            Self::Development => "Development",
        }
    }

    /// Returns the ordered workflow stages for this type.
    #[must_use]
    pub fn workflow(self) -> &'static [WorkflowStage] {
        match self {
            Self::Procurement => &PROCUREMENT_WORKFLOW,
            Self::Development => &DEVELOPMENT_WORKFLOW,
        }
    }

    /// Returns the stage occupying `status`, or `None` when this type's
    /// workflow has no such status.
    #[must_use]
    pub fn stage(self, status: TaskStatus) -> Option<&'static WorkflowStage> {
        self.workflow().iter().find(|stage| stage.status == status)
    }

    /// Returns the status a task must reach before it may be closed.
    #[must_use]
    pub fn terminal_status(self) -> TaskStatus {
        self.workflow()
            .last()
            .map_or(TaskStatus::CREATED, |stage| stage.status)
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskType {
    type Error = ParseTaskTypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "procurement" => Ok(Self::Procurement),
            "development" => Ok(Self::Development),
            _ => Err(ParseTaskTypeError(value.to_owned())),
        }
    }
}
