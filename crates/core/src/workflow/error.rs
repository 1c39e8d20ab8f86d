//! Workflow error types for expense submission and approval.
//!
//! Every failure of the approval engine is surfaced as one of these
//! variants; nothing is logged-and-swallowed.

use std::fmt;

use thiserror::Error;
use uuid::Uuid;

use crate::workflow::types::{ExpenseStatus, StepStatus};

/// Why an approver action was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidActionReason {
    /// The approver has no step on this expense.
    NotAnApprover,
    /// The approver's step was already resolved.
    AlreadyResolved(StepStatus),
    /// The expense already reached a terminal status.
    ExpenseClosed(ExpenseStatus),
}

impl fmt::Display for InvalidActionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnApprover => write!(f, "no approval step is assigned to this approver"),
            Self::AlreadyResolved(status) => write!(f, "step already resolved as {status}"),
            Self::ExpenseClosed(status) => write!(f, "expense is already {status}"),
        }
    }
}

/// Errors that can occur during workflow operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorkflowError {
    /// Malformed rule, expense or decision input.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A reference crosses a company boundary.
    #[error("{entity} {id} belongs to a different company")]
    ScopeViolation {
        /// Kind of the offending entity.
        entity: &'static str,
        /// Its ID.
        id: Uuid,
    },

    /// The approver cannot act on this expense.
    #[error("Approver {approver_id} cannot act: {reason}")]
    InvalidAction {
        /// The acting approver.
        approver_id: Uuid,
        /// Why the action was refused.
        reason: InvalidActionReason,
    },

    /// A sequential chain still has an earlier pending step.
    #[error("Step {requested} is out of sequence; step {next} must be resolved first")]
    OutOfSequence {
        /// Index of the step the approver tried to resolve.
        requested: i32,
        /// Index of the lowest pending step.
        next: i32,
    },

    /// A referenced entity does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of the missing entity.
        entity: &'static str,
        /// Its ID.
        id: Uuid,
    },

    /// A collaborator (currency rates) failed.
    #[error("External service failed: {0}")]
    ExternalService(String),

    /// Assigning the manager would create a reporting cycle.
    #[error("Assigning manager {manager_id} to profile {profile_id} would create a cycle")]
    ManagerCycle {
        /// Profile being assigned.
        profile_id: Uuid,
        /// Proposed manager.
        manager_id: Uuid,
    },

    /// Persistence failure.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl WorkflowError {
    /// Shorthand for a missing entity.
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl Into<Uuid>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Shorthand for a cross-company reference.
    #[must_use]
    pub fn scope(entity: &'static str, id: impl Into<Uuid>) -> Self {
        Self::ScopeViolation {
            entity,
            id: id.into(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::ManagerCycle { .. } => 400,
            Self::ScopeViolation { .. } => 403,
            Self::NotFound { .. } => 404,
            Self::InvalidAction { .. } | Self::OutOfSequence { .. } => 409,
            Self::Storage(_) => 500,
            Self::ExternalService(_) => 502,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::ScopeViolation { .. } => "SCOPE_VIOLATION",
            Self::InvalidAction { .. } => "INVALID_ACTION",
            Self::OutOfSequence { .. } => "OUT_OF_SEQUENCE",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            Self::ManagerCycle { .. } => "MANAGER_CYCLE",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }
}
