//! Workflow domain types for expense approval.
//!
//! This module defines the statuses, actions and rule policies the chain
//! builder and state machine operate on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Expense status in the approval workflow.
///
/// The valid transitions are:
/// - Pending → Approved (terminal condition met)
/// - Pending → Rejected (terminal condition met)
///
/// `Approved` and `Rejected` never revert; resubmission creates a new expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseStatus {
    /// Expense is being drafted and has no approval chain.
    Draft,
    /// Expense has been submitted and awaits approver decisions.
    Pending,
    /// Expense has been approved (terminal).
    Approved,
    /// Expense has been rejected (terminal).
    Rejected,
}

impl ExpenseStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Returns true once the workflow has reached a final decision.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl fmt::Display for ExpenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of a single approver's decision slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// Awaiting the approver's decision.
    Pending,
    /// The approver approved.
    Approved,
    /// The approver rejected.
    Rejected,
    /// Closed without a decision because the expense reached a terminal status.
    Skipped,
}

impl StepStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Skipped => "skipped",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "skipped" => Some(Self::Skipped),
            _ => None,
        }
    }

    /// Returns true if the step no longer accepts a decision.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The decision an approver casts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovalAction {
    /// Approve the expense.
    #[serde(rename = "approved", alias = "approve")]
    Approve,
    /// Reject the expense.
    #[serde(rename = "rejected", alias = "reject")]
    Reject,
}

impl ApprovalAction {
    /// Returns the string representation of the action.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approved",
            Self::Reject => "rejected",
        }
    }

    /// The step status this action resolves a step to.
    #[must_use]
    pub const fn step_status(&self) -> StepStatus {
        match self {
            Self::Approve => StepStatus::Approved,
            Self::Reject => StepStatus::Rejected,
        }
    }
}

/// Flat rule type, as stored and as accepted from clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleType {
    /// A share of approvers must approve.
    Percentage,
    /// One designated approver decides.
    Specific,
    /// Designated approver OR percentage threshold.
    Hybrid,
}

impl RuleType {
    /// Returns the string representation of the rule type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Percentage => "percentage",
            Self::Specific => "specific",
            Self::Hybrid => "hybrid",
        }
    }

    /// Parses a rule type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "percentage" => Some(Self::Percentage),
            "specific" => Some(Self::Specific),
            "hybrid" => Some(Self::Hybrid),
            _ => None,
        }
    }
}

/// Combination logic of an approval rule.
///
/// Each variant carries exactly the parameters it needs, so an unvalidated
/// combination (a specific rule without an approver, a percentage rule
/// without a threshold) cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RuleKind {
    /// Approved once `required`% of all steps approved.
    Percentage {
        /// Threshold in percent, 1..=100.
        required: u8,
    },
    /// The designated approver's decision is final.
    Specific {
        /// The designated approver.
        approver_id: Uuid,
    },
    /// Designated approver decision OR percentage threshold, whichever fires first.
    Hybrid {
        /// The designated approver, if any.
        approver_id: Option<Uuid>,
        /// Threshold in percent, 1..=100.
        required: u8,
    },
}

impl RuleKind {
    /// The flat rule type of this kind.
    #[must_use]
    pub const fn rule_type(&self) -> RuleType {
        match self {
            Self::Percentage { .. } => RuleType::Percentage,
            Self::Specific { .. } => RuleType::Specific,
            Self::Hybrid { .. } => RuleType::Hybrid,
        }
    }

    /// The designated approver, if the kind has one.
    #[must_use]
    pub const fn specific_approver(&self) -> Option<Uuid> {
        match self {
            Self::Percentage { .. } => None,
            Self::Specific { approver_id } => Some(*approver_id),
            Self::Hybrid { approver_id, .. } => *approver_id,
        }
    }

    /// The percentage threshold, if the kind has one.
    #[must_use]
    pub const fn percentage_required(&self) -> Option<u8> {
        match self {
            Self::Percentage { required } | Self::Hybrid { required, .. } => Some(*required),
            Self::Specific { .. } => None,
        }
    }
}

/// The part of a rule the state machine needs, snapshotted onto each expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalPolicy {
    /// Combination logic.
    pub kind: RuleKind,
    /// Whether steps must be resolved in ascending index order.
    pub sequence_order: bool,
}

/// One approver's decision slot on one expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalStep {
    /// Step ID.
    pub id: Uuid,
    /// Owning expense.
    pub expense_id: Uuid,
    /// The profile that decides this step.
    pub approver_id: Uuid,
    /// Dense 0-based position in the chain.
    pub sequence_index: i32,
    /// Current status.
    pub status: StepStatus,
    /// Approver's comment (required for rejections).
    pub comment: Option<String>,
    /// When the approver acted.
    pub acted_at: Option<DateTime<Utc>>,
}

impl ApprovalStep {
    /// Creates a pending step for a chain slot.
    #[must_use]
    pub fn pending(expense_id: Uuid, slot: ChainSlot) -> Self {
        Self {
            id: Uuid::now_v7(),
            expense_id,
            approver_id: slot.approver_id,
            sequence_index: slot.sequence_index,
            status: StepStatus::Pending,
            comment: None,
            acted_at: None,
        }
    }
}

/// A draft position in an approval chain, before it is attached to an expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSlot {
    /// The approver for this slot.
    pub approver_id: Uuid,
    /// Position in the chain.
    pub sequence_index: i32,
}

/// A single approver action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// The acting approver.
    pub approver_id: Uuid,
    /// What they decided.
    pub action: ApprovalAction,
    /// Optional for approvals, required for rejections.
    pub comment: Option<String>,
}

/// Result of applying a decision to a step set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Expense status after the decision.
    pub status: ExpenseStatus,
    /// IDs of every step the decision modified (acted step first, then skips).
    pub changed_steps: Vec<Uuid>,
}
