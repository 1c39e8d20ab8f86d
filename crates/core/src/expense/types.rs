//! Expense domain types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::currency::{CurrencyCode, ensure_storable};
use crate::workflow::error::WorkflowError;
use crate::workflow::types::{ApprovalPolicy, ApprovalStep, ExpenseStatus};

/// Categories offered in the expense form.
pub const EXPENSE_CATEGORIES: &[&str] = &[
    "Travel",
    "Meals & Entertainment",
    "Office Supplies",
    "Software & Subscriptions",
    "Training & Education",
    "Marketing",
    "Utilities",
    "Transportation",
    "Accommodation",
    "Equipment",
    "Other",
];

/// Payment methods offered in the expense form.
pub const PAYMENT_METHODS: &[&str] = &[
    "Company Card",
    "Personal Card",
    "Cash",
    "Bank Transfer",
    "Other",
];

/// A submitted expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    /// Expense ID.
    pub id: Uuid,
    /// Owning company.
    pub company_id: Uuid,
    /// Submitter profile.
    pub created_by: Uuid,
    /// What was bought.
    pub description: String,
    /// Expense category.
    pub category: String,
    /// When the expense was incurred.
    pub date_of_expense: NaiveDate,
    /// Payment method.
    pub paid_by: Option<String>,
    /// Amount in the submitted currency.
    pub amount: Decimal,
    /// Submitted currency.
    pub currency: CurrencyCode,
    /// Amount normalized into the company's base currency.
    pub amount_base: Decimal,
    /// The company's base currency at submission time.
    pub base_currency: CurrencyCode,
    /// Workflow status.
    pub status: ExpenseStatus,
    /// Rule the expense was submitted against; cleared if the rule is deleted.
    pub approval_rule_id: Option<Uuid>,
    /// Rule logic as it was at submission.
    pub approval_policy: ApprovalPolicy,
    /// Stored receipt object key.
    pub receipt_path: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last status change.
    pub updated_at: DateTime<Utc>,
}

/// Expense fields supplied by the submitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseDraft {
    /// What was bought.
    pub description: String,
    /// Expense category.
    pub category: String,
    /// When the expense was incurred.
    pub date_of_expense: NaiveDate,
    /// Payment method.
    #[serde(default)]
    pub paid_by: Option<String>,
    /// Amount in `currency`.
    pub amount: Decimal,
    /// Currency code as entered.
    pub currency: String,
    /// Rule to route the expense through.
    pub approval_rule_id: Uuid,
    /// Stored receipt object key.
    #[serde(default)]
    pub receipt_path: Option<String>,
}

impl ExpenseDraft {
    /// Checks the fields and returns the parsed currency.
    pub fn validate(&self) -> Result<CurrencyCode, WorkflowError> {
        if self.description.trim().is_empty() {
            return Err(WorkflowError::Validation("description is required".into()));
        }
        if self.category.trim().is_empty() {
            return Err(WorkflowError::Validation("category is required".into()));
        }
        if self.amount <= Decimal::ZERO {
            return Err(WorkflowError::Validation(format!(
                "amount must be positive, got {}",
                self.amount
            )));
        }
        ensure_storable(self.amount)?;
        CurrencyCode::parse(&self.currency).map_err(WorkflowError::from)
    }
}

/// An expense with its ordered approval steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseWithSteps {
    /// The expense.
    pub expense: Expense,
    /// Submitter's display name.
    pub submitter_name: String,
    /// Steps ordered by sequence index.
    pub steps: Vec<ApprovalStep>,
}

impl ExpenseWithSteps {
    /// Whether `profile_id` has a step on this expense.
    #[must_use]
    pub fn has_approver(&self, profile_id: Uuid) -> bool {
        self.steps.iter().any(|s| s.approver_id == profile_id)
    }
}

/// One entry of an approver's queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingApproval {
    /// The approver's pending step.
    pub step: ApprovalStep,
    /// The expense it belongs to.
    pub expense: Expense,
    /// Submitter's display name.
    pub submitter_name: String,
    /// False while a sequential chain still waits on an earlier step.
    pub actionable: bool,
}

/// Outcome of an approver action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    /// The expense and its steps after the action.
    pub record: ExpenseWithSteps,
    /// Steps touched by the action, acted step first.
    pub changed_steps: Vec<Uuid>,
}

/// Filters for company expense listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseFilter {
    /// Only this status.
    #[serde(default)]
    pub status: Option<ExpenseStatus>,
    /// Only this category.
    #[serde(default)]
    pub category: Option<String>,
}
