//! Persistence seam for the workflow services.

use std::future::Future;

use uuid::Uuid;

use crate::expense::types::{ActionResult, Expense, ExpenseWithSteps};
use crate::org::{Company, Profile};
use crate::workflow::error::WorkflowError;
use crate::workflow::rule::ApprovalRule;
use crate::workflow::types::{ApprovalStep, Transition};

/// Storage operations the submission coordinator and approval service need.
///
/// This trait is implemented by the db crate for Postgres and by
/// [`crate::expense::InMemoryWorkflowStore`].
pub trait WorkflowStore: Send + Sync {
    /// Finds a company by ID.
    fn find_company(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<Company>, WorkflowError>> + Send;

    /// Finds a profile by ID, in any company.
    fn find_profile(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<Profile>, WorkflowError>> + Send;

    /// Finds a rule by ID, in any company.
    fn find_rule(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<ApprovalRule>, WorkflowError>> + Send;

    /// Writes an expense and its full step set atomically.
    ///
    /// Either both exist afterwards or neither does.
    fn insert_submission(
        &self,
        expense: &Expense,
        steps: &[ApprovalStep],
    ) -> impl Future<Output = Result<(), WorkflowError>> + Send;

    /// Runs `decide` against one expense under an exclusive per-expense lock
    /// and persists the result.
    ///
    /// `decide` receives the current expense and a working copy of its steps
    /// ordered by sequence index. On `Ok`, the modified steps and the
    /// transition's status are committed together; on `Err` nothing is
    /// written.
    fn apply_decision<F>(
        &self,
        expense_id: Uuid,
        decide: F,
    ) -> impl Future<Output = Result<ActionResult, WorkflowError>> + Send
    where
        F: FnOnce(&Expense, &mut [ApprovalStep]) -> Result<Transition, WorkflowError> + Send;

    /// Loads an expense with its ordered steps.
    fn find_expense(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<ExpenseWithSteps>, WorkflowError>> + Send;

    /// Pending expenses on which `approver_id` holds a pending step.
    fn expenses_awaiting(
        &self,
        approver_id: Uuid,
    ) -> impl Future<Output = Result<Vec<ExpenseWithSteps>, WorkflowError>> + Send;
}
