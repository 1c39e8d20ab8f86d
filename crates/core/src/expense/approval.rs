//! Approver actions and queues.

use std::sync::Arc;

use chrono::Utc;
use outlay_shared::auth::RequestContext;
use outlay_shared::types::ExpenseId;
use tracing::{info, instrument};

use crate::expense::store::WorkflowStore;
use crate::expense::types::{ActionResult, ExpenseWithSteps, PendingApproval};
use crate::workflow::error::WorkflowError;
use crate::workflow::state_machine::ApprovalStateMachine;
use crate::workflow::types::{ApprovalAction, Decision, StepStatus};

/// Applies approver decisions and answers approver-facing queries.
pub struct ApprovalService<S> {
    store: Arc<S>,
}

impl<S: WorkflowStore> ApprovalService<S> {
    /// Creates a service.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Records the caller's decision on an expense.
    ///
    /// The whole read-decide-write cycle runs under the store's per-expense
    /// lock, so concurrent decisions on one expense are applied one at a
    /// time and each sees the previous one's result.
    #[instrument(skip_all, fields(expense_id = %expense_id, approver = %ctx.profile_id, action = action.as_str()))]
    pub async fn act(
        &self,
        ctx: &RequestContext,
        expense_id: ExpenseId,
        action: ApprovalAction,
        comment: Option<String>,
    ) -> Result<ActionResult, WorkflowError> {
        let company_id = ctx.company_id.into_inner();
        let decision = Decision {
            approver_id: ctx.profile_id.into_inner(),
            action,
            comment,
        };
        let now = Utc::now();

        let result = self
            .store
            .apply_decision(expense_id.into_inner(), move |expense, steps| {
                if expense.company_id != company_id {
                    return Err(WorkflowError::scope("expense", expense.id));
                }
                ApprovalStateMachine::apply(
                    &expense.approval_policy,
                    expense.status,
                    steps,
                    &decision,
                    now,
                )
            })
            .await?;

        info!(
            status = %result.record.expense.status,
            changed = result.changed_steps.len(),
            "Approval recorded"
        );
        Ok(result)
    }

    /// The caller's pending steps, oldest expense first.
    pub async fn list_pending_for(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<PendingApproval>, WorkflowError> {
        let approver_id = ctx.profile_id.into_inner();
        let company_id = ctx.company_id.into_inner();

        let mut queue: Vec<PendingApproval> = self
            .store
            .expenses_awaiting(approver_id)
            .await?
            .into_iter()
            .filter(|record| record.expense.company_id == company_id)
            .filter_map(|record| {
                let actionable = ApprovalStateMachine::is_actionable(
                    &record.expense.approval_policy,
                    &record.steps,
                    approver_id,
                );
                let step = record
                    .steps
                    .into_iter()
                    .find(|s| s.approver_id == approver_id && s.status == StepStatus::Pending)?;
                Some(PendingApproval {
                    step,
                    expense: record.expense,
                    submitter_name: record.submitter_name,
                    actionable,
                })
            })
            .collect();

        queue.sort_by(|a, b| {
            a.expense
                .created_at
                .cmp(&b.expense.created_at)
                .then(a.step.sequence_index.cmp(&b.step.sequence_index))
        });
        Ok(queue)
    }

    /// An expense with its step history.
    ///
    /// Admins and managers see every expense in their company; employees
    /// see their own and the ones they approve.
    pub async fn expense_detail(
        &self,
        ctx: &RequestContext,
        expense_id: ExpenseId,
    ) -> Result<ExpenseWithSteps, WorkflowError> {
        let id = expense_id.into_inner();
        let record = self
            .store
            .find_expense(id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("expense", id))?;

        let caller = ctx.profile_id.into_inner();
        let visible = record.expense.company_id == ctx.company_id.into_inner()
            && (ctx.can_review() || record.expense.created_by == caller || record.has_approver(caller));
        if !visible {
            return Err(WorkflowError::scope("expense", id));
        }
        Ok(record)
    }
}
