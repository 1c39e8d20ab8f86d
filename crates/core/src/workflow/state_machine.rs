//! The approval state machine.
//!
//! Applies one approver's decision to an expense's full step set and
//! recomputes the expense status. The caller is responsible for holding the
//! per-expense lock for the duration of [`ApprovalStateMachine::apply`] and
//! for persisting the result.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::workflow::error::{InvalidActionReason, WorkflowError};
use crate::workflow::types::{
    ApprovalAction, ApprovalPolicy, ApprovalStep, Decision, ExpenseStatus, RuleKind, StepStatus,
    Transition,
};

/// Stateless engine for approver decisions.
pub struct ApprovalStateMachine;

impl ApprovalStateMachine {
    /// Applies `decision` to `steps` and returns the resulting expense status.
    ///
    /// Preconditions are checked in order, and nothing is modified when one
    /// fails:
    /// 1. the expense is still pending
    /// 2. the approver owns a step
    /// 3. that step is pending
    /// 4. in sequential mode, no lower-index step is pending
    /// 5. a rejection carries a non-empty comment
    ///
    /// When a terminal condition fires, every other pending step is marked
    /// [`StepStatus::Skipped`].
    pub fn apply(
        policy: &ApprovalPolicy,
        current: ExpenseStatus,
        steps: &mut [ApprovalStep],
        decision: &Decision,
        now: DateTime<Utc>,
    ) -> Result<Transition, WorkflowError> {
        if current != ExpenseStatus::Pending {
            return Err(WorkflowError::InvalidAction {
                approver_id: decision.approver_id,
                reason: InvalidActionReason::ExpenseClosed(current),
            });
        }

        let idx = steps
            .iter()
            .position(|s| s.approver_id == decision.approver_id)
            .ok_or(WorkflowError::InvalidAction {
                approver_id: decision.approver_id,
                reason: InvalidActionReason::NotAnApprover,
            })?;

        if steps[idx].status.is_resolved() {
            return Err(WorkflowError::InvalidAction {
                approver_id: decision.approver_id,
                reason: InvalidActionReason::AlreadyResolved(steps[idx].status),
            });
        }

        if policy.sequence_order
            && let Some(next) = next_pending_index(steps)
            && steps[idx].sequence_index > next
        {
            return Err(WorkflowError::OutOfSequence {
                requested: steps[idx].sequence_index,
                next,
            });
        }

        let comment = decision
            .comment
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);
        if decision.action == ApprovalAction::Reject && comment.is_none() {
            return Err(WorkflowError::Validation(
                "a comment is required to reject an expense".into(),
            ));
        }

        let step = &mut steps[idx];
        step.status = decision.action.step_status();
        step.comment = comment;
        step.acted_at = Some(now);
        let mut changed_steps = vec![step.id];

        let status = evaluate(&policy.kind, steps, decision);
        if status.is_terminal() {
            for other in steps.iter_mut().filter(|s| s.status == StepStatus::Pending) {
                other.status = StepStatus::Skipped;
                changed_steps.push(other.id);
            }
        }

        Ok(Transition {
            status,
            changed_steps,
        })
    }

    /// Whether `approver_id` may act right now, given the policy.
    ///
    /// Used to flag entries in an approver's queue; the authoritative check
    /// is still [`ApprovalStateMachine::apply`].
    #[must_use]
    pub fn is_actionable(policy: &ApprovalPolicy, steps: &[ApprovalStep], approver_id: Uuid) -> bool {
        let Some(step) = steps
            .iter()
            .find(|s| s.approver_id == approver_id && s.status == StepStatus::Pending)
        else {
            return false;
        };
        !policy.sequence_order || next_pending_index(steps) == Some(step.sequence_index)
    }
}

/// Lowest sequence index still pending.
#[must_use]
pub fn next_pending_index(steps: &[ApprovalStep]) -> Option<i32> {
    steps
        .iter()
        .filter(|s| s.status == StepStatus::Pending)
        .map(|s| s.sequence_index)
        .min()
}

fn evaluate(kind: &RuleKind, steps: &[ApprovalStep], decision: &Decision) -> ExpenseStatus {
    match *kind {
        RuleKind::Specific { approver_id } => {
            if decision.approver_id == approver_id {
                terminal(decision.action)
            } else {
                ExpenseStatus::Pending
            }
        }
        RuleKind::Percentage { required } => percentage_outcome(required, steps),
        RuleKind::Hybrid {
            approver_id,
            required,
        } => {
            if approver_id == Some(decision.approver_id) {
                terminal(decision.action)
            } else {
                percentage_outcome(required, steps)
            }
        }
    }
}

const fn terminal(action: ApprovalAction) -> ExpenseStatus {
    match action {
        ApprovalAction::Approve => ExpenseStatus::Approved,
        ApprovalAction::Reject => ExpenseStatus::Rejected,
    }
}

/// Approved once `approved / total >= required%`; rejected once even
/// approving every pending step could not reach it.
fn percentage_outcome(required: u8, steps: &[ApprovalStep]) -> ExpenseStatus {
    let total = steps.len();
    let approved = steps
        .iter()
        .filter(|s| s.status == StepStatus::Approved)
        .count();
    let pending = steps
        .iter()
        .filter(|s| s.status == StepStatus::Pending)
        .count();
    let threshold = usize::from(required) * total;

    if approved * 100 >= threshold {
        ExpenseStatus::Approved
    } else if (approved + pending) * 100 < threshold {
        ExpenseStatus::Rejected
    } else {
        ExpenseStatus::Pending
    }
}
