//! Property-based tests for ApprovalStateMachine.
//!
//! These tests exercise threshold arithmetic, terminal stickiness and
//! sequential gating over randomly sized chains.

use chrono::Utc;
use proptest::prelude::*;
use uuid::Uuid;

use crate::workflow::error::WorkflowError;
use crate::workflow::state_machine::ApprovalStateMachine;
use crate::workflow::types::{
    ApprovalAction, ApprovalPolicy, ApprovalStep, Decision, ExpenseStatus, RuleKind, StepStatus,
};

fn chain(n: usize) -> Vec<ApprovalStep> {
    let expense_id = Uuid::new_v4();
    (0..n)
        .map(|i| ApprovalStep {
            id: Uuid::new_v4(),
            expense_id,
            approver_id: Uuid::new_v4(),
            sequence_index: i32::try_from(i).unwrap(),
            status: StepStatus::Pending,
            comment: None,
            acted_at: None,
        })
        .collect()
}

fn decision(approver_id: Uuid, action: ApprovalAction) -> Decision {
    Decision {
        approver_id,
        action,
        comment: Some("reviewed".to_string()),
    }
}

/// Smallest approval count k with k * 100 >= p * n.
fn approvals_needed(p: u8, n: usize) -> usize {
    (usize::from(p) * n).div_ceil(100)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Approved exactly when the approval count first reaches ceil(P/100 * N).
    #[test]
    fn prop_percentage_approves_at_threshold(n in 1usize..12, p in 1u8..=100) {
        let policy = ApprovalPolicy { kind: RuleKind::Percentage { required: p }, sequence_order: false };
        let mut steps = chain(n);
        let ids: Vec<_> = steps.iter().map(|s| s.approver_id).collect();
        let needed = approvals_needed(p, n);

        for (i, id) in ids.iter().enumerate() {
            let t = ApprovalStateMachine::apply(
                &policy, ExpenseStatus::Pending, &mut steps, &decision(*id, ApprovalAction::Approve), Utc::now(),
            ).unwrap();
            if i + 1 < needed {
                prop_assert_eq!(t.status, ExpenseStatus::Pending);
            } else {
                prop_assert_eq!(t.status, ExpenseStatus::Approved);
                prop_assert_eq!(i + 1, needed);
                break;
            }
        }
    }

    /// Rejected exactly when the remaining pending steps can no longer reach P.
    #[test]
    fn prop_percentage_rejects_when_unreachable(n in 1usize..12, p in 1u8..=100) {
        let policy = ApprovalPolicy { kind: RuleKind::Percentage { required: p }, sequence_order: false };
        let mut steps = chain(n);
        let ids: Vec<_> = steps.iter().map(|s| s.approver_id).collect();
        let needed = approvals_needed(p, n);
        // The expense is rejected on the first rejection that leaves fewer than `needed` possible approvals.
        let rejections_to_fail = n - needed + 1;

        for (i, id) in ids.iter().enumerate() {
            let t = ApprovalStateMachine::apply(
                &policy, ExpenseStatus::Pending, &mut steps, &decision(*id, ApprovalAction::Reject), Utc::now(),
            ).unwrap();
            if i + 1 < rejections_to_fail {
                prop_assert_eq!(t.status, ExpenseStatus::Pending);
            } else {
                prop_assert_eq!(t.status, ExpenseStatus::Rejected);
                break;
            }
        }
    }

    /// The designated approver's decision is terminal regardless of other steps.
    #[test]
    fn prop_specific_decision_is_terminal(
        n in 1usize..8,
        pick in any::<prop::sample::Index>(),
        prior in 0usize..8,
        approve in any::<bool>(),
    ) {
        let mut steps = chain(n);
        let designated = steps[pick.index(n)].approver_id;
        let policy = ApprovalPolicy { kind: RuleKind::Specific { approver_id: designated }, sequence_order: false };

        let others: Vec<_> = steps.iter().map(|s| s.approver_id).filter(|id| *id != designated).collect();
        for id in others.iter().take(prior) {
            let t = ApprovalStateMachine::apply(
                &policy, ExpenseStatus::Pending, &mut steps, &decision(*id, ApprovalAction::Reject), Utc::now(),
            ).unwrap();
            prop_assert_eq!(t.status, ExpenseStatus::Pending);
        }

        let action = if approve { ApprovalAction::Approve } else { ApprovalAction::Reject };
        let t = ApprovalStateMachine::apply(
            &policy, ExpenseStatus::Pending, &mut steps, &decision(designated, action), Utc::now(),
        ).unwrap();
        let expected = if approve { ExpenseStatus::Approved } else { ExpenseStatus::Rejected };
        prop_assert_eq!(t.status, expected);
        prop_assert!(steps.iter().all(|s| s.status != StepStatus::Pending));
    }

    /// A second action on a resolved step fails and leaves state unchanged.
    #[test]
    fn prop_second_action_is_rejected(n in 2usize..8, p in 1u8..=100, which in any::<prop::sample::Index>()) {
        let policy = ApprovalPolicy { kind: RuleKind::Percentage { required: p }, sequence_order: false };
        let mut steps = chain(n);
        let id = steps[which.index(n)].approver_id;
        let first = ApprovalStateMachine::apply(
            &policy, ExpenseStatus::Pending, &mut steps, &decision(id, ApprovalAction::Approve), Utc::now(),
        ).unwrap();
        let snapshot = steps.clone();

        let again = ApprovalStateMachine::apply(
            &policy, first.status, &mut steps, &decision(id, ApprovalAction::Approve), Utc::now(),
        );
        let is_invalid_action = matches!(again, Err(WorkflowError::InvalidAction { .. }));
        prop_assert!(is_invalid_action);
        prop_assert_eq!(steps, snapshot);
    }

    /// In sequential mode only the lowest pending index can act.
    #[test]
    fn prop_sequential_only_lowest_pending(n in 2usize..8, resolved in 0usize..7, target in any::<prop::sample::Index>()) {
        let policy = ApprovalPolicy { kind: RuleKind::Percentage { required: 100 }, sequence_order: true };
        let mut steps = chain(n);
        let resolved = resolved.min(n - 1);
        for i in 0..resolved {
            let id = steps[i].approver_id;
            ApprovalStateMachine::apply(
                &policy, ExpenseStatus::Pending, &mut steps, &decision(id, ApprovalAction::Approve), Utc::now(),
            ).unwrap();
        }

        let t = target.index(n);
        let id = steps[t].approver_id;
        let result = ApprovalStateMachine::apply(
            &policy, ExpenseStatus::Pending, &mut steps, &decision(id, ApprovalAction::Approve), Utc::now(),
        );
        match t.cmp(&resolved) {
            std::cmp::Ordering::Less => {
                let is_invalid = matches!(result, Err(WorkflowError::InvalidAction { .. }));
                prop_assert!(is_invalid);
            }
            std::cmp::Ordering::Equal => prop_assert!(result.is_ok()),
            std::cmp::Ordering::Greater => {
                let is_out_of_sequence = matches!(result, Err(WorkflowError::OutOfSequence { .. }));
                prop_assert!(is_out_of_sequence);
            }
        }
    }
}
