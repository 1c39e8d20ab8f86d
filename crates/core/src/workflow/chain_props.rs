//! Property-based tests for ApprovalChainBuilder.

use std::collections::HashSet;

use outlay_shared::auth::Role;
use proptest::prelude::*;
use uuid::Uuid;

use crate::org::Profile;
use crate::workflow::chain::ApprovalChainBuilder;
use crate::workflow::rule::ApprovalRule;
use crate::workflow::types::RuleKind;

/// Draws approver ids from a small pool so duplicates and manager overlap occur.
fn arb_pool_ids() -> impl Strategy<Value = (Vec<Uuid>, Vec<usize>, Option<usize>)> {
    (
        Just((0..6).map(|_| Uuid::new_v4()).collect::<Vec<_>>()),
        prop::collection::vec(0usize..6, 0..10),
        prop::option::of(0usize..6),
    )
}

fn rule(is_manager_approver: bool, approver_ids: Vec<Uuid>) -> ApprovalRule {
    ApprovalRule {
        id: Uuid::nil(),
        company_id: Uuid::nil(),
        name: "prop".to_string(),
        description: None,
        kind: RuleKind::Percentage { required: 50 },
        is_manager_approver,
        approver_ids,
        sequence_order: false,
    }
}

fn submitter(manager_id: Option<Uuid>) -> Profile {
    Profile {
        id: Uuid::new_v4(),
        company_id: Uuid::nil(),
        full_name: "Submitter".to_string(),
        email: "s@example.com".to_string(),
        role: Role::Employee,
        manager_id,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Indices are dense, 0-based and ascending; approvers are unique.
    #[test]
    fn prop_chain_dense_and_unique(
        (pool, picks, manager) in arb_pool_ids(),
        with_manager in any::<bool>(),
    ) {
        let approvers: Vec<Uuid> = picks.iter().map(|i| pool[*i]).collect();
        let chain = ApprovalChainBuilder::build(
            &rule(with_manager, approvers),
            &submitter(manager.map(|i| pool[i])),
        );

        for (i, slot) in chain.iter().enumerate() {
            prop_assert_eq!(slot.sequence_index, i32::try_from(i).unwrap());
        }
        let unique: HashSet<_> = chain.iter().map(|s| s.approver_id).collect();
        prop_assert_eq!(unique.len(), chain.len());
    }

    /// The manager, when injected, is always at index 0.
    #[test]
    fn prop_manager_first((pool, picks, manager) in arb_pool_ids()) {
        let manager_id = manager.map(|i| pool[i]);
        let approvers: Vec<Uuid> = picks.iter().map(|i| pool[*i]).collect();
        let chain = ApprovalChainBuilder::build(&rule(true, approvers), &submitter(manager_id));

        if let Some(m) = manager_id {
            prop_assert_eq!(chain[0].approver_id, m);
        }
    }

    /// Identical inputs produce identical chains.
    #[test]
    fn prop_chain_deterministic((pool, picks, manager) in arb_pool_ids(), with_manager in any::<bool>()) {
        let approvers: Vec<Uuid> = picks.iter().map(|i| pool[*i]).collect();
        let r = rule(with_manager, approvers);
        let s = submitter(manager.map(|i| pool[i]));
        prop_assert_eq!(ApprovalChainBuilder::build(&r, &s), ApprovalChainBuilder::build(&r, &s));
    }

    /// Every listed approver appears exactly once, in first-occurrence order.
    #[test]
    fn prop_listed_order_preserved((pool, picks, _m) in arb_pool_ids()) {
        let approvers: Vec<Uuid> = picks.iter().map(|i| pool[*i]).collect();
        let chain = ApprovalChainBuilder::build(&rule(false, approvers.clone()), &submitter(None));

        let mut expected = Vec::new();
        for id in approvers {
            if !expected.contains(&id) {
                expected.push(id);
            }
        }
        let actual: Vec<Uuid> = chain.iter().map(|s| s.approver_id).collect();
        prop_assert_eq!(actual, expected);
    }
}
