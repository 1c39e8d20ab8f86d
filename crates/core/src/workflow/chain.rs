//! Approval chain construction.
//!
//! Turns a rule and the submitter's position in the manager forest into the
//! ordered list of decision slots an expense is created with.

use uuid::Uuid;

use crate::org::Profile;
use crate::workflow::rule::ApprovalRule;
use crate::workflow::types::ChainSlot;

/// Stateless builder for approval chains.
pub struct ApprovalChainBuilder;

impl ApprovalChainBuilder {
    /// Builds the ordered chain for a submission.
    ///
    /// The submitter's manager (when the rule asks for one and the submitter
    /// has one) always occupies index 0. Listed approvers follow in rule
    /// order; an approver already present keeps its first slot. Indices are
    /// dense and 0-based.
    ///
    /// An empty result means the expense needs no approvals.
    #[must_use]
    pub fn build(rule: &ApprovalRule, submitter: &Profile) -> Vec<ChainSlot> {
        let manager = rule
            .is_manager_approver
            .then_some(submitter.manager_id)
            .flatten();

        let mut approvers: Vec<Uuid> = Vec::with_capacity(rule.approver_ids.len() + 1);
        for id in manager.into_iter().chain(rule.approver_ids.iter().copied()) {
            if !approvers.contains(&id) {
                approvers.push(id);
            }
        }

        approvers
            .into_iter()
            .zip(0..)
            .map(|(approver_id, sequence_index)| ChainSlot {
                approver_id,
                sequence_index,
            })
            .collect()
    }
}
