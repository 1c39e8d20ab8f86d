//! Approval rules: the company policy an expense is submitted against.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::workflow::error::WorkflowError;
use crate::workflow::types::{ApprovalPolicy, RuleKind, RuleType};

/// A validated approval rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRule {
    /// Rule ID.
    pub id: Uuid,
    /// Owning company.
    pub company_id: Uuid,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Combination logic.
    pub kind: RuleKind,
    /// Whether the submitter's manager is injected as the first step.
    pub is_manager_approver: bool,
    /// Approvers in chain order, without duplicates.
    pub approver_ids: Vec<Uuid>,
    /// Whether steps must be resolved in ascending order.
    pub sequence_order: bool,
}

impl ApprovalRule {
    /// The snapshot stored on every expense submitted against this rule.
    #[must_use]
    pub const fn policy(&self) -> ApprovalPolicy {
        ApprovalPolicy {
            kind: self.kind,
            sequence_order: self.sequence_order,
        }
    }

    /// Every profile the rule references.
    pub fn referenced_profiles(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.approver_ids
            .iter()
            .copied()
            .chain(self.kind.specific_approver())
    }
}

/// Unvalidated rule fields as received from a client or the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleInput {
    /// Display name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Flat rule type.
    pub rule_type: RuleType,
    /// Inject the submitter's manager as step 0.
    #[serde(default)]
    pub is_manager_approver: bool,
    /// Ordered approvers.
    #[serde(default)]
    pub approver_ids: Vec<Uuid>,
    /// Sequential mode.
    #[serde(default)]
    pub sequence_order: bool,
    /// Threshold for percentage and hybrid rules.
    #[serde(default)]
    pub percentage_required: Option<i32>,
    /// Designated approver for specific and hybrid rules.
    #[serde(default)]
    pub specific_approver: Option<Uuid>,
}

impl RuleInput {
    /// Validates the fields and folds them into a closed [`RuleKind`].
    pub fn validate(&self) -> Result<RuleKind, WorkflowError> {
        if self.name.trim().is_empty() {
            return Err(WorkflowError::Validation("rule name is required".into()));
        }

        let mut seen = HashSet::with_capacity(self.approver_ids.len());
        if let Some(dup) = self.approver_ids.iter().find(|id| !seen.insert(**id)) {
            return Err(WorkflowError::Validation(format!(
                "approver {dup} is listed more than once"
            )));
        }

        if !self.is_manager_approver && self.approver_ids.is_empty() {
            return Err(WorkflowError::Validation(
                "rule needs the manager step or at least one approver".into(),
            ));
        }

        if let Some(specific) = self.specific_approver
            && !self.approver_ids.contains(&specific)
        {
            return Err(WorkflowError::Validation(format!(
                "specific approver {specific} must be one of the rule's approvers"
            )));
        }

        let kind = match self.rule_type {
            RuleType::Percentage => RuleKind::Percentage {
                required: self.required_percentage()?,
            },
            RuleType::Specific => RuleKind::Specific {
                approver_id: self.specific_approver.ok_or_else(|| {
                    WorkflowError::Validation("specific rules need a specific approver".into())
                })?,
            },
            RuleType::Hybrid => RuleKind::Hybrid {
                approver_id: self.specific_approver,
                required: self.required_percentage()?,
            },
        };
        Ok(kind)
    }

    /// Validates and builds a rule for the given company.
    pub fn into_rule(self, id: Uuid, company_id: Uuid) -> Result<ApprovalRule, WorkflowError> {
        let kind = self.validate()?;
        Ok(ApprovalRule {
            id,
            company_id,
            name: self.name.trim().to_string(),
            description: self.description.filter(|d| !d.trim().is_empty()),
            kind,
            is_manager_approver: self.is_manager_approver,
            approver_ids: self.approver_ids,
            sequence_order: self.sequence_order,
        })
    }

    fn required_percentage(&self) -> Result<u8, WorkflowError> {
        let value = self.percentage_required.ok_or_else(|| {
            WorkflowError::Validation(format!(
                "percentage_required is required for {} rules",
                self.rule_type.as_str()
            ))
        })?;
        u8::try_from(value)
            .ok()
            .filter(|p| (1..=100).contains(p))
            .ok_or_else(|| {
                WorkflowError::Validation(format!(
                    "percentage_required must be between 1 and 100, got {value}"
                ))
            })
    }
}

impl From<&ApprovalRule> for RuleInput {
    fn from(rule: &ApprovalRule) -> Self {
        Self {
            name: rule.name.clone(),
            description: rule.description.clone(),
            rule_type: rule.kind.rule_type(),
            is_manager_approver: rule.is_manager_approver,
            approver_ids: rule.approver_ids.clone(),
            sequence_order: rule.sequence_order,
            percentage_required: rule.kind.percentage_required().map(i32::from),
            specific_approver: rule.kind.specific_approver(),
        }
    }
}
