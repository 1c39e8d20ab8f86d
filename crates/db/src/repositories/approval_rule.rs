//! Approval rule repository.

use std::collections::HashSet;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::info;
use uuid::Uuid;

use outlay_core::workflow::{ApprovalRule, RuleInput, WorkflowError};

use super::mapping::{self, db_err};
use crate::entities::{approval_rules, profiles};

/// Approval rule repository.
///
/// Every method is scoped by company; a rule from another company is
/// reported as a scope violation.
#[derive(Debug, Clone)]
pub struct ApprovalRuleRepository {
    db: DatabaseConnection,
}

impl ApprovalRuleRepository {
    /// Creates a new approval rule repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Validates and stores a new rule.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for malformed input, `NotFound` or
    /// `ScopeViolation` when a referenced approver is unknown or foreign.
    pub async fn create_rule(
        &self,
        company_id: Uuid,
        input: RuleInput,
    ) -> Result<ApprovalRule, WorkflowError> {
        let rule = input.into_rule(Uuid::now_v7(), company_id)?;
        self.check_references(&rule).await?;

        let now = Utc::now().into();
        let mut active = approval_rules::ActiveModel {
            id: Set(rule.id),
            company_id: Set(company_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        mapping::rule_columns(&rule, &mut active);
        active.insert(&self.db).await.map_err(db_err)?;

        info!(
            company_id = %company_id,
            rule_id = %rule.id,
            rule_type = rule.kind.rule_type().as_str(),
            approvers = rule.approver_ids.len(),
            "Approval rule created"
        );
        Ok(rule)
    }

    /// Lists a company's rules, newest first.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the query fails.
    pub async fn list_rules(&self, company_id: Uuid) -> Result<Vec<ApprovalRule>, WorkflowError> {
        approval_rules::Entity::find()
            .filter(approval_rules::Column::CompanyId.eq(company_id))
            .order_by_desc(approval_rules::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(mapping::rule)
            .collect()
    }

    /// Gets one rule.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `ScopeViolation`.
    pub async fn get_rule(
        &self,
        company_id: Uuid,
        rule_id: Uuid,
    ) -> Result<ApprovalRule, WorkflowError> {
        mapping::rule(self.company_rule(company_id, rule_id).await?)
    }

    /// Replaces a rule's fields.
    ///
    /// Expenses already submitted keep the policy they were submitted with.
    ///
    /// # Errors
    ///
    /// Same as [`Self::create_rule`], plus `NotFound`/`ScopeViolation` for
    /// the rule itself.
    pub async fn update_rule(
        &self,
        company_id: Uuid,
        rule_id: Uuid,
        input: RuleInput,
    ) -> Result<ApprovalRule, WorkflowError> {
        let existing = self.company_rule(company_id, rule_id).await?;
        let rule = input.into_rule(rule_id, company_id)?;
        self.check_references(&rule).await?;

        let mut active: approval_rules::ActiveModel = existing.into();
        mapping::rule_columns(&rule, &mut active);
        active.updated_at = Set(Utc::now().into());
        active.update(&self.db).await.map_err(db_err)?;

        info!(company_id = %company_id, rule_id = %rule_id, "Approval rule updated");
        Ok(rule)
    }

    /// Deletes a rule. Expenses referencing it keep their policy snapshot
    /// and lose only the link.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `ScopeViolation`.
    pub async fn delete_rule(&self, company_id: Uuid, rule_id: Uuid) -> Result<(), WorkflowError> {
        let existing = self.company_rule(company_id, rule_id).await?;
        existing.delete(&self.db).await.map_err(db_err)?;
        info!(company_id = %company_id, rule_id = %rule_id, "Approval rule deleted");
        Ok(())
    }

    async fn company_rule(
        &self,
        company_id: Uuid,
        rule_id: Uuid,
    ) -> Result<approval_rules::Model, WorkflowError> {
        let model = approval_rules::Entity::find_by_id(rule_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| WorkflowError::not_found("approval rule", rule_id))?;
        if model.company_id != company_id {
            return Err(WorkflowError::scope("approval rule", rule_id));
        }
        Ok(model)
    }

    /// Every referenced approver must exist in the rule's company.
    async fn check_references(&self, rule: &ApprovalRule) -> Result<(), WorkflowError> {
        let wanted: HashSet<Uuid> = rule.referenced_profiles().collect();
        if wanted.is_empty() {
            return Ok(());
        }

        let found = profiles::Entity::find()
            .filter(profiles::Column::Id.is_in(wanted.iter().copied()))
            .all(&self.db)
            .await
            .map_err(db_err)?;

        if let Some(foreign) = found.iter().find(|p| p.company_id != rule.company_id) {
            return Err(WorkflowError::scope("profile", foreign.id));
        }
        if let Some(missing) = wanted.iter().find(|id| !found.iter().any(|p| p.id == **id)) {
            return Err(WorkflowError::not_found("profile", *missing));
        }
        Ok(())
    }
}
