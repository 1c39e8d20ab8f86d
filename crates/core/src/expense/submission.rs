//! Expense submission.

use std::sync::Arc;

use chrono::Utc;
use outlay_shared::auth::RequestContext;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::currency::CurrencyNormalizer;
use crate::expense::store::WorkflowStore;
use crate::expense::types::{Expense, ExpenseDraft, ExpenseWithSteps};
use crate::workflow::chain::ApprovalChainBuilder;
use crate::workflow::error::WorkflowError;
use crate::workflow::types::{ApprovalStep, ExpenseStatus};

/// Orchestrates normalization, chain construction and the atomic write of
/// an expense with its steps.
pub struct ExpenseSubmissionCoordinator<S, N> {
    store: Arc<S>,
    normalizer: Arc<N>,
}

impl<S: WorkflowStore, N: CurrencyNormalizer> ExpenseSubmissionCoordinator<S, N> {
    /// Creates a coordinator.
    pub fn new(store: Arc<S>, normalizer: Arc<N>) -> Self {
        Self { store, normalizer }
    }

    /// Submits an expense on behalf of the caller.
    ///
    /// Fails without writing anything when the draft is malformed, the rule
    /// is missing or belongs to another company, or the amount cannot be
    /// normalized. A chain that resolves to zero steps yields an expense
    /// that is approved immediately.
    #[instrument(skip_all, fields(company_id = %ctx.company_id, submitter = %ctx.profile_id))]
    pub async fn submit(
        &self,
        ctx: &RequestContext,
        draft: ExpenseDraft,
    ) -> Result<ExpenseWithSteps, WorkflowError> {
        let currency = draft.validate()?;
        let company_id = ctx.company_id.into_inner();
        let submitter_id = ctx.profile_id.into_inner();

        let company = self
            .store
            .find_company(company_id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("company", company_id))?;

        let submitter = self
            .store
            .find_profile(submitter_id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("profile", submitter_id))?;
        submitter.ensure_company(company.id)?;

        let rule = self
            .store
            .find_rule(draft.approval_rule_id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("approval rule", draft.approval_rule_id))?;
        if rule.company_id != company.id {
            return Err(WorkflowError::scope("approval rule", rule.id));
        }

        let amount_base = self
            .normalizer
            .convert(draft.amount, &currency, &company.base_currency)
            .await
            .map_err(WorkflowError::from)?;

        let expense_id = Uuid::now_v7();
        let steps: Vec<ApprovalStep> = ApprovalChainBuilder::build(&rule, &submitter)
            .into_iter()
            .map(|slot| ApprovalStep::pending(expense_id, slot))
            .collect();
        let status = if steps.is_empty() {
            ExpenseStatus::Approved
        } else {
            ExpenseStatus::Pending
        };

        let now = Utc::now();
        let expense = Expense {
            id: expense_id,
            company_id: company.id,
            created_by: submitter.id,
            description: draft.description.trim().to_string(),
            category: draft.category.trim().to_string(),
            date_of_expense: draft.date_of_expense,
            paid_by: draft.paid_by,
            amount: draft.amount,
            currency,
            amount_base,
            base_currency: company.base_currency,
            status,
            approval_rule_id: Some(rule.id),
            approval_policy: rule.policy(),
            receipt_path: draft.receipt_path,
            created_at: now,
            updated_at: now,
        };

        self.store.insert_submission(&expense, &steps).await?;

        info!(
            expense_id = %expense.id,
            rule_id = %rule.id,
            steps = steps.len(),
            status = %expense.status,
            amount_base = %expense.amount_base,
            "Expense submitted"
        );

        Ok(ExpenseWithSteps {
            expense,
            submitter_name: submitter.full_name,
            steps,
        })
    }
}
