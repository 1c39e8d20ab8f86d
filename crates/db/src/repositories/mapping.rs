//! Conversions between `SeaORM` models and core domain types.

use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{DbErr, Set};

use outlay_core::currency::CurrencyCode;
use outlay_core::expense::Expense;
use outlay_core::org::{Company, Profile};
use outlay_core::workflow::{ApprovalPolicy, ApprovalRule, ApprovalStep, RuleInput, WorkflowError};

use crate::entities::{approval_rules, approval_steps, companies, expenses, profiles};

/// Wraps a database error as an opaque storage failure.
#[allow(clippy::needless_pass_by_value)]
pub(crate) fn db_err(e: DbErr) -> WorkflowError {
    WorkflowError::Storage(e.to_string())
}

fn utc(ts: DateTime<FixedOffset>) -> DateTime<Utc> {
    ts.with_timezone(&Utc)
}

fn currency(column: &str, raw: &str) -> Result<CurrencyCode, WorkflowError> {
    CurrencyCode::parse(raw)
        .map_err(|e| WorkflowError::Storage(format!("corrupt {column} '{raw}': {e}")))
}

pub(crate) fn company(model: companies::Model) -> Result<Company, WorkflowError> {
    Ok(Company {
        id: model.id,
        base_currency: currency("base_currency", &model.base_currency)?,
        name: model.name,
        country: model.country,
    })
}

pub(crate) fn profile(model: profiles::Model) -> Profile {
    Profile {
        id: model.id,
        company_id: model.company_id,
        full_name: model.full_name,
        email: model.email,
        role: model.role.into(),
        manager_id: model.manager_id,
    }
}

/// Re-validates a stored rule on the way out.
pub(crate) fn rule(model: approval_rules::Model) -> Result<ApprovalRule, WorkflowError> {
    let id = model.id;
    RuleInput {
        name: model.name,
        description: model.description,
        rule_type: model.rule_type.into(),
        is_manager_approver: model.is_manager_approver,
        approver_ids: model.approver_ids,
        sequence_order: model.sequence_order,
        percentage_required: model.percentage_required,
        specific_approver: model.specific_approver,
    }
    .into_rule(id, model.company_id)
    .map_err(|e| WorkflowError::Storage(format!("stored rule {id} is invalid: {e}")))
}

pub(crate) fn rule_columns(rule: &ApprovalRule, active: &mut approval_rules::ActiveModel) {
    active.name = Set(rule.name.clone());
    active.description = Set(rule.description.clone());
    active.rule_type = Set(rule.kind.rule_type().into());
    active.is_manager_approver = Set(rule.is_manager_approver);
    active.approver_ids = Set(rule.approver_ids.clone());
    active.sequence_order = Set(rule.sequence_order);
    active.percentage_required = Set(rule.kind.percentage_required().map(i32::from));
    active.specific_approver = Set(rule.kind.specific_approver());
}

pub(crate) fn expense(model: expenses::Model) -> Result<Expense, WorkflowError> {
    let approval_policy: ApprovalPolicy = serde_json::from_value(model.approval_policy)
        .map_err(|e| WorkflowError::Storage(format!("corrupt approval policy on {}: {e}", model.id)))?;
    Ok(Expense {
        id: model.id,
        company_id: model.company_id,
        created_by: model.created_by,
        description: model.description,
        category: model.category,
        date_of_expense: model.date_of_expense,
        paid_by: model.paid_by,
        amount: model.amount,
        currency: currency("currency", &model.currency)?,
        amount_base: model.amount_base,
        base_currency: currency("base_currency", &model.base_currency)?,
        status: model.status.into(),
        approval_rule_id: model.approval_rule_id,
        approval_policy,
        receipt_path: model.receipt_path,
        created_at: utc(model.created_at),
        updated_at: utc(model.updated_at),
    })
}

pub(crate) fn expense_active(expense: &Expense) -> Result<expenses::ActiveModel, WorkflowError> {
    let policy = serde_json::to_value(expense.approval_policy)
        .map_err(|e| WorkflowError::Storage(e.to_string()))?;
    Ok(expenses::ActiveModel {
        id: Set(expense.id),
        company_id: Set(expense.company_id),
        created_by: Set(expense.created_by),
        description: Set(expense.description.clone()),
        category: Set(expense.category.clone()),
        date_of_expense: Set(expense.date_of_expense),
        paid_by: Set(expense.paid_by.clone()),
        amount: Set(expense.amount),
        currency: Set(expense.currency.to_string()),
        amount_base: Set(expense.amount_base),
        base_currency: Set(expense.base_currency.to_string()),
        status: Set(expense.status.into()),
        approval_rule_id: Set(expense.approval_rule_id),
        approval_policy: Set(policy),
        receipt_path: Set(expense.receipt_path.clone()),
        created_at: Set(expense.created_at.into()),
        updated_at: Set(expense.updated_at.into()),
    })
}

pub(crate) fn step(model: approval_steps::Model) -> ApprovalStep {
    ApprovalStep {
        id: model.id,
        expense_id: model.expense_id,
        approver_id: model.approver_id,
        sequence_index: model.sequence_index,
        status: model.status.into(),
        comment: model.comment,
        acted_at: model.acted_at.map(utc),
    }
}

pub(crate) fn step_active(
    step: &ApprovalStep,
    created_at: DateTime<Utc>,
) -> approval_steps::ActiveModel {
    approval_steps::ActiveModel {
        id: Set(step.id),
        expense_id: Set(step.expense_id),
        approver_id: Set(step.approver_id),
        sequence_index: Set(step.sequence_index),
        status: Set(step.status.into()),
        comment: Set(step.comment.clone()),
        acted_at: Set(step.acted_at.map(Into::into)),
        created_at: Set(created_at.into()),
    }
}
