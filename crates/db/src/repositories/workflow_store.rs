//! Postgres implementation of the workflow store.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use tracing::{debug, instrument};
use uuid::Uuid;

use outlay_core::expense::{ActionResult, Expense, ExpenseWithSteps, WorkflowStore};
use outlay_core::org::{Company, Profile};
use outlay_core::workflow::{ApprovalRule, ApprovalStep, Transition, WorkflowError};

use super::expense::with_steps;
use super::mapping::{self, db_err};
use crate::entities::{
    approval_rules, approval_steps, companies, expenses, profiles,
    sea_orm_active_enums::{ApprovalStepStatus, ExpenseStatus},
};

/// [`WorkflowStore`] backed by `SeaORM`.
///
/// Decisions lock the expense row (`SELECT ... FOR UPDATE`) inside a
/// database transaction, so concurrent actions on one expense queue up
/// behind each other while actions on different expenses run in parallel.
#[derive(Debug, Clone)]
pub struct SeaOrmWorkflowStore {
    db: DatabaseConnection,
}

impl SeaOrmWorkflowStore {
    /// Creates a new store.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl WorkflowStore for SeaOrmWorkflowStore {
    async fn find_company(&self, id: Uuid) -> Result<Option<Company>, WorkflowError> {
        companies::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(mapping::company)
            .transpose()
    }

    async fn find_profile(&self, id: Uuid) -> Result<Option<Profile>, WorkflowError> {
        Ok(profiles::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(mapping::profile))
    }

    async fn find_rule(&self, id: Uuid) -> Result<Option<ApprovalRule>, WorkflowError> {
        approval_rules::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(mapping::rule)
            .transpose()
    }

    #[instrument(skip_all, fields(expense_id = %expense.id, steps = steps.len()))]
    async fn insert_submission(
        &self,
        expense: &Expense,
        steps: &[ApprovalStep],
    ) -> Result<(), WorkflowError> {
        let active = mapping::expense_active(expense)?;
        let txn = self.db.begin().await.map_err(db_err)?;

        active.insert(&txn).await.map_err(db_err)?;
        if !steps.is_empty() {
            approval_steps::Entity::insert_many(
                steps.iter().map(|s| mapping::step_active(s, expense.created_at)),
            )
            .exec(&txn)
            .await
            .map_err(db_err)?;
        }

        txn.commit().await.map_err(db_err)?;
        Ok(())
    }

    #[instrument(skip_all, fields(expense_id = %expense_id))]
    async fn apply_decision<F>(
        &self,
        expense_id: Uuid,
        decide: F,
    ) -> Result<ActionResult, WorkflowError>
    where
        F: FnOnce(&Expense, &mut [ApprovalStep]) -> Result<Transition, WorkflowError> + Send,
    {
        let txn = self.db.begin().await.map_err(db_err)?;

        let row = expenses::Entity::find_by_id(expense_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| WorkflowError::not_found("expense", expense_id))?;
        debug!("Expense row locked");

        let step_rows = approval_steps::Entity::find()
            .filter(approval_steps::Column::ExpenseId.eq(expense_id))
            .order_by_asc(approval_steps::Column::SequenceIndex)
            .all(&txn)
            .await
            .map_err(db_err)?;

        let mut expense = mapping::expense(row.clone())?;
        let mut steps: Vec<ApprovalStep> = step_rows.iter().cloned().map(mapping::step).collect();

        let transition = match decide(&expense, &mut steps) {
            Ok(transition) => transition,
            Err(e) => {
                txn.rollback().await.map_err(db_err)?;
                return Err(e);
            }
        };

        for changed in &transition.changed_steps {
            let (Some(row), Some(step)) = (
                step_rows.iter().find(|r| r.id == *changed),
                steps.iter().find(|s| s.id == *changed),
            ) else {
                continue;
            };
            let mut active: approval_steps::ActiveModel = row.clone().into();
            active.status = Set(ApprovalStepStatus::from(step.status));
            active.comment = Set(step.comment.clone());
            active.acted_at = Set(step.acted_at.map(Into::into));
            active.update(&txn).await.map_err(db_err)?;
        }

        if transition.status != expense.status {
            let now = Utc::now();
            let mut active: expenses::ActiveModel = row.into();
            active.status = Set(ExpenseStatus::from(transition.status));
            active.updated_at = Set(now.into());
            active.update(&txn).await.map_err(db_err)?;
            expense.status = transition.status;
            expense.updated_at = now;
        }

        txn.commit().await.map_err(db_err)?;

        let submitter_name = profiles::Entity::find_by_id(expense.created_by)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(|p| p.full_name)
            .unwrap_or_default();

        Ok(ActionResult {
            record: ExpenseWithSteps {
                expense,
                submitter_name,
                steps,
            },
            changed_steps: transition.changed_steps,
        })
    }

    async fn find_expense(&self, id: Uuid) -> Result<Option<ExpenseWithSteps>, WorkflowError> {
        let Some(model) = expenses::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };
        Ok(with_steps(&self.db, vec![model]).await?.pop())
    }

    async fn expenses_awaiting(
        &self,
        approver_id: Uuid,
    ) -> Result<Vec<ExpenseWithSteps>, WorkflowError> {
        let expense_ids: Vec<Uuid> = approval_steps::Entity::find()
            .filter(approval_steps::Column::ApproverId.eq(approver_id))
            .filter(approval_steps::Column::Status.eq(ApprovalStepStatus::Pending))
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(|s| s.expense_id)
            .collect();
        if expense_ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = expenses::Entity::find()
            .filter(expenses::Column::Id.is_in(expense_ids))
            .filter(expenses::Column::Status.eq(ExpenseStatus::Pending))
            .order_by_asc(expenses::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        with_steps(&self.db, models).await
    }
}
