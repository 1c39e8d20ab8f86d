//! Expense listing queries.

use std::collections::{HashMap, HashSet};

use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use uuid::Uuid;

use outlay_core::expense::{ExpenseFilter, ExpenseWithSteps};
use outlay_core::workflow::{ApprovalStep, WorkflowError};
use outlay_shared::types::PageRequest;

use super::mapping::{self, db_err};
use crate::entities::{approval_steps, expenses, profiles, sea_orm_active_enums::ExpenseStatus};

/// Read-side expense queries.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    db: DatabaseConnection,
}

impl ExpenseRepository {
    /// Creates a new expense repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Expenses submitted by one profile, newest first.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if a query fails.
    pub async fn list_my_expenses(
        &self,
        company_id: Uuid,
        profile_id: Uuid,
    ) -> Result<Vec<ExpenseWithSteps>, WorkflowError> {
        let models = expenses::Entity::find()
            .filter(expenses::Column::CompanyId.eq(company_id))
            .filter(expenses::Column::CreatedBy.eq(profile_id))
            .order_by_desc(expenses::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        with_steps(&self.db, models).await
    }

    /// One page of a company's expenses matching `filter`, newest first,
    /// with the total match count.
    ///
    /// Steps and submitter names are loaded for the returned page only.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if a query fails.
    pub async fn list_company_expenses(
        &self,
        company_id: Uuid,
        filter: &ExpenseFilter,
        page: &PageRequest,
    ) -> Result<(Vec<ExpenseWithSteps>, u64), WorkflowError> {
        let mut query = expenses::Entity::find().filter(expenses::Column::CompanyId.eq(company_id));
        if let Some(status) = filter.status {
            query = query.filter(expenses::Column::Status.eq(ExpenseStatus::from(status)));
        }
        if let Some(category) = filter.category.as_deref() {
            query = query.filter(expenses::Column::Category.eq(category));
        }

        let total = query.clone().count(&self.db).await.map_err(db_err)?;

        let models = query
            .order_by_desc(expenses::Column::CreatedAt)
            .order_by_desc(expenses::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok((with_steps(&self.db, models).await?, total))
    }
}

/// Loads the ordered steps and submitter names for a batch of expenses.
pub(crate) async fn with_steps(
    db: &DatabaseConnection,
    models: Vec<expenses::Model>,
) -> Result<Vec<ExpenseWithSteps>, WorkflowError> {
    if models.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
    let submitters: HashSet<Uuid> = models.iter().map(|m| m.created_by).collect();

    let step_models = approval_steps::Entity::find()
        .filter(approval_steps::Column::ExpenseId.is_in(ids))
        .order_by_asc(approval_steps::Column::SequenceIndex)
        .all(db)
        .await
        .map_err(db_err)?;

    let names: HashMap<Uuid, String> = profiles::Entity::find()
        .filter(profiles::Column::Id.is_in(submitters))
        .all(db)
        .await
        .map_err(db_err)?
        .into_iter()
        .map(|p| (p.id, p.full_name))
        .collect();

    let mut steps: HashMap<Uuid, Vec<ApprovalStep>> = HashMap::new();
    for model in step_models {
        steps.entry(model.expense_id).or_default().push(mapping::step(model));
    }

    models
        .into_iter()
        .map(|model| {
            let submitter_name = names.get(&model.created_by).cloned().unwrap_or_default();
            let steps = steps.remove(&model.id).unwrap_or_default();
            Ok(ExpenseWithSteps {
                expense: mapping::expense(model)?,
                submitter_name,
                steps,
            })
        })
        .collect()
}
