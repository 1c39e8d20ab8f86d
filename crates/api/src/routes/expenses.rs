//! Expense submission and listing routes.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{
    AppState,
    error::{app_error_response, workflow_error_response},
    middleware::AuthContext,
};
use outlay_core::currency::format_amount;
use outlay_core::expense::{
    ApprovalService, EXPENSE_CATEGORIES, Expense, ExpenseDraft, ExpenseFilter,
    ExpenseSubmissionCoordinator, ExpenseWithSteps, PAYMENT_METHODS,
};
use outlay_core::workflow::{ApprovalStep, ExpenseStatus};
use outlay_db::{ExpenseRepository, SeaOrmWorkflowStore};
use outlay_shared::AppError;
use outlay_shared::types::{ExpenseId, PageRequest, PageResponse};

/// Creates the expense routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", get(list_company_expenses).post(submit_expense))
        .route("/expenses/mine", get(list_my_expenses))
        .route("/expenses/options", get(expense_options))
        .route("/expenses/{expense_id}", get(get_expense))
}

/// Query parameters for the company listing.
#[derive(Debug, Deserialize)]
pub struct ListExpensesQuery {
    /// Status filter.
    pub status: Option<String>,
    /// Category filter.
    pub category: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
}

/// An expense with display amounts and its step history.
#[derive(Debug, Serialize)]
pub struct ExpenseResponse {
    /// The expense.
    #[serde(flatten)]
    pub expense: Expense,
    /// Submitter's display name.
    pub submitter_name: String,
    /// Submitted amount formatted with its currency symbol.
    pub amount_display: String,
    /// Base-currency amount formatted with its currency symbol.
    pub amount_base_display: String,
    /// Steps ordered by sequence index.
    pub steps: Vec<ApprovalStep>,
}

impl From<ExpenseWithSteps> for ExpenseResponse {
    fn from(record: ExpenseWithSteps) -> Self {
        let amount_display = format_amount(record.expense.amount, record.expense.currency.as_str());
        let amount_base_display = format_amount(
            record.expense.amount_base,
            record.expense.base_currency.as_str(),
        );
        Self {
            expense: record.expense,
            submitter_name: record.submitter_name,
            amount_display,
            amount_base_display,
            steps: record.steps,
        }
    }
}

/// POST `/expenses` - Submit an expense against an approval rule.
async fn submit_expense(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(draft): Json<ExpenseDraft>,
) -> impl IntoResponse {
    let store = Arc::new(SeaOrmWorkflowStore::new((*state.db).clone()));
    let coordinator = ExpenseSubmissionCoordinator::new(store, Arc::clone(&state.rates));

    match coordinator.submit(&auth.0, draft).await {
        Ok(record) => {
            info!(expense_id = %record.expense.id, status = %record.expense.status, "Expense submitted via API");
            (StatusCode::CREATED, Json(ExpenseResponse::from(record))).into_response()
        }
        Err(e) => workflow_error_response(&e),
    }
}

/// GET `/expenses/mine` - The caller's expenses, newest first.
async fn list_my_expenses(State(state): State<AppState>, auth: AuthContext) -> impl IntoResponse {
    let repo = ExpenseRepository::new((*state.db).clone());

    match repo
        .list_my_expenses(
            auth.0.company_id.into_inner(),
            auth.0.profile_id.into_inner(),
        )
        .await
    {
        Ok(records) => {
            let items: Vec<ExpenseResponse> = records.into_iter().map(Into::into).collect();
            (StatusCode::OK, Json(json!({ "data": items }))).into_response()
        }
        Err(e) => workflow_error_response(&e),
    }
}

/// GET `/expenses` - Company expenses for admins and managers.
async fn list_company_expenses(
    State(state): State<AppState>,
    auth: AuthContext,
    Query(query): Query<ListExpensesQuery>,
) -> impl IntoResponse {
    if let Err(response) = auth.require_reviewer() {
        return response;
    }

    let status = match query.status.as_deref().map(ExpenseStatus::parse) {
        None => None,
        Some(Some(status)) => Some(status),
        Some(None) => {
            return app_error_response(&AppError::Validation(format!(
                "unknown status '{}'",
                query.status.as_deref().unwrap_or_default()
            )));
        }
    };
    let filter = ExpenseFilter {
        status,
        category: query.category.filter(|c| !c.trim().is_empty()),
    };
    let page = PageRequest {
        page: query.page.unwrap_or(1).max(1),
        per_page: query.per_page.unwrap_or(20),
    };

    let repo = ExpenseRepository::new((*state.db).clone());
    match repo
        .list_company_expenses(auth.0.company_id.into_inner(), &filter, &page)
        .await
    {
        Ok((records, total)) => {
            let items: Vec<ExpenseResponse> = records.into_iter().map(Into::into).collect();
            (StatusCode::OK, Json(PageResponse::new(items, &page, total))).into_response()
        }
        Err(e) => workflow_error_response(&e),
    }
}

/// GET `/expenses/{expense_id}` - One expense with its step history.
async fn get_expense(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(expense_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = ApprovalService::new(Arc::new(SeaOrmWorkflowStore::new((*state.db).clone())));

    match service
        .expense_detail(&auth.0, ExpenseId::from_uuid(expense_id))
        .await
    {
        Ok(record) => (StatusCode::OK, Json(ExpenseResponse::from(record))).into_response(),
        Err(e) => workflow_error_response(&e),
    }
}

/// GET `/expenses/options` - Categories and payment methods for the form.
async fn expense_options(_auth: AuthContext) -> impl IntoResponse {
    Json(json!({
        "categories": EXPENSE_CATEGORIES,
        "payment_methods": PAYMENT_METHODS,
    }))
}
