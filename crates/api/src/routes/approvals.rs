//! Approver routes: the pending queue and approve/reject actions.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::expenses::ExpenseResponse;
use crate::{AppState, error::workflow_error_response, middleware::AuthContext};
use outlay_core::currency::format_amount;
use outlay_core::expense::{ApprovalService, PendingApproval};
use outlay_core::workflow::{ApprovalAction, ApprovalStep};
use outlay_db::SeaOrmWorkflowStore;
use outlay_shared::types::ExpenseId;

/// Creates the approval routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/approvals/pending", get(list_pending))
        .route("/expenses/{expense_id}/approval", post(act_on_expense))
}

/// Request body for an approver action.
#[derive(Debug, Deserialize)]
pub struct ApprovalRequest {
    /// `approve`/`approved` or `reject`/`rejected`.
    pub action: ApprovalAction,
    /// Required when rejecting.
    #[serde(default)]
    pub comment: Option<String>,
}

/// Response for an approver action.
#[derive(Debug, Serialize)]
pub struct ApprovalResponse {
    /// The expense after the action.
    pub expense: ExpenseResponse,
    /// Steps the action changed, acted step first.
    pub changed_steps: Vec<Uuid>,
}

/// One entry of the approver's queue.
#[derive(Debug, Serialize)]
pub struct PendingApprovalResponse {
    /// The caller's pending step.
    pub step: ApprovalStep,
    /// Expense ID.
    pub expense_id: Uuid,
    /// What was bought.
    pub description: String,
    /// Expense category.
    pub category: String,
    /// Submitter's display name.
    pub submitter_name: String,
    /// Submitted amount with its currency symbol.
    pub amount_display: String,
    /// Base-currency amount with its currency symbol.
    pub amount_base_display: String,
    /// False while an earlier step of a sequential chain is still open.
    pub actionable: bool,
}

impl From<PendingApproval> for PendingApprovalResponse {
    fn from(entry: PendingApproval) -> Self {
        Self {
            amount_display: format_amount(entry.expense.amount, entry.expense.currency.as_str()),
            amount_base_display: format_amount(
                entry.expense.amount_base,
                entry.expense.base_currency.as_str(),
            ),
            expense_id: entry.expense.id,
            description: entry.expense.description,
            category: entry.expense.category,
            submitter_name: entry.submitter_name,
            step: entry.step,
            actionable: entry.actionable,
        }
    }
}

fn service(state: &AppState) -> ApprovalService<SeaOrmWorkflowStore> {
    ApprovalService::new(Arc::new(SeaOrmWorkflowStore::new((*state.db).clone())))
}

/// GET `/approvals/pending` - Steps waiting on the caller, oldest first.
async fn list_pending(State(state): State<AppState>, auth: AuthContext) -> impl IntoResponse {
    match service(&state).list_pending_for(&auth.0).await {
        Ok(queue) => {
            let items: Vec<PendingApprovalResponse> = queue.into_iter().map(Into::into).collect();
            (StatusCode::OK, Json(json!({ "data": items }))).into_response()
        }
        Err(e) => workflow_error_response(&e),
    }
}

/// POST `/expenses/{expense_id}/approval` - Approve or reject.
async fn act_on_expense(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(expense_id): Path<Uuid>,
    Json(payload): Json<ApprovalRequest>,
) -> impl IntoResponse {
    match service(&state)
        .act(
            &auth.0,
            ExpenseId::from_uuid(expense_id),
            payload.action,
            payload.comment,
        )
        .await
    {
        Ok(result) => (
            StatusCode::OK,
            Json(ApprovalResponse {
                expense: result.record.into(),
                changed_steps: result.changed_steps,
            }),
        )
            .into_response(),
        Err(e) => workflow_error_response(&e),
    }
}
