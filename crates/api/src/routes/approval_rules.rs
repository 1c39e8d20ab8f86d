//! Approval rule management routes. Admin only.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Serialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{AppState, error::workflow_error_response, middleware::AuthContext};
use outlay_core::workflow::{ApprovalRule, RuleInput};
use outlay_db::ApprovalRuleRepository;

/// Creates the approval rules routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/approval-rules",
            get(list_approval_rules).post(create_approval_rule),
        )
        .route(
            "/approval-rules/{rule_id}",
            get(get_approval_rule)
                .put(update_approval_rule)
                .delete(delete_approval_rule),
        )
}

/// Response for an approval rule, in the flat shape clients submit.
#[derive(Debug, Serialize)]
pub struct ApprovalRuleResponse {
    /// Rule ID.
    pub id: Uuid,
    /// Rule fields.
    #[serde(flatten)]
    pub fields: RuleInput,
}

impl From<&ApprovalRule> for ApprovalRuleResponse {
    fn from(rule: &ApprovalRule) -> Self {
        Self {
            id: rule.id,
            fields: RuleInput::from(rule),
        }
    }
}

/// GET `/approval-rules` - List the company's rules, newest first.
async fn list_approval_rules(
    State(state): State<AppState>,
    auth: AuthContext,
) -> impl IntoResponse {
    if let Err(response) = auth.require_admin() {
        return response;
    }
    let repo = ApprovalRuleRepository::new((*state.db).clone());

    match repo.list_rules(auth.0.company_id.into_inner()).await {
        Ok(rules) => {
            let items: Vec<ApprovalRuleResponse> = rules.iter().map(Into::into).collect();
            (StatusCode::OK, Json(json!({ "data": items }))).into_response()
        }
        Err(e) => workflow_error_response(&e),
    }
}

/// POST `/approval-rules` - Create a rule.
async fn create_approval_rule(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(payload): Json<RuleInput>,
) -> impl IntoResponse {
    if let Err(response) = auth.require_admin() {
        return response;
    }
    let repo = ApprovalRuleRepository::new((*state.db).clone());

    match repo.create_rule(auth.0.company_id.into_inner(), payload).await {
        Ok(rule) => {
            info!(rule_id = %rule.id, "Approval rule created via API");
            (StatusCode::CREATED, Json(ApprovalRuleResponse::from(&rule))).into_response()
        }
        Err(e) => workflow_error_response(&e),
    }
}

/// GET `/approval-rules/{rule_id}` - Get one rule.
async fn get_approval_rule(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(rule_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) = auth.require_admin() {
        return response;
    }
    let repo = ApprovalRuleRepository::new((*state.db).clone());

    match repo.get_rule(auth.0.company_id.into_inner(), rule_id).await {
        Ok(rule) => (StatusCode::OK, Json(ApprovalRuleResponse::from(&rule))).into_response(),
        Err(e) => workflow_error_response(&e),
    }
}

/// PUT `/approval-rules/{rule_id}` - Replace a rule's fields.
async fn update_approval_rule(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(rule_id): Path<Uuid>,
    Json(payload): Json<RuleInput>,
) -> impl IntoResponse {
    if let Err(response) = auth.require_admin() {
        return response;
    }
    let repo = ApprovalRuleRepository::new((*state.db).clone());

    match repo
        .update_rule(auth.0.company_id.into_inner(), rule_id, payload)
        .await
    {
        Ok(rule) => (StatusCode::OK, Json(ApprovalRuleResponse::from(&rule))).into_response(),
        Err(e) => workflow_error_response(&e),
    }
}

/// DELETE `/approval-rules/{rule_id}` - Delete a rule.
async fn delete_approval_rule(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(rule_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) = auth.require_admin() {
        return response;
    }
    let repo = ApprovalRuleRepository::new((*state.db).clone());

    match repo
        .delete_rule(auth.0.company_id.into_inner(), rule_id)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => workflow_error_response(&e),
    }
}
