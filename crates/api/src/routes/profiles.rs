//! Company member routes: profiles, approver candidates and reporting lines.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{AppState, error::workflow_error_response, middleware::AuthContext};
use outlay_db::{ProfileRepository, repositories::CreateProfileInput};
use outlay_shared::Role;

/// Creates the profile routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/profiles", get(list_profiles).post(create_profile))
        .route("/profiles/me", get(get_me))
        .route("/profiles/approvers", get(list_approver_candidates))
        .route("/profiles/{profile_id}/manager", put(assign_manager))
}

/// Request body for creating a profile.
#[derive(Debug, Deserialize)]
pub struct CreateProfileRequest {
    /// Display name.
    pub full_name: String,
    /// Contact email.
    pub email: String,
    /// Role; defaults to employee.
    #[serde(default)]
    pub role: Option<Role>,
    /// Direct manager.
    #[serde(default)]
    pub manager_id: Option<Uuid>,
}

/// Request body for setting or clearing a manager.
#[derive(Debug, Deserialize)]
pub struct AssignManagerRequest {
    /// New manager; `null` clears it.
    pub manager_id: Option<Uuid>,
}

/// GET `/profiles` - List the company's members.
async fn list_profiles(State(state): State<AppState>, auth: AuthContext) -> impl IntoResponse {
    if let Err(response) = auth.require_admin() {
        return response;
    }
    let repo = ProfileRepository::new((*state.db).clone());

    match repo.list_profiles(auth.0.company_id.into_inner()).await {
        Ok(profiles) => (StatusCode::OK, Json(json!({ "data": profiles }))).into_response(),
        Err(e) => workflow_error_response(&e),
    }
}

/// POST `/profiles` - Add a member to the caller's company.
async fn create_profile(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(payload): Json<CreateProfileRequest>,
) -> impl IntoResponse {
    if let Err(response) = auth.require_admin() {
        return response;
    }
    let repo = ProfileRepository::new((*state.db).clone());
    let input = CreateProfileInput {
        full_name: payload.full_name,
        email: payload.email,
        role: payload.role.unwrap_or(Role::Employee),
        manager_id: payload.manager_id,
    };

    match repo
        .create_profile(auth.0.company_id.into_inner(), input)
        .await
    {
        Ok(profile) => (StatusCode::CREATED, Json(profile)).into_response(),
        Err(e) => workflow_error_response(&e),
    }
}

/// GET `/profiles/me` - The caller's own profile.
async fn get_me(State(state): State<AppState>, auth: AuthContext) -> impl IntoResponse {
    let repo = ProfileRepository::new((*state.db).clone());

    match repo
        .get_profile(
            auth.0.company_id.into_inner(),
            auth.0.profile_id.into_inner(),
        )
        .await
    {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(e) => workflow_error_response(&e),
    }
}

/// GET `/profiles/approvers` - Admins and managers a rule may name.
async fn list_approver_candidates(
    State(state): State<AppState>,
    auth: AuthContext,
) -> impl IntoResponse {
    if let Err(response) = auth.require_admin() {
        return response;
    }
    let repo = ProfileRepository::new((*state.db).clone());

    match repo
        .list_approver_candidates(auth.0.company_id.into_inner())
        .await
    {
        Ok(profiles) => (StatusCode::OK, Json(json!({ "data": profiles }))).into_response(),
        Err(e) => workflow_error_response(&e),
    }
}

/// PUT `/profiles/{profile_id}/manager` - Set or clear a manager.
async fn assign_manager(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(profile_id): Path<Uuid>,
    Json(payload): Json<AssignManagerRequest>,
) -> impl IntoResponse {
    if let Err(response) = auth.require_admin() {
        return response;
    }
    let repo = ProfileRepository::new((*state.db).clone());

    match repo
        .assign_manager(
            auth.0.company_id.into_inner(),
            profile_id,
            payload.manager_id,
        )
        .await
    {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(e) => workflow_error_response(&e),
    }
}
