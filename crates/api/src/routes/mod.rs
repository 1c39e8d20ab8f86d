//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth::auth_middleware};

pub mod approval_rules;
pub mod approvals;
pub mod currencies;
pub mod expenses;
pub mod health;
pub mod profiles;

/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Protected routes that require authentication
    let protected_routes = Router::new()
        .merge(approval_rules::routes())
        .merge(profiles::routes())
        .merge(expenses::routes())
        .merge(approvals::routes())
        .merge(currencies::routes())
        .layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new().merge(health::routes()).merge(protected_routes)
}
