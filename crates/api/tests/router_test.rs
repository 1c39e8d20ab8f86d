//! Router tests that run without a database.
//!
//! The state holds a disconnected `DatabaseConnection`; every request here is
//! answered before a query would be issued.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header::AUTHORIZATION},
};
use http_body_util::BodyExt;
use outlay_api::{AppState, create_router};
use outlay_core::currency::{CurrencyCode, FixedRateNormalizer, RateProvider};
use outlay_shared::{JwtConfig, JwtService, Role};
use rstest::rstest;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;
use tower::ServiceExt;
use uuid::Uuid;

fn state() -> AppState {
    let rates = FixedRateNormalizer::new().with_rate(
        CurrencyCode::parse("EUR").unwrap(),
        CurrencyCode::parse("USD").unwrap(),
        dec!(1.08),
    );
    AppState {
        db: Arc::new(DatabaseConnection::Disconnected),
        jwt_service: Arc::new(JwtService::new(JwtConfig::default())),
        rates: Arc::new(RateProvider::Fixed(rates)),
    }
}

fn app() -> (Router, AppState) {
    let state = state();
    (create_router(state.clone()), state)
}

fn token(state: &AppState, role: Role) -> String {
    state
        .jwt_service
        .generate_access_token(Uuid::new_v4(), Uuid::new_v4(), role)
        .unwrap()
}

async fn get(app: Router, uri: &str, token: Option<&str>) -> (StatusCode, serde_json::Value) {
    let mut request = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        request = request.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let response = app
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_health_reports_database_down() {
    let (app, _) = app();
    let (status, json) = get(app, "/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["database"], false);
}

#[rstest]
#[case("/api/v1/approval-rules")]
#[case("/api/v1/expenses/mine")]
#[case("/api/v1/approvals/pending")]
#[case("/api/v1/currencies")]
#[tokio::test]
async fn test_protected_routes_need_token(#[case] uri: &str) {
    let (app, _) = app();
    let (status, json) = get(app, uri, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "missing_token");
}

#[tokio::test]
async fn test_garbage_token_rejected() {
    let (app, _) = app();
    let (status, json) = get(app, "/api/v1/currencies", Some("not.a.jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "invalid_token");
}

#[rstest]
#[case(Role::Employee, "/api/v1/approval-rules")]
#[case(Role::Manager, "/api/v1/approval-rules")]
#[case(Role::Manager, "/api/v1/profiles")]
#[case(Role::Employee, "/api/v1/expenses")]
#[tokio::test]
async fn test_role_gates(#[case] role: Role, #[case] uri: &str) {
    let (app, state) = app();
    let token = token(&state, role);
    let (status, json) = get(app, uri, Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["error"], "FORBIDDEN");
}

#[tokio::test]
async fn test_unknown_status_filter_is_validation_error() {
    let (app, state) = app();
    let token = token(&state, Role::Manager);
    let (status, json) = get(app, "/api/v1/expenses?status=archived", Some(&token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_currency_listing_and_country_lookup() {
    let (app, state) = app();
    let token = token(&state, Role::Employee);

    let (status, json) = get(app.clone(), "/api/v1/currencies", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["currencies"][0]["code"], "USD");

    let (status, json) = get(app, "/api/v1/currencies/country/India", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["currency"], "INR");
}

#[tokio::test]
async fn test_conversion_preview() {
    let (app, state) = app();
    let token = token(&state, Role::Employee);

    let (status, json) = get(
        app.clone(),
        "/api/v1/currencies/convert?from=eur&to=USD&amount=100",
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let converted: Decimal = json["converted"].as_str().unwrap().parse().unwrap();
    assert_eq!(converted, dec!(108));
    assert_eq!(json["display"], "$ 108.00");

    let (status, json) = get(
        app,
        "/api/v1/currencies/convert?from=EUR&to=JPY&amount=1",
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["error"], "EXTERNAL_SERVICE_ERROR");
}
