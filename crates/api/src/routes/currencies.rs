//! Currency routes: supported codes, country defaults and conversion previews.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::{
    AppState,
    error::{app_error_response, workflow_error_response},
    middleware::AuthContext,
};
use outlay_core::currency::{
    CurrencyCode, CurrencyNormalizer, SUPPORTED_CURRENCIES, currency_for_country, format_amount,
};
use outlay_core::workflow::WorkflowError;
use outlay_shared::AppError;

/// Creates the currency routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/currencies", get(list_currencies))
        .route("/currencies/country/{country}", get(currency_for))
        .route("/currencies/convert", get(convert))
}

/// Query parameters for a conversion preview.
#[derive(Debug, Deserialize)]
pub struct ConvertQuery {
    /// Source currency.
    pub from: String,
    /// Target currency.
    pub to: String,
    /// Amount in `from`.
    pub amount: Decimal,
}

/// GET `/currencies` - Currencies offered in pickers.
async fn list_currencies(_auth: AuthContext) -> impl IntoResponse {
    Json(json!({ "currencies": SUPPORTED_CURRENCIES }))
}

/// GET `/currencies/country/{country}` - Default currency for a country.
async fn currency_for(_auth: AuthContext, Path(country): Path<String>) -> impl IntoResponse {
    Json(json!({ "country": country, "currency": currency_for_country(&country) }))
}

/// GET `/currencies/convert` - Preview a conversion at the current rate.
async fn convert(
    State(state): State<AppState>,
    _auth: AuthContext,
    Query(query): Query<ConvertQuery>,
) -> impl IntoResponse {
    let (from, to) = match (CurrencyCode::parse(&query.from), CurrencyCode::parse(&query.to)) {
        (Ok(from), Ok(to)) => (from, to),
        (Err(e), _) | (_, Err(e)) => {
            return app_error_response(&AppError::Validation(e.to_string()));
        }
    };

    match state.rates.convert(query.amount, &from, &to).await {
        Ok(converted) => (
            StatusCode::OK,
            Json(json!({
                "from": from,
                "to": to,
                "amount": query.amount,
                "converted": converted,
                "display": format_amount(converted, to.as_str()),
            })),
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, from = %from, to = %to, "Conversion preview failed");
            workflow_error_response(&WorkflowError::from(e))
        }
    }
}
