//! Mapping domain errors to HTTP responses.
//!
//! Every error body has the shape `{"error": CODE, "message": text}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use outlay_core::workflow::WorkflowError;
use outlay_shared::AppError;
use serde_json::json;
use tracing::error;

fn respond(status: u16, code: &str, message: &str) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({ "error": code, "message": message }))).into_response()
}

/// Converts a workflow error into a response.
///
/// Storage failures are logged and reported without their details.
#[must_use]
pub fn workflow_error_response(e: &WorkflowError) -> Response {
    if let WorkflowError::Storage(detail) = e {
        error!(error = %detail, "Storage failure");
        return respond(e.status_code(), e.error_code(), "An error occurred");
    }
    respond(e.status_code(), e.error_code(), &e.to_string())
}

/// Converts an application error into a response.
#[must_use]
pub fn app_error_response(e: &AppError) -> Response {
    respond(e.status_code(), e.error_code(), &e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use rstest::rstest;
    use uuid::Uuid;

    async fn body(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[rstest]
    #[case(WorkflowError::Validation("bad".into()), StatusCode::BAD_REQUEST)]
    #[case(WorkflowError::scope("expense", Uuid::nil()), StatusCode::FORBIDDEN)]
    #[case(WorkflowError::not_found("expense", Uuid::nil()), StatusCode::NOT_FOUND)]
    #[case(WorkflowError::OutOfSequence { requested: 2, next: 0 }, StatusCode::CONFLICT)]
    #[case(WorkflowError::ExternalService("down".into()), StatusCode::BAD_GATEWAY)]
    fn test_workflow_status_mapping(#[case] e: WorkflowError, #[case] expected: StatusCode) {
        assert_eq!(workflow_error_response(&e).status(), expected);
    }

    #[tokio::test]
    async fn test_storage_details_are_hidden() {
        let response =
            workflow_error_response(&WorkflowError::Storage("relation does not exist".into()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body(response).await;
        assert_eq!(json["error"], "STORAGE_ERROR");
        assert_eq!(json["message"], "An error occurred");
    }

    #[tokio::test]
    async fn test_app_error_body() {
        let response = app_error_response(&AppError::Forbidden("admins only".into()));
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let json = body(response).await;
        assert_eq!(json["error"], "FORBIDDEN");
    }
}
