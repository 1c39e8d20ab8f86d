//! Errors raised at the HTTP edge before a request reaches the workflow
//! services: role gates and malformed query parameters.

use thiserror::Error;

/// Request-level errors.
#[derive(Debug, Error)]
pub enum AppError {
    /// The caller's role does not allow the operation.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// A query parameter could not be interpreted.
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Forbidden(_) => 403,
            Self::Validation(_) => 400,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Validation(_) => "VALIDATION_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_gate_is_forbidden() {
        let err = AppError::Forbidden("admins only".into());
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.error_code(), "FORBIDDEN");
        assert_eq!(err.to_string(), "Access denied: admins only");
    }

    #[test]
    fn test_bad_query_is_validation() {
        let err = AppError::Validation("unknown status 'paid'".into());
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }
}
