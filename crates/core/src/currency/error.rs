//! Currency error types.

use thiserror::Error;

use crate::workflow::error::WorkflowError;

/// Errors raised while normalizing amounts between currencies.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CurrencyError {
    /// The code is not three ASCII letters.
    #[error("Invalid currency code: {0}")]
    InvalidCode(String),

    /// The rate source has no rate for the pair.
    #[error("No exchange rate from {from} to {to}")]
    RateUnavailable {
        /// Source currency.
        from: String,
        /// Target currency.
        to: String,
    },

    /// The rate source could not be reached or answered garbage.
    #[error("Exchange rate request failed: {0}")]
    Http(String),

    /// The amount cannot be represented in a money column.
    #[error("Amount out of range: {0}")]
    OutOfRange(String),
}

impl CurrencyError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidCode(_) | Self::OutOfRange(_) => 400,
            Self::RateUnavailable { .. } | Self::Http(_) => 502,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCode(_) => "INVALID_CURRENCY",
            Self::RateUnavailable { .. } => "RATE_UNAVAILABLE",
            Self::Http(_) => "EXCHANGE_RATE_SERVICE_ERROR",
            Self::OutOfRange(_) => "AMOUNT_OUT_OF_RANGE",
        }
    }
}

impl From<CurrencyError> for WorkflowError {
    fn from(err: CurrencyError) -> Self {
        match err {
            CurrencyError::InvalidCode(_) | CurrencyError::OutOfRange(_) => {
                Self::Validation(err.to_string())
            }
            CurrencyError::RateUnavailable { .. } | CurrencyError::Http(_) => {
                Self::ExternalService(err.to_string())
            }
        }
    }
}
