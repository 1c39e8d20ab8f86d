//! Currency codes, conversion and exchange rate sources.

pub mod code;
pub mod conversion;
pub mod error;
pub mod format;
pub mod normalizer;
pub mod rates_api;

pub use code::CurrencyCode;
pub use conversion::{
    MAX_STORABLE_AMOUNT, NORMALIZED_DECIMAL_PLACES, convert_amount, ensure_storable,
};
pub use error::CurrencyError;
pub use format::{SUPPORTED_CURRENCIES, currency_for_country, format_amount};
pub use normalizer::{CurrencyNormalizer, FixedRateNormalizer, RateProvider};
pub use rates_api::ExchangeRateApiClient;
