//! Normalizing amounts into a company's base currency.

use std::collections::HashMap;
use std::future::Future;

use rust_decimal::Decimal;

use crate::currency::code::CurrencyCode;
use crate::currency::conversion::{NORMALIZED_DECIMAL_PLACES, convert_amount, invert_rate};
use crate::currency::error::CurrencyError;
use crate::currency::rates_api::ExchangeRateApiClient;

/// Source of exchange rates.
///
/// Implementors only supply [`CurrencyNormalizer::rate`]; conversion and the
/// same-currency identity are shared.
pub trait CurrencyNormalizer: Send + Sync {
    /// Rate such that `1 from = rate to`.
    fn rate(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> impl Future<Output = Result<Decimal, CurrencyError>> + Send;

    /// Converts `amount` from one currency to another.
    ///
    /// Returns the input unchanged when the codes match, without consulting
    /// the rate source. Otherwise rounds to 4 places with banker's rounding
    /// and fails with `OutOfRange` if the result does not fit a money column.
    fn convert(
        &self,
        amount: Decimal,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> impl Future<Output = Result<Decimal, CurrencyError>> + Send {
        async move {
            if from == to {
                return Ok(amount);
            }
            let rate = self.rate(from, to).await?;
            convert_amount(amount, rate, NORMALIZED_DECIMAL_PLACES)
        }
    }
}

/// Normalizer backed by a static rate table.
///
/// A pair is looked up directly, then through the inverse of the opposite
/// pair. Used by the seeder, tests and offline deployments.
#[derive(Debug, Clone, Default)]
pub struct FixedRateNormalizer {
    rates: HashMap<(CurrencyCode, CurrencyCode), Decimal>,
}

impl FixedRateNormalizer {
    /// Creates an empty table; only same-currency conversions succeed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rate, `1 from = rate to`.
    #[must_use]
    pub fn with_rate(mut self, from: CurrencyCode, to: CurrencyCode, rate: Decimal) -> Self {
        self.rates.insert((from, to), rate);
        self
    }

    fn lookup(&self, from: &CurrencyCode, to: &CurrencyCode) -> Option<Decimal> {
        if let Some(rate) = self.rates.get(&(from.clone(), to.clone())) {
            return Some(*rate);
        }
        self.rates
            .get(&(to.clone(), from.clone()))
            .and_then(|r| invert_rate(*r))
    }
}

impl CurrencyNormalizer for FixedRateNormalizer {
    async fn rate(&self, from: &CurrencyCode, to: &CurrencyCode) -> Result<Decimal, CurrencyError> {
        if from == to {
            return Ok(Decimal::ONE);
        }
        self.lookup(from, to)
            .ok_or_else(|| CurrencyError::RateUnavailable {
                from: from.to_string(),
                to: to.to_string(),
            })
    }
}

/// The rate sources a deployment can be configured with.
#[derive(Debug, Clone)]
pub enum RateProvider {
    /// Live rates from exchangerate-api.
    Api(ExchangeRateApiClient),
    /// Static table.
    Fixed(FixedRateNormalizer),
}

impl CurrencyNormalizer for RateProvider {
    async fn rate(&self, from: &CurrencyCode, to: &CurrencyCode) -> Result<Decimal, CurrencyError> {
        match self {
            Self::Api(client) => client.rate(from, to).await,
            Self::Fixed(table) => table.rate(from, to).await,
        }
    }
}
