//! Live exchange rates from exchangerate-api.com.
//!
//! `GET {base_url}/{BASE}` returns every rate quoted against `BASE`. Tables
//! are cached per base currency for a configurable TTL so a burst of
//! submissions costs one request.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, warn};

use outlay_shared::config::CurrencyConfig;

use crate::currency::code::CurrencyCode;
use crate::currency::error::CurrencyError;
use crate::currency::normalizer::CurrencyNormalizer;

/// Base currencies kept in the cache at once.
const MAX_CACHED_TABLES: u64 = 64;

type RateTable = Arc<HashMap<String, Decimal>>;

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    rates: HashMap<String, serde_json::Number>,
}

/// HTTP client for the `latest/{BASE}` endpoint with a TTL cache.
#[derive(Clone)]
pub struct ExchangeRateApiClient {
    client: Client,
    base_url: String,
    cache: Cache<CurrencyCode, RateTable>,
}

impl ExchangeRateApiClient {
    /// Creates a client.
    pub fn new(
        base_url: impl Into<String>,
        cache_ttl: Duration,
        request_timeout: Duration,
    ) -> Result<Self, CurrencyError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| CurrencyError::Http(e.to_string()))?;
        let cache = Cache::builder()
            .max_capacity(MAX_CACHED_TABLES)
            .time_to_live(cache_ttl)
            .build();

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cache,
        })
    }

    /// Creates a client from the `currency` configuration section.
    pub fn from_config(config: &CurrencyConfig) -> Result<Self, CurrencyError> {
        Self::new(
            config.api_base_url.clone(),
            Duration::from_secs(config.cache_ttl_secs),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Returns the rate table for `base`, fetching it on a cache miss.
    ///
    /// Concurrent misses for the same base share one request.
    pub async fn rates_for(&self, base: &CurrencyCode) -> Result<RateTable, CurrencyError> {
        self.cache
            .try_get_with(base.clone(), self.fetch(base))
            .await
            .map_err(|e| (*e).clone())
    }

    async fn fetch(&self, base: &CurrencyCode) -> Result<RateTable, CurrencyError> {
        let url = format!("{}/{}", self.base_url, base);
        debug!(%url, "Fetching exchange rates");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| {
                warn!(base = %base, error = %e, "Exchange rate request failed");
                CurrencyError::Http(e.to_string())
            })?;

        let body: LatestRatesResponse = response
            .json()
            .await
            .map_err(|e| CurrencyError::Http(format!("malformed rate response: {e}")))?;

        Ok(Arc::new(parse_rates(body.rates)?))
    }
}

impl fmt::Debug for ExchangeRateApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExchangeRateApiClient")
            .field("base_url", &self.base_url)
            .field("cached_tables", &self.cache.entry_count())
            .finish_non_exhaustive()
    }
}

/// Converts JSON numbers to decimals through their text form, never through `f64`.
fn parse_rates(
    raw: HashMap<String, serde_json::Number>,
) -> Result<HashMap<String, Decimal>, CurrencyError> {
    raw.into_iter()
        .map(|(code, number)| {
            let text = number.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .map(|rate| (code.to_ascii_uppercase(), rate))
                .map_err(|e| CurrencyError::Http(format!("unparseable rate {text} for {code}: {e}")))
        })
        .collect()
}

impl CurrencyNormalizer for ExchangeRateApiClient {
    async fn rate(&self, from: &CurrencyCode, to: &CurrencyCode) -> Result<Decimal, CurrencyError> {
        if from == to {
            return Ok(Decimal::ONE);
        }
        let table = self.rates_for(from).await?;
        table
            .get(to.as_str())
            .copied()
            .ok_or_else(|| CurrencyError::RateUnavailable {
                from: from.to_string(),
                to: to.to_string(),
            })
    }
}
