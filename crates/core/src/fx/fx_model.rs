use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A cached conversion rate and when it was fetched.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CachedRate {
    pub rate: Decimal,
    pub fetched_at: DateTime<Utc>,
}

impl CachedRate {
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.fetched_at
    }

    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.age(now) < ttl
    }
}

/// Where a returned rate came from.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RateOrigin {
    Identity,
    Fresh,
    Refreshed,
    /// Expired entry returned because the source was unavailable.
    Stale,
    /// No data at all; the amount is left unconverted.
    Fallback,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RateQuote {
    pub rate: Decimal,
    pub origin: RateOrigin,
}

/// `GET latest?from=X&to=Y,Z` response body.
#[derive(Deserialize, Debug, Clone)]
pub struct LatestRatesResponse {
    #[serde(default)]
    pub base: Option<String>,
    pub rates: HashMap<String, Decimal>,
}

/// Settings of the process-wide rate cache.
#[derive(Debug, Clone)]
pub struct RateCacheConfig {
    pub ttl: Duration,
    /// Currencies refreshed together whenever one of them misses.
    pub supported_currencies: Vec<String>,
}

impl Default for RateCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::seconds(crate::constants::FX_CACHE_TTL_SECS),
            supported_currencies: ["USD", "EUR", "GBP", "ILS", "JPY", "CHF", "CAD"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }
}
