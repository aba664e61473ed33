//! Time-bounded, degrading cache of exchange rates.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use log::{debug, error, warn};
use rust_decimal::Decimal;
use std::sync::Arc;

use super::currency::normalize_currency_code;
use super::fx_model::{CachedRate, RateCacheConfig, RateOrigin, RateQuote};
use super::fx_traits::{CurrencyConverterTrait, RateSourceTrait};
use crate::constants::DECIMAL_PRECISION;

type PairKey = (String, String);

/// Process-wide exchange-rate cache.
///
/// Lookups degrade through fresh hit → batched refresh → expired entry →
/// identity. Entries are replaced whole, so concurrent readers never need an
/// exclusive lock and the last writer wins.
pub struct ExchangeRateCache {
    source: Arc<dyn RateSourceTrait>,
    config: RateCacheConfig,
    entries: DashMap<PairKey, CachedRate>,
}

impl ExchangeRateCache {
    pub fn new(source: Arc<dyn RateSourceTrait>, config: RateCacheConfig) -> Self {
        Self {
            source,
            config,
            entries: DashMap::new(),
        }
    }

    /// Rate converting one unit of `from` into `to`, evaluated at `now`.
    pub async fn quote_at(&self, from: &str, to: &str, now: DateTime<Utc>) -> RateQuote {
        let from = normalize_currency_code(from);
        let to = normalize_currency_code(to);
        if from == to {
            return RateQuote {
                rate: Decimal::ONE,
                origin: RateOrigin::Identity,
            };
        }

        let key = (from.clone(), to.clone());
        let cached = self.entries.get(&key).map(|e| *e.value());
        if let Some(entry) = cached.filter(|e| e.is_fresh(now, self.config.ttl)) {
            return RateQuote {
                rate: entry.rate,
                origin: RateOrigin::Fresh,
            };
        }

        if let Some(rate) = self.refresh(&from, &to, now).await {
            return RateQuote {
                rate,
                origin: RateOrigin::Refreshed,
            };
        }

        // Re-read: a concurrent refresh may have landed meanwhile.
        if let Some(entry) = self.entries.get(&key).map(|e| *e.value()) {
            warn!(
                "Using expired {}/{} rate {} fetched at {} (rate source unavailable)",
                from, to, entry.rate, entry.fetched_at
            );
            return RateQuote {
                rate: entry.rate,
                origin: RateOrigin::Stale,
            };
        }

        error!(
            "No exchange rate available for {}/{}; leaving amounts unconverted",
            from, to
        );
        RateQuote {
            rate: Decimal::ONE,
            origin: RateOrigin::Fallback,
        }
    }

    pub async fn rate_at(&self, from: &str, to: &str, now: DateTime<Utc>) -> Decimal {
        self.quote_at(from, to, now).await.rate
    }

    /// Fetches every supported currency against `from` in one request and
    /// caches forward and inverse rates. Returns the `from → to` rate when
    /// the fetch produced it.
    async fn refresh(&self, from: &str, to: &str, now: DateTime<Utc>) -> Option<Decimal> {
        let mut targets: Vec<String> = self
            .config
            .supported_currencies
            .iter()
            .map(|c| normalize_currency_code(c))
            .filter(|c| c != from)
            .collect();
        if !targets.iter().any(|c| c == to) {
            targets.push(to.to_string());
        }

        let rates = match self.source.fetch_latest(from, &targets).await {
            Ok(rates) => rates,
            Err(e) => {
                warn!("Exchange rate refresh for base {} failed: {}", from, e);
                return None;
            }
        };

        let mut stored = 0;
        for (currency, rate) in rates {
            let currency = normalize_currency_code(&currency);
            if rate <= Decimal::ZERO || currency == from {
                continue;
            }
            self.store(from, &currency, rate, now);
            self.store(
                &currency,
                from,
                (Decimal::ONE / rate).round_dp(DECIMAL_PRECISION),
                now,
            );
            stored += 1;
        }
        debug!("Cached {} rate pair(s) for base {}", stored, from);

        self.entries
            .get(&(from.to_string(), to.to_string()))
            .filter(|e| e.fetched_at == now)
            .map(|e| e.rate)
    }

    fn store(&self, from: &str, to: &str, rate: Decimal, fetched_at: DateTime<Utc>) {
        self.entries
            .insert((from.to_string(), to.to_string()), CachedRate { rate, fetched_at });
    }

    /// Seeds an entry, e.g. from a persisted last-known rate.
    pub fn insert(&self, from: &str, to: &str, rate: Decimal, fetched_at: DateTime<Utc>) {
        self.store(
            &normalize_currency_code(from),
            &normalize_currency_code(to),
            rate,
            fetched_at,
        );
    }

    pub fn cached(&self, from: &str, to: &str) -> Option<CachedRate> {
        self.entries
            .get(&(normalize_currency_code(from), normalize_currency_code(to)))
            .map(|e| *e.value())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CurrencyConverterTrait for ExchangeRateCache {
    async fn rate(&self, from: &str, to: &str) -> Decimal {
        self.rate_at(from, to, Utc::now()).await
    }
}
