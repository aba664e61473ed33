use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;

use super::fx_errors::FxError;

/// External source of latest exchange rates.
#[async_trait]
pub trait RateSourceTrait: Send + Sync {
    /// Rates from `base` into each of `targets`, in one request.
    async fn fetch_latest(
        &self,
        base: &str,
        targets: &[String],
    ) -> std::result::Result<HashMap<String, Decimal>, FxError>;
}

/// Currency conversion as consumed by the projections. Never fails: an
/// unavailable rate degrades as described on [`super::ExchangeRateCache`].
#[async_trait]
pub trait CurrencyConverterTrait: Send + Sync {
    async fn rate(&self, from: &str, to: &str) -> Decimal;

    async fn convert(&self, amount: Decimal, from: &str, to: &str) -> Decimal {
        if from == to {
            return amount;
        }
        amount * self.rate(from, to).await
    }
}
