//! HTTP client for the latest-rates endpoint.

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::time::Duration;

use super::fx_errors::FxError;
use super::fx_model::LatestRatesResponse;
use super::fx_traits::RateSourceTrait;

pub const DEFAULT_RATE_SOURCE_URL: &str = "https://api.frankfurter.app";
pub const DEFAULT_RATE_SOURCE_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches `GET {base_url}/latest?from=X&to=Y,Z`.
pub struct HttpRateSource {
    client: Client,
    base_url: String,
}

impl HttpRateSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FxError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FxError::FetchError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn latest_url(&self) -> String {
        format!("{}/latest", self.base_url)
    }
}

#[async_trait]
impl RateSourceTrait for HttpRateSource {
    async fn fetch_latest(
        &self,
        base: &str,
        targets: &[String],
    ) -> Result<HashMap<String, Decimal>, FxError> {
        if targets.is_empty() {
            return Ok(HashMap::new());
        }
        let to = targets.join(",");
        debug!("Fetching latest rates {} -> {}", base, to);

        let response = self
            .client
            .get(self.latest_url())
            .query(&[("from", base), ("to", to.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FxError::FetchError(format!(
                "Rate source returned HTTP {} for base {}",
                status, base
            )));
        }

        let body: LatestRatesResponse = response
            .json()
            .await
            .map_err(|e| FxError::InvalidPayload(e.to_string()))?;

        if let Some(returned) = body.base.as_deref() {
            if !returned.eq_ignore_ascii_case(base) {
                return Err(FxError::InvalidPayload(format!(
                    "Expected base {}, got {}",
                    base, returned
                )));
            }
        }
        Ok(body.rates)
    }
}
