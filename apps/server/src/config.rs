use std::{fmt::Display, net::SocketAddr, str::FromStr, time::Duration};

use anyhow::anyhow;
use cashflow_core::{
    fx::{RateCacheConfig, DEFAULT_RATE_SOURCE_URL},
    scheduler::SchedulerConfig,
};
use chrono::NaiveTime;
use chrono_tz::Tz;

const DEFAULT_CURRENCIES: &str = "USD,EUR,GBP,ILS,JPY,CHF,CAD";

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub scheduler: SchedulerConfig,
    pub fx_base_url: String,
    pub fx_timeout: Duration,
    pub rate_cache: RateCacheConfig,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; unset keys take defaults.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| -> String {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let listen_addr: SocketAddr = parse("CF_LISTEN_ADDR", &var("CF_LISTEN_ADDR", "0.0.0.0:8080"))?;
        let db_path = var("CF_DB_PATH", "./db/cashflow.db");
        let cors_allow = split_list(&var("CF_CORS_ALLOW_ORIGINS", "*"));
        let timeout_ms: u64 = parse("CF_REQUEST_TIMEOUT_MS", &var("CF_REQUEST_TIMEOUT_MS", "30000"))?;

        let timezone_name = var("CF_SCHEDULER_TIMEZONE", "UTC");
        let timezone: Tz = timezone_name
            .parse()
            .map_err(|e| anyhow!("Invalid CF_SCHEDULER_TIMEZONE '{}': {}", timezone_name, e))?;
        let fire_time_text = var("CF_SCHEDULER_TIME", "00:05");
        let fire_time = NaiveTime::parse_from_str(&fire_time_text, "%H:%M")
            .map_err(|e| anyhow!("Invalid CF_SCHEDULER_TIME '{}': {}", fire_time_text, e))?;
        let grace_secs: i64 = parse(
            "CF_SCHEDULER_MISFIRE_GRACE_SECS",
            &var("CF_SCHEDULER_MISFIRE_GRACE_SECS", "3600"),
        )?;
        let workers: usize = parse("CF_SCHEDULER_WORKERS", &var("CF_SCHEDULER_WORKERS", "1"))?;
        let enabled: bool = parse("CF_SCHEDULER_ENABLED", &var("CF_SCHEDULER_ENABLED", "true"))?;

        let fx_base_url = var("CF_FX_BASE_URL", DEFAULT_RATE_SOURCE_URL);
        let fx_timeout_secs: u64 = parse("CF_FX_TIMEOUT_SECS", &var("CF_FX_TIMEOUT_SECS", "10"))?;
        let currencies = split_list(&var("CF_FX_CURRENCIES", DEFAULT_CURRENCIES));

        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            scheduler: SchedulerConfig {
                timezone,
                fire_time,
                misfire_grace: chrono::Duration::seconds(grace_secs.max(0)),
                workers: workers.max(1),
                enabled,
            },
            fx_base_url,
            fx_timeout: Duration::from_secs(fx_timeout_secs),
            rate_cache: RateCacheConfig {
                supported_currencies: currencies
                    .into_iter()
                    .map(|c| c.to_uppercase())
                    .collect(),
                ..RateCacheConfig::default()
            },
        })
    }
}

fn parse<T>(key: &str, value: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .parse()
        .map_err(|e| anyhow!("Invalid {} '{}': {}", key, value, e))
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
