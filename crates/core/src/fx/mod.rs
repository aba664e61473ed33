//! Exchange rates: a time-bounded cache over an external rate source.

pub mod currency;
mod fx_errors;
mod fx_model;
mod fx_traits;
mod rate_cache;
mod rate_source;


pub use currency::{normalize_currency_code, parse_currency_code};
pub use fx_errors::FxError;
pub use fx_model::{CachedRate, LatestRatesResponse, RateCacheConfig, RateOrigin, RateQuote};
pub use fx_traits::{CurrencyConverterTrait, RateSourceTrait};
pub use rate_cache::ExchangeRateCache;
pub use rate_source::{HttpRateSource, DEFAULT_RATE_SOURCE_TIMEOUT, DEFAULT_RATE_SOURCE_URL};
