use thiserror::Error;

#[derive(Error, Debug)]
pub enum FxError {
    #[error("Exchange rate not found: {0}")]
    RateNotFound(String),

    #[error("Invalid currency code: {0}")]
    InvalidCurrencyCode(String),

    #[error("Fetch error: {0}")]
    FetchError(String),

    #[error("Invalid rate payload: {0}")]
    InvalidPayload(String),
}

impl From<reqwest::Error> for FxError {
    fn from(err: reqwest::Error) -> Self {
        FxError::FetchError(err.to_string())
    }
}
