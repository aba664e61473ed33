//! Currency code helpers.

use super::fx_errors::FxError;

/// Canonical form of a currency code: trimmed and upper-cased.
pub fn normalize_currency_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// Validates an ISO-4217 style three-letter code and returns it normalized.
pub fn parse_currency_code(code: &str) -> Result<String, FxError> {
    let normalized = normalize_currency_code(code);
    if normalized.len() == 3 && normalized.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(normalized)
    } else {
        Err(FxError::InvalidCurrencyCode(code.to_string()))
    }
}
