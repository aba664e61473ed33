//! Text codecs for the columns SQLite stores as TEXT.
//!
//! Money and rates are stored as decimal strings so no precision is lost;
//! dates as ISO `YYYY-MM-DD`.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::errors::StorageError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn decimal_to_text(value: Decimal) -> String {
    value.normalize().to_string()
}

pub fn text_to_decimal(column: &str, value: &str) -> Result<Decimal, StorageError> {
    Decimal::from_str(value.trim()).map_err(|e| StorageError::invalid_data(column, e))
}

pub fn text_to_decimal_opt(column: &str, value: Option<&str>) -> Result<Option<Decimal>, StorageError> {
    value.map(|v| text_to_decimal(column, v)).transpose()
}

pub fn date_to_text(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn text_to_date(column: &str, value: &str) -> Result<NaiveDate, StorageError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|e| StorageError::invalid_data(column, e))
}

pub fn text_to_date_opt(column: &str, value: Option<&str>) -> Result<Option<NaiveDate>, StorageError> {
    value.map(|v| text_to_date(column, v)).transpose()
}

/// Decodes an enum column through its `FromStr` implementation.
pub fn text_to_enum<T>(column: &str, value: &str) -> Result<T, StorageError>
where
    T: FromStr,
    T::Err: ToString,
{
    T::from_str(value).map_err(|e| StorageError::invalid_data(column, e))
}

/// Non-negative integer column into a count or day number.
pub fn int_to_u32(column: &str, value: i32) -> Result<u32, StorageError> {
    u32::try_from(value).map_err(|e| StorageError::invalid_data(column, e))
}
