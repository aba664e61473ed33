use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A recorded balance as of `effective_date`.
///
/// Exactly one snapshot per owner is current; the persistence collaborator
/// enforces that and the core only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSnapshot {
    pub id: String,
    pub owner_id: String,
    pub balance: Decimal,
    pub currency: String,
    pub effective_date: NaiveDate,
    pub is_current: bool,
}
