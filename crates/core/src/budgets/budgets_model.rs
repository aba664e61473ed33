//! Budget domain models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::{Error, Result, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BudgetPeriodType {
    Monthly,
    Quarterly,
    Annual,
}

impl BudgetPeriodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetPeriodType::Monthly => "MONTHLY",
            BudgetPeriodType::Quarterly => "QUARTERLY",
            BudgetPeriodType::Annual => "ANNUAL",
        }
    }

    pub fn months(&self) -> u32 {
        match self {
            BudgetPeriodType::Monthly => 1,
            BudgetPeriodType::Quarterly => 3,
            BudgetPeriodType::Annual => 12,
        }
    }
}

impl FromStr for BudgetPeriodType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "MONTHLY" => Ok(BudgetPeriodType::Monthly),
            "QUARTERLY" => Ok(BudgetPeriodType::Quarterly),
            "ANNUAL" => Ok(BudgetPeriodType::Annual),
            other => Err(ValidationError::InvalidInput(format!(
                "Unknown budget period '{}'",
                other
            ))
            .into()),
        }
    }
}

/// Spending cap for one category over a rolling period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub category_id: String,
    pub period_type: BudgetPeriodType,
    pub amount: Decimal,
    pub currency: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    /// Usage percentage (0-100) at which the budget raises an alert.
    pub alert_at_percentage: Decimal,
    pub is_active: bool,
}

/// Inclusive date bounds of one budget period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl BudgetPeriod {
    pub fn total_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Spend to date against a budget and its run-rate forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetActuals {
    pub actual_amount: Decimal,
    pub remaining: Decimal,
    pub usage_percentage: Decimal,
    pub is_over_budget: bool,
    pub forecast_end_of_period: Decimal,
    pub alert_triggered: bool,
    pub days_elapsed: i64,
    pub total_days: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetStatus {
    pub budget_id: String,
    pub category_id: String,
    pub currency: String,
    pub budget_amount: Decimal,
    pub period: BudgetPeriod,
    pub actuals: BudgetActuals,
}
