//! Forecast models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ledger::EntryType;
use crate::obligations::{Obligation, ObligationKind};

/// Income the owner expects on a given date outside any obligation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedIncome {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub amount: Decimal,
    pub currency: String,
    pub expected_date: NaiveDate,
    pub category_id: Option<String>,
    pub is_active: bool,
}

/// What produced a projected money movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowKind {
    FixedItem,
    Installment,
    Loan,
    Subscription,
    ExpectedIncome,
    OneTime,
    Adjustment,
}

impl From<ObligationKind> for FlowKind {
    fn from(kind: ObligationKind) -> Self {
        match kind {
            ObligationKind::FixedItem => FlowKind::FixedItem,
            ObligationKind::Installment => FlowKind::Installment,
            ObligationKind::Loan => FlowKind::Loan,
            ObligationKind::Subscription => FlowKind::Subscription,
        }
    }
}

/// One dated movement in the projection currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlow {
    pub date: NaiveDate,
    pub direction: EntryType,
    pub kind: FlowKind,
    pub amount: Decimal,
}

/// Inclusive date bounds of one projection bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// One month or week of a projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodProjection {
    /// 1-based position in the projection.
    pub index: u32,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub opening_balance: Decimal,
    pub income_breakdown: BTreeMap<FlowKind, Decimal>,
    pub expense_breakdown: BTreeMap<FlowKind, Decimal>,
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub net_change: Decimal,
    pub closing_balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyForecast {
    pub owner_id: String,
    pub currency: String,
    pub as_of: NaiveDate,
    pub current_balance: Decimal,
    /// Date of the balance snapshot the projection starts from.
    pub balance_effective_date: Option<NaiveDate>,
    pub months: Vec<PeriodProjection>,
    pub has_negative_months: bool,
    pub first_negative_month: Option<u32>,
    pub lowest_balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyForecast {
    pub owner_id: String,
    pub currency: String,
    pub as_of: NaiveDate,
    pub current_balance: Decimal,
    pub balance_effective_date: Option<NaiveDate>,
    pub weeks: Vec<PeriodProjection>,
    pub has_negative_weeks: bool,
    pub first_negative_week: Option<u32>,
    pub lowest_balance: Decimal,
}

/// Hypothetical changes layered over the stored state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WhatIfScenario {
    /// Added to the starting balance.
    pub balance_adjustment: Decimal,
    /// Extra income booked on the first day of every projected month.
    pub monthly_income: Decimal,
    /// Extra expense booked on the first day of every projected month.
    pub monthly_expenses: Decimal,
    /// Obligations projected as if they existed.
    pub additional_obligations: Vec<Obligation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhatIfForecast {
    pub baseline: MonthlyForecast,
    pub scenario: MonthlyForecast,
    /// Scenario minus baseline closing balance of the last month.
    pub final_balance_difference: Decimal,
}
