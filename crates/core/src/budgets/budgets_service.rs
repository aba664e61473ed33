use async_trait::async_trait;
use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::budgets_model::{Budget, BudgetActuals, BudgetPeriod, BudgetStatus};
use super::budgets_traits::{BudgetRepositoryTrait, BudgetServiceTrait};
use crate::constants::{MONEY_PRECISION, PERCENT_PRECISION};
use crate::errors::{Error, Result};
use crate::fx::CurrencyConverterTrait;
use crate::ledger::LedgerRepositoryTrait;
use crate::utils::time_utils::add_months;

/// Derives a budget's current rolling period and forecasts its end-of-period
/// spend from the run rate so far.
pub struct BudgetPeriodCalculator {
    budget_repository: Arc<dyn BudgetRepositoryTrait>,
    ledger_repository: Arc<dyn LedgerRepositoryTrait>,
    converter: Arc<dyn CurrencyConverterTrait>,
}

impl BudgetPeriodCalculator {
    pub fn new(
        budget_repository: Arc<dyn BudgetRepositoryTrait>,
        ledger_repository: Arc<dyn LedgerRepositoryTrait>,
        converter: Arc<dyn CurrencyConverterTrait>,
    ) -> Self {
        Self {
            budget_repository,
            ledger_repository,
            converter,
        }
    }

    /// The period containing `today`.
    ///
    /// Periods are laid out from `start_date` in whole period lengths; each
    /// boundary is computed from `start_date` directly so a start on the 31st
    /// does not drift after a short month. Before `start_date` the first
    /// period is returned. A period never starts after `end_date`, and its end
    /// is clamped to `end_date`.
    pub fn current_period(budget: &Budget, today: NaiveDate) -> BudgetPeriod {
        let step = budget.period_type.months();
        let mut index = 0u32;
        loop {
            let next_start = add_months(budget.start_date, step * (index + 1));
            let past_end = budget.end_date.is_some_and(|end| next_start > end);
            if next_start > today || past_end {
                break;
            }
            index += 1;
        }

        let start = add_months(budget.start_date, step * index);
        let natural_end = add_months(budget.start_date, step * (index + 1))
            .pred_opt()
            .unwrap_or(start);
        let end = match budget.end_date {
            Some(limit) if limit < natural_end => limit.max(start),
            _ => natural_end,
        };
        BudgetPeriod { start, end }
    }

    /// Spend figures for `actual_amount` spent within `period` as of `today`.
    ///
    /// The forecast is a linear run rate: `actual / days_elapsed × total_days`.
    /// `days_elapsed` counts the days from the period start up to but not
    /// including `today`, so on 11 April a period starting 1 April has 10.
    /// It is at least one and at most the period length.
    pub fn compute_actuals(
        budget: &Budget,
        period: &BudgetPeriod,
        today: NaiveDate,
        actual_amount: Decimal,
    ) -> BudgetActuals {
        let total_days = period.total_days().max(1);
        let days_elapsed = (today - period.start).num_days().clamp(1, total_days);

        let usage_percentage = if budget.amount > Decimal::ZERO {
            (actual_amount / budget.amount * Decimal::ONE_HUNDRED).round_dp(PERCENT_PRECISION)
        } else {
            Decimal::ZERO
        };
        let forecast_end_of_period = (actual_amount / Decimal::from(days_elapsed)
            * Decimal::from(total_days))
        .round_dp(MONEY_PRECISION);

        BudgetActuals {
            actual_amount,
            remaining: budget.amount - actual_amount,
            usage_percentage,
            is_over_budget: actual_amount > budget.amount,
            forecast_end_of_period,
            alert_triggered: usage_percentage >= budget.alert_at_percentage,
            days_elapsed,
            total_days,
        }
    }

    /// Expense entries of the budget's category within `period`, converted
    /// into the budget currency.
    async fn actual_spend(&self, budget: &Budget, period: &BudgetPeriod) -> Result<Decimal> {
        let entries = self.ledger_repository.list_expenses_by_category(
            &budget.owner_id,
            &budget.category_id,
            period.start,
            period.end,
        )?;

        let mut total = Decimal::ZERO;
        for entry in &entries {
            total += self
                .converter
                .convert(entry.amount, &entry.currency, &budget.currency)
                .await;
        }
        debug!(
            "Budget {}: {} expense entr(ies) in {}..{} totalling {}",
            budget.id,
            entries.len(),
            period.start,
            period.end,
            total
        );
        Ok(total.round_dp(MONEY_PRECISION))
    }
}

#[async_trait]
impl BudgetServiceTrait for BudgetPeriodCalculator {
    async fn status(&self, budget_id: &str, today: NaiveDate) -> Result<BudgetStatus> {
        let budget = self
            .budget_repository
            .get_by_id(budget_id)?
            .ok_or_else(|| Error::NotFound(format!("Budget {}", budget_id)))?;

        let period = Self::current_period(&budget, today);
        let actual = self.actual_spend(&budget, &period).await?;
        let actuals = Self::compute_actuals(&budget, &period, today, actual);

        Ok(BudgetStatus {
            budget_id: budget.id.clone(),
            category_id: budget.category_id.clone(),
            currency: budget.currency.clone(),
            budget_amount: budget.amount,
            period,
            actuals,
        })
    }
}
