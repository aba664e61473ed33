use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use log::debug;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

use super::forecast_model::{
    CashFlow, DateWindow, FlowKind, MonthlyForecast, WeeklyForecast, WhatIfForecast, WhatIfScenario,
};
use super::forecast_traits::{ExpectedIncomeRepositoryTrait, ForecastServiceTrait};
use super::projection::{
    first_negative, lowest_balance, month_windows, obligation_occurrences, project, week_windows,
};
use crate::balances::BalanceRepositoryTrait;
use crate::constants::{MAX_FORECAST_MONTHS, MAX_FORECAST_WEEKS, MONEY_PRECISION};
use crate::errors::{Error, Result, ValidationError};
use crate::fx::CurrencyConverterTrait;
use crate::ledger::{EntrySource, EntryType, LedgerRepositoryTrait};
use crate::obligations::{Obligation, ObligationRepositoryTrait};
use crate::owners::OwnerRepositoryTrait;

/// Starting point of a projection: the current balance in its currency and
/// the first date whose movements the balance does not yet include.
#[derive(Debug, Clone)]
struct Baseline {
    balance: Decimal,
    currency: String,
    effective_date: Option<NaiveDate>,
    counted_from: NaiveDate,
}

/// Projects future balances from the current snapshot, open obligations,
/// expected incomes and recorded one-time entries.
pub struct ForecastEngine {
    owner_repository: Arc<dyn OwnerRepositoryTrait>,
    balance_repository: Arc<dyn BalanceRepositoryTrait>,
    obligation_repository: Arc<dyn ObligationRepositoryTrait>,
    ledger_repository: Arc<dyn LedgerRepositoryTrait>,
    expected_income_repository: Arc<dyn ExpectedIncomeRepositoryTrait>,
    converter: Arc<dyn CurrencyConverterTrait>,
}

impl ForecastEngine {
    pub fn new(
        owner_repository: Arc<dyn OwnerRepositoryTrait>,
        balance_repository: Arc<dyn BalanceRepositoryTrait>,
        obligation_repository: Arc<dyn ObligationRepositoryTrait>,
        ledger_repository: Arc<dyn LedgerRepositoryTrait>,
        expected_income_repository: Arc<dyn ExpectedIncomeRepositoryTrait>,
        converter: Arc<dyn CurrencyConverterTrait>,
    ) -> Self {
        Self {
            owner_repository,
            balance_repository,
            obligation_repository,
            ledger_repository,
            expected_income_repository,
            converter,
        }
    }

    fn check_horizon(value: u32, max: u32, name: &str) -> Result<()> {
        if value == 0 || value > max {
            return Err(ValidationError::InvalidInput(format!(
                "{} must be between 1 and {}, got {}",
                name, max, value
            ))
            .into());
        }
        Ok(())
    }

    /// Current snapshot, or a zero balance in the owner's base currency
    /// counted from `fallback_from`.
    fn baseline(&self, owner_id: &str, fallback_from: NaiveDate) -> Result<Baseline> {
        if let Some(snapshot) = self.balance_repository.get_current(owner_id)? {
            return Ok(Baseline {
                balance: snapshot.balance,
                currency: snapshot.currency,
                effective_date: Some(snapshot.effective_date),
                counted_from: snapshot.effective_date,
            });
        }

        let owner = self
            .owner_repository
            .get_by_id(owner_id)?
            .ok_or_else(|| Error::NotFound(format!("Owner {}", owner_id)))?;
        debug!(
            "Owner {} has no balance snapshot; projecting from zero in {}",
            owner_id, owner.base_currency
        );
        Ok(Baseline {
            balance: Decimal::ZERO,
            currency: owner.base_currency,
            effective_date: None,
            counted_from: fallback_from,
        })
    }

    async fn converted(&self, amount: Decimal, from: &str, to: &str) -> Decimal {
        self.converter
            .convert(amount, from, to)
            .await
            .round_dp(MONEY_PRECISION)
    }

    /// Projected flows of `obligations`. Bounded plans are priced from the
    /// day after their latest entry in `materialized`, and never before `today`.
    async fn obligation_flows(
        &self,
        obligations: &[Obligation],
        materialized: &HashMap<&str, NaiveDate>,
        from: NaiveDate,
        to: NaiveDate,
        today: NaiveDate,
        currency: &str,
    ) -> Vec<CashFlow> {
        let mut flows = Vec::new();
        for obligation in obligations {
            let priced_from = materialized
                .get(obligation.id.as_str())
                .map_or(today, |last| today.max(*last + Duration::days(1)));
            for (date, amount) in obligation_occurrences(obligation, from, to, priced_from) {
                flows.push(CashFlow {
                    date,
                    direction: obligation.entry_type,
                    kind: FlowKind::from(obligation.kind),
                    amount: self.converted(amount, &obligation.currency, currency).await,
                });
            }
        }
        flows
    }

    /// Every movement of the owner within `[from, to]` in `currency`.
    async fn collect_flows(
        &self,
        owner_id: &str,
        from: NaiveDate,
        to: NaiveDate,
        today: NaiveDate,
        currency: &str,
    ) -> Result<Vec<CashFlow>> {
        if from > to {
            return Ok(Vec::new());
        }
        let obligations = self.obligation_repository.list_by_owner(owner_id)?;
        let entries = self.ledger_repository.list_between(owner_id, from, to)?;

        // Bounded plans count what was actually charged; open-ended items are
        // projected from their schedule instead.
        let bounded: HashMap<&str, &Obligation> = obligations
            .iter()
            .filter(|o| o.is_bounded())
            .map(|o| (o.id.as_str(), o))
            .collect();
        let mut materialized: HashMap<&str, NaiveDate> = HashMap::new();
        let mut flows = Vec::new();
        for entry in entries.iter().filter(|e| e.source == EntrySource::Obligation) {
            let Some(plan) = entry
                .obligation_id
                .as_deref()
                .and_then(|id| bounded.get(id))
            else {
                continue;
            };
            let last = materialized.entry(plan.id.as_str()).or_insert(entry.date);
            *last = (*last).max(entry.date);
            flows.push(CashFlow {
                date: entry.date,
                direction: entry.entry_type,
                kind: FlowKind::from(plan.kind),
                amount: self.converted(entry.amount, &entry.currency, currency).await,
            });
        }

        flows.extend(
            self.obligation_flows(&obligations, &materialized, from, to, today, currency)
                .await,
        );

        for income in self
            .expected_income_repository
            .list_between(owner_id, from, to)?
            .into_iter()
            .filter(|i| i.is_active)
        {
            flows.push(CashFlow {
                date: income.expected_date,
                direction: EntryType::Income,
                kind: FlowKind::ExpectedIncome,
                amount: self.converted(income.amount, &income.currency, currency).await,
            });
        }

        for entry in entries
            .iter()
            .filter(|e| e.source == EntrySource::Manual && !e.is_recurring && e.obligation_id.is_none())
        {
            flows.push(CashFlow {
                date: entry.date,
                direction: entry.entry_type,
                kind: FlowKind::OneTime,
                amount: self.converted(entry.amount, &entry.currency, currency).await,
            });
        }

        debug!(
            "Owner {}: {} projected flow(s) between {} and {}",
            owner_id,
            flows.len(),
            from,
            to
        );
        Ok(flows)
    }

    fn monthly_result(
        owner_id: &str,
        today: NaiveDate,
        baseline: &Baseline,
        opening: Decimal,
        windows: &[DateWindow],
        flows: &[CashFlow],
    ) -> MonthlyForecast {
        let months = project(opening, windows, flows);
        let first_negative_month = first_negative(&months);
        MonthlyForecast {
            owner_id: owner_id.to_string(),
            currency: baseline.currency.clone(),
            as_of: today,
            current_balance: opening,
            balance_effective_date: baseline.effective_date,
            has_negative_months: first_negative_month.is_some(),
            first_negative_month,
            lowest_balance: lowest_balance(opening, &months),
            months,
        }
    }

    /// Flows range over `windows`, starting no earlier than the snapshot.
    fn flow_range(baseline: &Baseline, windows: &[DateWindow]) -> Option<(NaiveDate, NaiveDate)> {
        let first = windows.first()?;
        let last = windows.last()?;
        Some((first.start.max(baseline.counted_from), last.end))
    }
}

#[async_trait]
impl ForecastServiceTrait for ForecastEngine {
    async fn monthly(&self, owner_id: &str, months: u32, today: NaiveDate) -> Result<MonthlyForecast> {
        Self::check_horizon(months, MAX_FORECAST_MONTHS, "months")?;
        let windows = month_windows(today, months);
        let baseline = self.baseline(owner_id, windows[0].start)?;

        let flows = match Self::flow_range(&baseline, &windows) {
            Some((from, to)) => {
                self.collect_flows(owner_id, from, to, today, &baseline.currency)
                    .await?
            }
            None => Vec::new(),
        };
        Ok(Self::monthly_result(
            owner_id,
            today,
            &baseline,
            baseline.balance,
            &windows,
            &flows,
        ))
    }

    async fn weekly(&self, owner_id: &str, weeks: u32, today: NaiveDate) -> Result<WeeklyForecast> {
        Self::check_horizon(weeks, MAX_FORECAST_WEEKS, "weeks")?;
        let windows = week_windows(today, weeks);
        let baseline = self.baseline(owner_id, today)?;

        let flows = match Self::flow_range(&baseline, &windows) {
            Some((_, to)) => {
                self.collect_flows(owner_id, baseline.counted_from, to, today, &baseline.currency)
                    .await?
            }
            None => Vec::new(),
        };
        // Week 1 opens on `today`, so movements between an older snapshot and
        // today are carried into its opening balance.
        let carried: Decimal = flows
            .iter()
            .filter(|f| f.date < today)
            .map(|f| f.direction.signed(f.amount))
            .sum();
        let opening = baseline.balance + carried;
        let weeks = project(opening, &windows, &flows);
        let first_negative_week = first_negative(&weeks);

        Ok(WeeklyForecast {
            owner_id: owner_id.to_string(),
            currency: baseline.currency.clone(),
            as_of: today,
            current_balance: baseline.balance,
            balance_effective_date: baseline.effective_date,
            has_negative_weeks: first_negative_week.is_some(),
            first_negative_week,
            lowest_balance: lowest_balance(opening, &weeks),
            weeks,
        })
    }

    async fn what_if(
        &self,
        owner_id: &str,
        months: u32,
        today: NaiveDate,
        scenario: WhatIfScenario,
    ) -> Result<WhatIfForecast> {
        Self::check_horizon(months, MAX_FORECAST_MONTHS, "months")?;
        if scenario.monthly_income < Decimal::ZERO || scenario.monthly_expenses < Decimal::ZERO {
            return Err(ValidationError::InvalidInput(
                "Monthly what-if adjustments must not be negative".to_string(),
            )
            .into());
        }
        for obligation in &scenario.additional_obligations {
            obligation.validate()?;
        }

        let windows = month_windows(today, months);
        let baseline = self.baseline(owner_id, windows[0].start)?;
        let Some((from, to)) = Self::flow_range(&baseline, &windows) else {
            return Err(Error::Unexpected("Empty projection horizon".to_string()));
        };

        let flows = self
            .collect_flows(owner_id, from, to, today, &baseline.currency)
            .await?;
        let mut scenario_flows = flows.clone();
        scenario_flows.extend(
            self.obligation_flows(
                &scenario.additional_obligations,
                &HashMap::new(),
                from,
                to,
                today,
                &baseline.currency,
            )
            .await,
        );
        for window in &windows {
            let date = window.start.max(from);
            for (direction, amount) in [
                (EntryType::Income, scenario.monthly_income),
                (EntryType::Expense, scenario.monthly_expenses),
            ] {
                if amount > Decimal::ZERO {
                    scenario_flows.push(CashFlow {
                        date,
                        direction,
                        kind: FlowKind::Adjustment,
                        amount,
                    });
                }
            }
        }

        let baseline_forecast =
            Self::monthly_result(owner_id, today, &baseline, baseline.balance, &windows, &flows);
        let scenario_forecast = Self::monthly_result(
            owner_id,
            today,
            &baseline,
            baseline.balance + scenario.balance_adjustment,
            &windows,
            &scenario_flows,
        );

        let closing = |f: &MonthlyForecast| {
            f.months
                .last()
                .map_or(f.current_balance, |m| m.closing_balance)
        };
        Ok(WhatIfForecast {
            final_balance_difference: closing(&scenario_forecast) - closing(&baseline_forecast),
            baseline: baseline_forecast,
            scenario: scenario_forecast,
        })
    }
}
