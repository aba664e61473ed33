//! Pure projection arithmetic shared by the monthly, weekly and what-if
//! forecasts.

use chrono::{Duration, NaiveDate};
use log::warn;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use super::forecast_model::{CashFlow, DateWindow, PeriodProjection};
use crate::ledger::{EntryType, ObligationLedgerWriter};
use crate::obligations::{Obligation, ObligationKind};
use crate::recurring::RecurringChargeProcessor;
use crate::utils::time_utils::{add_months, month_end, month_start, occurrences_between};

/// Calendar months starting with the one containing `today`.
pub fn month_windows(today: NaiveDate, months: u32) -> Vec<DateWindow> {
    let first = month_start(today);
    (0..months)
        .map(|i| {
            let start = add_months(first, i);
            DateWindow {
                start,
                end: month_end(start),
            }
        })
        .collect()
}

/// Consecutive 7-day windows starting on `today`.
pub fn week_windows(today: NaiveDate, weeks: u32) -> Vec<DateWindow> {
    (0..weeks)
        .map(|i| {
            let start = today + Duration::days(7 * i as i64);
            DateWindow {
                start,
                end: start + Duration::days(6),
            }
        })
        .collect()
}

/// Dated amounts, in the obligation currency, that `obligation` moves within
/// `[from, to]`.
///
/// Bounded plans are priced occurrence by occurrence from `priced_from` on,
/// so the rounding-absorbing final payment and loan payoff land where they
/// will be charged and nothing is projected past completion. Their earlier
/// dates are left to the ledger entries actually written for them.
pub fn obligation_occurrences(
    obligation: &Obligation,
    from: NaiveDate,
    to: NaiveDate,
    priced_from: NaiveDate,
) -> Vec<(NaiveDate, Decimal)> {
    if !obligation.is_active {
        return Vec::new();
    }
    let lo = from.max(obligation.start_date);
    let hi = obligation.end_date.map_or(to, |end| end.min(to));
    let dates = occurrences_between(obligation.day_of_month, lo, hi);

    match obligation.kind {
        ObligationKind::FixedItem => dates.into_iter().map(|d| (d, obligation.amount)).collect(),
        ObligationKind::Subscription => dates
            .into_iter()
            .filter(|d| obligation.is_due_on(*d))
            .map(|d| (d, obligation.amount))
            .collect(),
        ObligationKind::Loan | ObligationKind::Installment => {
            let mut plan = obligation.clone();
            let mut out = Vec::new();
            for date in dates.into_iter().filter(|d| *d >= priced_from) {
                if plan.is_complete() {
                    break;
                }
                match ObligationLedgerWriter::compute_charge(&plan, date, None) {
                    Ok(charge) => {
                        out.push((date, charge.amount));
                        plan = RecurringChargeProcessor::advance_progress(&plan, &charge);
                    }
                    Err(e) => {
                        warn!(
                            "Leaving obligation {} out of the projection from {}: {}",
                            obligation.id, date, e
                        );
                        break;
                    }
                }
            }
            out
        }
    }
}

/// Buckets `flows` into `windows` and chains the balances: each window
/// closes at `opening + income − expenses` and the next opens there.
/// Flows outside every window are ignored.
pub fn project(opening_balance: Decimal, windows: &[DateWindow], flows: &[CashFlow]) -> Vec<PeriodProjection> {
    let mut balance = opening_balance;
    let mut periods = Vec::with_capacity(windows.len());

    for (i, window) in windows.iter().enumerate() {
        let mut income_breakdown: BTreeMap<_, Decimal> = BTreeMap::new();
        let mut expense_breakdown: BTreeMap<_, Decimal> = BTreeMap::new();

        for flow in flows.iter().filter(|f| window.contains(f.date)) {
            let bucket = match flow.direction {
                EntryType::Income => &mut income_breakdown,
                EntryType::Expense => &mut expense_breakdown,
            };
            *bucket.entry(flow.kind).or_default() += flow.amount;
        }

        let total_income: Decimal = income_breakdown.values().copied().sum();
        let total_expenses: Decimal = expense_breakdown.values().copied().sum();
        let net_change = total_income - total_expenses;
        let opening = balance;
        balance = opening + net_change;

        periods.push(PeriodProjection {
            index: i as u32 + 1,
            start: window.start,
            end: window.end,
            opening_balance: opening,
            income_breakdown,
            expense_breakdown,
            total_income,
            total_expenses,
            net_change,
            closing_balance: balance,
        });
    }
    periods
}

/// 1-based index of the first period closing below zero.
pub fn first_negative(periods: &[PeriodProjection]) -> Option<u32> {
    periods
        .iter()
        .find(|p| p.closing_balance < Decimal::ZERO)
        .map(|p| p.index)
}

/// Lowest closing balance, or `opening` when there are no periods.
pub fn lowest_balance(opening: Decimal, periods: &[PeriodProjection]) -> Decimal {
    periods
        .iter()
        .map(|p| p.closing_balance)
        .fold(opening, Decimal::min)
}
