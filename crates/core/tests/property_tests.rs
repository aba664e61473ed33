//! Property-based tests for the scheduling and projection arithmetic.
//!
//! Random plans, dates and flows are generated with `proptest`; each test
//! states a property that must hold for every generated input.

use cashflow_core::budgets::{Budget, BudgetPeriodCalculator, BudgetPeriodType};
use cashflow_core::credit_cards::CreditCardBillingAggregator;
use cashflow_core::forecast::projection::{month_windows, project};
use cashflow_core::forecast::{CashFlow, FlowKind};
use cashflow_core::ledger::{EntryType, MaterializedHistory, ObligationLedgerWriter};
use cashflow_core::obligations::{Obligation, ObligationKind, ObligationStatus};
use cashflow_core::recurring::RecurringChargeProcessor;
use cashflow_core::utils::time_utils::is_due_on;
use chrono::{Datelike, Duration, NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

// =============================================================================
// Generators
// =============================================================================

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (0i64..3650).prop_map(|offset| NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + Duration::days(offset))
}

fn arb_period_type() -> impl Strategy<Value = BudgetPeriodType> {
    prop_oneof![
        Just(BudgetPeriodType::Monthly),
        Just(BudgetPeriodType::Quarterly),
        Just(BudgetPeriodType::Annual),
    ]
}

/// An installment plan whose total is at least one unit per occurrence.
fn arb_plan() -> impl Strategy<Value = (Decimal, u32)> {
    (1u32..=36).prop_flat_map(|n| {
        (i64::from(n) * 100..=5_000_000i64).prop_map(move |cents| (Decimal::new(cents, 2), n))
    })
}

fn arb_flow() -> impl Strategy<Value = CashFlow> {
    (0i64..120, any::<bool>(), 1i64..500_000).prop_map(|(offset, income, cents)| CashFlow {
        date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap() + Duration::days(offset),
        direction: if income {
            EntryType::Income
        } else {
            EntryType::Expense
        },
        kind: FlowKind::OneTime,
        amount: Decimal::new(cents, 2),
    })
}

fn installment(total: Decimal, occurrences: u32) -> Obligation {
    Obligation {
        id: "plan".to_string(),
        owner_id: "owner".to_string(),
        kind: ObligationKind::Installment,
        name: "Plan".to_string(),
        entry_type: EntryType::Expense,
        amount: Obligation::per_occurrence_from_total(total, occurrences),
        total_amount: Some(total),
        currency: "USD".to_string(),
        day_of_month: 10,
        start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        end_date: None,
        occurrences_completed: 0,
        occurrences_total: Some(occurrences),
        is_active: true,
        status: ObligationStatus::Active,
        category_id: None,
        account_id: None,
        credit_card_id: None,
        billing_cycle: None,
        loan: None,
        updated_at: Utc::now(),
    }
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    /// Materializing every occurrence of a plan charges exactly its total and
    /// leaves it completed.
    #[test]
    fn installment_occurrences_sum_to_total((total, n) in arb_plan()) {
        let mut obligation = installment(total, n);
        let mut history = MaterializedHistory { count: 0, total: Decimal::ZERO };
        let date = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();

        for _ in 0..n {
            let charge = ObligationLedgerWriter::compute_charge(&obligation, date, Some(history)).unwrap();
            prop_assert!(charge.amount > Decimal::ZERO);
            history = MaterializedHistory {
                count: history.count + 1,
                total: history.total + charge.amount,
            };
            obligation = RecurringChargeProcessor::advance_progress(&obligation, &charge);
        }

        prop_assert_eq!(history.total, total);
        prop_assert_eq!(obligation.status, ObligationStatus::Completed);
        prop_assert!(ObligationLedgerWriter::compute_charge(&obligation, date, Some(history)).is_err());
    }

    /// Exactly one day of every month is due, however long the month.
    #[test]
    fn one_due_day_per_month(day_of_month in 1u32..=31, anchor in arb_date()) {
        let first = anchor.with_day(1).unwrap();
        let due = (0..31)
            .map(|d| first + Duration::days(d))
            .filter(|d| d.month() == first.month())
            .filter(|d| is_due_on(day_of_month, *d))
            .count();
        prop_assert_eq!(due, 1);
    }

    /// The current period of an open-ended budget always contains today.
    #[test]
    fn budget_period_contains_today(
        period_type in arb_period_type(),
        start in arb_date(),
        offset in 0i64..2000,
    ) {
        let today = start + Duration::days(offset);
        let budget = Budget {
            id: "b".to_string(),
            owner_id: "owner".to_string(),
            name: "Groceries".to_string(),
            category_id: "food".to_string(),
            period_type,
            amount: Decimal::new(1000, 0),
            currency: "USD".to_string(),
            start_date: start,
            end_date: None,
            alert_at_percentage: Decimal::new(80, 0),
            is_active: true,
        };
        let period = BudgetPeriodCalculator::current_period(&budget, today);
        prop_assert!(period.start <= today && today <= period.end);
        prop_assert!(period.start >= start);
    }

    /// The next statement lands on the billing day within a month of today.
    #[test]
    fn next_billing_is_upcoming(billing_day in 1u32..=28, today in arb_date()) {
        let next = CreditCardBillingAggregator::next_billing_date(billing_day, today);
        prop_assert!(next >= today);
        prop_assert!(next < today + Duration::days(32));
        prop_assert_eq!(next.day(), billing_day);
    }

    /// Closing balances chain into the next opening balance.
    #[test]
    fn projections_chain(
        opening_cents in -1_000_000i64..1_000_000,
        flows in prop::collection::vec(arb_flow(), 0..40),
        months in 1u32..=4,
    ) {
        let opening = Decimal::new(opening_cents, 2);
        let windows = month_windows(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), months);
        let periods = project(opening, &windows, &flows);

        prop_assert_eq!(periods.len(), months as usize);
        let mut expected_opening = opening;
        for period in &periods {
            prop_assert_eq!(period.opening_balance, expected_opening);
            prop_assert_eq!(
                period.closing_balance,
                period.opening_balance + period.total_income - period.total_expenses
            );
            expected_opening = period.closing_balance;
        }
    }
}
