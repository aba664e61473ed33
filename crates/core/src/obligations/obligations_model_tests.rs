#[cfg(test)]
mod tests {
    use crate::obligations::{BillingCycle, ObligationKind, ObligationStatus};
    use crate::testing::{date, fixed_expense, installment, loan, subscription};
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    #[test]
    fn test_day_31_obligation_is_due_on_last_day_of_short_months() {
        let rent = fixed_expense("rent", "u1", dec!(1000), 31);

        assert!(rent.is_due_on(date(2025, 4, 30)));
        assert!(!rent.is_due_on(date(2025, 4, 29)));
        assert!(rent.is_due_on(date(2025, 2, 28)));
        assert!(rent.is_due_on(date(2024, 2, 29)));
        assert!(!rent.is_due_on(date(2024, 2, 28)));
        assert!(rent.is_due_on(date(2025, 3, 31)));
    }

    #[test]
    fn test_not_due_outside_start_and_end() {
        let mut gym = fixed_expense("gym", "u1", dec!(50), 5);
        gym.start_date = date(2025, 3, 1);
        gym.end_date = Some(date(2025, 5, 31));

        assert!(!gym.is_due_on(date(2025, 2, 5)));
        assert!(gym.is_due_on(date(2025, 3, 5)));
        assert!(gym.is_due_on(date(2025, 5, 5)));
        assert!(!gym.is_due_on(date(2025, 6, 5)));
    }

    #[test]
    fn test_quarterly_subscription_bills_every_third_month() {
        let mut plan = subscription("s1", "u1", dec!(30), BillingCycle::Quarterly, 10);
        plan.start_date = date(2025, 1, 10);

        assert!(plan.is_due_on(date(2025, 1, 10)));
        assert!(!plan.is_due_on(date(2025, 2, 10)));
        assert!(!plan.is_due_on(date(2025, 3, 10)));
        assert!(plan.is_due_on(date(2025, 4, 10)));
        assert!(plan.is_due_on(date(2026, 1, 10)));
    }

    #[test]
    fn test_annual_subscription_monthly_equivalent() {
        let annual = subscription("s1", "u1", dec!(1200), BillingCycle::Annual, 1);
        assert_eq!(annual.monthly_equivalent(), dec!(100));

        let quarterly = subscription("s2", "u1", dec!(30), BillingCycle::Quarterly, 1);
        assert_eq!(quarterly.monthly_equivalent(), dec!(10));

        // Non-subscriptions contribute their per-occurrence amount.
        assert_eq!(fixed_expense("f", "u1", dec!(75), 1).monthly_equivalent(), dec!(75));
        assert_eq!(BillingCycle::SemiAnnual.monthly_equivalent(dec!(600)), dec!(100));
    }

    #[test]
    fn test_installment_completion_tracks_occurrences() {
        let mut plan = installment("i1", "u1", dec!(1000), 3, 15);
        assert_eq!(plan.amount, dec!(333.33));
        assert!(plan.is_open());
        assert_eq!(plan.remaining_occurrences(), Some(3));

        plan.occurrences_completed = 3;
        assert!(plan.is_complete());
        assert!(!plan.is_open());
        assert!(plan.is_final_occurrence(3));
    }

    #[test]
    fn test_loan_completes_when_balance_is_gone() {
        let mut car = loan("l1", "u1", dec!(5000), dec!(0), dec!(500), 10, 1);
        assert!(!car.is_complete());

        car.loan.as_mut().unwrap().remaining_balance = dec!(0);
        assert!(car.is_complete());
    }

    #[test]
    fn test_fixed_items_never_complete() {
        let mut salary = fixed_expense("f", "u1", dec!(10), 1);
        salary.occurrences_completed = 500;
        assert!(!salary.is_complete());

        salary.status = ObligationStatus::Completed;
        assert!(salary.is_complete());
    }

    #[test]
    fn test_validate_rejects_malformed_obligations() {
        let mut bad_day = fixed_expense("f", "u1", dec!(10), 1);
        bad_day.day_of_month = 32;
        assert!(bad_day.validate().is_err());

        let mut zero = fixed_expense("f", "u1", dec!(10), 1);
        zero.amount = dec!(0);
        assert!(zero.validate().is_err());

        let mut overrun = installment("i", "u1", dec!(100), 2, 1);
        overrun.occurrences_completed = 3;
        assert!(overrun.validate().is_err());

        let mut no_cycle = subscription("s", "u1", dec!(10), BillingCycle::Monthly, 1);
        no_cycle.billing_cycle = None;
        assert!(no_cycle.validate().is_err());

        let mut income_loan = loan("l", "u1", dec!(100), dec!(0), dec!(10), 10, 1);
        income_loan.entry_type = crate::ledger::EntryType::Income;
        assert!(income_loan.validate().is_err());

        assert!(installment("i", "u1", dec!(100), 2, 1).validate().is_ok());
    }

    #[test]
    fn test_kind_round_trips_through_its_storage_name() {
        for kind in [
            ObligationKind::Loan,
            ObligationKind::Installment,
            ObligationKind::FixedItem,
            ObligationKind::Subscription,
        ] {
            assert_eq!(ObligationKind::from_str(kind.as_str()).unwrap(), kind);
        }
        assert!(ObligationKind::from_str("MORTGAGE").is_err());
    }
}
