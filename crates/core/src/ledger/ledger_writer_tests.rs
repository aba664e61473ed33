#[cfg(test)]
mod tests {
    use crate::ledger::{EntrySource, EntryType, MaterializedHistory, ObligationLedgerWriter};
    use crate::testing::{date, fixed_expense, fixed_income, installment, loan};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[test]
    fn test_installment_final_occurrence_absorbs_rounding() {
        let mut plan = installment("i1", "u1", dec!(1000), 3, 15);
        let mut amounts = Vec::new();

        for n in 0..3u32 {
            plan.occurrences_completed = n;
            let history = MaterializedHistory {
                count: n,
                total: amounts.iter().copied().sum(),
            };
            let charge =
                ObligationLedgerWriter::compute_charge(&plan, date(2025, 1 + n, 15), Some(history))
                    .unwrap();
            assert_eq!(charge.occurrence_number, Some(n + 1));
            assert_eq!(charge.is_final, n == 2);
            amounts.push(charge.amount);
        }

        assert_eq!(amounts, vec![dec!(333.33), dec!(333.33), dec!(333.34)]);
        assert_eq!(amounts.iter().copied().sum::<Decimal>(), dec!(1000));
    }

    #[test]
    fn test_final_occurrence_without_history_uses_per_occurrence_product() {
        let mut plan = installment("i1", "u1", dec!(1000), 3, 15);
        plan.occurrences_completed = 2;

        let charge = ObligationLedgerWriter::compute_charge(&plan, date(2025, 3, 15), None).unwrap();
        assert_eq!(charge.amount, dec!(333.34));
    }

    #[test]
    fn test_final_occurrence_follows_actual_charges_after_mid_series_edit() {
        let mut plan = installment("i1", "u1", dec!(1000), 3, 15);
        plan.occurrences_completed = 2;
        // Per-occurrence amount edited after two occurrences were charged at 333.33.
        plan.amount = dec!(350);

        let history = MaterializedHistory {
            count: 2,
            total: dec!(666.66),
        };
        let charge =
            ObligationLedgerWriter::compute_charge(&plan, date(2025, 3, 15), Some(history)).unwrap();
        assert_eq!(charge.amount, dec!(333.34));

        // History that does not account for every prior occurrence is not trusted.
        let partial = MaterializedHistory {
            count: 1,
            total: dec!(333.33),
        };
        let charge =
            ObligationLedgerWriter::compute_charge(&plan, date(2025, 3, 15), Some(partial)).unwrap();
        assert_eq!(charge.amount, dec!(300));
    }

    #[test]
    fn test_final_occurrence_with_nothing_left_is_rejected() {
        let mut plan = installment("i1", "u1", dec!(1000), 3, 15);
        plan.amount = dec!(600);
        plan.occurrences_completed = 2;

        assert!(ObligationLedgerWriter::compute_charge(&plan, date(2025, 3, 15), None).is_err());
    }

    #[test]
    fn test_completed_plan_cannot_be_charged() {
        let mut plan = installment("i1", "u1", dec!(1000), 3, 15);
        plan.occurrences_completed = 3;

        assert!(ObligationLedgerWriter::compute_charge(&plan, date(2025, 4, 15), None).is_err());
    }

    #[test]
    fn test_loan_payment_splits_interest_and_principal() {
        let car = loan("l1", "u1", dec!(1200), dec!(0.12), dec!(500), 3, 1);

        let charge = ObligationLedgerWriter::compute_charge(&car, date(2025, 1, 1), None).unwrap();
        assert_eq!(charge.amount, dec!(500));
        assert_eq!(charge.interest, Some(dec!(12)));
        assert_eq!(charge.principal, Some(dec!(488)));
        assert!(!charge.is_final);
    }

    #[test]
    fn test_loan_final_payment_pays_off_balance_and_interest() {
        let mut car = loan("l1", "u1", dec!(1200), dec!(0.12), dec!(500), 3, 1);
        car.occurrences_completed = 2;
        car.loan.as_mut().unwrap().remaining_balance = dec!(219.98);

        let charge = ObligationLedgerWriter::compute_charge(&car, date(2025, 3, 1), None).unwrap();
        // 219.98 * 0.12 / 12 = 2.1998 -> 2.20
        assert_eq!(charge.interest, Some(dec!(2.20)));
        assert_eq!(charge.amount, dec!(222.18));
        assert_eq!(charge.principal, Some(dec!(219.98)));
        assert!(charge.is_final);
    }

    #[test]
    fn test_interest_free_loan_final_payment_uses_principal_as_total() {
        let mut loan_plan = loan("l1", "u1", dec!(1000), dec!(0), dec!(333.33), 3, 1);
        loan_plan.occurrences_completed = 2;

        let charge =
            ObligationLedgerWriter::compute_charge(&loan_plan, date(2025, 3, 1), None).unwrap();
        assert_eq!(charge.amount, dec!(333.34));
        assert_eq!(charge.interest, Some(dec!(0)));
        assert_eq!(charge.principal, Some(dec!(333.34)));
    }

    #[test]
    fn test_open_ended_item_charges_its_amount() {
        let rent = fixed_expense("rent", "u1", dec!(1500), 1);
        let charge = ObligationLedgerWriter::compute_charge(&rent, date(2025, 6, 1), None).unwrap();

        assert_eq!(charge.amount, dec!(1500));
        assert_eq!(charge.occurrence_number, None);
        assert!(!charge.is_final);
    }

    #[test]
    fn test_entry_fields_carry_obligation_linkage() {
        let mut plan = installment("i1", "u1", dec!(1000), 3, 15);
        plan.occurrences_completed = 1;
        plan.credit_card_id = Some("card-1".to_string());
        let charge = ObligationLedgerWriter::compute_charge(&plan, date(2025, 2, 15), None).unwrap();

        let entry = ObligationLedgerWriter::entry_for(&plan, &charge);
        assert_eq!(entry.description.as_deref(), Some("Obligation i1 (2/3)"));
        assert_eq!(entry.obligation_id.as_deref(), Some("i1"));
        assert_eq!(entry.occurrence_number, Some(2));
        assert_eq!(entry.category_id.as_deref(), Some("cat-housing"));
        assert_eq!(entry.account_id.as_deref(), Some("acc-checking"));
        assert_eq!(entry.credit_card_id.as_deref(), Some("card-1"));
        assert_eq!(entry.source, EntrySource::Obligation);
        assert_eq!(entry.entry_type, EntryType::Expense);
        assert!(entry.is_recurring);

        let salary = fixed_income("sal", "u1", dec!(9000), 25);
        let charge = ObligationLedgerWriter::compute_charge(&salary, date(2025, 2, 25), None).unwrap();
        let entry = ObligationLedgerWriter::entry_for(&salary, &charge);
        assert_eq!(entry.entry_type, EntryType::Income);
        assert_eq!(entry.description.as_deref(), Some("Obligation sal"));
    }
}
