#[cfg(test)]
mod tests {
    use crate::credit_cards::CreditCardBillingAggregator;
    use crate::errors::{Error, Result};
    use crate::obligations::BillingCycle;
    use crate::recurring::{
        LeaseRegistry, ProcessSummary, RecurringChargeProcessor, RecurringChargeServiceTrait,
    };
    use crate::scheduler::{RunTrigger, SchedulerConfig, SchedulerOrchestrator, SchedulerServiceTrait};
    use crate::testing::{
        card, date, fixed_expense, owner, subscription, FixedRateConverter, InMemoryStore,
    };
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use tokio::sync::Semaphore;

    fn config(workers: usize) -> SchedulerConfig {
        SchedulerConfig {
            workers,
            ..SchedulerConfig::default()
        }
    }

    fn charge_service(store: &InMemoryStore, leases: &Arc<LeaseRegistry>) -> Arc<RecurringChargeProcessor> {
        Arc::new(RecurringChargeProcessor::new(
            Arc::new(store.clone()),
            Arc::clone(leases),
        ))
    }

    fn scheduler_with(
        store: &InMemoryStore,
        charges: Arc<dyn RecurringChargeServiceTrait>,
        leases: &Arc<LeaseRegistry>,
        config: SchedulerConfig,
    ) -> SchedulerOrchestrator {
        let cards = Arc::new(CreditCardBillingAggregator::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::clone(leases),
            Arc::new(FixedRateConverter::new()),
        ));
        SchedulerOrchestrator::new(Arc::new(store.clone()), charges, cards, config)
    }

    fn scheduler(store: &InMemoryStore, config: SchedulerConfig) -> SchedulerOrchestrator {
        let leases = LeaseRegistry::new();
        scheduler_with(store, charge_service(store, &leases), &leases, config)
    }

    /// u1 pays rent on the 15th; u2 pays rent and has a card billed on the 15th.
    fn seeded_store() -> InMemoryStore {
        let store = InMemoryStore::new();
        store.add_owner(owner("u1"));
        store.add_owner(owner("u2"));
        store.add_obligation(fixed_expense("rent-1", "u1", dec!(900), 15));
        store.add_obligation(fixed_expense("rent-2", "u2", dec!(1100), 15));
        store.add_card(card("c2", "u2", dec!(3000), 15));
        let mut music = subscription("music", "u2", dec!(12), BillingCycle::Monthly, 15);
        music.credit_card_id = Some("c2".to_string());
        store.add_obligation(music);
        store
    }

    /// Delegates to a real pass except for one owner, which always fails.
    struct FailingFor {
        owner_id: String,
        inner: Arc<RecurringChargeProcessor>,
    }

    #[async_trait]
    impl RecurringChargeServiceTrait for FailingFor {
        async fn process(&self, owner_id: &str, date: NaiveDate, preview: bool) -> Result<ProcessSummary> {
            if owner_id == self.owner_id {
                return Err(Error::Unexpected("database is locked".to_string()));
            }
            self.inner.process(owner_id, date, preview).await
        }
    }

    /// Holds every pass until the gate is opened.
    struct Gated {
        gate: Arc<Semaphore>,
    }

    #[async_trait]
    impl RecurringChargeServiceTrait for Gated {
        async fn process(&self, owner_id: &str, date: NaiveDate, preview: bool) -> Result<ProcessSummary> {
            let _permit = self.gate.acquire().await.unwrap();
            Ok(ProcessSummary::new(owner_id, date, preview))
        }
    }

    #[tokio::test]
    async fn test_run_aggregates_every_owner() {
        let store = seeded_store();
        let scheduler = scheduler(&store, config(2));

        let run = scheduler.run(date(2025, 3, 15), RunTrigger::Timer).await.unwrap();

        assert_eq!(run.owners_total, 2);
        assert_eq!(run.owners_processed, 2);
        assert_eq!(run.owners_failed, 0);
        assert_eq!(run.created, 3);
        assert_eq!(run.processed, 3);
        assert_eq!(run.cards_billed, 1);
        assert_eq!(run.trigger, RunTrigger::Timer);
        assert_eq!(store.entries().len(), 3);
        assert!(store.entries().iter().any(|e| e.credit_card_id.as_deref() == Some("c2")
            && e.amount == dec!(12)));
    }

    #[tokio::test]
    async fn test_second_run_for_same_date_creates_nothing() {
        let store = seeded_store();
        let scheduler = scheduler(&store, config(1));

        scheduler.run_now(Some(date(2025, 3, 15))).await.unwrap();
        let again = scheduler.run_now(Some(date(2025, 3, 15))).await.unwrap();

        assert_eq!(again.created, 0);
        assert_eq!(again.skipped, 3);
        assert_eq!(again.trigger, RunTrigger::Manual);
        assert_eq!(store.entries().len(), 3);
    }

    #[tokio::test]
    async fn test_billing_failure_keeps_committed_charge_counts() {
        let store = seeded_store();
        store.fail_card_reads(true);
        let scheduler = scheduler(&store, config(2));

        let run = scheduler.run(date(2025, 3, 15), RunTrigger::Timer).await.unwrap();

        assert_eq!(run.owners_failed, 2);
        assert_eq!(run.owners_processed, 0);
        assert_eq!(run.created, 2);
        assert_eq!(run.cards_billed, 0);
        assert_eq!(store.entries().len(), 2);
        assert!(run.failures.iter().all(|f| f.error.contains("credit_cards is unavailable")));

        let last = scheduler.status().last_run_result.unwrap();
        assert_eq!(last.created, 2);
    }

    #[tokio::test]
    async fn test_failing_owner_does_not_stop_the_run() {
        let store = seeded_store();
        let leases = LeaseRegistry::new();
        let charges = Arc::new(FailingFor {
            owner_id: "u2".to_string(),
            inner: charge_service(&store, &leases),
        });
        let scheduler = scheduler_with(&store, charges, &leases, config(2));

        let run = scheduler.run(date(2025, 3, 15), RunTrigger::Timer).await.unwrap();

        assert_eq!(run.owners_processed, 1);
        assert_eq!(run.owners_failed, 1);
        assert_eq!(run.failures[0].owner_id, "u2");
        assert!(run.failures[0].error.contains("database is locked"));
        assert_eq!(store.entries_for("rent-1").len(), 1);
        // Billing is not attempted for an owner whose charge pass failed.
        assert!(store.entries().iter().all(|e| e.owner_id == "u1"));
    }

    #[tokio::test]
    async fn test_status_reports_last_run() {
        let store = seeded_store();
        let scheduler = scheduler(&store, config(1));

        let before = scheduler.status();
        assert!(!before.running);
        assert!(before.enabled);
        assert_eq!(before.timezone, "UTC");
        assert!(before.last_run_result.is_none());

        let run = scheduler.run_now(Some(date(2025, 3, 15))).await.unwrap();

        let after = scheduler.status();
        assert!(!after.running);
        assert_eq!(after.last_run_time, Some(run.finished_at));
        assert_eq!(after.last_run_result, Some(run));
    }

    #[tokio::test]
    async fn test_overlapping_run_is_rejected() {
        let store = seeded_store();
        let leases = LeaseRegistry::new();
        let gate = Arc::new(Semaphore::new(0));
        let charges = Arc::new(Gated {
            gate: Arc::clone(&gate),
        });
        let scheduler = Arc::new(scheduler_with(&store, charges, &leases, config(1)));

        let first = {
            let scheduler = Arc::clone(&scheduler);
            tokio::spawn(async move { scheduler.run_now(Some(date(2025, 3, 15))).await })
        };
        while !scheduler.status().running {
            tokio::task::yield_now().await;
        }

        let second = scheduler.run_now(Some(date(2025, 3, 15))).await;
        assert!(matches!(second, Err(Error::Scheduler(_))));

        gate.add_permits(10);
        let run = first.await.unwrap().unwrap();
        assert_eq!(run.owners_processed, 2);
        assert!(!scheduler.status().running);
    }

    #[tokio::test]
    async fn test_manual_process_and_preview_for_one_owner() {
        let store = seeded_store();
        let scheduler = scheduler(&store, config(1));

        let preview = scheduler.preview("u2", Some(date(2025, 3, 15))).await.unwrap();
        assert!(preview.preview);
        assert_eq!(preview.created, 2);
        assert!(store.entries().is_empty());

        let summary = scheduler
            .process("u2", Some(date(2025, 3, 15)), false)
            .await
            .unwrap();
        assert_eq!(summary.created, 2);
        assert_eq!(store.entries().len(), 2);
        assert!(store.entries_for("rent-1").is_empty());
    }

    #[tokio::test]
    async fn test_disabled_scheduler_does_not_start() {
        let store = seeded_store();
        let scheduler = Arc::new(scheduler(
            &store,
            SchedulerConfig {
                enabled: false,
                ..SchedulerConfig::default()
            },
        ));

        assert!(Arc::clone(&scheduler).start().is_none());
        let status = scheduler.status();
        assert!(!status.enabled);
        assert!(status.next_run_time.is_none());
    }
}
