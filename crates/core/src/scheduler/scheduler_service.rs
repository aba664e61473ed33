use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use super::scheduler_model::{
    OwnerJob, RunSummary, RunTrigger, SchedulerConfig, SchedulerStatus,
};
use super::timer::{initial_fire, next_fire_after, reference_date_of, within_grace};
use crate::credit_cards::CreditCardServiceTrait;
use crate::errors::{Error, Result};
use crate::owners::OwnerRepositoryTrait;
use crate::recurring::{ProcessSummary, RecurringChargeServiceTrait};
use crate::utils::time_utils::business_date_from_utc;

#[derive(Debug, Default)]
struct SchedulerState {
    next_run_time: Option<DateTime<Utc>>,
    last_run_time: Option<DateTime<Utc>>,
    last_run_result: Option<RunSummary>,
}

/// Clears the running flag when a run ends, however it ends.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// What one owner's passes left behind. A failed billing pass still carries
/// the charge pass that had already committed.
enum OwnerOutcome {
    Done(ProcessSummary),
    Failed {
        committed: Option<ProcessSummary>,
        error: Error,
    },
}

#[async_trait]
pub trait SchedulerServiceTrait: Send + Sync {
    /// Charge and billing passes for one owner.
    async fn process(
        &self,
        owner_id: &str,
        reference_date: Option<NaiveDate>,
        preview: bool,
    ) -> Result<ProcessSummary>;

    async fn preview(&self, owner_id: &str, reference_date: Option<NaiveDate>) -> Result<ProcessSummary> {
        self.process(owner_id, reference_date, true).await
    }

    /// Full run across every active owner, as the timer does it.
    async fn run_now(&self, reference_date: Option<NaiveDate>) -> Result<RunSummary>;

    fn status(&self) -> SchedulerStatus;
}

/// Fires the daily run and fans it out as one job per owner over a small
/// worker pool. Runs are `Idle → Running → Idle`; a second full run while
/// one is in flight is refused.
pub struct SchedulerOrchestrator {
    owner_repository: Arc<dyn OwnerRepositoryTrait>,
    charge_service: Arc<dyn RecurringChargeServiceTrait>,
    card_service: Arc<dyn CreditCardServiceTrait>,
    config: SchedulerConfig,
    running: AtomicBool,
    state: RwLock<SchedulerState>,
}

impl SchedulerOrchestrator {
    pub fn new(
        owner_repository: Arc<dyn OwnerRepositoryTrait>,
        charge_service: Arc<dyn RecurringChargeServiceTrait>,
        card_service: Arc<dyn CreditCardServiceTrait>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            owner_repository,
            charge_service,
            card_service,
            config,
            running: AtomicBool::new(false),
            state: RwLock::new(SchedulerState::default()),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Business date of `now` in the scheduler's time zone.
    pub fn today(&self) -> NaiveDate {
        business_date_from_utc(Utc::now(), self.config.timezone)
    }

    fn read_state(&self) -> RwLockReadGuard<'_, SchedulerState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, SchedulerState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Every pass for one owner. The billing pass only runs once the charge
    /// pass committed.
    async fn run_owner(&self, owner_id: &str, date: NaiveDate, preview: bool) -> Result<ProcessSummary> {
        match self.run_owner_passes(owner_id, date, preview).await {
            OwnerOutcome::Done(summary) => Ok(summary),
            OwnerOutcome::Failed { error, .. } => Err(error),
        }
    }

    async fn run_owner_passes(&self, owner_id: &str, date: NaiveDate, preview: bool) -> OwnerOutcome {
        let mut summary = match self.charge_service.process(owner_id, date, preview).await {
            Ok(summary) => summary,
            Err(error) => {
                return OwnerOutcome::Failed {
                    committed: None,
                    error,
                }
            }
        };
        match self
            .card_service
            .bill_due_cards(owner_id, date, preview)
            .await
        {
            Ok(billing) => {
                summary.absorb(billing);
                OwnerOutcome::Done(summary)
            }
            Err(error) => OwnerOutcome::Failed {
                committed: Some(summary),
                error,
            },
        }
    }

    /// Pulls jobs off the shared queue until it is closed and drained.
    async fn worker(
        &self,
        worker_id: usize,
        jobs: &Mutex<mpsc::Receiver<OwnerJob>>,
        results: mpsc::UnboundedSender<(OwnerJob, OwnerOutcome)>,
    ) {
        loop {
            let next = jobs.lock().await.recv().await;
            let Some(job) = next else {
                debug!("Scheduler worker {} drained the queue", worker_id);
                return;
            };
            let result = self
                .run_owner_passes(&job.owner_id, job.reference_date, false)
                .await;
            if results.send((job, result)).is_err() {
                return;
            }
        }
    }

    /// Runs every active owner for `date`.
    pub async fn run(&self, date: NaiveDate, trigger: RunTrigger) -> Result<RunSummary> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(Error::Scheduler("A run is already in progress".to_string()));
        }
        let _running = RunningGuard(&self.running);

        let started_at = Utc::now();
        let mut run = RunSummary::new(date, trigger, started_at);
        info!("Scheduler run started for {} ({:?})", date, trigger);

        let owners = match self.owner_repository.list_active() {
            Ok(owners) => owners,
            Err(e) => {
                error!("Scheduler run for {} could not list owners: {}", date, e);
                return Err(e);
            }
        };
        run.owners_total = owners.len();

        let (job_tx, job_rx) = mpsc::channel(owners.len().max(1));
        for owner in &owners {
            let job = OwnerJob {
                owner_id: owner.id.clone(),
                reference_date: date,
            };
            if job_tx.send(job).await.is_err() {
                return Err(Error::Scheduler("Job queue closed unexpectedly".to_string()));
            }
        }
        drop(job_tx);

        let jobs = Mutex::new(job_rx);
        let (result_tx, mut result_rx) = mpsc::unbounded_channel();
        let workers = self.config.workers.clamp(1, owners.len().max(1));
        futures::future::join_all(
            (0..workers).map(|id| self.worker(id, &jobs, result_tx.clone())),
        )
        .await;
        drop(result_tx);

        while let Some((job, result)) = result_rx.recv().await {
            match result {
                OwnerOutcome::Done(summary) => run.record_owner(&summary),
                OwnerOutcome::Failed { committed, error: e } => {
                    error!(
                        "Scheduler run for {}: owner {} failed: {}",
                        date, job.owner_id, e
                    );
                    match committed {
                        Some(summary) => {
                            run.record_partial_failure(&job.owner_id, &summary, e.to_string())
                        }
                        None => run.record_failure(&job.owner_id, e.to_string()),
                    }
                }
            }
        }

        run.finished_at = Utc::now();
        info!(
            "Scheduler run for {} finished: owners={} failed_owners={} created={} skipped={} deferred={} failed={} cards_billed={}",
            date,
            run.owners_processed,
            run.owners_failed,
            run.created,
            run.skipped,
            run.deferred,
            run.failed,
            run.cards_billed
        );

        let mut state = self.write_state();
        state.last_run_time = Some(run.finished_at);
        state.last_run_result = Some(run.clone());
        Ok(run)
    }

    fn set_next_run(&self, next: Option<DateTime<Utc>>) {
        self.write_state().next_run_time = next;
    }

    /// Spawns the daily timer. A fire that wakes later than the misfire
    /// grace is skipped; an overlapping manual run makes the fire a no-op
    /// through the per-occurrence idempotency checks.
    pub fn start(self: Arc<Self>) -> Option<JoinHandle<()>> {
        if !self.config.enabled {
            info!("Daily scheduler disabled");
            self.set_next_run(None);
            return None;
        }

        let handle = tokio::spawn(async move {
            let cfg = self.config.clone();
            let mut scheduled = initial_fire(Utc::now(), cfg.fire_time, cfg.timezone, cfg.misfire_grace);
            info!(
                "Daily scheduler started: {} {} (next fire {})",
                cfg.fire_time, cfg.timezone, scheduled
            );

            loop {
                self.set_next_run(Some(scheduled));
                let wait = (scheduled - Utc::now()).to_std().unwrap_or_default();
                tokio::time::sleep(wait).await;

                let now = Utc::now();
                if within_grace(scheduled, now, cfg.misfire_grace) {
                    let date = reference_date_of(scheduled, cfg.timezone);
                    if let Err(e) = self.run(date, RunTrigger::Timer).await {
                        warn!("Scheduled run for {} did not complete: {}", date, e);
                    }
                } else {
                    warn!(
                        "Skipping run scheduled for {}: woke at {}, beyond the misfire grace",
                        scheduled, now
                    );
                }
                scheduled = next_fire_after(now.max(scheduled), cfg.fire_time, cfg.timezone);
            }
        });
        Some(handle)
    }
}

#[async_trait]
impl SchedulerServiceTrait for SchedulerOrchestrator {
    async fn process(
        &self,
        owner_id: &str,
        reference_date: Option<NaiveDate>,
        preview: bool,
    ) -> Result<ProcessSummary> {
        let date = reference_date.unwrap_or_else(|| self.today());
        self.run_owner(owner_id, date, preview).await
    }

    async fn run_now(&self, reference_date: Option<NaiveDate>) -> Result<RunSummary> {
        let date = reference_date.unwrap_or_else(|| self.today());
        self.run(date, RunTrigger::Manual).await
    }

    fn status(&self) -> SchedulerStatus {
        let state = self.read_state();
        SchedulerStatus {
            running: self.running.load(Ordering::SeqCst),
            enabled: self.config.enabled,
            timezone: self.config.timezone.name().to_string(),
            fire_time: self.config.fire_time,
            next_run_time: state.next_run_time,
            last_run_time: state.last_run_time,
            last_run_result: state.last_run_result.clone(),
        }
    }
}
