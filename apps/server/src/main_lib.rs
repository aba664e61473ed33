use std::sync::Arc;

use cashflow_core::{
    budgets::{BudgetPeriodCalculator, BudgetServiceTrait},
    credit_cards::{CreditCardBillingAggregator, CreditCardServiceTrait},
    forecast::{ForecastEngine, ForecastServiceTrait},
    fx::{ExchangeRateCache, HttpRateSource},
    recurring::{LeaseRegistry, RecurringChargeProcessor},
    scheduler::SchedulerOrchestrator,
};
use cashflow_storage_sqlite::{
    db, BalanceRepository, BudgetRepository, CreditCardRepository, ExpectedIncomeRepository,
    LedgerRepository, ObligationRepository, OwnerRepository, SqliteChargeStore,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

pub struct AppState {
    pub scheduler: Arc<SchedulerOrchestrator>,
    pub forecast_service: Arc<dyn ForecastServiceTrait>,
    pub budget_service: Arc<dyn BudgetServiceTrait>,
    pub card_service: Arc<dyn CreditCardServiceTrait>,
    pub rate_cache: Arc<ExchangeRateCache>,
}

/// Installs the global subscriber. `log` records from the library crates are
/// forwarded into tracing by `init()`.
pub fn init_tracing() {
    let log_format = std::env::var("CF_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer(pool.clone())?;

    let owner_repository = Arc::new(OwnerRepository::new(pool.clone(), writer.clone()));
    let obligation_repository = Arc::new(ObligationRepository::new(pool.clone(), writer.clone()));
    let ledger_repository = Arc::new(LedgerRepository::new(pool.clone(), writer.clone()));
    let balance_repository = Arc::new(BalanceRepository::new(pool.clone(), writer.clone()));
    let budget_repository = Arc::new(BudgetRepository::new(pool.clone(), writer.clone()));
    let card_repository = Arc::new(CreditCardRepository::new(pool.clone(), writer.clone()));
    let expected_income_repository =
        Arc::new(ExpectedIncomeRepository::new(pool.clone(), writer.clone()));
    let charge_store = Arc::new(SqliteChargeStore::new(writer));

    // One rate cache per process, shared by every projection.
    let rate_source = Arc::new(HttpRateSource::new(
        config.fx_base_url.clone(),
        config.fx_timeout,
    )?);
    let rate_cache = Arc::new(ExchangeRateCache::new(
        rate_source,
        config.rate_cache.clone(),
    ));

    // Charge and billing passes share one lease registry.
    let leases = LeaseRegistry::new();
    let charge_service = Arc::new(RecurringChargeProcessor::new(
        charge_store.clone(),
        leases.clone(),
    ));
    let card_service: Arc<dyn CreditCardServiceTrait> = Arc::new(CreditCardBillingAggregator::new(
        card_repository,
        obligation_repository.clone(),
        charge_store,
        leases,
        rate_cache.clone(),
    ));

    let scheduler = Arc::new(SchedulerOrchestrator::new(
        owner_repository.clone(),
        charge_service,
        card_service.clone(),
        config.scheduler.clone(),
    ));

    let forecast_service: Arc<dyn ForecastServiceTrait> = Arc::new(ForecastEngine::new(
        owner_repository,
        balance_repository,
        obligation_repository,
        ledger_repository.clone(),
        expected_income_repository,
        rate_cache.clone(),
    ));
    let budget_service: Arc<dyn BudgetServiceTrait> = Arc::new(BudgetPeriodCalculator::new(
        budget_repository,
        ledger_repository,
        rate_cache.clone(),
    ));

    Ok(Arc::new(AppState {
        scheduler,
        forecast_service,
        budget_service,
        card_service,
        rate_cache,
    }))
}
