//! In-memory persistence collaborator and fixtures for unit tests.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::balances::{BalanceRepositoryTrait, BalanceSnapshot};
use crate::budgets::{Budget, BudgetPeriodType, BudgetRepositoryTrait};
use crate::credit_cards::{CreditCard, CreditCardRepositoryTrait};
use crate::errors::{DatabaseError, Error, Result};
use crate::forecast::{ExpectedIncome, ExpectedIncomeRepositoryTrait};
use crate::fx::CurrencyConverterTrait;
use crate::ledger::{
    EntrySource, EntryType, LedgerEntry, LedgerRepositoryTrait, MaterializedHistory,
    NewLedgerEntry, OccurrenceLookup,
};
use crate::obligations::{
    BillingCycle, LoanTerms, Obligation, ObligationKind, ObligationRepositoryTrait,
    ObligationStatus,
};
use crate::owners::{Owner, OwnerRepositoryTrait};
use crate::recurring::{BatchJob, BatchOutcome, ChargeBatch, ChargeStoreTrait, LoadedObligations};

#[derive(Debug, Clone, Default)]
pub struct MemoryData {
    pub owners: Vec<Owner>,
    pub obligations: Vec<Obligation>,
    pub entries: Vec<LedgerEntry>,
    pub snapshots: Vec<BalanceSnapshot>,
    pub budgets: Vec<Budget>,
    pub cards: Vec<CreditCard>,
    pub incomes: Vec<ExpectedIncome>,
}

/// Shared in-memory tables. Batches work on a copy that replaces the tables
/// only on commit; savepoints restore the copy on error.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    data: Arc<Mutex<MemoryData>>,
    failing_inserts: Arc<Mutex<HashSet<String>>>,
    fail_commit: Arc<AtomicBool>,
    fail_card_reads: Arc<AtomicBool>,
    batches: Arc<AtomicUsize>,
    writer: Arc<tokio::sync::Mutex<()>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data(&self) -> MemoryData {
        self.data.lock().unwrap().clone()
    }

    pub fn add_owner(&self, owner: Owner) {
        self.data.lock().unwrap().owners.push(owner);
    }

    pub fn add_obligation(&self, obligation: Obligation) {
        self.data.lock().unwrap().obligations.push(obligation);
    }

    pub fn add_entry(&self, entry: LedgerEntry) {
        self.data.lock().unwrap().entries.push(entry);
    }

    pub fn add_snapshot(&self, snapshot: BalanceSnapshot) {
        self.data.lock().unwrap().snapshots.push(snapshot);
    }

    pub fn add_budget(&self, budget: Budget) {
        self.data.lock().unwrap().budgets.push(budget);
    }

    pub fn add_card(&self, card: CreditCard) {
        self.data.lock().unwrap().cards.push(card);
    }

    pub fn add_income(&self, income: ExpectedIncome) {
        self.data.lock().unwrap().incomes.push(income);
    }

    pub fn entries(&self) -> Vec<LedgerEntry> {
        self.data.lock().unwrap().entries.clone()
    }

    pub fn entries_for(&self, obligation_id: &str) -> Vec<LedgerEntry> {
        self.entries()
            .into_iter()
            .filter(|e| e.obligation_id.as_deref() == Some(obligation_id))
            .collect()
    }

    pub fn obligation(&self, obligation_id: &str) -> Obligation {
        self.data
            .lock()
            .unwrap()
            .obligations
            .iter()
            .find(|o| o.id == obligation_id)
            .cloned()
            .expect("obligation exists")
    }

    /// Makes every insert for this obligation fail with a query error.
    pub fn fail_inserts_for(&self, obligation_id: &str) {
        self.failing_inserts
            .lock()
            .unwrap()
            .insert(obligation_id.to_string());
    }

    /// Makes every following batch fail at commit time.
    pub fn fail_commits(&self, fail: bool) {
        self.fail_commit.store(fail, Ordering::SeqCst);
    }

    /// Makes listing an owner's cards fail with a database error.
    pub fn fail_card_reads(&self, fail: bool) {
        self.fail_card_reads.store(fail, Ordering::SeqCst);
    }

    pub fn batch_count(&self) -> usize {
        self.batches.load(Ordering::SeqCst)
    }
}

struct MemoryBatch {
    data: MemoryData,
    failing_inserts: HashSet<String>,
}

impl ChargeBatch for MemoryBatch {
    fn load_open_obligations(&mut self, owner_id: &str) -> Result<LoadedObligations> {
        let open: Vec<Obligation> = self
            .data
            .obligations
            .iter()
            .filter(|o| o.owner_id == owner_id && o.is_open())
            .cloned()
            .collect();
        Ok(open.into())
    }

    fn find_occurrence_entry(&mut self, obligation_id: &str, date: NaiveDate) -> Result<OccurrenceLookup> {
        Ok(self
            .data
            .entries
            .iter()
            .find(|e| e.obligation_id.as_deref() == Some(obligation_id) && e.date == date)
            .cloned()
            .into())
    }

    fn materialized_history(&mut self, obligation_id: &str) -> Result<MaterializedHistory> {
        Ok(self
            .data
            .entries
            .iter()
            .filter(|e| e.obligation_id.as_deref() == Some(obligation_id))
            .fold(MaterializedHistory::default(), |h, e| MaterializedHistory {
                count: h.count + 1,
                total: h.total + e.amount,
            }))
    }

    fn insert_entry(&mut self, entry: NewLedgerEntry) -> Result<LedgerEntry> {
        if let Some(obligation_id) = entry.obligation_id.as_deref() {
            if self.failing_inserts.contains(obligation_id) {
                return Err(DatabaseError::QueryFailed(format!(
                    "insert for obligation {} rejected",
                    obligation_id
                ))
                .into());
            }
            if self
                .data
                .entries
                .iter()
                .any(|e| e.obligation_id.as_deref() == Some(obligation_id) && e.date == entry.date)
            {
                return Err(DatabaseError::UniqueViolation(format!(
                    "ledger_entries({}, {})",
                    obligation_id, entry.date
                ))
                .into());
            }
        }
        let id = entry
            .id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let created = entry.into_entry(id, Utc::now());
        self.data.entries.push(created.clone());
        Ok(created)
    }

    fn save_progress(&mut self, obligation: &Obligation) -> Result<()> {
        let slot = self
            .data
            .obligations
            .iter_mut()
            .find(|o| o.id == obligation.id)
            .ok_or_else(|| Error::NotFound(format!("Obligation {}", obligation.id)))?;
        *slot = obligation.clone();
        Ok(())
    }

    fn find_card_billing_entry(&mut self, credit_card_id: &str, date: NaiveDate) -> Result<OccurrenceLookup> {
        Ok(self
            .data
            .entries
            .iter()
            .find(|e| {
                e.source == EntrySource::CardBilling
                    && e.credit_card_id.as_deref() == Some(credit_card_id)
                    && e.date == date
            })
            .cloned()
            .into())
    }

    fn savepoint(&mut self, work: &mut dyn FnMut(&mut dyn ChargeBatch) -> Result<()>) -> Result<()> {
        let before = self.data.clone();
        let result = work(self);
        if result.is_err() {
            self.data = before;
        }
        result
    }
}

#[async_trait]
impl ChargeStoreTrait for InMemoryStore {
    async fn run_batch(&self, job: BatchJob) -> Result<BatchOutcome> {
        let _writer = self.writer.lock().await;
        self.batches.fetch_add(1, Ordering::SeqCst);

        let mut batch = MemoryBatch {
            data: self.data.lock().unwrap().clone(),
            failing_inserts: self.failing_inserts.lock().unwrap().clone(),
        };
        let outcome = job(&mut batch)?;
        if self.fail_commit.load(Ordering::SeqCst) {
            return Err(DatabaseError::TransactionFailed("commit failed".to_string()).into());
        }
        *self.data.lock().unwrap() = batch.data;
        Ok(outcome)
    }
}

#[async_trait]
impl ObligationRepositoryTrait for InMemoryStore {
    fn get_by_id(&self, obligation_id: &str) -> Result<Option<Obligation>> {
        Ok(self
            .data
            .lock()
            .unwrap()
            .obligations
            .iter()
            .find(|o| o.id == obligation_id)
            .cloned())
    }

    fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Obligation>> {
        Ok(self
            .data
            .lock()
            .unwrap()
            .obligations
            .iter()
            .filter(|o| o.owner_id == owner_id)
            .cloned()
            .collect())
    }

    fn list_by_credit_card(&self, credit_card_id: &str) -> Result<Vec<Obligation>> {
        Ok(self
            .data
            .lock()
            .unwrap()
            .obligations
            .iter()
            .filter(|o| o.credit_card_id.as_deref() == Some(credit_card_id))
            .cloned()
            .collect())
    }

    async fn create(&self, obligation: Obligation) -> Result<Obligation> {
        self.add_obligation(obligation.clone());
        Ok(obligation)
    }
}

#[async_trait]
impl LedgerRepositoryTrait for InMemoryStore {
    fn list_between(&self, owner_id: &str, from: NaiveDate, to: NaiveDate) -> Result<Vec<LedgerEntry>> {
        let mut entries: Vec<_> = self
            .entries()
            .into_iter()
            .filter(|e| e.owner_id == owner_id && e.date >= from && e.date <= to)
            .collect();
        entries.sort_by_key(|e| e.date);
        Ok(entries)
    }

    fn list_expenses_by_category(
        &self,
        owner_id: &str,
        category_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<LedgerEntry>> {
        Ok(LedgerRepositoryTrait::list_between(self, owner_id, from, to)?
            .into_iter()
            .filter(|e| {
                e.entry_type == EntryType::Expense && e.category_id.as_deref() == Some(category_id)
            })
            .collect())
    }

    fn find_by_occurrence(&self, obligation_id: &str, date: NaiveDate) -> Result<Option<LedgerEntry>> {
        Ok(self
            .entries()
            .into_iter()
            .find(|e| e.obligation_id.as_deref() == Some(obligation_id) && e.date == date))
    }

    async fn create(&self, entry: NewLedgerEntry) -> Result<LedgerEntry> {
        entry.validate()?;
        let id = entry
            .id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let created = entry.into_entry(id, Utc::now());
        self.add_entry(created.clone());
        Ok(created)
    }
}

#[async_trait]
impl OwnerRepositoryTrait for InMemoryStore {
    fn get_by_id(&self, owner_id: &str) -> Result<Option<Owner>> {
        Ok(self
            .data
            .lock()
            .unwrap()
            .owners
            .iter()
            .find(|o| o.id == owner_id)
            .cloned())
    }

    fn list_active(&self) -> Result<Vec<Owner>> {
        Ok(self
            .data
            .lock()
            .unwrap()
            .owners
            .iter()
            .filter(|o| o.is_active)
            .cloned()
            .collect())
    }

    async fn create(&self, owner: Owner) -> Result<Owner> {
        self.add_owner(owner.clone());
        Ok(owner)
    }
}

#[async_trait]
impl BalanceRepositoryTrait for InMemoryStore {
    fn get_current(&self, owner_id: &str) -> Result<Option<BalanceSnapshot>> {
        Ok(self
            .data
            .lock()
            .unwrap()
            .snapshots
            .iter()
            .find(|s| s.owner_id == owner_id && s.is_current)
            .cloned())
    }

    async fn record(&self, snapshot: BalanceSnapshot) -> Result<BalanceSnapshot> {
        let mut data = self.data.lock().unwrap();
        for existing in data.snapshots.iter_mut().filter(|s| s.owner_id == snapshot.owner_id) {
            existing.is_current = false;
        }
        let current = BalanceSnapshot {
            is_current: true,
            ..snapshot
        };
        data.snapshots.push(current.clone());
        Ok(current)
    }
}

#[async_trait]
impl BudgetRepositoryTrait for InMemoryStore {
    fn get_by_id(&self, budget_id: &str) -> Result<Option<Budget>> {
        Ok(self
            .data
            .lock()
            .unwrap()
            .budgets
            .iter()
            .find(|b| b.id == budget_id)
            .cloned())
    }

    fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Budget>> {
        Ok(self
            .data
            .lock()
            .unwrap()
            .budgets
            .iter()
            .filter(|b| b.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn create(&self, budget: Budget) -> Result<Budget> {
        self.add_budget(budget.clone());
        Ok(budget)
    }
}

#[async_trait]
impl CreditCardRepositoryTrait for InMemoryStore {
    fn get_by_id(&self, credit_card_id: &str) -> Result<Option<CreditCard>> {
        Ok(self
            .data
            .lock()
            .unwrap()
            .cards
            .iter()
            .find(|c| c.id == credit_card_id)
            .cloned())
    }

    fn list_by_owner(&self, owner_id: &str) -> Result<Vec<CreditCard>> {
        if self.fail_card_reads.load(Ordering::SeqCst) {
            return Err(Error::Database(DatabaseError::QueryFailed(
                "credit_cards is unavailable".to_string(),
            )));
        }
        Ok(self
            .data
            .lock()
            .unwrap()
            .cards
            .iter()
            .filter(|c| c.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn create(&self, card: CreditCard) -> Result<CreditCard> {
        self.add_card(card.clone());
        Ok(card)
    }
}

#[async_trait]
impl ExpectedIncomeRepositoryTrait for InMemoryStore {
    fn list_between(&self, owner_id: &str, from: NaiveDate, to: NaiveDate) -> Result<Vec<ExpectedIncome>> {
        Ok(self
            .data
            .lock()
            .unwrap()
            .incomes
            .iter()
            .filter(|i| {
                i.owner_id == owner_id && i.is_active && i.expected_date >= from && i.expected_date <= to
            })
            .cloned()
            .collect())
    }

    async fn create(&self, income: ExpectedIncome) -> Result<ExpectedIncome> {
        self.add_income(income.clone());
        Ok(income)
    }
}

/// Converter with fixed rates; unknown pairs convert one to one.
#[derive(Default)]
pub struct FixedRateConverter {
    rates: HashMap<(String, String), Decimal>,
}

impl FixedRateConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rate(mut self, from: &str, to: &str, rate: Decimal) -> Self {
        self.rates.insert((from.to_string(), to.to_string()), rate);
        self
    }
}

#[async_trait]
impl CurrencyConverterTrait for FixedRateConverter {
    async fn rate(&self, from: &str, to: &str) -> Decimal {
        if from == to {
            return Decimal::ONE;
        }
        self.rates
            .get(&(from.to_string(), to.to_string()))
            .copied()
            .unwrap_or(Decimal::ONE)
    }
}

// --- Fixtures ---

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn owner(id: &str) -> Owner {
    Owner {
        id: id.to_string(),
        name: format!("Owner {}", id),
        base_currency: "USD".to_string(),
        is_active: true,
    }
}

fn obligation(id: &str, owner_id: &str, kind: ObligationKind, amount: Decimal, day: u32) -> Obligation {
    Obligation {
        id: id.to_string(),
        owner_id: owner_id.to_string(),
        kind,
        name: format!("Obligation {}", id),
        entry_type: EntryType::Expense,
        amount,
        total_amount: None,
        currency: "USD".to_string(),
        day_of_month: day,
        start_date: date(2024, 1, 1),
        end_date: None,
        occurrences_completed: 0,
        occurrences_total: None,
        is_active: true,
        status: ObligationStatus::Active,
        category_id: Some("cat-housing".to_string()),
        account_id: Some("acc-checking".to_string()),
        credit_card_id: None,
        billing_cycle: None,
        loan: None,
        updated_at: Utc::now(),
    }
}

pub fn fixed_expense(id: &str, owner_id: &str, amount: Decimal, day: u32) -> Obligation {
    obligation(id, owner_id, ObligationKind::FixedItem, amount, day)
}

pub fn fixed_income(id: &str, owner_id: &str, amount: Decimal, day: u32) -> Obligation {
    Obligation {
        entry_type: EntryType::Income,
        ..obligation(id, owner_id, ObligationKind::FixedItem, amount, day)
    }
}

/// Installment plan splitting `total` over `occurrences`.
pub fn installment(id: &str, owner_id: &str, total: Decimal, occurrences: u32, day: u32) -> Obligation {
    Obligation {
        total_amount: Some(total),
        occurrences_total: Some(occurrences),
        ..obligation(
            id,
            owner_id,
            ObligationKind::Installment,
            Obligation::per_occurrence_from_total(total, occurrences),
            day,
        )
    }
}

pub fn loan(
    id: &str,
    owner_id: &str,
    principal: Decimal,
    annual_rate: Decimal,
    payment: Decimal,
    payments: u32,
    day: u32,
) -> Obligation {
    Obligation {
        occurrences_total: Some(payments),
        loan: Some(LoanTerms {
            principal,
            annual_interest_rate: annual_rate,
            remaining_balance: principal,
        }),
        ..obligation(id, owner_id, ObligationKind::Loan, payment, day)
    }
}

pub fn subscription(id: &str, owner_id: &str, amount: Decimal, cycle: BillingCycle, day: u32) -> Obligation {
    Obligation {
        billing_cycle: Some(cycle),
        ..obligation(id, owner_id, ObligationKind::Subscription, amount, day)
    }
}

pub fn card(id: &str, owner_id: &str, limit: Decimal, billing_day: u32) -> CreditCard {
    CreditCard {
        id: id.to_string(),
        owner_id: owner_id.to_string(),
        name: format!("Card {}", id),
        credit_limit: limit,
        billing_day,
        currency: "USD".to_string(),
        linked_account_id: Some("acc-checking".to_string()),
        is_active: true,
    }
}

pub fn snapshot(owner_id: &str, balance: Decimal, effective_date: NaiveDate) -> BalanceSnapshot {
    BalanceSnapshot {
        id: format!("snap-{}", owner_id),
        owner_id: owner_id.to_string(),
        balance,
        currency: "USD".to_string(),
        effective_date,
        is_current: true,
    }
}

pub fn monthly_budget(id: &str, owner_id: &str, category_id: &str, amount: Decimal, start: NaiveDate) -> Budget {
    Budget {
        id: id.to_string(),
        owner_id: owner_id.to_string(),
        name: format!("Budget {}", id),
        category_id: category_id.to_string(),
        period_type: BudgetPeriodType::Monthly,
        amount,
        currency: "USD".to_string(),
        start_date: start,
        end_date: None,
        alert_at_percentage: Decimal::from(80),
        is_active: true,
    }
}

pub fn manual_entry(
    owner_id: &str,
    entry_type: EntryType,
    amount: Decimal,
    on: NaiveDate,
    category_id: Option<&str>,
) -> LedgerEntry {
    LedgerEntry {
        id: uuid::Uuid::new_v4().to_string(),
        owner_id: owner_id.to_string(),
        entry_type,
        amount,
        currency: "USD".to_string(),
        date: on,
        category_id: category_id.map(str::to_string),
        account_id: None,
        credit_card_id: None,
        description: None,
        obligation_id: None,
        occurrence_number: None,
        is_recurring: false,
        source: EntrySource::Manual,
        created_at: Utc::now(),
    }
}
