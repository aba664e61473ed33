use crate::errors::Result;
use crate::ledger::ledger_model::{LedgerEntry, NewLedgerEntry};
use async_trait::async_trait;
use chrono::NaiveDate;

/// Trait for ledger entry repository operations.
#[async_trait]
pub trait LedgerRepositoryTrait: Send + Sync {
    /// Entries of an owner dated within `[from, to]`, ordered by date.
    fn list_between(&self, owner_id: &str, from: NaiveDate, to: NaiveDate) -> Result<Vec<LedgerEntry>>;

    /// Expense entries of an owner in one category dated within `[from, to]`.
    fn list_expenses_by_category(
        &self,
        owner_id: &str,
        category_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<LedgerEntry>>;

    fn find_by_occurrence(&self, obligation_id: &str, date: NaiveDate) -> Result<Option<LedgerEntry>>;

    /// Records a user-entered ledger entry.
    async fn create(&self, entry: NewLedgerEntry) -> Result<LedgerEntry>;
}
