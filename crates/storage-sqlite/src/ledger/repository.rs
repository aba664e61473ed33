use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;
use uuid::Uuid;

use cashflow_core::ledger::{EntryType, LedgerEntry, LedgerRepositoryTrait, NewLedgerEntry};
use cashflow_core::Result;

use super::model::{decode_entries, LedgerEntryDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::ledger_entries;
use crate::utils::date_to_text;

pub struct LedgerRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl LedgerRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

/// Inserts `entry` with a fresh id. Shared by the repository and the
/// charge batch.
pub(crate) fn insert_entry(conn: &mut SqliteConnection, entry: NewLedgerEntry) -> Result<LedgerEntry> {
    entry.validate()?;
    let id = entry
        .id
        .clone()
        .unwrap_or_else(|| Uuid::now_v7().to_string());
    let created = entry.into_entry(id, Utc::now());
    diesel::insert_into(ledger_entries::table)
        .values(LedgerEntryDB::from(&created))
        .execute(conn)
        .into_core()?;
    Ok(created)
}

#[async_trait]
impl LedgerRepositoryTrait for LedgerRepository {
    fn list_between(&self, owner_id: &str, from: NaiveDate, to: NaiveDate) -> Result<Vec<LedgerEntry>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = ledger_entries::table
            .filter(ledger_entries::owner_id.eq(owner_id))
            .filter(ledger_entries::date.ge(date_to_text(from)))
            .filter(ledger_entries::date.le(date_to_text(to)))
            .order((ledger_entries::date.asc(), ledger_entries::created_at.asc()))
            .select(LedgerEntryDB::as_select())
            .load::<LedgerEntryDB>(&mut conn)
            .into_core()?;
        Ok(decode_entries(rows)?)
    }

    fn list_expenses_by_category(
        &self,
        owner_id: &str,
        category_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<LedgerEntry>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = ledger_entries::table
            .filter(ledger_entries::owner_id.eq(owner_id))
            .filter(ledger_entries::category_id.eq(category_id))
            .filter(ledger_entries::entry_type.eq(EntryType::Expense.as_str()))
            .filter(ledger_entries::date.ge(date_to_text(from)))
            .filter(ledger_entries::date.le(date_to_text(to)))
            .order(ledger_entries::date.asc())
            .select(LedgerEntryDB::as_select())
            .load::<LedgerEntryDB>(&mut conn)
            .into_core()?;
        Ok(decode_entries(rows)?)
    }

    fn find_by_occurrence(&self, obligation_id: &str, date: NaiveDate) -> Result<Option<LedgerEntry>> {
        let mut conn = get_connection(&self.pool)?;
        let row = ledger_entries::table
            .filter(ledger_entries::obligation_id.eq(obligation_id))
            .filter(ledger_entries::date.eq(date_to_text(date)))
            .select(LedgerEntryDB::as_select())
            .first::<LedgerEntryDB>(&mut conn)
            .optional()
            .into_core()?;
        Ok(row.map(LedgerEntry::try_from).transpose()?)
    }

    async fn create(&self, entry: NewLedgerEntry) -> Result<LedgerEntry> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| insert_entry(conn, entry))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cashflow_core::ledger::EntrySource;
    use crate::test_support::{date, TestDb};
    use rust_decimal_macros::dec;

    fn entry(entry_type: EntryType, on: NaiveDate, category: &str) -> NewLedgerEntry {
        NewLedgerEntry {
            id: None,
            owner_id: "u1".to_string(),
            entry_type,
            amount: dec!(42.5),
            currency: "USD".to_string(),
            date: on,
            category_id: Some(category.to_string()),
            account_id: None,
            credit_card_id: None,
            description: Some("groceries".to_string()),
            obligation_id: None,
            occurrence_number: None,
            is_recurring: false,
            source: EntrySource::Manual,
        }
    }

    #[tokio::test]
    async fn test_category_expenses_within_range() {
        let db = TestDb::with_owner("u1").await;
        let repo = LedgerRepository::new(Arc::clone(&db.pool), db.writer.clone());
        repo.create(entry(EntryType::Expense, date(2025, 3, 5), "food")).await.unwrap();
        repo.create(entry(EntryType::Expense, date(2025, 3, 31), "food")).await.unwrap();
        repo.create(entry(EntryType::Expense, date(2025, 4, 1), "food")).await.unwrap();
        repo.create(entry(EntryType::Income, date(2025, 3, 10), "food")).await.unwrap();
        repo.create(entry(EntryType::Expense, date(2025, 3, 10), "fuel")).await.unwrap();

        let spent = repo
            .list_expenses_by_category("u1", "food", date(2025, 3, 1), date(2025, 3, 31))
            .unwrap();

        assert_eq!(spent.len(), 2);
        assert!(spent.iter().all(|e| e.amount == dec!(42.5)));
        assert_eq!(spent[0].date, date(2025, 3, 5));
        assert_eq!(repo.list_between("u1", date(2025, 3, 1), date(2025, 3, 31)).unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_non_positive_amounts_are_rejected() {
        let db = TestDb::with_owner("u1").await;
        let repo = LedgerRepository::new(Arc::clone(&db.pool), db.writer.clone());
        let mut bad = entry(EntryType::Expense, date(2025, 3, 5), "food");
        bad.amount = dec!(0);

        assert!(repo.create(bad).await.is_err());
    }
}
