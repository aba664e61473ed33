use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel::SqliteConnection;

use cashflow_core::ledger::{
    EntrySource, LedgerEntry, MaterializedHistory, NewLedgerEntry, OccurrenceLookup,
};
use cashflow_core::obligations::{Obligation, ObligationStatus};
use cashflow_core::recurring::{
    BatchJob, BatchOutcome, ChargeBatch, ChargeStoreTrait, LoadedObligations,
};
use cashflow_core::{Error, Result};

use crate::db::WriteHandle;
use crate::errors::{IntoCore, StorageError};
use crate::ledger::{insert_entry, LedgerEntryDB};
use crate::obligations::{split_rows, ObligationDB, ObligationProgressDB};
use crate::schema::{ledger_entries, obligations};
use crate::utils::{date_to_text, text_to_decimal};

/// Runs charge batches on the writer actor: one `BEGIN IMMEDIATE`
/// transaction per batch, one savepoint per item.
pub struct SqliteChargeStore {
    writer: WriteHandle,
}

impl SqliteChargeStore {
    pub fn new(writer: WriteHandle) -> Self {
        Self { writer }
    }
}

#[async_trait]
impl ChargeStoreTrait for SqliteChargeStore {
    async fn run_batch(&self, job: BatchJob) -> Result<BatchOutcome> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| {
                let mut batch = SqliteChargeBatch { conn };
                job(&mut batch)
            })
            .await
    }
}

struct SqliteChargeBatch<'a> {
    conn: &'a mut SqliteConnection,
}

fn to_lookup(row: Option<LedgerEntryDB>) -> Result<OccurrenceLookup> {
    let entry = row.map(LedgerEntry::try_from).transpose()?;
    Ok(entry.into())
}

impl ChargeBatch for SqliteChargeBatch<'_> {
    fn load_open_obligations(&mut self, owner_id: &str) -> Result<LoadedObligations> {
        let rows = obligations::table
            .filter(obligations::owner_id.eq(owner_id))
            .filter(obligations::is_active.eq(true))
            .filter(obligations::status.eq(ObligationStatus::Active.as_str()))
            .order(obligations::id.asc())
            .select(ObligationDB::as_select())
            .load::<ObligationDB>(self.conn)
            .into_core()?;
        let (decoded, unreadable) = split_rows(rows);
        Ok(LoadedObligations {
            open: decoded.into_iter().filter(|o| o.is_open()).collect(),
            unreadable,
        })
    }

    fn find_occurrence_entry(&mut self, obligation_id: &str, date: NaiveDate) -> Result<OccurrenceLookup> {
        let row = ledger_entries::table
            .filter(ledger_entries::obligation_id.eq(obligation_id))
            .filter(ledger_entries::date.eq(date_to_text(date)))
            .select(LedgerEntryDB::as_select())
            .first::<LedgerEntryDB>(self.conn)
            .optional()
            .into_core()?;
        to_lookup(row)
    }

    fn materialized_history(&mut self, obligation_id: &str) -> Result<MaterializedHistory> {
        let amounts = ledger_entries::table
            .filter(ledger_entries::obligation_id.eq(obligation_id))
            .select(ledger_entries::amount)
            .load::<String>(self.conn)
            .into_core()?;

        let mut history = MaterializedHistory::default();
        for amount in amounts {
            history.count += 1;
            history.total += text_to_decimal("ledger_entries.amount", &amount)?;
        }
        Ok(history)
    }

    fn insert_entry(&mut self, entry: NewLedgerEntry) -> Result<LedgerEntry> {
        insert_entry(self.conn, entry)
    }

    fn save_progress(&mut self, obligation: &Obligation) -> Result<()> {
        let updated = diesel::update(obligations::table.find(&obligation.id))
            .set(ObligationProgressDB::from(obligation))
            .execute(self.conn)
            .into_core()?;
        if updated == 0 {
            return Err(Error::NotFound(format!("Obligation {}", obligation.id)));
        }
        Ok(())
    }

    fn find_card_billing_entry(&mut self, credit_card_id: &str, date: NaiveDate) -> Result<OccurrenceLookup> {
        let row = ledger_entries::table
            .filter(ledger_entries::credit_card_id.eq(credit_card_id))
            .filter(ledger_entries::date.eq(date_to_text(date)))
            .filter(ledger_entries::source.eq(EntrySource::CardBilling.as_str()))
            .select(LedgerEntryDB::as_select())
            .first::<LedgerEntryDB>(self.conn)
            .optional()
            .into_core()?;
        to_lookup(row)
    }

    /// Nested diesel transactions are savepoints. The work's own error is
    /// kept instead of the rollback marker diesel reports for it.
    fn savepoint(&mut self, work: &mut dyn FnMut(&mut dyn ChargeBatch) -> Result<()>) -> Result<()> {
        let mut failure = None;
        let outcome = self.conn.transaction::<(), DieselError, _>(|conn| {
            let mut inner = SqliteChargeBatch { conn };
            work(&mut inner).map_err(|e| {
                failure = Some(e);
                DieselError::RollbackTransaction
            })
        });

        match (outcome, failure) {
            (_, Some(e)) => Err(e),
            (Ok(()), None) => Ok(()),
            (Err(e), None) => Err(StorageError::from(e).into()),
        }
    }
}
