//! Database model for balance snapshots.

use diesel::prelude::*;

use cashflow_core::balances::BalanceSnapshot;

use crate::errors::StorageError;
use crate::utils::{date_to_text, decimal_to_text, text_to_date, text_to_decimal};

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::balance_snapshots)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BalanceSnapshotDB {
    pub id: String,
    pub owner_id: String,
    pub balance: String,
    pub currency: String,
    pub effective_date: String,
    pub is_current: bool,
}

impl TryFrom<BalanceSnapshotDB> for BalanceSnapshot {
    type Error = StorageError;

    fn try_from(db: BalanceSnapshotDB) -> Result<Self, Self::Error> {
        Ok(Self {
            balance: text_to_decimal("balance_snapshots.balance", &db.balance)?,
            effective_date: text_to_date("balance_snapshots.effective_date", &db.effective_date)?,
            id: db.id,
            owner_id: db.owner_id,
            currency: db.currency,
            is_current: db.is_current,
        })
    }
}

impl From<&BalanceSnapshot> for BalanceSnapshotDB {
    fn from(domain: &BalanceSnapshot) -> Self {
        Self {
            id: domain.id.clone(),
            owner_id: domain.owner_id.clone(),
            balance: decimal_to_text(domain.balance),
            currency: domain.currency.clone(),
            effective_date: date_to_text(domain.effective_date),
            is_current: domain.is_current,
        }
    }
}
