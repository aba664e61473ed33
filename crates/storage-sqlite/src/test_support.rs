//! Temporary database and fixtures for storage tests.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tempfile::TempDir;

use cashflow_core::ledger::EntryType;
use cashflow_core::obligations::{Obligation, ObligationKind, ObligationStatus};
use cashflow_core::owners::{Owner, OwnerRepositoryTrait};

use crate::db::{create_pool, init, run_migrations, spawn_writer, DbPool, WriteHandle};
use crate::owners::OwnerRepository;

/// A migrated database in a temporary directory, removed on drop.
pub struct TestDb {
    _dir: TempDir,
    pub pool: Arc<DbPool>,
    pub writer: WriteHandle,
}

impl TestDb {
    pub async fn open() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cashflow.db");
        let db_path = init(path.to_str().unwrap()).unwrap();
        let pool = create_pool(&db_path).unwrap();
        run_migrations(&pool).unwrap();
        let writer = spawn_writer(Arc::clone(&pool)).unwrap();
        Self {
            _dir: dir,
            pool,
            writer,
        }
    }

    pub async fn with_owner(owner_id: &str) -> Self {
        let db = Self::open().await;
        OwnerRepository::new(Arc::clone(&db.pool), db.writer.clone())
            .create(Owner {
                id: owner_id.to_string(),
                name: format!("Owner {}", owner_id),
                base_currency: "USD".to_string(),
                is_active: true,
            })
            .await
            .unwrap();
        db
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn fixed_expense(id: &str, owner_id: &str, amount: Decimal, day: u32) -> Obligation {
    Obligation {
        id: id.to_string(),
        owner_id: owner_id.to_string(),
        kind: ObligationKind::FixedItem,
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

pub fn installment(id: &str, owner_id: &str, total: Decimal, occurrences: u32, day: u32) -> Obligation {
    Obligation {
        kind: ObligationKind::Installment,
        amount: Obligation::per_occurrence_from_total(total, occurrences),
        total_amount: Some(total),
        occurrences_total: Some(occurrences),
        ..fixed_expense(id, owner_id, total, day)
    }
}
