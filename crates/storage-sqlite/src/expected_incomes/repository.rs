use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::error;
use std::sync::Arc;

use cashflow_core::forecast::{ExpectedIncome, ExpectedIncomeRepositoryTrait};
use cashflow_core::Result;

use super::model::ExpectedIncomeDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::expected_incomes;
use crate::utils::date_to_text;

pub struct ExpectedIncomeRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl ExpectedIncomeRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl ExpectedIncomeRepositoryTrait for ExpectedIncomeRepository {
    fn list_between(&self, owner_id: &str, from: NaiveDate, to: NaiveDate) -> Result<Vec<ExpectedIncome>> {
        let mut conn = get_connection(&self.pool)?;
        // ISO dates order lexicographically.
        let rows = expected_incomes::table
            .filter(expected_incomes::owner_id.eq(owner_id))
            .filter(expected_incomes::is_active.eq(true))
            .filter(expected_incomes::expected_date.ge(date_to_text(from)))
            .filter(expected_incomes::expected_date.le(date_to_text(to)))
            .order(expected_incomes::expected_date.asc())
            .select(ExpectedIncomeDB::as_select())
            .load::<ExpectedIncomeDB>(&mut conn)
            .into_core()?;
        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let id = row.id.clone();
                ExpectedIncome::try_from(row)
                    .inspect_err(|e| error!("Skipping unreadable expected income {}: {}", id, e))
                    .ok()
            })
            .collect())
    }

    async fn create(&self, income: ExpectedIncome) -> Result<ExpectedIncome> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<ExpectedIncome> {
                diesel::insert_into(expected_incomes::table)
                    .values(ExpectedIncomeDB::from(&income))
                    .execute(conn)
                    .into_core()?;
                Ok(income)
            })
            .await
    }
}
