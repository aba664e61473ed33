use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::error;
use std::sync::Arc;

use cashflow_core::budgets::{Budget, BudgetRepositoryTrait};
use cashflow_core::Result;

use super::model::BudgetDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::budgets;

pub struct BudgetRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl BudgetRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl BudgetRepositoryTrait for BudgetRepository {
    fn get_by_id(&self, budget_id: &str) -> Result<Option<Budget>> {
        let mut conn = get_connection(&self.pool)?;
        let row = budgets::table
            .find(budget_id)
            .select(BudgetDB::as_select())
            .first::<BudgetDB>(&mut conn)
            .optional()
            .into_core()?;
        Ok(row.map(Budget::try_from).transpose()?)
    }

    fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Budget>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = budgets::table
            .filter(budgets::owner_id.eq(owner_id))
            .order(budgets::name.asc())
            .select(BudgetDB::as_select())
            .load::<BudgetDB>(&mut conn)
            .into_core()?;
        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let id = row.id.clone();
                Budget::try_from(row)
                    .inspect_err(|e| error!("Skipping unreadable budget {}: {}", id, e))
                    .ok()
            })
            .collect())
    }

    async fn create(&self, budget: Budget) -> Result<Budget> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Budget> {
                diesel::insert_into(budgets::table)
                    .values(BudgetDB::from(&budget))
                    .execute(conn)
                    .into_core()?;
                Ok(budget)
            })
            .await
    }
}
