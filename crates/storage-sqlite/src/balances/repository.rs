use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::debug;
use std::sync::Arc;
use uuid::Uuid;

use cashflow_core::balances::{BalanceRepositoryTrait, BalanceSnapshot};
use cashflow_core::Result;

use super::model::BalanceSnapshotDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::balance_snapshots;

pub struct BalanceRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl BalanceRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl BalanceRepositoryTrait for BalanceRepository {
    fn get_current(&self, owner_id: &str) -> Result<Option<BalanceSnapshot>> {
        let mut conn = get_connection(&self.pool)?;
        let row = balance_snapshots::table
            .filter(balance_snapshots::owner_id.eq(owner_id))
            .filter(balance_snapshots::is_current.eq(true))
            .select(BalanceSnapshotDB::as_select())
            .first::<BalanceSnapshotDB>(&mut conn)
            .optional()
            .into_core()?;
        Ok(row.map(BalanceSnapshot::try_from).transpose()?)
    }

    /// Demotes the previous current snapshot and inserts the new one in the
    /// same transaction, so an owner never has two current snapshots.
    async fn record(&self, snapshot: BalanceSnapshot) -> Result<BalanceSnapshot> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<BalanceSnapshot> {
                let snapshot = BalanceSnapshot {
                    id: if snapshot.id.is_empty() {
                        Uuid::new_v4().to_string()
                    } else {
                        snapshot.id
                    },
                    is_current: true,
                    ..snapshot
                };

                let demoted = diesel::update(
                    balance_snapshots::table
                        .filter(balance_snapshots::owner_id.eq(&snapshot.owner_id))
                        .filter(balance_snapshots::is_current.eq(true)),
                )
                .set(balance_snapshots::is_current.eq(false))
                .execute(conn)
                .into_core()?;
                debug!(
                    "Owner {}: {} previous snapshot(s) no longer current",
                    snapshot.owner_id, demoted
                );

                diesel::insert_into(balance_snapshots::table)
                    .values(BalanceSnapshotDB::from(&snapshot))
                    .execute(conn)
                    .into_core()?;
                Ok(snapshot)
            })
            .await
    }
}
