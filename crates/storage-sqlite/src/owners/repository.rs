use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;

use cashflow_core::owners::{Owner, OwnerRepositoryTrait};
use cashflow_core::Result;

use super::model::OwnerDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::owners;

pub struct OwnerRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl OwnerRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl OwnerRepositoryTrait for OwnerRepository {
    fn get_by_id(&self, owner_id: &str) -> Result<Option<Owner>> {
        let mut conn = get_connection(&self.pool)?;
        let row = owners::table
            .find(owner_id)
            .select(OwnerDB::as_select())
            .first::<OwnerDB>(&mut conn)
            .optional()
            .into_core()?;
        Ok(row.map(Owner::from))
    }

    fn list_active(&self) -> Result<Vec<Owner>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = owners::table
            .filter(owners::is_active.eq(true))
            .order(owners::id.asc())
            .select(OwnerDB::as_select())
            .load::<OwnerDB>(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(Owner::from).collect())
    }

    async fn create(&self, owner: Owner) -> Result<Owner> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Owner> {
                let row: OwnerDB = owner.into();
                let saved = diesel::insert_into(owners::table)
                    .values(&row)
                    .returning(OwnerDB::as_returning())
                    .get_result(conn)
                    .into_core()?;
                Ok(Owner::from(saved))
            })
            .await
    }
}
