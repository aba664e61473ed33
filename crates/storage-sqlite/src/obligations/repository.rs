use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;

use cashflow_core::obligations::{Obligation, ObligationRepositoryTrait};
use cashflow_core::Result;

use super::model::{decode_rows, ObligationDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::obligations;

pub struct ObligationRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl ObligationRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl ObligationRepositoryTrait for ObligationRepository {
    fn get_by_id(&self, obligation_id: &str) -> Result<Option<Obligation>> {
        let mut conn = get_connection(&self.pool)?;
        let row = obligations::table
            .find(obligation_id)
            .select(ObligationDB::as_select())
            .first::<ObligationDB>(&mut conn)
            .optional()
            .into_core()?;
        Ok(row.map(Obligation::try_from).transpose()?)
    }

    fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Obligation>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = obligations::table
            .filter(obligations::owner_id.eq(owner_id))
            .order(obligations::id.asc())
            .select(ObligationDB::as_select())
            .load::<ObligationDB>(&mut conn)
            .into_core()?;
        Ok(decode_rows(rows))
    }

    fn list_by_credit_card(&self, credit_card_id: &str) -> Result<Vec<Obligation>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = obligations::table
            .filter(obligations::credit_card_id.eq(credit_card_id))
            .order(obligations::id.asc())
            .select(ObligationDB::as_select())
            .load::<ObligationDB>(&mut conn)
            .into_core()?;
        Ok(decode_rows(rows))
    }

    async fn create(&self, obligation: Obligation) -> Result<Obligation> {
        obligation.validate()?;
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Obligation> {
                let saved = diesel::insert_into(obligations::table)
                    .values(ObligationDB::from(&obligation))
                    .returning(ObligationDB::as_returning())
                    .get_result(conn)
                    .into_core()?;
                Ok(Obligation::try_from(saved)?)
            })
            .await
    }
}
