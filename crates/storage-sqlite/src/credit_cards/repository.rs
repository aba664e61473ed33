use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::error;
use std::sync::Arc;

use cashflow_core::credit_cards::{CreditCard, CreditCardRepositoryTrait};
use cashflow_core::Result;

use super::model::CreditCardDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::credit_cards;

pub struct CreditCardRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl CreditCardRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl CreditCardRepositoryTrait for CreditCardRepository {
    fn get_by_id(&self, credit_card_id: &str) -> Result<Option<CreditCard>> {
        let mut conn = get_connection(&self.pool)?;
        let row = credit_cards::table
            .find(credit_card_id)
            .select(CreditCardDB::as_select())
            .first::<CreditCardDB>(&mut conn)
            .optional()
            .into_core()?;
        Ok(row.map(CreditCard::try_from).transpose()?)
    }

    fn list_by_owner(&self, owner_id: &str) -> Result<Vec<CreditCard>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = credit_cards::table
            .filter(credit_cards::owner_id.eq(owner_id))
            .order(credit_cards::id.asc())
            .select(CreditCardDB::as_select())
            .load::<CreditCardDB>(&mut conn)
            .into_core()?;
        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let id = row.id.clone();
                CreditCard::try_from(row)
                    .inspect_err(|e| error!("Skipping unreadable credit card {}: {}", id, e))
                    .ok()
            })
            .collect())
    }

    async fn create(&self, card: CreditCard) -> Result<CreditCard> {
        card.validate()?;
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<CreditCard> {
                diesel::insert_into(credit_cards::table)
                    .values(CreditCardDB::from(&card))
                    .execute(conn)
                    .into_core()?;
                Ok(card)
            })
            .await
    }
}
