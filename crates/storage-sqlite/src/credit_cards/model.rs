//! Database model for credit cards.

use diesel::prelude::*;

use cashflow_core::credit_cards::CreditCard;

use crate::errors::StorageError;
use crate::utils::{decimal_to_text, int_to_u32, text_to_decimal};

#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::credit_cards)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CreditCardDB {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub credit_limit: String,
    pub billing_day: i32,
    pub currency: String,
    pub linked_account_id: Option<String>,
    pub is_active: bool,
}

impl TryFrom<CreditCardDB> for CreditCard {
    type Error = StorageError;

    fn try_from(db: CreditCardDB) -> Result<Self, Self::Error> {
        Ok(Self {
            credit_limit: text_to_decimal("credit_cards.credit_limit", &db.credit_limit)?,
            billing_day: int_to_u32("credit_cards.billing_day", db.billing_day)?,
            id: db.id,
            owner_id: db.owner_id,
            name: db.name,
            currency: db.currency,
            linked_account_id: db.linked_account_id,
            is_active: db.is_active,
        })
    }
}

impl From<&CreditCard> for CreditCardDB {
    fn from(domain: &CreditCard) -> Self {
        Self {
            id: domain.id.clone(),
            owner_id: domain.owner_id.clone(),
            name: domain.name.clone(),
            credit_limit: decimal_to_text(domain.credit_limit),
            billing_day: domain.billing_day as i32,
            currency: domain.currency.clone(),
            linked_account_id: domain.linked_account_id.clone(),
            is_active: domain.is_active,
        }
    }
}
