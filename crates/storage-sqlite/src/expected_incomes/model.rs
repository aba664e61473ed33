use diesel::prelude::*;

use cashflow_core::forecast::ExpectedIncome;

use crate::errors::StorageError;
use crate::utils::{date_to_text, decimal_to_text, text_to_date, text_to_decimal};

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::expected_incomes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ExpectedIncomeDB {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub amount: String,
    pub currency: String,
    pub expected_date: String,
    pub category_id: Option<String>,
    pub is_active: bool,
}

impl TryFrom<ExpectedIncomeDB> for ExpectedIncome {
    type Error = StorageError;

    fn try_from(db: ExpectedIncomeDB) -> Result<Self, Self::Error> {
        Ok(Self {
            amount: text_to_decimal("expected_incomes.amount", &db.amount)?,
            expected_date: text_to_date("expected_incomes.expected_date", &db.expected_date)?,
            id: db.id,
            owner_id: db.owner_id,
            name: db.name,
            currency: db.currency,
            category_id: db.category_id,
            is_active: db.is_active,
        })
    }
}

impl From<&ExpectedIncome> for ExpectedIncomeDB {
    fn from(domain: &ExpectedIncome) -> Self {
        Self {
            id: domain.id.clone(),
            owner_id: domain.owner_id.clone(),
            name: domain.name.clone(),
            amount: decimal_to_text(domain.amount),
            currency: domain.currency.clone(),
            expected_date: date_to_text(domain.expected_date),
            category_id: domain.category_id.clone(),
            is_active: domain.is_active,
        }
    }
}
