//! Database model for budgets.

use diesel::prelude::*;

use cashflow_core::budgets::Budget;

use crate::errors::StorageError;
use crate::utils::{
    date_to_text, decimal_to_text, text_to_date, text_to_date_opt, text_to_decimal, text_to_enum,
};

#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::budgets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BudgetDB {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub category_id: String,
    pub period_type: String,
    pub amount: String,
    pub currency: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub alert_at_percentage: String,
    pub is_active: bool,
}

impl TryFrom<BudgetDB> for Budget {
    type Error = StorageError;

    fn try_from(db: BudgetDB) -> Result<Self, Self::Error> {
        Ok(Self {
            period_type: text_to_enum("budgets.period_type", &db.period_type)?,
            amount: text_to_decimal("budgets.amount", &db.amount)?,
            start_date: text_to_date("budgets.start_date", &db.start_date)?,
            end_date: text_to_date_opt("budgets.end_date", db.end_date.as_deref())?,
            alert_at_percentage: text_to_decimal(
                "budgets.alert_at_percentage",
                &db.alert_at_percentage,
            )?,
            id: db.id,
            owner_id: db.owner_id,
            name: db.name,
            category_id: db.category_id,
            currency: db.currency,
            is_active: db.is_active,
        })
    }
}

impl From<&Budget> for BudgetDB {
    fn from(domain: &Budget) -> Self {
        Self {
            id: domain.id.clone(),
            owner_id: domain.owner_id.clone(),
            name: domain.name.clone(),
            category_id: domain.category_id.clone(),
            period_type: domain.period_type.as_str().to_string(),
            amount: decimal_to_text(domain.amount),
            currency: domain.currency.clone(),
            start_date: date_to_text(domain.start_date),
            end_date: domain.end_date.map(date_to_text),
            alert_at_percentage: decimal_to_text(domain.alert_at_percentage),
            is_active: domain.is_active,
        }
    }
}
