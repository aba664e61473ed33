//! Database model for owners.

use diesel::prelude::*;

use cashflow_core::owners::Owner;

#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::owners)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OwnerDB {
    pub id: String,
    pub name: String,
    pub base_currency: String,
    pub is_active: bool,
}

impl From<OwnerDB> for Owner {
    fn from(db: OwnerDB) -> Self {
        Self {
            id: db.id,
            name: db.name,
            base_currency: db.base_currency,
            is_active: db.is_active,
        }
    }
}

impl From<Owner> for OwnerDB {
    fn from(domain: Owner) -> Self {
        Self {
            id: domain.id,
            name: domain.name,
            base_currency: domain.base_currency,
            is_active: domain.is_active,
        }
    }
}
