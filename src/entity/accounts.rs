//! 资金账户实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub name: String,
    pub account_type: String,
    pub account_number: Option<String>,
    pub opening_balance: f64,
    pub balance: f64,
    pub is_active: bool,
    pub description: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_account(self) -> crate::models::finance::entities::Account {
        use crate::models::finance::entities::{Account, AccountType};

        Account {
            id: self.id,
            name: self.name,
            account_type: self
                .account_type
                .parse::<AccountType>()
                .unwrap_or(AccountType::Other),
            account_number: self.account_number,
            opening_balance: self.opening_balance,
            balance: self.balance,
            is_active: self.is_active,
            description: self.description,
            created_at: super::from_ts(self.created_at),
            updated_at: super::from_ts(self.updated_at),
        }
    }
}
