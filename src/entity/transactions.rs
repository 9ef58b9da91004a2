//! 财务流水实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub account_id: i64,
    // 转账目标账户
    pub counter_account_id: Option<i64>,
    pub txn_type: String,
    pub amount: f64,
    pub category: String,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub staff_id: Option<i64>,
    pub txn_date: i64,
    pub created_by: Option<i64>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id"
    )]
    Account,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_transaction(self) -> crate::models::finance::entities::Transaction {
        use crate::models::finance::entities::{Transaction, TxnType};

        Transaction {
            id: self.id,
            account_id: self.account_id,
            counter_account_id: self.counter_account_id,
            txn_type: self
                .txn_type
                .parse::<TxnType>()
                .unwrap_or(TxnType::Expense),
            amount: self.amount,
            category: self.category,
            description: self.description,
            reference: self.reference,
            staff_id: self.staff_id,
            txn_date: super::from_ts(self.txn_date),
            created_by: self.created_by,
            created_at: super::from_ts(self.created_at),
        }
    }
}
