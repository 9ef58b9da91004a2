//! 缴费记录实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "fee_payments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub record_id: i64,
    pub student_id: i64,
    pub amount: f64,
    pub discount: f64,
    pub method: String,
    #[sea_orm(unique)]
    pub receipt_number: String,
    pub paid_at: i64,
    pub account_id: Option<i64>,
    pub transaction_id: Option<i64>,
    pub collected_by: Option<i64>,
    pub remarks: Option<String>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::student_fee_records::Entity",
        from = "Column::RecordId",
        to = "super::student_fee_records::Column::Id"
    )]
    Record,
}

impl Related<super::student_fee_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Record.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_payment(self) -> crate::models::fees::entities::FeePayment {
        use crate::models::fees::entities::{FeePayment, PaymentMethod};

        FeePayment {
            id: self.id,
            record_id: self.record_id,
            student_id: self.student_id,
            amount: self.amount,
            discount: self.discount,
            method: self
                .method
                .parse::<PaymentMethod>()
                .unwrap_or(PaymentMethod::Other),
            receipt_number: self.receipt_number,
            paid_at: super::from_ts(self.paid_at),
            account_id: self.account_id,
            transaction_id: self.transaction_id,
            collected_by: self.collected_by,
            remarks: self.remarks,
            created_at: super::from_ts(self.created_at),
        }
    }
}
