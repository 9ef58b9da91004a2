//! 学生收费记录实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "student_fee_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub student_id: i64,
    pub fee_type_id: i64,
    pub class_id: Option<i64>,
    pub academic_year: String,
    pub frequency: String,
    pub amount_per_period: f64,
    pub periods: i32,
    pub total_amount: f64,
    pub paid_amount: f64,
    pub discount_amount: f64,
    // 第一期截止日零点（UTC）
    pub first_due_at: i64,
    pub status: String,
    pub remarks: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::students::Entity",
        from = "Column::StudentId",
        to = "super::students::Column::Id"
    )]
    Student,
    #[sea_orm(
        belongs_to = "super::fee_types::Entity",
        from = "Column::FeeTypeId",
        to = "super::fee_types::Column::Id"
    )]
    FeeType,
    #[sea_orm(has_many = "super::fee_payments::Entity")]
    Payments,
}

impl Related<super::students::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::fee_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FeeType.def()
    }
}

impl Related<super::fee_payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_record(self) -> crate::models::fees::entities::StudentFeeRecord {
        use crate::models::fees::entities::{FeeFrequency, FeeStatus, StudentFeeRecord};

        StudentFeeRecord {
            id: self.id,
            student_id: self.student_id,
            fee_type_id: self.fee_type_id,
            class_id: self.class_id,
            academic_year: self.academic_year,
            frequency: self
                .frequency
                .parse::<FeeFrequency>()
                .unwrap_or(FeeFrequency::Yearly),
            amount_per_period: self.amount_per_period,
            periods: self.periods,
            total_amount: self.total_amount,
            paid_amount: self.paid_amount,
            discount_amount: self.discount_amount,
            first_due_date: super::from_ts(self.first_due_at).date_naive(),
            status: self
                .status
                .parse::<FeeStatus>()
                .unwrap_or(FeeStatus::Pending),
            remarks: self.remarks,
            created_at: super::from_ts(self.created_at),
            updated_at: super::from_ts(self.updated_at),
        }
    }
}
