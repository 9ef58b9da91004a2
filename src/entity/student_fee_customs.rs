//! 学生个别收费实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "student_fee_customs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub student_id: i64,
    pub fee_type_id: i64,
    pub academic_year: String,
    pub custom_amount: Option<f64>,
    pub is_applicable: bool,
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
}

impl Related<super::students::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_custom(self) -> crate::models::fees::entities::StudentFeeCustom {
        crate::models::fees::entities::StudentFeeCustom {
            id: self.id,
            student_id: self.student_id,
            fee_type_id: self.fee_type_id,
            academic_year: self.academic_year,
            custom_amount: self.custom_amount,
            is_applicable: self.is_applicable,
            remarks: self.remarks,
            created_at: super::from_ts(self.created_at),
            updated_at: super::from_ts(self.updated_at),
        }
    }
}
