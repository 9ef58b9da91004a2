//! 收费项目实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "fee_types")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub name: String,
    pub description: Option<String>,
    pub frequency: String,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::class_fee_structures::Entity")]
    ClassFeeStructures,
    #[sea_orm(has_many = "super::student_fee_records::Entity")]
    StudentFeeRecords,
}

impl Related<super::class_fee_structures::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClassFeeStructures.def()
    }
}

impl Related<super::student_fee_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StudentFeeRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_fee_type(self) -> crate::models::fees::entities::FeeType {
        use crate::models::fees::entities::{FeeFrequency, FeeType};

        FeeType {
            id: self.id,
            name: self.name,
            description: self.description,
            frequency: self
                .frequency
                .parse::<FeeFrequency>()
                .unwrap_or(FeeFrequency::Yearly),
            is_active: self.is_active,
            created_at: super::from_ts(self.created_at),
            updated_at: super::from_ts(self.updated_at),
        }
    }
}
