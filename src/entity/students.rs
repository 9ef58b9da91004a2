//! 学生实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "students")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub admission_number: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: Option<String>,
    pub date_of_birth: Option<String>,
    pub class_id: Option<i64>,
    pub roll_number: Option<String>,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub guardian_email: Option<String>,
    pub address: Option<String>,
    pub photo_url: Option<String>,
    pub admission_date: Option<String>,
    pub academic_year: String,
    pub status: String,
    pub deleted_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::classes::Entity",
        from = "Column::ClassId",
        to = "super::classes::Column::Id"
    )]
    Class,
    #[sea_orm(has_many = "super::student_fee_records::Entity")]
    FeeRecords,
    #[sea_orm(has_many = "super::student_fee_customs::Entity")]
    FeeCustoms,
}

impl Related<super::classes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Class.def()
    }
}

impl Related<super::student_fee_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FeeRecords.def()
    }
}

impl Related<super::student_fee_customs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FeeCustoms.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_student(self) -> crate::models::students::entities::Student {
        use crate::models::students::entities::{Student, StudentStatus};

        Student {
            id: self.id,
            admission_number: self.admission_number,
            first_name: self.first_name,
            last_name: self.last_name,
            gender: self.gender,
            date_of_birth: super::parse_date(self.date_of_birth.as_deref()),
            class_id: self.class_id,
            roll_number: self.roll_number,
            guardian_name: self.guardian_name,
            guardian_phone: self.guardian_phone,
            guardian_email: self.guardian_email,
            address: self.address,
            photo_url: self.photo_url,
            admission_date: super::parse_date(self.admission_date.as_deref()),
            academic_year: self.academic_year,
            status: self
                .status
                .parse::<StudentStatus>()
                .unwrap_or(StudentStatus::Inactive),
            deleted_at: self.deleted_at.map(super::from_ts),
            created_at: super::from_ts(self.created_at),
            updated_at: super::from_ts(self.updated_at),
        }
    }
}
