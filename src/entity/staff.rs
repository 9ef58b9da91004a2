//! 教职工实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "staff")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub employee_code: String,
    pub full_name: String,
    pub designation: String,
    pub department: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub joining_date: Option<String>,
    pub salary: f64,
    pub salary_status: String,
    pub last_salary_paid_at: Option<i64>,
    // YYYY-MM
    pub last_salary_month: Option<String>,
    pub status: String,
    pub deleted_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::classes::Entity")]
    Classes,
}

impl Related<super::classes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Classes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_staff(self) -> crate::models::staff::entities::Staff {
        use crate::models::staff::entities::{SalaryStatus, Staff, StaffStatus};

        Staff {
            id: self.id,
            employee_code: self.employee_code,
            full_name: self.full_name,
            designation: self.designation,
            department: self.department,
            phone: self.phone,
            email: self.email,
            joining_date: super::parse_date(self.joining_date.as_deref()),
            salary: self.salary,
            salary_status: self
                .salary_status
                .parse::<SalaryStatus>()
                .unwrap_or(SalaryStatus::Unpaid),
            last_salary_paid_at: self.last_salary_paid_at.map(super::from_ts),
            last_salary_month: self.last_salary_month,
            status: self
                .status
                .parse::<StaffStatus>()
                .unwrap_or(StaffStatus::Inactive),
            deleted_at: self.deleted_at.map(super::from_ts),
            created_at: super::from_ts(self.created_at),
            updated_at: super::from_ts(self.updated_at),
        }
    }
}
