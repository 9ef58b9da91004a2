//! 操作日志实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "activity_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<i64>,
    pub description: String,
    pub ip_address: Option<String>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_activity(self) -> crate::models::activity::entities::ActivityLog {
        use crate::models::activity::entities::{ActivityAction, ActivityLog, EntityType};

        ActivityLog {
            id: self.id,
            user_id: self.user_id,
            username: self.username,
            action: self
                .action
                .parse::<ActivityAction>()
                .unwrap_or(ActivityAction::Update),
            entity_type: self
                .entity_type
                .parse::<EntityType>()
                .unwrap_or(EntityType::Setting),
            entity_id: self.entity_id,
            description: self.description,
            ip_address: self.ip_address,
            created_at: super::from_ts(self.created_at),
        }
    }
}
