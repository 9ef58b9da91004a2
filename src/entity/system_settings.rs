//! 配置项表，主键为配置键

use sea_orm::entity::prelude::*;

use crate::models::system::entities::{SettingValueType, SystemSetting};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "system_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    pub value: String,
    pub value_type: String,
    pub description: Option<String>,
    pub updated_at: i64,
    pub updated_by: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for SystemSetting {
    fn from(m: Model) -> Self {
        // 未知类型按字符串处理，避免旧数据导致整个列表读取失败
        let value_type = m.value_type.parse().unwrap_or(SettingValueType::String);
        SystemSetting {
            key: m.key,
            value: m.value,
            value_type,
            description: m.description,
            updated_at: super::from_ts(m.updated_at),
            updated_by: m.updated_by,
        }
    }
}
