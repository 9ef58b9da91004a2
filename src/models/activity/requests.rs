use chrono::NaiveDate;
use serde::Deserialize;
use ts_rs::TS;

use super::entities::{ActivityAction, EntityType};
use crate::models::common::PaginationQuery;

// 操作日志查询参数（来自HTTP请求）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/activity.ts")]
pub struct ActivityListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub user_id: Option<i64>,
    pub entity_type: Option<EntityType>,
    pub action: Option<ActivityAction>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

// 操作日志查询参数（用于存储层）
#[derive(Debug, Clone, Default)]
pub struct ActivityListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub user_id: Option<i64>,
    pub entity_type: Option<EntityType>,
    pub action: Option<ActivityAction>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl From<ActivityListParams> for ActivityListQuery {
    fn from(params: ActivityListParams) -> Self {
        Self {
            page: Some(params.pagination.page),
            size: Some(params.pagination.size),
            user_id: params.user_id,
            entity_type: params.entity_type,
            action: params.action,
            from: params.from,
            to: params.to,
        }
    }
}
