//! 操作日志存储操作

use super::SeaOrmStorage;
use crate::entity::activity_logs::{ActiveModel, Column, Entity as ActivityLogs};
use crate::errors::{Result, SchoolError};
use crate::models::{
    PaginationInfo,
    common::pagination::page_bounds,
    activity::{
        entities::{ActivityLog, NewActivityLog},
        requests::ActivityListQuery,
        responses::ActivityListResponse,
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select, Set,
};

// 单次导出的最大行数
const EXPORT_LIMIT: u64 = 10_000;

fn filtered(query: &ActivityListQuery) -> Select<ActivityLogs> {
    let mut select = ActivityLogs::find();

    if let Some(user_id) = query.user_id {
        select = select.filter(Column::UserId.eq(user_id));
    }
    if let Some(entity_type) = query.entity_type {
        select = select.filter(Column::EntityType.eq(entity_type.to_string()));
    }
    if let Some(action) = query.action {
        select = select.filter(Column::Action.eq(action.to_string()));
    }
    if let Some(from) = query.from {
        select = select.filter(Column::CreatedAt.gte(crate::entity::date_to_ts(from)));
    }
    if let Some(to) = query.to {
        // 包含结束日当天
        let end = crate::entity::date_to_ts(to) + 86_400;
        select = select.filter(Column::CreatedAt.lt(end));
    }

    select.order_by_desc(Column::CreatedAt).order_by_desc(Column::Id)
}

impl SeaOrmStorage {
    pub async fn create_activity_log_impl(&self, log: NewActivityLog) -> Result<ActivityLog> {
        let model = ActiveModel {
            user_id: Set(log.user_id),
            username: Set(log.username),
            action: Set(log.action.to_string()),
            entity_type: Set(log.entity_type.to_string()),
            entity_id: Set(log.entity_id),
            description: Set(log.description),
            ip_address: Set(log.ip_address),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("写入操作日志失败: {e}")))?;

        Ok(result.into_activity())
    }

    pub async fn list_activity_logs_impl(
        &self,
        query: ActivityListQuery,
    ) -> Result<ActivityListResponse> {
        let (page, size) = page_bounds(query.page, query.size, 20);

        let paginator = filtered(&query).paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询日志总数失败: {e}")))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询日志页数失败: {e}")))?;
        let logs = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询日志列表失败: {e}")))?;

        Ok(ActivityListResponse {
            items: logs.into_iter().map(|m| m.into_activity()).collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    pub async fn list_activity_logs_for_export_impl(
        &self,
        query: ActivityListQuery,
    ) -> Result<Vec<ActivityLog>> {
        let logs = filtered(&query)
            .limit(EXPORT_LIMIT)
            .all(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("导出操作日志失败: {e}")))?;

        Ok(logs.into_iter().map(|m| m.into_activity()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::activity::entities::{ActivityAction, EntityType};
    use crate::storage::sea_orm_storage::test_storage;

    fn log(action: ActivityAction, entity_type: EntityType) -> NewActivityLog {
        NewActivityLog {
            user_id: Some(1),
            username: Some("admin".to_string()),
            action,
            entity_type,
            entity_id: Some(7),
            description: "test".to_string(),
            ip_address: None,
        }
    }

    #[tokio::test]
    async fn test_activity_filters() {
        let storage = test_storage().await;
        storage
            .create_activity_log_impl(log(ActivityAction::Create, EntityType::Student))
            .await
            .unwrap();
        storage
            .create_activity_log_impl(log(ActivityAction::Payment, EntityType::FeePayment))
            .await
            .unwrap();

        let all = storage
            .list_activity_logs_impl(ActivityListQuery::default())
            .await
            .unwrap();
        assert_eq!(all.pagination.total, 2);
        // 最新的在前
        assert_eq!(all.items[0].action, ActivityAction::Payment);

        let payments = storage
            .list_activity_logs_for_export_impl(ActivityListQuery {
                entity_type: Some(EntityType::FeePayment),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(payments.len(), 1);

        let today = chrono::Utc::now().date_naive();
        let ranged = storage
            .list_activity_logs_impl(ActivityListQuery {
                from: Some(today),
                to: Some(today),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(ranged.pagination.total, 2);
    }
}
