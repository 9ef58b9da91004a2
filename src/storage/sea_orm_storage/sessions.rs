//! 登录会话存储操作

use super::SeaOrmStorage;
use crate::entity::active_sessions::{ActiveModel, Column, Entity as ActiveSessions};
use crate::errors::{Result, SchoolError};
use crate::models::{
    PaginationInfo,
    common::pagination::page_bounds,
    auth::{
        requests::SessionListQuery,
        responses::{ActiveSession, SessionListResponse},
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    sea_query::Expr,
};

impl SeaOrmStorage {
    pub async fn create_session_impl(&self, session: ActiveSession) -> Result<ActiveSession> {
        let model = ActiveModel {
            id: Set(session.id),
            user_id: Set(session.user_id),
            ip_address: Set(session.ip_address),
            user_agent: Set(session.user_agent),
            created_at: Set(session.created_at.timestamp()),
            last_seen_at: Set(session.last_seen_at.timestamp()),
            expires_at: Set(session.expires_at.timestamp()),
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("创建会话失败: {e}")))?;

        Ok(result.into_session())
    }

    pub async fn get_session_impl(&self, id: &str) -> Result<Option<ActiveSession>> {
        let result = ActiveSessions::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询会话失败: {e}")))?;

        Ok(result.map(|m| m.into_session()))
    }

    pub async fn touch_session_impl(&self, id: &str) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();

        let result = ActiveSessions::update_many()
            .col_expr(Column::LastSeenAt, Expr::value(now))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("更新会话失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn delete_session_impl(&self, id: &str) -> Result<bool> {
        let result = ActiveSessions::delete_by_id(id.to_string())
            .exec(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("删除会话失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn delete_user_sessions_impl(&self, user_id: i64) -> Result<u64> {
        let result = ActiveSessions::delete_many()
            .filter(Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("删除用户会话失败: {e}")))?;

        Ok(result.rows_affected)
    }

    /// 分页列出未过期会话，最近活动的在前
    pub async fn list_sessions_impl(&self, query: SessionListQuery) -> Result<SessionListResponse> {
        let (page, size) = page_bounds(query.page, query.size, 10);
        let now = chrono::Utc::now().timestamp();

        let mut select = ActiveSessions::find().filter(Column::ExpiresAt.gt(now));
        if let Some(user_id) = query.user_id {
            select = select.filter(Column::UserId.eq(user_id));
        }
        select = select.order_by_desc(Column::LastSeenAt);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询会话总数失败: {e}")))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询会话页数失败: {e}")))?;
        let sessions = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询会话列表失败: {e}")))?;

        Ok(SessionListResponse {
            items: sessions.into_iter().map(|m| m.into_session()).collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    pub async fn purge_expired_sessions_impl(&self) -> Result<u64> {
        let now = chrono::Utc::now().timestamp();

        let result = ActiveSessions::delete_many()
            .filter(Column::ExpiresAt.lte(now))
            .exec(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("清理过期会话失败: {e}")))?;

        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::{test_storage, tests_support::seed_user};
    use chrono::{Duration, Utc};

    fn session(id: &str, user_id: i64, expires_in: Duration) -> ActiveSession {
        let now = Utc::now();
        ActiveSession {
            id: id.to_string(),
            user_id,
            ip_address: Some("127.0.0.1".to_string()),
            user_agent: None,
            created_at: now,
            last_seen_at: now,
            expires_at: now + expires_in,
        }
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let storage = test_storage().await;
        let user = seed_user(&storage, "clerk01").await;

        storage
            .create_session_impl(session("s1", user.id, Duration::days(1)))
            .await
            .unwrap();
        storage
            .create_session_impl(session("s2", user.id, Duration::seconds(-10)))
            .await
            .unwrap();

        assert!(storage.get_session_impl("s1").await.unwrap().is_some());
        assert!(storage.touch_session_impl("s1").await.unwrap());

        let listed = storage
            .list_sessions_impl(SessionListQuery::default())
            .await
            .unwrap();
        assert_eq!(listed.pagination.total, 1);

        assert_eq!(storage.purge_expired_sessions_impl().await.unwrap(), 1);
        assert!(storage.delete_session_impl("s1").await.unwrap());
        assert!(storage.get_session_impl("s1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sessions_removed_with_user() {
        let storage = test_storage().await;
        let user = seed_user(&storage, "clerk02").await;
        storage
            .create_session_impl(session("s3", user.id, Duration::days(1)))
            .await
            .unwrap();
        assert_eq!(storage.delete_user_sessions_impl(user.id).await.unwrap(), 1);
    }
}
