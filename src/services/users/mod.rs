pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::cache::ObjectCache;
use crate::middlewares::{RequireJWT, require_jwt::user_cache_key};
use crate::models::{
    ApiResponse, ErrorCode,
    activity::entities::{ActivityAction, EntityType},
    auth::requests::SessionListQuery,
    users::requests::{CreateUserRequest, UpdateUserRequest, UserListParams},
};
use crate::services::{record_activity, storage_error_response};
use crate::storage::Storage;

pub struct UserService {
    storage: Option<Arc<dyn Storage>>,
}

impl UserService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        self.storage
            .clone()
            .unwrap_or_else(|| super::app_storage(request))
    }

    /// 清除该用户所有会话的用户缓存，角色或权限变更后立即生效
    pub(crate) async fn evict_cached_user(&self, request: &HttpRequest, user_id: i64) {
        let Some(cache) = request
            .app_data::<actix_web::web::Data<Arc<dyn ObjectCache>>>()
            .map(|c| c.get_ref().clone())
        else {
            return;
        };
        let query = SessionListQuery {
            page: Some(1),
            size: Some(1000),
            user_id: Some(user_id),
        };
        match self.get_storage(request).list_sessions(query).await {
            Ok(sessions) => {
                for session in sessions.items {
                    cache.remove(&user_cache_key(&session.id)).await;
                }
            }
            Err(e) => tracing::warn!("Failed to list sessions of user {}: {}", user_id, e),
        }
    }

    // 获取用户列表
    pub async fn list_users(
        &self,
        query: UserListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_users(self, query, request).await
    }

    // 创建用户
    pub async fn create_user(
        &self,
        user_data: CreateUserRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_user(self, user_data, request).await
    }

    // 根据ID获取用户
    pub async fn get_user(&self, user_id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        get::get_user(self, user_id, request).await
    }

    // 更新用户信息
    pub async fn update_user(
        &self,
        user_id: i64,
        update_data: UpdateUserRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_user(self, user_id, update_data, request).await
    }

    // 删除用户
    pub async fn delete_user(
        &self,
        user_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_user(self, user_id, request).await
    }

    /// 强制下线某个用户的全部会话
    pub async fn revoke_user_sessions(
        &self,
        user_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        if RequireJWT::extract_user_id(request) == Some(user_id) {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::BadRequest,
                "Use logout to end your own sessions",
            )));
        }

        let storage = self.get_storage(request);
        match storage.get_user_by_id(user_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return Ok(HttpResponse::NotFound()
                    .json(ApiResponse::error_empty(ErrorCode::UserNotFound, "User not found")));
            }
            Err(e) => return Ok(storage_error_response(&e, ErrorCode::UserNotFound)),
        }

        // 先按会话清缓存，删除后就查不到会话了
        self.evict_cached_user(request, user_id).await;
        match storage.delete_user_sessions(user_id).await {
            Ok(revoked) => {
                record_activity(
                    &storage,
                    request,
                    ActivityAction::Delete,
                    EntityType::Session,
                    Some(user_id),
                    format!("强制下线用户 {user_id} 的 {revoked} 个会话"),
                )
                .await;
                Ok(HttpResponse::Ok().json(ApiResponse::success(
                    serde_json::json!({ "revoked": revoked }),
                    "Sessions revoked",
                )))
            }
            Err(e) => Ok(storage_error_response(&e, ErrorCode::SessionNotFound)),
        }
    }
}
