//! 登录会话管理

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::cache::ObjectCache;
use crate::middlewares::{RequireJWT, require_jwt::user_cache_key};
use crate::models::{
    ApiResponse, ErrorCode,
    activity::entities::{ActivityAction, EntityType},
    auth::requests::{SessionListParams, SessionListQuery},
};
use crate::services::{record_activity, storage_error_response};
use crate::storage::Storage;

pub struct SessionService {
    storage: Option<Arc<dyn Storage>>,
}

impl SessionService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        self.storage
            .clone()
            .unwrap_or_else(|| super::app_storage(request))
    }

    // 列出未过期的登录会话
    pub async fn list_sessions(
        &self,
        request: &HttpRequest,
        params: SessionListParams,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);
        let query = SessionListQuery {
            page: Some(params.pagination.page),
            size: Some(params.pagination.size),
            user_id: params.user_id,
        };

        match storage.list_sessions(query).await {
            Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                response,
                "Sessions retrieved successfully",
            ))),
            Err(e) => Ok(storage_error_response(&e, ErrorCode::SessionNotFound)),
        }
    }

    // 强制下线单个会话，只清除该会话的缓存
    pub async fn revoke_session(
        &self,
        request: &HttpRequest,
        session_id: String,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);

        if RequireJWT::extract_session_id(request).as_deref() == Some(session_id.as_str()) {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::BadRequest,
                "Use logout to end the current session",
            )));
        }

        match storage.delete_session(&session_id).await {
            Ok(true) => {
                if let Some(cache) = request.app_data::<actix_web::web::Data<Arc<dyn ObjectCache>>>()
                {
                    cache.remove(&user_cache_key(&session_id)).await;
                }
                record_activity(
                    &storage,
                    request,
                    ActivityAction::Delete,
                    EntityType::Session,
                    None,
                    format!("强制下线会话 {session_id}"),
                )
                .await;
                Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Session revoked")))
            }
            Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::SessionNotFound,
                "Session not found",
            ))),
            Err(e) => Ok(storage_error_response(&e, ErrorCode::SessionNotFound)),
        }
    }
}
