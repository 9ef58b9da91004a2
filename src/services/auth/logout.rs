use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::middlewares::{RequireJWT, require_jwt::user_cache_key};
use crate::models::{
    ApiResponse,
    activity::entities::{ActivityAction, EntityType},
};
use crate::services::record_activity;
use crate::utils::jwt::JwtUtils;

use super::AuthService;

/// 注销当前会话，并清除客户端的 refresh_token cookie
pub async fn handle_logout(
    service: &AuthService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    if let Some(session_id) = RequireJWT::extract_session_id(request) {
        if let Err(e) = storage.delete_session(&session_id).await {
            tracing::warn!("Failed to delete session {}: {}", session_id, e);
        }
        if let Some(cache) = service.get_cache(request) {
            cache.remove(&user_cache_key(&session_id)).await;
        }
        record_activity(
            &storage,
            request,
            ActivityAction::Logout,
            EntityType::Session,
            None,
            "退出登录",
        )
        .await;
    }

    // max_age=0 会让浏览器删除该 cookie
    let empty_cookie = JwtUtils::create_empty_refresh_token_cookie();

    Ok(HttpResponse::Ok()
        .cookie(empty_cookie)
        .json(ApiResponse::success_empty("登出成功")))
}
