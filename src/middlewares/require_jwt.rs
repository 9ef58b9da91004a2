/*!
 * JWT 认证中间件
 *
 * 校验 `Authorization: Bearer <access_token>`，并要求 token 绑定的登录会话仍然有效。
 *
 * ## 认证流程
 *
 * 1. 解析并验证 access token（签名、过期时间、类型）
 * 2. 根据 claims 中的 `sid` 查询登录会话，会话不存在、已过期或空闲超时均视为未登录
 * 3. 先查缓存（键 `user:{sid}`），未命中再查存储，用户必须为 active
 * 4. 将 `User` 与 `Claims` 存入请求扩展，刷新会话的最近活动时间
 *
 * ```rust,ignore
 * web::scope("/api/v1/students")
 *     .wrap(RequirePermission::new(Permission::StudentsView))
 *     .wrap(RequireJWT)
 * ```
 *
 * actix 中后注册的 wrap 先执行，所以 `RequireJWT` 要写在最后。
 */

use crate::cache::{CacheResult, ObjectCache};
use crate::config::AppConfig;
use crate::models::ErrorCode;
use crate::models::users::entities;
use crate::storage::Storage;
use crate::utils::jwt::{Claims, JwtUtils};
use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::{rc::Rc, sync::Arc};
use tracing::{debug, info, warn};

use super::create_error_response;

const BEARER_PREFIX: &str = "Bearer ";
const AUTHORIZATION_HEADER: &str = "Authorization";

#[derive(Clone)]
pub struct RequireJWT;

/// 会话对应的用户缓存键，注销或修改用户时按会话清除
pub fn user_cache_key(session_id: &str) -> String {
    format!("user:{session_id}")
}

async fn authenticate(req: &ServiceRequest) -> Result<(entities::User, Claims), String> {
    let token = req
        .headers()
        .get(AUTHORIZATION_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix(BEARER_PREFIX))
        .ok_or_else(|| "Missing or invalid Authorization header".to_string())?;

    let claims = JwtUtils::verify_access_token(token).map_err(|err| {
        info!("JWT token validation failed: {}", err);
        "Invalid JWT token".to_string()
    })?;
    let user_id = claims
        .user_id()
        .ok_or_else(|| "Invalid user ID in JWT".to_string())?;

    let storage = req
        .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
        .ok_or_else(|| "Storage not configured".to_string())?
        .get_ref()
        .clone();

    let session = storage
        .get_session(&claims.sid)
        .await
        .map_err(|e| {
            warn!("Failed to load session {}: {}", claims.sid, e);
            "Failed to verify session".to_string()
        })?
        .ok_or_else(|| "Session has been revoked".to_string())?;

    let now = chrono::Utc::now();
    if session.user_id != user_id || session.is_expired(now) {
        return Err("Session expired".to_string());
    }
    let idle_minutes = AppConfig::get().school.session_idle_timeout;
    if idle_minutes > 0 && now - session.last_seen_at > chrono::TimeDelta::minutes(idle_minutes)
    {
        return Err("Session idle timeout".to_string());
    }

    let cache = req
        .app_data::<actix_web::web::Data<Arc<dyn ObjectCache>>>()
        .map(|c| c.get_ref().clone());
    let cache_key = user_cache_key(&claims.sid);

    if let Some(cache) = &cache {
        match cache.get_raw(&cache_key).await {
            CacheResult::Found(json) => match serde_json::from_str::<entities::User>(&json) {
                Ok(user) if user.id == user_id => {
                    touch(&storage, &claims.sid).await;
                    return Ok((user, claims));
                }
                _ => cache.remove(&cache_key).await,
            },
            _ => debug!("User not cached for session {}", claims.sid),
        }
    }

    let user = storage
        .get_user_by_id(user_id)
        .await
        .map_err(|_| "Failed to retrieve user from storage".to_string())?
        .ok_or_else(|| "User not found".to_string())?;

    if user.status != entities::UserStatus::Active {
        return Err("User is not active".to_string());
    }

    if let Some(cache) = &cache
        && let Ok(user_json) = serde_json::to_string(&user)
    {
        cache
            .insert_raw(cache_key, user_json, AppConfig::get().cache.default_ttl)
            .await;
    }

    touch(&storage, &claims.sid).await;
    Ok((user, claims))
}

async fn touch(storage: &Arc<dyn Storage>, session_id: &str) {
    if let Err(e) = storage.touch_session(session_id).await {
        warn!("Failed to touch session {}: {}", session_id, e);
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireJWT
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireJWTMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireJWTMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireJWTMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireJWTMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        Box::pin(async move {
            // 预检请求直接放行
            if req.method() == actix_web::http::Method::OPTIONS {
                return Ok(req.into_response(
                    create_error_response(StatusCode::NO_CONTENT, ErrorCode::Success, "")
                        .map_into_right_body(),
                ));
            }

            match authenticate(&req).await {
                Ok((user, claims)) => {
                    debug!("JWT authentication successful for ID: {}", user.id);
                    req.extensions_mut().insert(user);
                    req.extensions_mut().insert(claims);
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Err(err) => {
                    info!(
                        "JWT authentication failed for request to {}: {}",
                        req.path(),
                        err
                    );
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::UNAUTHORIZED,
                            ErrorCode::Unauthorized,
                            &format!("Unauthorized: {err}"),
                        )
                        .map_into_right_body(),
                    ))
                }
            }
        })
    }
}

// 处理程序中读取认证结果，需在 RequireJWT 之后使用
impl RequireJWT {
    pub fn extract_user_claims(req: &actix_web::HttpRequest) -> Option<entities::User> {
        req.extensions().get::<entities::User>().cloned()
    }

    pub fn extract_user_id(req: &actix_web::HttpRequest) -> Option<i64> {
        req.extensions().get::<entities::User>().map(|user| user.id)
    }

    pub fn extract_session_id(req: &actix_web::HttpRequest) -> Option<String> {
        req.extensions().get::<Claims>().map(|c| c.sid.clone())
    }
}
