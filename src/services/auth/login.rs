use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::{
    ApiResponse, ErrorCode,
    activity::entities::{ActivityAction, EntityType, NewActivityLog},
    auth::{ActiveSession, LoginRequest, LoginResponse},
    users::entities::UserStatus,
};
use crate::services::client_ip;
use crate::utils::jwt;
use crate::utils::password::verify_password;

use super::AuthService;

const USER_AGENT_MAX_LEN: usize = 255;

fn auth_failed() -> HttpResponse {
    HttpResponse::Unauthorized().json(ApiResponse::error_empty(
        ErrorCode::AuthFailed,
        "Username or password is incorrect",
    ))
}

pub async fn handle_login(
    service: &AuthService,
    login_request: LoginRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let config = service.get_config();

    // 1. 根据用户名或邮箱获取用户信息
    let user = match storage
        .get_user_by_username_or_email(login_request.username.trim())
        .await
    {
        Ok(Some(user)) => user,
        Ok(None) => return Ok(auth_failed()),
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Login failed: {e}"),
                )),
            );
        }
    };

    // 2. 验证密码
    if !verify_password(&login_request.password, &user.password_hash) {
        tracing::info!("Login failed for {}: wrong password", user.username);
        return Ok(auth_failed());
    }

    // 3. 停用或暂停的账号不能登录
    if user.status != UserStatus::Active {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::UserInactive,
            "User account is not active",
        )));
    }

    // 4. 创建登录会话
    let now = chrono::Utc::now();
    let session_ttl = jwt::JwtUtils::refresh_token_ttl(login_request.remember_me);
    let ip_address = client_ip(request);
    let user_agent = request
        .headers()
        .get(actix_web::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.chars().take(USER_AGENT_MAX_LEN).collect::<String>());

    let session = ActiveSession {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: user.id,
        ip_address: ip_address.clone(),
        user_agent,
        created_at: now,
        last_seen_at: now,
        expires_at: now + session_ttl,
    };
    let session = match storage.create_session(session).await {
        Ok(session) => session,
        Err(e) => {
            tracing::error!("Failed to create session for {}: {}", user.username, e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Login failed, unable to create session",
                )),
            );
        }
    };

    // 5. 生成令牌对
    let token_pair = match user.generate_token_pair(&session.id, Some(session_ttl)) {
        Ok(pair) => pair,
        Err(e) => {
            tracing::error!("Failed to generate JWT token: {}", e);
            let _ = storage.delete_session(&session.id).await;
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Login failed, unable to generate token",
                )),
            );
        }
    };

    // 6. 更新最后登录时间并记录日志
    if let Err(e) = storage.update_last_login(user.id).await {
        tracing::warn!("Failed to update last login for {}: {}", user.username, e);
    }
    let log = NewActivityLog {
        user_id: Some(user.id),
        username: Some(user.username.clone()),
        action: ActivityAction::Login,
        entity_type: EntityType::Session,
        entity_id: None,
        description: format!("用户 {} 登录", user.username),
        ip_address,
    };
    if let Err(e) = storage.create_activity_log(log).await {
        tracing::warn!("写入操作日志失败: {}", e);
    }

    tracing::info!("User {} logged in successfully", user.username);

    let permissions = user.effective_permissions();
    let response = LoginResponse {
        access_token: token_pair.access_token,
        expires_in: config.jwt.access_token_expiry * 60, // 转换为秒
        session_id: session.id,
        user,
        permissions,
        created_at: now,
    };

    let refresh_cookie =
        jwt::JwtUtils::create_refresh_token_cookie(&token_pair.refresh_token, session_ttl);

    Ok(HttpResponse::Ok()
        .cookie(refresh_cookie)
        .json(ApiResponse::success(response, "Login successful")))
}
