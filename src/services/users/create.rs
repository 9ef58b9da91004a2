use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::UserService;
use crate::models::{
    ApiResponse, ErrorCode,
    activity::entities::{ActivityAction, EntityType},
    users::{requests::CreateUserRequest, responses::UserResponse},
};
use crate::services::record_activity;
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_email, validate_password_simple, validate_username};

pub async fn create_user(
    service: &UserService,
    mut user_data: CreateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    user_data.username = user_data.username.trim().to_string();
    user_data.email = user_data.email.trim().to_lowercase();

    // 验证用户名
    if let Err(msg) = validate_username(&user_data.username) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserNameInvalid, msg)));
    }

    // 验证邮箱
    if let Err(msg) = validate_email(&user_data.email) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserEmailInvalid, msg)));
    }

    // 验证密码策略
    if let Err(msg) = validate_password_simple(&user_data.password) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserPasswordInvalid, msg)));
    }

    user_data.password = match hash_password(&user_data.password) {
        Ok(hash) => hash,
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Password hashing failed: {e}"),
                )),
            );
        }
    };

    let storage = service.get_storage(request);

    // 先按用户名和邮箱查重，给出明确提示；并发时仍由唯一约束兜底
    let username_taken = storage.get_user_by_username(&user_data.username).await;
    let email_taken = storage.get_user_by_email(&user_data.email).await;
    match (username_taken, email_taken) {
        (Ok(Some(_)), _) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::UserAlreadyExists,
                format!("用户名已存在: {}", user_data.username),
            )));
        }
        (_, Ok(Some(_))) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::UserAlreadyExists,
                format!("邮箱已被使用: {}", user_data.email),
            )));
        }
        (Err(e), _) | (_, Err(e)) => {
            error!("Failed to check user uniqueness: {}", e);
        }
        _ => {}
    }

    match storage.create_user(user_data).await {
        Ok(user) => {
            record_activity(
                &storage,
                request,
                ActivityAction::Create,
                EntityType::User,
                Some(user.id),
                format!("创建用户 {}（{}）", user.username, user.role),
            )
            .await;
            Ok(HttpResponse::Created().json(ApiResponse::success(
                UserResponse::new(user),
                "用户创建成功",
            )))
        }
        Err(e) if e.is_unique_violation() => Ok(HttpResponse::Conflict().json(
            ApiResponse::error_empty(
                ErrorCode::UserAlreadyExists,
                "Username or email already exists",
            ),
        )),
        Err(e) => {
            let msg = format!("User creation failed: {e}");
            error!("{}", msg);
            Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::error_empty(ErrorCode::UserCreationFailed, msg)))
        }
    }
}
