pub mod activity;
pub mod auth;
pub mod classes;
pub mod config;
pub mod dashboard;
pub mod export;
pub mod fees;
pub mod files;
pub mod finance;
pub mod promotion;
pub mod sessions;
pub mod staff;
pub mod students;
pub mod users;

pub use activity::ActivityService;
pub use auth::AuthService;
pub use classes::ClassService;
pub use config::{ConfigService, DynamicConfig};
pub use dashboard::DashboardService;
pub use fees::FeeService;
pub use files::FileService;
pub use finance::FinanceService;
pub use promotion::PromotionService;
pub use sessions::SessionService;
pub use staff::StaffService;
pub use students::StudentService;
pub use users::UserService;

use actix_web::{HttpRequest, HttpResponse, http::StatusCode};
use std::sync::Arc;
use tracing::{error, warn};

use crate::errors::SchoolError;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    activity::entities::{ActivityAction, EntityType, NewActivityLog},
};
use crate::storage::Storage;

/// 自带接口错误码的存储层错误
fn specific_error_code(err: &SchoolError) -> Option<(StatusCode, ErrorCode)> {
    let mapped = match err {
        SchoolError::AccountNotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::AccountNotFound),
        SchoolError::FeeRecordNotFound(_) => {
            (StatusCode::NOT_FOUND, ErrorCode::FeeRecordNotFound)
        }
        SchoolError::AccountInactive(_) => (StatusCode::BAD_REQUEST, ErrorCode::AccountInactive),
        SchoolError::InsufficientBalance(_) => {
            (StatusCode::BAD_REQUEST, ErrorCode::InsufficientBalance)
        }
        SchoolError::FeeRecordWaived(_) => (StatusCode::BAD_REQUEST, ErrorCode::FeeRecordWaived),
        SchoolError::PaymentExceedsBalance(_) => {
            (StatusCode::BAD_REQUEST, ErrorCode::PaymentExceedsBalance)
        }
        _ => return None,
    };
    Some(mapped)
}

/// 存储层错误转为 HTTP 响应
///
/// 自带错误码的错误优先；`code` 用于其余调用方可处理的错误（不存在、冲突、业务规则、校验），
/// 剩下的一律 500。
pub(crate) fn storage_error_response(err: &SchoolError, code: ErrorCode) -> HttpResponse {
    if let Some((status, specific)) = specific_error_code(err) {
        return HttpResponse::build(status).json(ApiResponse::error_empty(specific, err.message()));
    }
    match err {
        SchoolError::NotFound(msg) => {
            HttpResponse::NotFound().json(ApiResponse::error_empty(code, msg.as_str()))
        }
        SchoolError::Conflict(msg) => {
            HttpResponse::Conflict().json(ApiResponse::error_empty(code, msg.as_str()))
        }
        SchoolError::BusinessRule(msg)
        | SchoolError::Validation(msg)
        | SchoolError::DateParse(msg) => {
            HttpResponse::BadRequest().json(ApiResponse::error_empty(code, msg.as_str()))
        }
        other => {
            error!("{}", other.format_simple());
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                other.message(),
            ))
        }
    }
}

/// 启动时注册到 app_data 的存储实例
pub(crate) fn app_storage(request: &HttpRequest) -> Arc<dyn Storage> {
    request
        .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
        .expect("Storage not found in app data")
        .get_ref()
        .clone()
}

pub(crate) fn unauthorized_response() -> HttpResponse {
    HttpResponse::Unauthorized().json(ApiResponse::error_empty(
        ErrorCode::Unauthorized,
        "无法获取用户信息",
    ))
}

/// 客户端 IP，经反向代理时取真实地址
pub(crate) fn client_ip(req: &HttpRequest) -> Option<String> {
    req.connection_info()
        .realip_remote_addr()
        .map(|s| s.to_string())
}

/// 写操作日志，失败只记录警告，不影响请求结果
pub(crate) async fn record_activity(
    storage: &Arc<dyn Storage>,
    req: &HttpRequest,
    action: ActivityAction,
    entity_type: EntityType,
    entity_id: Option<i64>,
    description: impl Into<String>,
) {
    let user = RequireJWT::extract_user_claims(req);
    let log = NewActivityLog {
        user_id: user.as_ref().map(|u| u.id),
        username: user.map(|u| u.username),
        action,
        entity_type,
        entity_id,
        description: description.into(),
        ip_address: client_ip(req),
    };
    if let Err(e) = storage.create_activity_log(log).await {
        warn!("写入操作日志失败: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_status() {
        let cases = [
            (SchoolError::not_found("x"), StatusCode::NOT_FOUND),
            (SchoolError::conflict("x"), StatusCode::CONFLICT),
            (SchoolError::business_rule("x"), StatusCode::BAD_REQUEST),
            (SchoolError::validation("x"), StatusCode::BAD_REQUEST),
            (
                SchoolError::database_operation("x"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(
                storage_error_response(&err, ErrorCode::BadRequest).status(),
                status
            );
        }
    }

    #[actix_web::test]
    async fn test_specific_error_code_wins() {
        let resp = storage_error_response(
            &SchoolError::payment_exceeds_balance("超出剩余应缴"),
            ErrorCode::PaymentInvalid,
        );
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], ErrorCode::PaymentExceedsBalance as i32);

        let resp = storage_error_response(
            &SchoolError::account_not_found("账户不存在: 9"),
            ErrorCode::FeeRecordNotFound,
        );
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
