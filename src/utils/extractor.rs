//! 路径参数提取器
//!
//! 在进入处理程序前校验路径参数，格式错误直接返回 400。

use actix_web::{
    FromRequest, HttpRequest, HttpResponse, dev::Payload, error::InternalError,
};
use futures_util::future::{Ready, ready};

use crate::models::{ApiResponse, ErrorCode};

fn bad_path(message: &str) -> actix_web::Error {
    InternalError::from_response(
        message.to_string(),
        HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, message)),
    )
    .into()
}

// 路由中只有一个路径参数时取第一个，名称不限
fn first_path_param(req: &HttpRequest) -> Option<String> {
    req.match_info().iter().next().map(|(_, v)| v.to_string())
}

fn parse_positive_id(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().filter(|id| *id > 0)
}

fn is_valid_token(raw: &str) -> bool {
    !raw.is_empty()
        && raw.len() <= 64
        && raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn is_valid_setting_key(raw: &str) -> bool {
    !raw.is_empty()
        && raw.len() <= 64
        && raw.contains('.')
        && raw
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '_')
}

/// 正整数 ID
#[derive(Debug, Clone, Copy)]
pub struct SafeIDI64(pub i64);

impl FromRequest for SafeIDI64 {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let id = first_path_param(req).as_deref().and_then(parse_positive_id);
        ready(id.map(SafeIDI64).ok_or_else(|| bad_path("Invalid ID")))
    }
}

/// 文件 token
#[derive(Debug, Clone)]
pub struct SafeFileToken(pub String);

impl FromRequest for SafeFileToken {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = first_path_param(req).filter(|t| is_valid_token(t));
        ready(
            token
                .map(SafeFileToken)
                .ok_or_else(|| bad_path("Invalid file token")),
        )
    }
}

/// 配置键，形如 `school.name`
#[derive(Debug, Clone)]
pub struct SafeSettingKey(pub String);

impl FromRequest for SafeSettingKey {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let key = first_path_param(req).filter(|k| is_valid_setting_key(k));
        ready(
            key.map(SafeSettingKey)
                .ok_or_else(|| bad_path("Invalid setting key")),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_parse_positive_id() {
        assert_eq!(parse_positive_id("42"), Some(42));
        assert_eq!(parse_positive_id("0"), None);
        assert_eq!(parse_positive_id("-3"), None);
        assert_eq!(parse_positive_id("1; drop"), None);
    }

    #[test]
    fn test_token_and_key_formats() {
        assert!(is_valid_token("a1B2-c3_d4"));
        assert!(!is_valid_token("../etc/passwd"));
        assert!(!is_valid_token(""));

        assert!(is_valid_setting_key("fees.due_day"));
        assert!(!is_valid_setting_key("Fees.DueDay"));
        assert!(!is_valid_setting_key("nodot"));
    }

    #[actix_web::test]
    async fn test_extract_id_from_path() {
        let req = TestRequest::default()
            .param("student_id", "15")
            .to_http_request();
        let id = SafeIDI64::extract(&req).await.unwrap();
        assert_eq!(id.0, 15);

        let req = TestRequest::default().param("id", "abc").to_http_request();
        assert!(SafeIDI64::extract(&req).await.is_err());
    }
}
