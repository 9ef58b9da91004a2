use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;
use tracing::info;

use super::{ConfigService, DynamicConfig};
use crate::config::AppConfig;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    activity::entities::{ActivityAction, EntityType},
    system::{
        entities::{KnownSettingKey, SystemSetting},
        requests::{BatchUpdateSettingsRequest, UpdateSettingRequest},
        responses::{AdminSettingsListResponse, SchoolSettingsResponse, SettingResponse},
    },
};
use crate::services::{record_activity, storage_error_response};
use crate::storage::Storage;

/// 获取学校公开配置（任意登录用户可读）
pub async fn get_settings(
    _service: &ConfigService,
    _request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let calendar = DynamicConfig::fee_calendar().await;

    let response = SchoolSettingsResponse {
        school_name: DynamicConfig::school_name().await,
        current_academic_year: DynamicConfig::current_academic_year().await,
        academic_year_start_month: calendar.start_month,
        fee_due_day: calendar.due_day,
        fee_grace_days: calendar.grace_days,
        receipt_prefix: DynamicConfig::receipt_prefix().await,
        max_file_size: DynamicConfig::upload_max_size().await as i64,
        allowed_file_types: DynamicConfig::upload_allowed_types().await,
        environment: AppConfig::get().app.environment.clone(),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        response,
        "Settings retrieved successfully",
    )))
}

/// 获取全部配置项
pub async fn list_settings(
    service: &ConfigService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.list_all_settings().await {
        Ok(settings) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            AdminSettingsListResponse { settings },
            "Settings retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::SettingNotFound)),
    }
}

// 校验并写入单个配置，返回写入后的配置项
async fn apply_setting(
    storage: &Arc<dyn Storage>,
    request: &HttpRequest,
    key: &str,
    raw_value: &str,
) -> Result<SystemSetting, HttpResponse> {
    let known = key.parse::<KnownSettingKey>().map_err(|e| {
        HttpResponse::NotFound().json(ApiResponse::error_empty(ErrorCode::SettingNotFound, e))
    })?;
    let value = known.validate(raw_value).map_err(|e| {
        HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::SettingInvalid,
            format!("配置 {key} 的值无效: {e}"),
        ))
    })?;

    let previous = match storage.get_setting(key).await {
        Ok(Some(old)) => old.value,
        Ok(None) => {
            return Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::SettingNotFound,
                format!("配置项不存在: {key}"),
            )));
        }
        Err(e) => return Err(storage_error_response(&e, ErrorCode::SettingInvalid)),
    };

    let user_id = RequireJWT::extract_user_id(request);
    let setting = match storage.update_setting(key, &value, user_id).await {
        Ok(Some(setting)) => setting,
        Ok(None) => {
            return Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::SettingNotFound,
                format!("配置项不存在: {key}"),
            )));
        }
        Err(e) => return Err(storage_error_response(&e, ErrorCode::SettingInvalid)),
    };

    DynamicConfig::update(key, &setting.value).await;
    info!("配置 {} 已更新为 {}", key, setting.value);
    record_activity(
        storage,
        request,
        ActivityAction::Update,
        EntityType::Setting,
        None,
        format!("修改配置 {key}: {previous} -> {}", setting.value),
    )
    .await;

    Ok(setting)
}

/// 更新单个配置
pub async fn update_setting(
    service: &ConfigService,
    request: &HttpRequest,
    key: String,
    body: UpdateSettingRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match apply_setting(&storage, request, &key, &body.value.as_raw()).await {
        Ok(setting) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            SettingResponse { setting },
            "Setting updated successfully",
        ))),
        Err(response) => Ok(response),
    }
}

/// 批量更新配置，先全部校验再写入
pub async fn batch_update_settings(
    service: &ConfigService,
    request: &HttpRequest,
    body: BatchUpdateSettingsRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let items: Vec<(String, String)> = body
        .settings
        .into_iter()
        .map(|item| (item.key, item.value.as_raw()))
        .collect();

    for (key, value) in &items {
        let valid = key
            .parse::<KnownSettingKey>()
            .and_then(|k| k.validate(value));
        if let Err(e) = valid {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::SettingInvalid,
                format!("配置 {key} 无效: {e}"),
            )));
        }
    }

    let mut settings = Vec::with_capacity(items.len());
    for (key, value) in &items {
        match apply_setting(&storage, request, key, value).await {
            Ok(setting) => settings.push(setting),
            Err(response) => return Ok(response),
        }
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        AdminSettingsListResponse { settings },
        "Settings updated successfully",
    )))
}
