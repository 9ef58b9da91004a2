use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, middleware, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RequirePermission};
use crate::models::system::requests::{BatchUpdateSettingsRequest, UpdateSettingRequest};
use crate::models::users::entities::Permission;
use crate::services::ConfigService;
use crate::utils::SafeSettingKey;

// 懒加载的全局 ConfigService 实例
static CONFIG_SERVICE: Lazy<ConfigService> = Lazy::new(ConfigService::new_lazy);

pub async fn get_settings(req: HttpRequest) -> ActixResult<HttpResponse> {
    CONFIG_SERVICE.get_settings(&req).await
}

pub async fn list_settings(req: HttpRequest) -> ActixResult<HttpResponse> {
    CONFIG_SERVICE.list_settings(&req).await
}

pub async fn update_setting(
    req: HttpRequest,
    key: SafeSettingKey,
    body: web::Json<UpdateSettingRequest>,
) -> ActixResult<HttpResponse> {
    CONFIG_SERVICE
        .update_setting(&req, key.0, body.into_inner())
        .await
}

pub async fn batch_update_settings(
    req: HttpRequest,
    body: web::Json<BatchUpdateSettingsRequest>,
) -> ActixResult<HttpResponse> {
    CONFIG_SERVICE
        .batch_update_settings(&req, body.into_inner())
        .await
}

// 配置路由
pub fn configure_config_routes(cfg: &mut web::ServiceConfig) {
    let manage = || RequirePermission::new(Permission::ConfigManage);

    cfg.service(
        web::scope("/api/v1/config")
            .wrap(middleware::Compress::default())
            .wrap(middlewares::RequireJWT)
            // 任意登录用户可读
            .route("", web::get().to(get_settings))
            .route(
                "/settings",
                web::get().to(list_settings).wrap(manage()),
            )
            .route(
                "/settings/batch",
                web::put().to(batch_update_settings).wrap(manage()),
            )
            .route(
                "/settings/{key}",
                web::put().to(update_setting).wrap(manage()),
            ),
    );
}
