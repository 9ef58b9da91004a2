use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RateLimit};
use crate::models::activity::requests::ActivityListParams;
use crate::models::users::entities::Permission;
use crate::services::ActivityService;

// 懒加载的全局 ActivityService 实例
static ACTIVITY_SERVICE: Lazy<ActivityService> = Lazy::new(ActivityService::new_lazy);

pub async fn list_logs(
    req: HttpRequest,
    query: web::Query<ActivityListParams>,
) -> ActixResult<HttpResponse> {
    ACTIVITY_SERVICE.list_logs(&req, query.into_inner()).await
}

pub async fn export_logs(
    req: HttpRequest,
    query: web::Query<ActivityListParams>,
) -> ActixResult<HttpResponse> {
    ACTIVITY_SERVICE.export_logs(&req, query.into_inner()).await
}

// 配置路由
pub fn configure_activity_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/activity")
            .wrap(middlewares::RequirePermission::new(Permission::ActivityView))
            .wrap(middlewares::RequireJWT)
            .route("", web::get().to(list_logs))
            .route(
                "/export",
                web::get().to(export_logs).wrap(RateLimit::export()),
            ),
    );
}
