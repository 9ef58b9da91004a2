use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::dashboard::requests::{CollectionsParams, DashboardParams};
use crate::models::users::entities::Permission;
use crate::services::DashboardService;

// 懒加载的全局 DashboardService 实例
static DASHBOARD_SERVICE: Lazy<DashboardService> = Lazy::new(DashboardService::new_lazy);

pub async fn get_summary(
    req: HttpRequest,
    query: web::Query<DashboardParams>,
) -> ActixResult<HttpResponse> {
    DASHBOARD_SERVICE.get_summary(&req, query.into_inner()).await
}

pub async fn get_collections(
    req: HttpRequest,
    query: web::Query<CollectionsParams>,
) -> ActixResult<HttpResponse> {
    DASHBOARD_SERVICE
        .get_collections(&req, query.into_inner())
        .await
}

pub async fn get_class_fees(
    req: HttpRequest,
    query: web::Query<DashboardParams>,
) -> ActixResult<HttpResponse> {
    DASHBOARD_SERVICE
        .get_class_fees(&req, query.into_inner())
        .await
}

// 配置路由
pub fn configure_dashboard_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/dashboard")
            .wrap(middlewares::RequirePermission::new(Permission::DashboardView))
            .wrap(middlewares::RequireJWT)
            .route("/summary", web::get().to(get_summary))
            .route("/collections", web::get().to(get_collections))
            .route("/class-fees", web::get().to(get_class_fees)),
    );
}
