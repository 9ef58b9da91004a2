use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RequireRole};
use crate::models::promotion::requests::PromotionRequest;
use crate::models::users::entities::{Permission, UserRole};
use crate::services::PromotionService;

// 懒加载的全局 PromotionService 实例
static PROMOTION_SERVICE: Lazy<PromotionService> = Lazy::new(PromotionService::new_lazy);

pub async fn preview(
    req: HttpRequest,
    body: web::Json<PromotionRequest>,
) -> ActixResult<HttpResponse> {
    PROMOTION_SERVICE.preview(&req, body.into_inner()).await
}

pub async fn execute(
    req: HttpRequest,
    body: web::Json<PromotionRequest>,
) -> ActixResult<HttpResponse> {
    PROMOTION_SERVICE.execute(&req, body.into_inner()).await
}

// 配置路由
pub fn configure_promotion_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/promotion")
            .wrap(middlewares::RequirePermission::new(Permission::PromotionRun))
            .wrap(middlewares::RequireJWT)
            .route("/preview", web::post().to(preview))
            // 正式执行会推进当前学年，仅限管理员
            .route(
                "/execute",
                web::post()
                    .to(execute)
                    .wrap(RequireRole::new_any(UserRole::admin_roles())),
            ),
    );
}
