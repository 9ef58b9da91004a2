use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::auth::requests::SessionListParams;
use crate::models::users::entities::Permission;
use crate::services::SessionService;

// 懒加载的全局 SessionService 实例
static SESSION_SERVICE: Lazy<SessionService> = Lazy::new(SessionService::new_lazy);

pub async fn list_sessions(
    req: HttpRequest,
    query: web::Query<SessionListParams>,
) -> ActixResult<HttpResponse> {
    SESSION_SERVICE.list_sessions(&req, query.into_inner()).await
}

pub async fn revoke_session(
    req: HttpRequest,
    session_id: web::Path<String>,
) -> ActixResult<HttpResponse> {
    SESSION_SERVICE
        .revoke_session(&req, session_id.into_inner())
        .await
}

// 配置路由
pub fn configure_session_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/sessions")
            .wrap(middlewares::RequirePermission::new(Permission::UsersManage))
            .wrap(middlewares::RequireJWT)
            .route("", web::get().to(list_sessions))
            .route("/{session_id}", web::delete().to(revoke_session)),
    );
}
