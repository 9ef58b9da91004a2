use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RequirePermission};
use crate::models::staff::requests::{
    CreateStaffRequest, PaySalaryRequest, StaffListParams, UpdateStaffRequest,
};
use crate::models::users::entities::Permission;
use crate::services::StaffService;
use crate::utils::SafeIDI64;

// 懒加载的全局 StaffService 实例
static STAFF_SERVICE: Lazy<StaffService> = Lazy::new(StaffService::new_lazy);

pub async fn list_staff(
    req: HttpRequest,
    query: web::Query<StaffListParams>,
) -> ActixResult<HttpResponse> {
    STAFF_SERVICE.list_staff(&req, query.into_inner()).await
}

pub async fn create_staff(
    req: HttpRequest,
    body: web::Json<CreateStaffRequest>,
) -> ActixResult<HttpResponse> {
    STAFF_SERVICE.create_staff(&req, body.into_inner()).await
}

pub async fn get_staff(req: HttpRequest, staff_id: SafeIDI64) -> ActixResult<HttpResponse> {
    STAFF_SERVICE.get_staff(&req, staff_id.0).await
}

pub async fn update_staff(
    req: HttpRequest,
    staff_id: SafeIDI64,
    body: web::Json<UpdateStaffRequest>,
) -> ActixResult<HttpResponse> {
    STAFF_SERVICE
        .update_staff(&req, staff_id.0, body.into_inner())
        .await
}

pub async fn delete_staff(req: HttpRequest, staff_id: SafeIDI64) -> ActixResult<HttpResponse> {
    STAFF_SERVICE.delete_staff(&req, staff_id.0).await
}

pub async fn pay_salary(
    req: HttpRequest,
    staff_id: SafeIDI64,
    body: web::Json<PaySalaryRequest>,
) -> ActixResult<HttpResponse> {
    STAFF_SERVICE
        .pay_salary(&req, staff_id.0, body.into_inner())
        .await
}

// 配置路由
pub fn configure_staff_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/staff")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(
                        web::get()
                            .to(list_staff)
                            .wrap(RequirePermission::new(Permission::StaffView)),
                    )
                    .route(
                        web::post()
                            .to(create_staff)
                            .wrap(RequirePermission::new(Permission::StaffManage)),
                    ),
            )
            .service(
                web::resource("/{id}")
                    .route(
                        web::get()
                            .to(get_staff)
                            .wrap(RequirePermission::new(Permission::StaffView)),
                    )
                    .route(
                        web::put()
                            .to(update_staff)
                            .wrap(RequirePermission::new(Permission::StaffManage)),
                    )
                    .route(
                        web::delete()
                            .to(delete_staff)
                            .wrap(RequirePermission::new(Permission::StaffManage)),
                    ),
            )
            .service(
                // 发薪同时写财务流水
                web::resource("/{id}/salary").route(
                    web::post().to(pay_salary).wrap(RequirePermission::new_any(&[
                        Permission::StaffManage,
                        Permission::FinanceManage,
                    ])),
                ),
            ),
    );
}
