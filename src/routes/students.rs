use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RequirePermission};
use crate::models::students::requests::{
    CreateStudentRequest, StudentFeesParams, StudentListParams, UpdateStudentRequest,
};
use crate::models::users::entities::Permission;
use crate::services::StudentService;
use crate::utils::SafeIDI64;

// 懒加载的全局 StudentService 实例
static STUDENT_SERVICE: Lazy<StudentService> = Lazy::new(StudentService::new_lazy);

pub async fn list_students(
    req: HttpRequest,
    query: web::Query<StudentListParams>,
) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE.list_students(&req, query.into_inner()).await
}

pub async fn create_student(
    req: HttpRequest,
    body: web::Json<CreateStudentRequest>,
) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE.create_student(&req, body.into_inner()).await
}

pub async fn get_student(req: HttpRequest, student_id: SafeIDI64) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE.get_student(&req, student_id.0).await
}

pub async fn update_student(
    req: HttpRequest,
    student_id: SafeIDI64,
    body: web::Json<UpdateStudentRequest>,
) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE
        .update_student(&req, student_id.0, body.into_inner())
        .await
}

pub async fn delete_student(req: HttpRequest, student_id: SafeIDI64) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE.delete_student(&req, student_id.0).await
}

pub async fn get_student_fees(
    req: HttpRequest,
    student_id: SafeIDI64,
    query: web::Query<StudentFeesParams>,
) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE
        .get_student_fees(&req, student_id.0, query.into_inner())
        .await
}

// 配置路由
pub fn configure_student_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/students")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(
                        web::get()
                            .to(list_students)
                            .wrap(RequirePermission::new(Permission::StudentsView)),
                    )
                    .route(
                        web::post()
                            .to(create_student)
                            .wrap(RequirePermission::new(Permission::StudentsManage)),
                    ),
            )
            .service(
                web::resource("/{id}")
                    .route(
                        web::get()
                            .to(get_student)
                            .wrap(RequirePermission::new(Permission::StudentsView)),
                    )
                    .route(
                        web::put()
                            .to(update_student)
                            .wrap(RequirePermission::new(Permission::StudentsManage)),
                    )
                    .route(
                        web::delete()
                            .to(delete_student)
                            .wrap(RequirePermission::new(Permission::StudentsManage)),
                    ),
            )
            .service(
                web::resource("/{id}/fees").route(
                    web::get()
                        .to(get_student_fees)
                        .wrap(RequirePermission::new(Permission::FeesView)),
                ),
            ),
    );
}
