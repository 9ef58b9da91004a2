use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RateLimit, RequirePermission};
use crate::models::fees::requests::{
    CreateFeeTypeRequest, FeeCustomListParams, FeeExportParams, FeeRecordListParams,
    FeeStructureListParams, FeeTypeListParams, GenerateFeeRecordsRequest, PaymentListParams,
    RecordPaymentRequest, UpdateFeeRecordRequest, UpdateFeeTypeRequest, UpsertFeeCustomRequest,
    UpsertFeeStructureRequest,
};
use crate::models::users::entities::Permission;
use crate::services::FeeService;
use crate::utils::SafeIDI64;

// 懒加载的全局 FeeService 实例
static FEE_SERVICE: Lazy<FeeService> = Lazy::new(FeeService::new_lazy);

// ==================== 收费项目 ====================

pub async fn list_fee_types(
    req: HttpRequest,
    query: web::Query<FeeTypeListParams>,
) -> ActixResult<HttpResponse> {
    FEE_SERVICE.list_fee_types(&req, query.into_inner()).await
}

pub async fn create_fee_type(
    req: HttpRequest,
    body: web::Json<CreateFeeTypeRequest>,
) -> ActixResult<HttpResponse> {
    FEE_SERVICE.create_fee_type(&req, body.into_inner()).await
}

pub async fn get_fee_type(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    FEE_SERVICE.get_fee_type(&req, id.0).await
}

pub async fn update_fee_type(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<UpdateFeeTypeRequest>,
) -> ActixResult<HttpResponse> {
    FEE_SERVICE
        .update_fee_type(&req, id.0, body.into_inner())
        .await
}

pub async fn delete_fee_type(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    FEE_SERVICE.delete_fee_type(&req, id.0).await
}

// ==================== 班级收费标准 ====================

pub async fn list_fee_structures(
    req: HttpRequest,
    query: web::Query<FeeStructureListParams>,
) -> ActixResult<HttpResponse> {
    FEE_SERVICE.list_fee_structures(&req, query.into_inner()).await
}

pub async fn upsert_fee_structure(
    req: HttpRequest,
    body: web::Json<UpsertFeeStructureRequest>,
) -> ActixResult<HttpResponse> {
    FEE_SERVICE
        .upsert_fee_structure(&req, body.into_inner())
        .await
}

pub async fn delete_fee_structure(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    FEE_SERVICE.delete_fee_structure(&req, id.0).await
}

// ==================== 学生个别收费 ====================

pub async fn list_fee_customs(
    req: HttpRequest,
    query: web::Query<FeeCustomListParams>,
) -> ActixResult<HttpResponse> {
    FEE_SERVICE.list_fee_customs(&req, query.into_inner()).await
}

pub async fn upsert_fee_custom(
    req: HttpRequest,
    body: web::Json<UpsertFeeCustomRequest>,
) -> ActixResult<HttpResponse> {
    FEE_SERVICE.upsert_fee_custom(&req, body.into_inner()).await
}

pub async fn delete_fee_custom(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    FEE_SERVICE.delete_fee_custom(&req, id.0).await
}

// ==================== 收费记录 ====================

pub async fn list_fee_records(
    req: HttpRequest,
    query: web::Query<FeeRecordListParams>,
) -> ActixResult<HttpResponse> {
    FEE_SERVICE.list_fee_records(&req, query.into_inner()).await
}

pub async fn generate_fee_records(
    req: HttpRequest,
    body: web::Json<GenerateFeeRecordsRequest>,
) -> ActixResult<HttpResponse> {
    FEE_SERVICE
        .generate_fee_records(&req, body.into_inner())
        .await
}

pub async fn get_fee_record(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    FEE_SERVICE.get_fee_record(&req, id.0).await
}

pub async fn update_fee_record(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<UpdateFeeRecordRequest>,
) -> ActixResult<HttpResponse> {
    FEE_SERVICE
        .update_fee_record(&req, id.0, body.into_inner())
        .await
}

pub async fn export_fee_records(
    req: HttpRequest,
    query: web::Query<FeeExportParams>,
) -> ActixResult<HttpResponse> {
    FEE_SERVICE.export_fee_records(&req, query.into_inner()).await
}

// ==================== 缴费 ====================

pub async fn record_payment(
    req: HttpRequest,
    body: web::Json<RecordPaymentRequest>,
) -> ActixResult<HttpResponse> {
    FEE_SERVICE.record_payment(&req, body.into_inner()).await
}

pub async fn list_payments(
    req: HttpRequest,
    query: web::Query<PaymentListParams>,
) -> ActixResult<HttpResponse> {
    FEE_SERVICE.list_payments(&req, query.into_inner()).await
}

pub async fn get_payment(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    FEE_SERVICE.get_payment(&req, id.0).await
}

pub async fn delete_payment(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    FEE_SERVICE.delete_payment(&req, id.0).await
}

pub async fn payment_receipt(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    FEE_SERVICE.payment_receipt(&req, id.0).await
}

fn view() -> RequirePermission {
    RequirePermission::new(Permission::FeesView)
}

fn manage() -> RequirePermission {
    RequirePermission::new(Permission::FeesManage)
}

fn collect() -> RequirePermission {
    RequirePermission::new(Permission::FeesCollect)
}

// 配置路由
pub fn configure_fee_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/fees")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("/types")
                    .route(web::get().to(list_fee_types).wrap(view()))
                    .route(web::post().to(create_fee_type).wrap(manage())),
            )
            .service(
                web::resource("/types/{id}")
                    .route(web::get().to(get_fee_type).wrap(view()))
                    .route(web::put().to(update_fee_type).wrap(manage()))
                    .route(web::delete().to(delete_fee_type).wrap(manage())),
            )
            .service(
                web::resource("/structures")
                    .route(web::get().to(list_fee_structures).wrap(view()))
                    .route(web::put().to(upsert_fee_structure).wrap(manage())),
            )
            .service(
                web::resource("/structures/{id}")
                    .route(web::delete().to(delete_fee_structure).wrap(manage())),
            )
            .service(
                web::resource("/customs")
                    .route(web::get().to(list_fee_customs).wrap(view()))
                    .route(web::put().to(upsert_fee_custom).wrap(manage())),
            )
            .service(
                web::resource("/customs/{id}")
                    .route(web::delete().to(delete_fee_custom).wrap(manage())),
            )
            // 固定路径要先于 /records/{id} 注册
            .service(
                web::resource("/records/generate")
                    .route(web::post().to(generate_fee_records).wrap(manage())),
            )
            .service(
                web::resource("/records/export").route(
                    web::get()
                        .to(export_fee_records)
                        .wrap(view())
                        .wrap(RateLimit::export()),
                ),
            )
            .service(
                web::resource("/records")
                    .route(web::get().to(list_fee_records).wrap(view())),
            )
            .service(
                web::resource("/records/{id}")
                    .route(web::get().to(get_fee_record).wrap(view()))
                    .route(web::put().to(update_fee_record).wrap(manage())),
            )
            .service(
                web::resource("/payments")
                    .route(web::get().to(list_payments).wrap(view()))
                    .route(web::post().to(record_payment).wrap(collect())),
            )
            .service(
                web::resource("/payments/{id}")
                    .route(web::get().to(get_payment).wrap(view()))
                    // 撤销缴费会冲回账户流水
                    .route(web::delete().to(delete_payment).wrap(manage())),
            )
            .service(
                web::resource("/payments/{id}/receipt").route(
                    web::get()
                        .to(payment_receipt)
                        .wrap(RequirePermission::new_any(&[
                            Permission::FeesView,
                            Permission::FeesCollect,
                        ])),
                ),
            ),
    );
}
