use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::FeeService;
use crate::models::{
    ApiResponse, ErrorCode,
    activity::entities::{ActivityAction, EntityType},
    fees::{
        calculator::AcademicYear,
        requests::{FeeCustomListParams, UpsertFeeCustomRequest},
        responses::FeeCustomListResponse,
    },
};
use crate::services::{record_activity, storage_error_response};

pub async fn list_fee_customs(
    service: &FeeService,
    request: &HttpRequest,
    params: FeeCustomListParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.list_fee_customs(params).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            FeeCustomListResponse { items },
            "Fee customs retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::FeeCustomNotFound)),
    }
}

pub async fn upsert_fee_custom(
    service: &FeeService,
    request: &HttpRequest,
    mut req: UpsertFeeCustomRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    req.academic_year = req.academic_year.trim().to_string();
    if let Err(msg) = req.academic_year.parse::<AcademicYear>() {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)));
    }
    if req
        .custom_amount
        .is_some_and(|amount| !amount.is_finite() || amount < 0.0)
    {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "个别金额不能为负数",
        )));
    }

    match storage.upsert_fee_custom(req).await {
        Ok(custom) => {
            let description = if custom.is_applicable {
                format!(
                    "学生 #{} {} 学年收费项目 #{} 个别金额 {}",
                    custom.student_id,
                    custom.academic_year,
                    custom.fee_type_id,
                    custom
                        .custom_amount
                        .map(|a| format!("{a:.2}"))
                        .unwrap_or_else(|| "按班级标准".to_string())
                )
            } else {
                format!(
                    "学生 #{} {} 学年不收取收费项目 #{}",
                    custom.student_id, custom.academic_year, custom.fee_type_id
                )
            };
            record_activity(
                &storage,
                request,
                ActivityAction::Update,
                EntityType::FeeCustom,
                Some(custom.id),
                description,
            )
            .await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(custom, "Fee custom saved successfully")))
        }
        Err(e) => Ok(storage_error_response(&e, ErrorCode::BadRequest)),
    }
}

pub async fn delete_fee_custom(
    service: &FeeService,
    request: &HttpRequest,
    id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.delete_fee_custom(id).await {
        Ok(true) => {
            record_activity(
                &storage,
                request,
                ActivityAction::Delete,
                EntityType::FeeCustom,
                Some(id),
                format!("删除个别收费 #{id}"),
            )
            .await;
            Ok(HttpResponse::Ok()
                .json(ApiResponse::success_empty("Fee custom deleted successfully")))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::FeeCustomNotFound,
            "Fee custom not found",
        ))),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::FeeCustomNotFound)),
    }
}
