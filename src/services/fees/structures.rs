use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::FeeService;
use crate::models::{
    ApiResponse, ErrorCode,
    activity::entities::{ActivityAction, EntityType},
    fees::{
        calculator::AcademicYear,
        requests::{FeeStructureListParams, UpsertFeeStructureRequest},
        responses::FeeStructureListResponse,
    },
};
use crate::services::{record_activity, storage_error_response};

pub async fn list_fee_structures(
    service: &FeeService,
    request: &HttpRequest,
    params: FeeStructureListParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.list_fee_structures(params).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            FeeStructureListResponse { items },
            "Fee structures retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::FeeStructureNotFound)),
    }
}

pub async fn upsert_fee_structure(
    service: &FeeService,
    request: &HttpRequest,
    mut req: UpsertFeeStructureRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    req.academic_year = req.academic_year.trim().to_string();
    if let Err(msg) = req.academic_year.parse::<AcademicYear>() {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::FeeStructureInvalid, msg)));
    }
    if !req.amount.is_finite() || req.amount < 0.0 {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::FeeStructureInvalid,
            "金额不能为负数",
        )));
    }

    match storage.upsert_fee_structure(req).await {
        Ok(detail) => {
            record_activity(
                &storage,
                request,
                ActivityAction::Update,
                EntityType::FeeStructure,
                Some(detail.structure.id),
                format!(
                    "设置 {} {} 学年 {} 每期 {:.2}",
                    detail.class_name,
                    detail.structure.academic_year,
                    detail.fee_type_name,
                    detail.structure.amount
                ),
            )
            .await;
            Ok(HttpResponse::Ok()
                .json(ApiResponse::success(detail, "Fee structure saved successfully")))
        }
        Err(e) => Ok(storage_error_response(&e, ErrorCode::FeeStructureInvalid)),
    }
}

pub async fn delete_fee_structure(
    service: &FeeService,
    request: &HttpRequest,
    id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.delete_fee_structure(id).await {
        Ok(true) => {
            record_activity(
                &storage,
                request,
                ActivityAction::Delete,
                EntityType::FeeStructure,
                Some(id),
                format!("删除收费标准 #{id}"),
            )
            .await;
            Ok(HttpResponse::Ok()
                .json(ApiResponse::success_empty("Fee structure deleted successfully")))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::FeeStructureNotFound,
            "Fee structure not found",
        ))),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::FeeStructureNotFound)),
    }
}
