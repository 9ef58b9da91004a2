use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::FeeService;
use crate::models::{
    ApiResponse, ErrorCode,
    activity::entities::{ActivityAction, EntityType},
    fees::{
        calculator::AcademicYear,
        requests::{
            FeeExportParams, FeeRecordListParams, FeeRecordListQuery, GenerateFeeRecordsRequest,
            UpdateFeeRecordRequest,
        },
    },
};
use crate::services::{DynamicConfig, export, record_activity, storage_error_response};

fn record_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(
        ErrorCode::FeeRecordNotFound,
        "Fee record not found",
    ))
}

pub async fn list_fee_records(
    service: &FeeService,
    request: &HttpRequest,
    params: FeeRecordListParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let query = FeeRecordListQuery {
        page: Some(params.pagination.page),
        size: Some(params.pagination.size),
        student_id: params.student_id,
        class_id: params.class_id,
        fee_type_id: params.fee_type_id,
        academic_year: params.academic_year,
        status: params.status,
    };
    let ctx = DynamicConfig::fee_context().await;

    match storage.list_fee_records(query, ctx).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Fee records retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::FeeRecordNotFound)),
    }
}

pub async fn generate_fee_records(
    service: &FeeService,
    request: &HttpRequest,
    mut req: GenerateFeeRecordsRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    req.academic_year = req.academic_year.trim().to_string();
    if let Err(msg) = req.academic_year.parse::<AcademicYear>() {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)));
    }

    let ctx = DynamicConfig::fee_context().await;
    let academic_year = req.academic_year.clone();
    let scope = match (req.class_id, req.student_id) {
        (_, Some(student_id)) => format!("学生 #{student_id}"),
        (Some(class_id), None) => format!("班级 #{class_id}"),
        (None, None) => "全部在读学生".to_string(),
    };

    match storage.generate_fee_records(req, ctx).await {
        Ok(result) => {
            info!(
                "Fee records generated for {} ({}): created {}, skipped {}, not applicable {}",
                academic_year, scope, result.created, result.skipped, result.not_applicable
            );
            record_activity(
                &storage,
                request,
                ActivityAction::Generate,
                EntityType::FeeRecord,
                None,
                format!(
                    "生成 {academic_year} 学年收费记录（{scope}）：新建 {}，跳过 {}",
                    result.created, result.skipped
                ),
            )
            .await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                result,
                "Fee records generated successfully",
            )))
        }
        Err(e) => Ok(storage_error_response(&e, ErrorCode::BadRequest)),
    }
}

pub async fn get_fee_record(
    service: &FeeService,
    request: &HttpRequest,
    id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let ctx = DynamicConfig::fee_context().await;

    match storage.get_fee_record_detail(id, ctx).await {
        Ok(Some(detail)) => Ok(HttpResponse::Ok()
            .json(ApiResponse::success(detail, "Fee record retrieved successfully"))),
        Ok(None) => Ok(record_not_found()),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::FeeRecordNotFound)),
    }
}

pub async fn update_fee_record(
    service: &FeeService,
    request: &HttpRequest,
    id: i64,
    update: UpdateFeeRecordRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let ctx = DynamicConfig::fee_context().await;

    let waived = update.waived;
    match storage.update_fee_record(id, update, ctx).await {
        Ok(Some(detail)) => {
            let description = match waived {
                Some(true) => format!(
                    "{} 的 {} 标记为免收",
                    detail.student_name, detail.fee_type_name
                ),
                Some(false) => format!(
                    "{} 的 {} 取消免收",
                    detail.student_name, detail.fee_type_name
                ),
                None => format!(
                    "修改 {} 的 {} 备注",
                    detail.student_name, detail.fee_type_name
                ),
            };
            record_activity(
                &storage,
                request,
                ActivityAction::Update,
                EntityType::FeeRecord,
                Some(id),
                description,
            )
            .await;
            Ok(HttpResponse::Ok()
                .json(ApiResponse::success(detail, "Fee record updated successfully")))
        }
        Ok(None) => Ok(record_not_found()),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::FeeRecordNotFound)),
    }
}

pub async fn export_fee_records(
    service: &FeeService,
    request: &HttpRequest,
    params: FeeExportParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let ctx = DynamicConfig::fee_context().await;

    let records = match storage
        .list_fee_records_for_export(params.academic_year.clone(), params.class_id, ctx)
        .await
    {
        Ok(records) => records,
        Err(e) => return Ok(storage_error_response(&e, ErrorCode::ExportFailed)),
    };

    let buffer = match export::fee_records_xlsx(&records) {
        Ok(buffer) => buffer,
        Err(e) => return Ok(storage_error_response(&e, ErrorCode::ExportFailed)),
    };

    record_activity(
        &storage,
        request,
        ActivityAction::Export,
        EntityType::FeeRecord,
        None,
        format!(
            "导出收费记录 {} 条（学年 {}）",
            records.len(),
            params.academic_year.as_deref().unwrap_or("全部")
        ),
    )
    .await;

    let name = match &params.academic_year {
        Some(year) => format!("fee_records_{year}"),
        None => "fee_records".to_string(),
    };
    Ok(export::xlsx_response(buffer, &name))
}
