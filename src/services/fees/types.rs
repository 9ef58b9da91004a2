use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::FeeService;
use crate::errors::SchoolError;
use crate::models::{
    ApiResponse, ErrorCode,
    activity::entities::{ActivityAction, EntityType},
    fees::{
        requests::{CreateFeeTypeRequest, FeeTypeListParams, UpdateFeeTypeRequest},
        responses::FeeTypeListResponse,
    },
};
use crate::services::{record_activity, storage_error_response};

const MAX_NAME_LEN: usize = 64;

fn validate_name(name: &str) -> Result<(), &'static str> {
    let len = name.chars().count();
    if len == 0 {
        return Err("收费项目名称不能为空");
    }
    if len > MAX_NAME_LEN {
        return Err("收费项目名称过长");
    }
    Ok(())
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(
        ErrorCode::FeeTypeNotFound,
        "Fee type not found",
    ))
}

pub async fn list_fee_types(
    service: &FeeService,
    request: &HttpRequest,
    params: FeeTypeListParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.list_fee_types(params.include_inactive).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            FeeTypeListResponse { items },
            "Fee types retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::FeeTypeNotFound)),
    }
}

pub async fn create_fee_type(
    service: &FeeService,
    request: &HttpRequest,
    mut req: CreateFeeTypeRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    req.name = req.name.trim().to_string();
    if let Err(msg) = validate_name(&req.name) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)));
    }

    match storage.create_fee_type(req).await {
        Ok(fee_type) => {
            record_activity(
                &storage,
                request,
                ActivityAction::Create,
                EntityType::FeeType,
                Some(fee_type.id),
                format!("新增收费项目 {}", fee_type.name),
            )
            .await;
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(fee_type, "Fee type created successfully")))
        }
        Err(e) => Ok(storage_error_response(&e, ErrorCode::FeeTypeAlreadyExists)),
    }
}

pub async fn get_fee_type(
    service: &FeeService,
    request: &HttpRequest,
    id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_fee_type_by_id(id).await {
        Ok(Some(fee_type)) => Ok(HttpResponse::Ok()
            .json(ApiResponse::success(fee_type, "Fee type retrieved successfully"))),
        Ok(None) => Ok(not_found()),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::FeeTypeNotFound)),
    }
}

pub async fn update_fee_type(
    service: &FeeService,
    request: &HttpRequest,
    id: i64,
    mut update: UpdateFeeTypeRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    update.name = update.name.map(|n| n.trim().to_string());
    if let Some(name) = &update.name
        && let Err(msg) = validate_name(name)
    {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)));
    }

    match storage.update_fee_type(id, update).await {
        Ok(Some(fee_type)) => {
            record_activity(
                &storage,
                request,
                ActivityAction::Update,
                EntityType::FeeType,
                Some(fee_type.id),
                format!("修改收费项目 {}", fee_type.name),
            )
            .await;
            Ok(HttpResponse::Ok()
                .json(ApiResponse::success(fee_type, "Fee type updated successfully")))
        }
        Ok(None) => Ok(not_found()),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::FeeTypeAlreadyExists)),
    }
}

pub async fn delete_fee_type(
    service: &FeeService,
    request: &HttpRequest,
    id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.delete_fee_type(id).await {
        Ok(true) => {
            record_activity(
                &storage,
                request,
                ActivityAction::Delete,
                EntityType::FeeType,
                Some(id),
                format!("删除收费项目 #{id}"),
            )
            .await;
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Fee type deleted successfully")))
        }
        Ok(false) => Ok(not_found()),
        Err(e @ SchoolError::Conflict(_)) => Ok(storage_error_response(&e, ErrorCode::FeeTypeInUse)),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::FeeTypeNotFound)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Tuition").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name(&"学".repeat(MAX_NAME_LEN)).is_ok());
        assert!(validate_name(&"学".repeat(MAX_NAME_LEN + 1)).is_err());
    }
}
