use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::FinanceService;
use crate::models::{ApiResponse, ErrorCode, finance::requests::FinanceSummaryParams};
use crate::services::storage_error_response;

pub async fn get_summary(
    service: &FinanceService,
    request: &HttpRequest,
    params: FinanceSummaryParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    if let (Some(from), Some(to)) = (params.from, params.to)
        && from > to
    {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "开始日期不能晚于结束日期",
        )));
    }

    match storage.finance_summary(params.from, params.to).await {
        Ok(summary) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            summary,
            "Finance summary retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}
