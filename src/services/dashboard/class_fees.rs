use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{DashboardService, resolve_academic_year};
use crate::models::{
    ApiResponse, ErrorCode,
    dashboard::{requests::DashboardParams, responses::ClassFeesResponse},
};
use crate::services::storage_error_response;

pub async fn get_class_fees(
    service: &DashboardService,
    request: &HttpRequest,
    params: DashboardParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let academic_year = match resolve_academic_year(params.academic_year).await {
        Ok(year) => year,
        Err(msg) => {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)));
        }
    };

    match storage.class_fee_summaries(&academic_year).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            ClassFeesResponse {
                academic_year,
                items,
            },
            "Class fee summaries retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}
