use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::{Datelike, Utc};

use super::DashboardService;
use crate::models::{
    ApiResponse, ErrorCode,
    dashboard::{requests::CollectionsParams, responses::CollectionsResponse},
    fees::calculator::round_amount,
};
use crate::services::storage_error_response;

pub async fn get_collections(
    service: &DashboardService,
    request: &HttpRequest,
    params: CollectionsParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let year = params.year.unwrap_or_else(|| Utc::now().year());
    if !(2000..=2100).contains(&year) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            format!("年份超出范围: {year}"),
        )));
    }

    match storage.monthly_collections(year).await {
        Ok(months) => {
            let total = round_amount(months.iter().map(|m| m.amount).sum());
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                CollectionsResponse {
                    year,
                    months,
                    total,
                },
                "Collections retrieved successfully",
            )))
        }
        Err(e) => Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}
