use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::StudentService;
use crate::models::{
    ApiResponse, ErrorCode,
    fees::entities::FeeTotals,
    students::{requests::StudentFeesParams, responses::StudentFeesResponse},
};
use crate::services::{DynamicConfig, storage_error_response};

pub async fn get_student_fees(
    service: &StudentService,
    request: &HttpRequest,
    student_id: i64,
    params: StudentFeesParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_student_by_id(student_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::StudentNotFound,
                "Student not found",
            )));
        }
        Err(e) => return Ok(storage_error_response(&e, ErrorCode::StudentNotFound)),
    }

    let academic_year = match params.academic_year {
        Some(year) => year,
        None => DynamicConfig::current_academic_year().await,
    };
    let ctx = DynamicConfig::fee_context().await;

    match storage
        .list_student_fee_records(student_id, Some(academic_year.clone()), ctx)
        .await
    {
        Ok(records) => {
            let totals = FeeTotals::from_details(&records);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                StudentFeesResponse {
                    student_id,
                    academic_year,
                    records,
                    totals,
                },
                "Student fees retrieved successfully",
            )))
        }
        Err(e) => Ok(storage_error_response(&e, ErrorCode::FeeRecordNotFound)),
    }
}
