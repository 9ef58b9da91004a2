use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::StaffService;
use crate::models::{
    ApiResponse, ErrorCode,
    staff::requests::{StaffListParams, StaffListQuery},
};

pub async fn list_staff(
    service: &StaffService,
    request: &HttpRequest,
    query: StaffListParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let list_query = StaffListQuery {
        page: Some(query.pagination.page),
        size: Some(query.pagination.size),
        search: query.search,
        department: query.department,
        status: query.status,
        salary_status: query.salary_status,
    };

    match storage.list_staff_with_pagination(list_query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Staff list retrieved successfully",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to retrieve staff list: {e}"),
            )),
        ),
    }
}
