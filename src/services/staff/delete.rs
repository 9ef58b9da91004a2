use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::StaffService;
use crate::models::{
    ApiResponse, ErrorCode,
    activity::entities::{ActivityAction, EntityType},
};
use crate::services::{record_activity, storage_error_response};

pub async fn delete_staff(
    service: &StaffService,
    request: &HttpRequest,
    staff_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.delete_staff(staff_id).await {
        Ok(true) => {
            record_activity(
                &storage,
                request,
                ActivityAction::Delete,
                EntityType::Staff,
                Some(staff_id),
                format!("删除教职工 #{staff_id}"),
            )
            .await;
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Staff deleted successfully")))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::StaffNotFound,
            "Staff not found",
        ))),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::StaffNotFound)),
    }
}
