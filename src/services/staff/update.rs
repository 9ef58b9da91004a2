use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{StaffService, create::validate_staff_fields};
use crate::models::{
    ApiResponse, ErrorCode,
    activity::entities::{ActivityAction, EntityType},
    staff::requests::UpdateStaffRequest,
};
use crate::services::{record_activity, storage_error_response};

pub async fn update_staff(
    service: &StaffService,
    request: &HttpRequest,
    staff_id: i64,
    mut update: UpdateStaffRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    update.employee_code = update.employee_code.map(|c| c.trim().to_string());
    update.full_name = update.full_name.map(|n| n.trim().to_string());

    if let Err(msg) = validate_staff_fields(
        update.employee_code.as_deref(),
        update.full_name.as_deref(),
        update.phone.as_deref(),
        update.email.as_deref(),
        update.salary,
    ) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::StaffInvalid, msg)));
    }

    match storage.update_staff(staff_id, update).await {
        Ok(Some(staff)) => {
            record_activity(
                &storage,
                request,
                ActivityAction::Update,
                EntityType::Staff,
                Some(staff.id),
                format!("修改教职工 {}", staff.full_name),
            )
            .await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(staff, "Staff updated successfully")))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::StaffNotFound,
            "Staff not found",
        ))),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::StaffAlreadyExists)),
    }
}
