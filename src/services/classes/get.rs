use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::warn;

use super::ClassService;
use crate::models::{ApiResponse, ErrorCode, classes::entities::ClassWithStats};
use crate::services::storage_error_response;

/// 班级详情，附带在读人数和班主任姓名
pub async fn get_class(
    service: &ClassService,
    request: &HttpRequest,
    class_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let class = match storage.get_class_by_id(class_id).await {
        Ok(Some(class)) => class,
        Ok(None) => {
            return Ok(HttpResponse::NotFound()
                .json(ApiResponse::error_empty(ErrorCode::ClassNotFound, "班级不存在")));
        }
        Err(e) => return Ok(storage_error_response(&e, ErrorCode::ClassNotFound)),
    };

    let student_count = match storage.count_active_students(class_id).await {
        Ok(count) => count,
        Err(e) => return Ok(storage_error_response(&e, ErrorCode::ClassNotFound)),
    };

    // 班主任可能已离职删除，查不到时只是不显示姓名
    let class_teacher_name = match class.class_teacher_id {
        Some(staff_id) => match storage.get_staff_by_id(staff_id).await {
            Ok(staff) => staff.map(|s| s.full_name),
            Err(e) => {
                warn!("Failed to load class teacher {}: {}", staff_id, e);
                None
            }
        },
        None => None,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        ClassWithStats {
            class,
            student_count,
            class_teacher_name,
        },
        "Class retrieved successfully",
    )))
}
