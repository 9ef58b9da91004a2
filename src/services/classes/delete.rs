use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ClassService;
use crate::errors::SchoolError;
use crate::models::{
    ApiResponse, ErrorCode,
    activity::entities::{ActivityAction, EntityType},
};
use crate::services::{record_activity, storage_error_response};

pub async fn delete_class(
    service: &ClassService,
    request: &HttpRequest,
    class_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.delete_class(class_id).await {
        Ok(true) => {
            record_activity(
                &storage,
                request,
                ActivityAction::Delete,
                EntityType::Class,
                Some(class_id),
                format!("删除班级 #{class_id}"),
            )
            .await;
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Class deleted successfully")))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ClassNotFound,
            "Class not found",
        ))),
        Err(e @ SchoolError::Conflict(_)) => {
            Ok(storage_error_response(&e, ErrorCode::ClassHasStudents))
        }
        Err(e) => Ok(storage_error_response(&e, ErrorCode::ClassNotFound)),
    }
}
