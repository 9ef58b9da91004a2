use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{ClassService, create::validate_class_fields};
use crate::models::{
    ApiResponse, ErrorCode,
    activity::entities::{ActivityAction, EntityType},
    classes::requests::UpdateClassRequest,
};
use crate::services::{record_activity, storage_error_response};

pub async fn update_class(
    service: &ClassService,
    request: &HttpRequest,
    class_id: i64,
    update_data: UpdateClassRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    if let Err(resp) = validate_class_fields(
        &storage,
        update_data.name.as_deref(),
        update_data.capacity,
        update_data.class_teacher_id,
    )
    .await
    {
        return Ok(resp);
    }

    match storage.update_class(class_id, update_data).await {
        Ok(Some(class)) => {
            record_activity(
                &storage,
                request,
                ActivityAction::Update,
                EntityType::Class,
                Some(class.id),
                format!("修改班级 {}", class.display_name()),
            )
            .await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                class,
                "Class information updated successfully",
            )))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ClassNotFound,
            "Class not found",
        ))),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::ClassAlreadyExists)),
    }
}
