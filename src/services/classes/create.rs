use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::ClassService;
use crate::models::{
    ApiResponse, ErrorCode,
    activity::entities::{ActivityAction, EntityType},
    classes::requests::CreateClassRequest,
};
use crate::services::{record_activity, storage_error_response};
use crate::storage::Storage;

const CLASS_NAME_MAX_LEN: usize = 64;

fn invalid(message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::ClassInvalid, message))
}

/// 校验班级字段，创建与更新共用
pub(super) async fn validate_class_fields(
    storage: &Arc<dyn Storage>,
    name: Option<&str>,
    capacity: Option<i32>,
    class_teacher_id: Option<i64>,
) -> Result<(), HttpResponse> {
    if let Some(name) = name {
        let name = name.trim();
        if name.is_empty() || name.chars().count() > CLASS_NAME_MAX_LEN {
            return Err(invalid(format!(
                "班级名称不能为空且不超过 {CLASS_NAME_MAX_LEN} 个字符"
            )));
        }
    }
    if capacity.is_some_and(|c| c <= 0) {
        return Err(invalid("班级容量必须大于 0"));
    }
    if let Some(staff_id) = class_teacher_id {
        match storage.get_staff_by_id(staff_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return Err(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::StaffNotFound,
                    format!("班主任不存在: {staff_id}"),
                )));
            }
            Err(e) => return Err(storage_error_response(&e, ErrorCode::ClassInvalid)),
        }
    }
    Ok(())
}

pub async fn create_class(
    service: &ClassService,
    request: &HttpRequest,
    class_data: CreateClassRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    if let Err(resp) = validate_class_fields(
        &storage,
        Some(&class_data.name),
        class_data.capacity,
        class_data.class_teacher_id,
    )
    .await
    {
        return Ok(resp);
    }

    if let Ok(Some(existing)) = storage.get_class_by_name(&class_data.name).await {
        return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::ClassAlreadyExists,
            format!("班级名称已存在: {}", existing.name),
        )));
    }

    match storage.create_class(class_data).await {
        Ok(class) => {
            info!("Class {} created", class.name);
            record_activity(
                &storage,
                request,
                ActivityAction::Create,
                EntityType::Class,
                Some(class.id),
                format!("创建班级 {}", class.display_name()),
            )
            .await;
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(class, "Class created successfully")))
        }
        Err(e) => Ok(storage_error_response(&e, ErrorCode::ClassAlreadyExists)),
    }
}
