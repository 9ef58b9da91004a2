use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{
    StudentService,
    create::{StudentFields, validate_student_fields},
};
use crate::models::{
    ApiResponse, ErrorCode,
    activity::entities::{ActivityAction, EntityType},
    students::requests::UpdateStudentRequest,
};
use crate::services::{record_activity, storage_error_response};

pub async fn update_student(
    service: &StudentService,
    request: &HttpRequest,
    student_id: i64,
    mut update: UpdateStudentRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    update.admission_number = update.admission_number.map(|n| n.trim().to_string());
    update.first_name = update.first_name.map(|n| n.trim().to_string());

    let fields = StudentFields {
        admission_number: update.admission_number.as_deref(),
        first_name: update.first_name.as_deref(),
        class_id: update.class_id,
        guardian_phone: update.guardian_phone.as_deref(),
        guardian_email: update.guardian_email.as_deref(),
        academic_year: update.academic_year.as_deref(),
    };
    if let Err(resp) = validate_student_fields(&storage, fields).await {
        return Ok(resp);
    }

    match storage.update_student(student_id, update).await {
        Ok(Some(student)) => {
            record_activity(
                &storage,
                request,
                ActivityAction::Update,
                EntityType::Student,
                Some(student.id),
                format!("修改学生 {}", student.full_name()),
            )
            .await;
            Ok(HttpResponse::Ok()
                .json(ApiResponse::success(student, "Student updated successfully")))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::StudentNotFound,
            "Student not found",
        ))),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::StudentAlreadyExists)),
    }
}
