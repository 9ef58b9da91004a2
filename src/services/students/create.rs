use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::StudentService;
use crate::models::{
    ApiResponse, ErrorCode,
    activity::entities::{ActivityAction, EntityType},
    fees::calculator::AcademicYear,
    students::requests::CreateStudentRequest,
};
use crate::services::{DynamicConfig, record_activity, storage_error_response};
use crate::storage::Storage;
use crate::utils::validate::{validate_code, validate_email, validate_phone};

fn invalid(message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::StudentInvalid, message))
}

/// 学生的可校验字段，创建与更新共用
#[derive(Default)]
pub(super) struct StudentFields<'a> {
    pub admission_number: Option<&'a str>,
    pub first_name: Option<&'a str>,
    pub class_id: Option<i64>,
    pub guardian_phone: Option<&'a str>,
    pub guardian_email: Option<&'a str>,
    pub academic_year: Option<&'a str>,
}

pub(super) async fn validate_student_fields(
    storage: &Arc<dyn Storage>,
    fields: StudentFields<'_>,
) -> Result<(), HttpResponse> {
    if let Some(number) = fields.admission_number
        && let Err(msg) = validate_code(number)
    {
        return Err(invalid(format!("学籍号无效: {msg}")));
    }
    if fields.first_name.is_some_and(|n| n.trim().is_empty()) {
        return Err(invalid("学生姓名不能为空"));
    }
    if let Some(phone) = fields.guardian_phone.filter(|p| !p.trim().is_empty())
        && let Err(msg) = validate_phone(phone)
    {
        return Err(invalid(msg));
    }
    if let Some(email) = fields.guardian_email.filter(|e| !e.trim().is_empty())
        && let Err(msg) = validate_email(email.trim())
    {
        return Err(invalid(msg));
    }
    if let Some(year) = fields.academic_year
        && let Err(e) = year.parse::<AcademicYear>()
    {
        return Err(invalid(e.to_string()));
    }
    if let Some(class_id) = fields.class_id {
        match storage.get_class_by_id(class_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return Err(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::ClassNotFound,
                    format!("班级不存在: {class_id}"),
                )));
            }
            Err(e) => return Err(storage_error_response(&e, ErrorCode::StudentInvalid)),
        }
    }
    Ok(())
}

pub async fn create_student(
    service: &StudentService,
    request: &HttpRequest,
    mut student: CreateStudentRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    student.admission_number = student.admission_number.trim().to_string();
    student.first_name = student.first_name.trim().to_string();
    student.last_name = student.last_name.trim().to_string();
    if student.academic_year.is_none() {
        student.academic_year = Some(DynamicConfig::current_academic_year().await);
    }

    let fields = StudentFields {
        admission_number: Some(&student.admission_number),
        first_name: Some(&student.first_name),
        class_id: student.class_id,
        guardian_phone: student.guardian_phone.as_deref(),
        guardian_email: student.guardian_email.as_deref(),
        academic_year: student.academic_year.as_deref(),
    };
    if let Err(resp) = validate_student_fields(&storage, fields).await {
        return Ok(resp);
    }

    match storage.create_student(student).await {
        Ok(student) => {
            record_activity(
                &storage,
                request,
                ActivityAction::Create,
                EntityType::Student,
                Some(student.id),
                format!(
                    "新增学生 {}（{}）",
                    student.full_name(),
                    student.admission_number
                ),
            )
            .await;
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(student, "Student created successfully")))
        }
        Err(e) => Ok(storage_error_response(&e, ErrorCode::StudentAlreadyExists)),
    }
}
