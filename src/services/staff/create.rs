use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::StaffService;
use crate::models::{
    ApiResponse, ErrorCode,
    activity::entities::{ActivityAction, EntityType},
    staff::requests::CreateStaffRequest,
};
use crate::services::{record_activity, storage_error_response};
use crate::utils::validate::{validate_code, validate_email, validate_phone};

/// 教职工的可校验字段，创建与更新共用
pub(super) fn validate_staff_fields(
    employee_code: Option<&str>,
    full_name: Option<&str>,
    phone: Option<&str>,
    email: Option<&str>,
    salary: Option<f64>,
) -> Result<(), String> {
    if let Some(code) = employee_code {
        validate_code(code).map_err(|msg| format!("工号无效: {msg}"))?;
    }
    if full_name.is_some_and(|n| n.trim().is_empty()) {
        return Err("姓名不能为空".to_string());
    }
    if let Some(phone) = phone.filter(|p| !p.trim().is_empty()) {
        validate_phone(phone)?;
    }
    if let Some(email) = email.filter(|e| !e.trim().is_empty()) {
        validate_email(email.trim())?;
    }
    if salary.is_some_and(|s| !s.is_finite() || s < 0.0) {
        return Err("月薪不能为负数".to_string());
    }
    Ok(())
}

pub async fn create_staff(
    service: &StaffService,
    request: &HttpRequest,
    mut staff: CreateStaffRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    staff.employee_code = staff.employee_code.trim().to_string();
    staff.full_name = staff.full_name.trim().to_string();

    if let Err(msg) = validate_staff_fields(
        Some(&staff.employee_code),
        Some(&staff.full_name),
        staff.phone.as_deref(),
        staff.email.as_deref(),
        Some(staff.salary),
    ) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::StaffInvalid, msg)));
    }

    match storage.create_staff(staff).await {
        Ok(staff) => {
            record_activity(
                &storage,
                request,
                ActivityAction::Create,
                EntityType::Staff,
                Some(staff.id),
                format!("新增教职工 {}（{}）", staff.full_name, staff.employee_code),
            )
            .await;
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(staff, "Staff created successfully")))
        }
        Err(e) => Ok(storage_error_response(&e, ErrorCode::StaffAlreadyExists)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_staff_fields() {
        assert!(validate_staff_fields(Some("EMP-01"), Some("R. Iyer"), None, None, Some(0.0)).is_ok());
        assert!(validate_staff_fields(None, Some("  "), None, None, None).is_err());
        assert!(validate_staff_fields(None, None, None, None, Some(-1.0)).is_err());
        assert!(validate_staff_fields(None, None, None, Some("not-an-email"), None).is_err());
        // 空字符串视为未填写
        assert!(validate_staff_fields(None, None, Some(""), Some(""), None).is_ok());
    }
}
