use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::StaffService;
use crate::errors::SchoolError;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    activity::entities::{ActivityAction, EntityType},
    staff::{
        entities::parse_salary_month,
        requests::{PaySalaryRequest, SalaryPayment},
    },
};
use crate::services::{record_activity, storage_error_response};

pub async fn pay_salary(
    service: &StaffService,
    request: &HttpRequest,
    staff_id: i64,
    req: PaySalaryRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let month = req.month.trim().to_string();
    if parse_salary_month(&month).is_none() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::StaffInvalid,
            "月份格式应为 YYYY-MM",
        )));
    }

    let staff = match storage.get_staff_by_id(staff_id).await {
        Ok(Some(staff)) => staff,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::StaffNotFound,
                "Staff not found",
            )));
        }
        Err(e) => return Ok(storage_error_response(&e, ErrorCode::StaffNotFound)),
    };

    let amount = req.amount.unwrap_or(staff.salary);
    if !amount.is_finite() || amount <= 0.0 {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::StaffInvalid,
            "发薪金额必须大于 0",
        )));
    }

    let payment = SalaryPayment {
        staff_id,
        account_id: req.account_id,
        amount,
        month: month.clone(),
        remarks: req.remarks,
        paid_by: RequireJWT::extract_user_id(request),
    };

    match storage.pay_salary(payment).await {
        Ok(result) => {
            info!(
                "Salary paid for staff {} ({}), month {}, amount {:.2}",
                staff_id, result.staff.employee_code, month, amount
            );
            record_activity(
                &storage,
                request,
                ActivityAction::Payment,
                EntityType::Staff,
                Some(staff_id),
                format!("{} 发放 {} 工资 {:.2}", result.staff.full_name, month, amount),
            )
            .await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(result, "Salary paid successfully")))
        }
        Err(e @ SchoolError::Conflict(_)) => {
            Ok(storage_error_response(&e, ErrorCode::SalaryAlreadyPaid))
        }
        // 账户不存在、停用或余额不足自带错误码
        Err(e @ SchoolError::NotFound(_)) => {
            Ok(storage_error_response(&e, ErrorCode::StaffNotFound))
        }
        Err(e) => Ok(storage_error_response(&e, ErrorCode::StaffInvalid)),
    }
}
