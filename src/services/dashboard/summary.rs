use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::{Datelike, NaiveDate, Utc};

use super::{DashboardService, resolve_academic_year};
use crate::models::{
    ApiResponse, ErrorCode, dashboard::requests::DashboardParams,
    dashboard::responses::DashboardSummary,
};
use crate::services::storage_error_response;

const RECENT_PAYMENTS: u64 = 5;

pub async fn get_summary(
    service: &DashboardService,
    request: &HttpRequest,
    params: DashboardParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let academic_year = match resolve_academic_year(params.academic_year).await {
        Ok(year) => year,
        Err(msg) => {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)));
        }
    };

    let today = Utc::now().date_naive();
    let month_start = NaiveDate::from_ymd_opt(today.year(), today.month(), 1).unwrap_or(today);

    let result = tokio::try_join!(
        storage.count_students_by_status(),
        storage.count_staff(),
        storage.list_all_classes(),
        storage.fee_summary(&academic_year),
        storage.finance_summary(Some(month_start), Some(today)),
        storage.recent_fee_payments(RECENT_PAYMENTS),
    );

    match result {
        Ok((students, staff, classes, fees, month, recent_payments)) => {
            let summary = DashboardSummary {
                academic_year,
                students,
                staff_count: staff.active,
                class_count: classes.len() as i64,
                fees,
                total_balance: month.total_balance,
                month_income: month.income,
                month_expense: month.expense,
                salary_paid: staff.salary_paid,
                salary_unpaid: staff.salary_unpaid,
                recent_payments,
            };
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                summary,
                "Dashboard summary retrieved successfully",
            )))
        }
        Err(e) => Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}
