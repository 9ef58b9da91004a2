use chrono::NaiveDate;
use serde::Deserialize;
use ts_rs::TS;

use super::entities::{SalaryStatus, StaffStatus};
use crate::models::common::PaginationQuery;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/staff.ts")]
pub struct StaffListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub search: Option<String>,
    pub department: Option<String>,
    pub status: Option<StaffStatus>,
    pub salary_status: Option<SalaryStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct StaffListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub search: Option<String>,
    pub department: Option<String>,
    pub status: Option<StaffStatus>,
    pub salary_status: Option<SalaryStatus>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/staff.ts")]
pub struct CreateStaffRequest {
    pub employee_code: String,
    pub full_name: String,
    pub designation: String,
    pub department: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub joining_date: Option<NaiveDate>,
    #[serde(default)]
    pub salary: f64,
}

#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/staff.ts")]
pub struct UpdateStaffRequest {
    pub employee_code: Option<String>,
    pub full_name: Option<String>,
    pub designation: Option<String>,
    pub department: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub joining_date: Option<NaiveDate>,
    pub salary: Option<f64>,
    pub status: Option<StaffStatus>,
}

// 发薪请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/staff.ts")]
pub struct PaySalaryRequest {
    pub account_id: i64,
    // 为空时使用教职工月薪
    pub amount: Option<f64>,
    // 所属月份，格式 YYYY-MM
    pub month: String,
    pub remarks: Option<String>,
}

/// 存储层发薪参数
#[derive(Debug, Clone)]
pub struct SalaryPayment {
    pub staff_id: i64,
    pub account_id: i64,
    pub amount: f64,
    pub month: String,
    pub remarks: Option<String>,
    pub paid_by: Option<i64>,
}
