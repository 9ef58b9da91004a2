use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

crate::define_string_enum! {
    // 教职工状态
    #[derive(TS)]
    #[ts(export, export_to = "../frontend/src/types/generated/staff.ts", rename_all = "snake_case")]
    pub enum StaffStatus {
        Active => "active",
        Inactive => "inactive",
    }
}

crate::define_string_enum! {
    // 当月工资状态
    #[derive(TS)]
    #[ts(export, export_to = "../frontend/src/types/generated/staff.ts", rename_all = "snake_case")]
    pub enum SalaryStatus {
        Paid => "paid",
        Unpaid => "unpaid",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/staff.ts")]
pub struct Staff {
    pub id: i64,
    // 工号，全局唯一
    pub employee_code: String,
    pub full_name: String,
    pub designation: String,
    pub department: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub joining_date: Option<NaiveDate>,
    // 月薪
    pub salary: f64,
    pub salary_status: SalaryStatus,
    pub last_salary_paid_at: Option<chrono::DateTime<chrono::Utc>>,
    // 最近一次发薪所属月份，格式 YYYY-MM
    pub last_salary_month: Option<String>,
    pub status: StaffStatus,
    pub deleted_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// 月份键，格式 YYYY-MM
pub fn salary_month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// 校验月份键格式
pub fn parse_salary_month(month: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d").ok()
}

/// 在职人数与本月发薪情况
#[derive(Debug, Clone, Default, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/staff.ts")]
pub struct StaffCounts {
    pub active: i64,
    pub salary_paid: i64,
    pub salary_unpaid: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_key() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert_eq!(salary_month_key(date), "2025-03");
        assert_eq!(parse_salary_month("2025-03"), NaiveDate::from_ymd_opt(2025, 3, 1));
        assert!(parse_salary_month("2025-13").is_none());
        assert!(parse_salary_month("March").is_none());
    }
}
