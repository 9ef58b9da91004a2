use serde::Serialize;
use ts_rs::TS;

use crate::models::fees::calculator::round_amount;
use crate::models::fees::entities::FeePaymentDetail;

// 各状态学生人数
#[derive(Debug, Clone, Default, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/dashboard.ts")]
pub struct StudentCounts {
    pub total: i64,
    pub active: i64,
    pub inactive: i64,
    pub graduated: i64,
    pub transferred: i64,
}

// 学年收费汇总
#[derive(Debug, Clone, Default, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/dashboard.ts")]
pub struct FeeSummary {
    pub due: f64,
    pub collected: f64,
    pub discount: f64,
    pub outstanding: f64,
    // 百分比，保留两位小数
    pub collection_rate: f64,
}

impl FeeSummary {
    pub fn new(due: f64, collected: f64, discount: f64) -> Self {
        let outstanding = (due - collected - discount).max(0.0);
        let collection_rate = if due > 0.0 {
            round_amount((collected + discount) / due * 100.0)
        } else {
            0.0
        };
        Self {
            due: round_amount(due),
            collected: round_amount(collected),
            discount: round_amount(discount),
            outstanding: round_amount(outstanding),
            collection_rate,
        }
    }
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/dashboard.ts")]
pub struct DashboardSummary {
    pub academic_year: String,
    pub students: StudentCounts,
    pub staff_count: i64,
    pub class_count: i64,
    pub fees: FeeSummary,
    pub total_balance: f64,
    pub month_income: f64,
    pub month_expense: f64,
    pub salary_paid: i64,
    pub salary_unpaid: i64,
    pub recent_payments: Vec<FeePaymentDetail>,
}

// 单月收款
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/dashboard.ts")]
pub struct MonthlyCollection {
    pub month: u32,
    pub amount: f64,
    pub discount: f64,
    pub count: i64,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/dashboard.ts")]
pub struct CollectionsResponse {
    pub year: i32,
    pub months: Vec<MonthlyCollection>,
    pub total: f64,
}

// 单个班级的收费汇总
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/dashboard.ts")]
pub struct ClassFeeSummary {
    pub class_id: Option<i64>,
    pub class_name: String,
    pub student_count: i64,
    #[serde(flatten)]
    #[ts(flatten)]
    pub fees: FeeSummary,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/dashboard.ts")]
pub struct ClassFeesResponse {
    pub academic_year: String,
    pub items: Vec<ClassFeeSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fee_summary_rate() {
        let s = FeeSummary::new(12000.0, 5000.0, 1000.0);
        assert_eq!(s.outstanding, 6000.0);
        assert_eq!(s.collection_rate, 50.0);

        let empty = FeeSummary::new(0.0, 0.0, 0.0);
        assert_eq!(empty.collection_rate, 0.0);
    }
}
