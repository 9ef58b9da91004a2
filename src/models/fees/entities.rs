use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::calculator::{FeeStanding, due_schedule, remaining_amount, round_amount};

crate::define_string_enum! {
    // 收费频率
    #[derive(TS)]
    #[ts(export, export_to = "../frontend/src/types/generated/fee.ts", rename_all = "snake_case")]
    pub enum FeeFrequency {
        Monthly => "monthly",
        Quarterly => "quarterly",
        Biannual => "biannual",
        Yearly => "yearly",
        OneTime => "one_time",
    }
}

crate::define_string_enum! {
    // 收费记录状态
    #[derive(TS)]
    #[ts(export, export_to = "../frontend/src/types/generated/fee.ts", rename_all = "snake_case")]
    pub enum FeeStatus {
        Pending => "pending",
        Partial => "partial",
        Paid => "paid",
        Overdue => "overdue",
        Waived => "waived",
    }
}

crate::define_string_enum! {
    // 缴费方式
    #[derive(TS)]
    #[ts(export, export_to = "../frontend/src/types/generated/fee.ts", rename_all = "snake_case")]
    pub enum PaymentMethod {
        Cash => "cash",
        BankTransfer => "bank_transfer",
        Cheque => "cheque",
        Card => "card",
        Online => "online",
        Other => "other",
    }
}

// 收费项目
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/fee.ts")]
pub struct FeeType {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub frequency: FeeFrequency,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 班级收费标准：(班级, 收费项目, 学年) -> 每期金额
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/fee.ts")]
pub struct ClassFeeStructure {
    pub id: i64,
    pub class_id: i64,
    pub fee_type_id: i64,
    pub academic_year: String,
    pub amount: f64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/fee.ts")]
pub struct ClassFeeStructureDetail {
    #[serde(flatten)]
    #[ts(flatten)]
    pub structure: ClassFeeStructure,
    pub class_name: String,
    pub fee_type_name: String,
    pub frequency: FeeFrequency,
    pub yearly_amount: f64,
}

// 学生个别收费设置
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/fee.ts")]
pub struct StudentFeeCustom {
    pub id: i64,
    pub student_id: i64,
    pub fee_type_id: i64,
    pub academic_year: String,
    // 覆盖班级标准的每期金额
    pub custom_amount: Option<f64>,
    // false 表示该学生不收此项
    pub is_applicable: bool,
    pub remarks: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 学生学年收费记录
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/fee.ts")]
pub struct StudentFeeRecord {
    pub id: i64,
    pub student_id: i64,
    pub fee_type_id: i64,
    pub class_id: Option<i64>,
    pub academic_year: String,
    pub frequency: FeeFrequency,
    pub amount_per_period: f64,
    pub periods: i32,
    pub total_amount: f64,
    pub paid_amount: f64,
    pub discount_amount: f64,
    pub first_due_date: NaiveDate,
    pub status: FeeStatus,
    pub remarks: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl StudentFeeRecord {
    pub fn due_dates(&self) -> Vec<NaiveDate> {
        due_schedule(self.first_due_date, self.frequency)
    }

    fn with_standing<R>(&self, f: impl FnOnce(FeeStanding<'_>) -> R) -> R {
        let schedule = self.due_dates();
        f(FeeStanding {
            amount_per_period: self.amount_per_period,
            total: self.total_amount,
            paid: self.paid_amount,
            discount: self.discount_amount,
            schedule: &schedule,
            waived: self.status == FeeStatus::Waived,
        })
    }

    pub fn remaining(&self) -> f64 {
        remaining_amount(self.total_amount, self.paid_amount, self.discount_amount)
    }

    pub fn accrued_at(&self, as_of: NaiveDate) -> f64 {
        self.with_standing(|s| s.accrued(as_of))
    }

    pub fn overdue_at(&self, as_of: NaiveDate, grace_days: i64) -> f64 {
        self.with_standing(|s| s.overdue_amount(as_of, grace_days))
    }

    pub fn next_due_date(&self) -> Option<NaiveDate> {
        if self.status == FeeStatus::Waived || self.remaining() <= 0.0 {
            return None;
        }
        self.with_standing(|s| s.next_due_date())
    }

    pub fn derive_status(&self, as_of: NaiveDate, grace_days: i64) -> FeeStatus {
        self.with_standing(|s| s.status(as_of, grace_days))
    }
}

/// 带名称和计算字段的收费记录
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/fee.ts")]
pub struct FeeRecordDetail {
    #[serde(flatten)]
    #[ts(flatten)]
    pub record: StudentFeeRecord,
    pub student_name: String,
    pub admission_number: String,
    pub fee_type_name: String,
    pub class_name: Option<String>,
    pub remaining: f64,
    pub accrued: f64,
    pub overdue: f64,
    pub next_due_date: Option<NaiveDate>,
}

/// 计算字段所需的名称信息
#[derive(Debug, Clone, Default)]
pub struct FeeRecordNames {
    pub student_name: String,
    pub admission_number: String,
    pub fee_type_name: String,
    pub class_name: Option<String>,
}

impl FeeRecordDetail {
    pub fn new(
        record: StudentFeeRecord,
        names: FeeRecordNames,
        as_of: NaiveDate,
        grace_days: i64,
    ) -> Self {
        Self {
            remaining: record.remaining(),
            accrued: record.accrued_at(as_of),
            overdue: record.overdue_at(as_of, grace_days),
            next_due_date: record.next_due_date(),
            student_name: names.student_name,
            admission_number: names.admission_number,
            fee_type_name: names.fee_type_name,
            class_name: names.class_name,
            record,
        }
    }
}

/// 多条收费记录的合计
#[derive(Debug, Clone, Default, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/fee.ts")]
pub struct FeeTotals {
    pub total: f64,
    pub paid: f64,
    pub discount: f64,
    pub remaining: f64,
    pub accrued: f64,
    pub overdue: f64,
}

impl FeeTotals {
    pub fn from_details<'a>(details: impl IntoIterator<Item = &'a FeeRecordDetail>) -> Self {
        let mut totals = details
            .into_iter()
            .fold(FeeTotals::default(), |mut acc, d| {
                acc.total += d.record.total_amount;
                acc.paid += d.record.paid_amount;
                acc.discount += d.record.discount_amount;
                acc.remaining += d.remaining;
                acc.accrued += d.accrued;
                acc.overdue += d.overdue;
                acc
            });
        totals.total = round_amount(totals.total);
        totals.paid = round_amount(totals.paid);
        totals.discount = round_amount(totals.discount);
        totals.remaining = round_amount(totals.remaining);
        totals.accrued = round_amount(totals.accrued);
        totals.overdue = round_amount(totals.overdue);
        totals
    }
}

// 缴费记录
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/fee.ts")]
pub struct FeePayment {
    pub id: i64,
    pub record_id: i64,
    pub student_id: i64,
    pub amount: f64,
    pub discount: f64,
    pub method: PaymentMethod,
    pub receipt_number: String,
    pub paid_at: chrono::DateTime<chrono::Utc>,
    // 入账账户，为空表示未入账
    pub account_id: Option<i64>,
    pub transaction_id: Option<i64>,
    pub collected_by: Option<i64>,
    pub remarks: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/fee.ts")]
pub struct FeePaymentDetail {
    #[serde(flatten)]
    #[ts(flatten)]
    pub payment: FeePayment,
    pub student_name: String,
    pub admission_number: String,
    pub class_name: Option<String>,
    pub fee_type_name: String,
    pub academic_year: String,
    pub collected_by_name: Option<String>,
}

/// 新建缴费（存储层参数）
#[derive(Debug, Clone)]
pub struct NewFeePayment {
    pub record_id: i64,
    pub amount: f64,
    pub discount: f64,
    pub method: PaymentMethod,
    pub receipt_number: String,
    pub paid_at: chrono::DateTime<chrono::Utc>,
    pub account_id: Option<i64>,
    pub collected_by: Option<i64>,
    pub remarks: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(paid: f64, discount: f64, status: FeeStatus) -> StudentFeeRecord {
        StudentFeeRecord {
            id: 1,
            student_id: 1,
            fee_type_id: 1,
            class_id: Some(1),
            academic_year: "2025-2026".to_string(),
            frequency: FeeFrequency::Monthly,
            amount_per_period: 1000.0,
            periods: 12,
            total_amount: 12000.0,
            paid_amount: paid,
            discount_amount: discount,
            first_due_date: NaiveDate::from_ymd_opt(2025, 4, 10).unwrap(),
            status,
            remarks: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_record_remaining_and_status() {
        let as_of = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
        let r = record(3000.0, 500.0, FeeStatus::Pending);
        assert_eq!(r.remaining(), 8500.0);
        assert_eq!(r.accrued_at(as_of), 4000.0);
        assert_eq!(r.overdue_at(as_of, 0), 500.0);
        assert_eq!(r.derive_status(as_of, 0), FeeStatus::Overdue);

        let paid = record(11500.0, 500.0, FeeStatus::Partial);
        assert_eq!(paid.remaining(), 0.0);
        assert_eq!(paid.derive_status(as_of, 0), FeeStatus::Paid);
        assert_eq!(paid.next_due_date(), None);
    }

    #[test]
    fn test_waived_is_sticky() {
        let as_of = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let r = record(0.0, 0.0, FeeStatus::Waived);
        assert_eq!(r.derive_status(as_of, 0), FeeStatus::Waived);
        assert_eq!(r.next_due_date(), None);
    }

    #[test]
    fn test_totals_from_details() {
        let as_of = NaiveDate::from_ymd_opt(2025, 4, 15).unwrap();
        let details = vec![
            FeeRecordDetail::new(
                record(1000.0, 0.0, FeeStatus::Partial),
                FeeRecordNames::default(),
                as_of,
                0,
            ),
            FeeRecordDetail::new(
                record(0.0, 0.0, FeeStatus::Pending),
                FeeRecordNames::default(),
                as_of,
                0,
            ),
        ];
        let totals = FeeTotals::from_details(&details);
        assert_eq!(totals.total, 24000.0);
        assert_eq!(totals.paid, 1000.0);
        assert_eq!(totals.remaining, 23000.0);
        assert_eq!(totals.accrued, 2000.0);
        assert_eq!(totals.overdue, 1000.0);
    }

    #[test]
    fn test_frequency_values() {
        assert_eq!(
            serde_json::to_string(&FeeFrequency::OneTime).unwrap(),
            "\"one_time\""
        );
        assert_eq!(
            "bank_transfer".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::BankTransfer
        );
    }
}
