use chrono::NaiveDate;
use serde::Deserialize;
use ts_rs::TS;

use super::entities::{FeeFrequency, FeeStatus, PaymentMethod};
use crate::models::common::PaginationQuery;

// ==================== 收费项目 ====================

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/fee.ts")]
pub struct FeeTypeListParams {
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/fee.ts")]
pub struct CreateFeeTypeRequest {
    pub name: String,
    pub description: Option<String>,
    pub frequency: FeeFrequency,
}

#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/fee.ts")]
pub struct UpdateFeeTypeRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub frequency: Option<FeeFrequency>,
    pub is_active: Option<bool>,
}

// ==================== 班级收费标准 ====================

#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/fee.ts")]
pub struct FeeStructureListParams {
    pub class_id: Option<i64>,
    pub academic_year: Option<String>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/fee.ts")]
pub struct UpsertFeeStructureRequest {
    pub class_id: i64,
    pub fee_type_id: i64,
    pub academic_year: String,
    // 每期金额
    pub amount: f64,
}

// ==================== 学生个别收费 ====================

#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/fee.ts")]
pub struct FeeCustomListParams {
    pub student_id: Option<i64>,
    pub academic_year: Option<String>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/fee.ts")]
pub struct UpsertFeeCustomRequest {
    pub student_id: i64,
    pub fee_type_id: i64,
    pub academic_year: String,
    pub custom_amount: Option<f64>,
    #[serde(default = "default_true")]
    pub is_applicable: bool,
    pub remarks: Option<String>,
}

fn default_true() -> bool {
    true
}

// ==================== 收费记录 ====================

// 收费记录列表查询参数（来自HTTP请求）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/fee.ts")]
pub struct FeeRecordListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub student_id: Option<i64>,
    pub class_id: Option<i64>,
    pub fee_type_id: Option<i64>,
    pub academic_year: Option<String>,
    pub status: Option<FeeStatus>,
}

// 收费记录列表查询参数（用于存储层）
#[derive(Debug, Clone, Default)]
pub struct FeeRecordListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub student_id: Option<i64>,
    pub class_id: Option<i64>,
    pub fee_type_id: Option<i64>,
    pub academic_year: Option<String>,
    pub status: Option<FeeStatus>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/fee.ts")]
pub struct GenerateFeeRecordsRequest {
    pub academic_year: String,
    pub class_id: Option<i64>,
    pub student_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/fee.ts")]
pub struct UpdateFeeRecordRequest {
    pub remarks: Option<String>,
    // true 标记为免收；false 取消免收并重新计算状态
    pub waived: Option<bool>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/fee.ts")]
pub struct FeeExportParams {
    pub academic_year: Option<String>,
    pub class_id: Option<i64>,
}

// ==================== 缴费 ====================

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/fee.ts")]
pub struct RecordPaymentRequest {
    pub record_id: i64,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub discount: f64,
    pub method: PaymentMethod,
    // 为空时不入账
    pub account_id: Option<i64>,
    pub paid_at: Option<chrono::DateTime<chrono::Utc>>,
    pub remarks: Option<String>,
}

// 缴费列表查询参数（来自HTTP请求）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/fee.ts")]
pub struct PaymentListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub student_id: Option<i64>,
    pub record_id: Option<i64>,
    pub method: Option<PaymentMethod>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

// 缴费列表查询参数（用于存储层）
#[derive(Debug, Clone, Default)]
pub struct PaymentListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub student_id: Option<i64>,
    pub record_id: Option<i64>,
    pub method: Option<PaymentMethod>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}
