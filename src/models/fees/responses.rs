use serde::Serialize;
use ts_rs::TS;

use super::entities::{
    ClassFeeStructureDetail, FeePayment, FeePaymentDetail, FeeRecordDetail, FeeType,
    StudentFeeCustom,
};
use crate::models::common::PaginationInfo;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/fee.ts")]
pub struct FeeTypeListResponse {
    pub items: Vec<FeeType>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/fee.ts")]
pub struct FeeStructureListResponse {
    pub items: Vec<ClassFeeStructureDetail>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/fee.ts")]
pub struct FeeCustomListResponse {
    pub items: Vec<StudentFeeCustom>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/fee.ts")]
pub struct FeeRecordListResponse {
    pub items: Vec<FeeRecordDetail>,
    pub pagination: PaginationInfo,
}

// 收费记录及其缴费明细
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/fee.ts")]
pub struct FeeRecordWithPayments {
    pub record: FeeRecordDetail,
    pub payments: Vec<FeePayment>,
}

// 批量生成结果
#[derive(Debug, Clone, Default, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/fee.ts")]
pub struct GenerateFeeRecordsResponse {
    pub created: i64,
    // 已存在的记录
    pub skipped: i64,
    // 个别设置为不收取
    pub not_applicable: i64,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/fee.ts")]
pub struct PaymentListResponse {
    pub items: Vec<FeePaymentDetail>,
    pub pagination: PaginationInfo,
}

// 缴费结果：缴费记录与更新后的收费记录
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/fee.ts")]
pub struct PaymentResponse {
    pub payment: FeePaymentDetail,
    pub record: FeeRecordDetail,
}
