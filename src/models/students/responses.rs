use serde::Serialize;
use ts_rs::TS;

use super::entities::StudentDetail;
use crate::models::common::PaginationInfo;
use crate::models::fees::entities::{FeeRecordDetail, FeeTotals};

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct StudentListResponse {
    pub items: Vec<StudentDetail>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct StudentResponse {
    pub student: StudentDetail,
}

// 学生收费汇总
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct StudentFeesResponse {
    pub student_id: i64,
    pub academic_year: String,
    pub records: Vec<FeeRecordDetail>,
    pub totals: FeeTotals,
}
