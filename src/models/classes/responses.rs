use super::entities::ClassWithStats;
use crate::models::common::PaginationInfo;
use serde::Serialize;
use ts_rs::TS;

/// 按排序号、名称排列
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/class.ts")]
pub struct ClassListResponse {
    pub pagination: PaginationInfo,
    pub items: Vec<ClassWithStats>,
}
