use serde::Serialize;
use ts_rs::TS;

use super::entities::Staff;
use crate::models::common::PaginationInfo;
use crate::models::finance::entities::Transaction;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/staff.ts")]
pub struct StaffListResponse {
    pub items: Vec<Staff>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/staff.ts")]
pub struct SalaryPaymentResponse {
    pub staff: Staff,
    pub transaction: Transaction,
}
