use chrono::NaiveDate;
use serde::Serialize;
use ts_rs::TS;

use super::entities::{Account, AccountBalance, CategoryTotal, Transaction};
use crate::models::common::PaginationInfo;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/finance.ts")]
pub struct AccountListResponse {
    pub items: Vec<Account>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/finance.ts")]
pub struct TransactionListResponse {
    pub items: Vec<Transaction>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/finance.ts")]
pub struct FinanceSummaryResponse {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub income: f64,
    pub expense: f64,
    pub net: f64,
    pub categories: Vec<CategoryTotal>,
    pub accounts: Vec<AccountBalance>,
    pub total_balance: f64,
}
