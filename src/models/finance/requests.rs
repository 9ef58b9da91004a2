use chrono::NaiveDate;
use serde::Deserialize;
use ts_rs::TS;

use super::entities::{AccountType, TxnType};
use crate::models::common::PaginationQuery;

#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/finance.ts")]
pub struct AccountListParams {
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/finance.ts")]
pub struct CreateAccountRequest {
    pub name: String,
    pub account_type: AccountType,
    pub account_number: Option<String>,
    #[serde(default)]
    pub opening_balance: f64,
    pub description: Option<String>,
}

// 余额只能通过流水变更
#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/finance.ts")]
pub struct UpdateAccountRequest {
    pub name: Option<String>,
    pub account_type: Option<AccountType>,
    pub account_number: Option<String>,
    pub is_active: Option<bool>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/finance.ts")]
pub struct TransactionListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub account_id: Option<i64>,
    pub txn_type: Option<TxnType>,
    pub category: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct TransactionListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub account_id: Option<i64>,
    pub txn_type: Option<TxnType>,
    pub category: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/finance.ts")]
pub struct CreateTransactionRequest {
    pub account_id: i64,
    // 仅转账需要
    pub counter_account_id: Option<i64>,
    pub txn_type: TxnType,
    pub amount: f64,
    pub category: Option<String>,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub txn_date: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/finance.ts")]
pub struct FinanceSummaryParams {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}
