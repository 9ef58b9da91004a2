use serde::{Deserialize, Serialize};
use ts_rs::TS;

crate::define_string_enum! {
    // 账户类型
    #[derive(TS)]
    #[ts(export, export_to = "../frontend/src/types/generated/finance.ts", rename_all = "snake_case")]
    pub enum AccountType {
        Cash => "cash",
        Bank => "bank",
        Other => "other",
    }
}

crate::define_string_enum! {
    // 流水类型
    #[derive(TS)]
    #[ts(export, export_to = "../frontend/src/types/generated/finance.ts", rename_all = "snake_case")]
    pub enum TxnType {
        Income => "income",
        Expense => "expense",
        Transfer => "transfer",
    }
}

/// 由收费自动生成的流水分类
pub const CATEGORY_FEES: &str = "fees";
/// 由发薪自动生成的流水分类
pub const CATEGORY_SALARY: &str = "salary";

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/finance.ts")]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub account_type: AccountType,
    pub account_number: Option<String>,
    pub opening_balance: f64,
    pub balance: f64,
    pub is_active: bool,
    pub description: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/finance.ts")]
pub struct Transaction {
    pub id: i64,
    pub account_id: i64,
    // 转账的目标账户
    pub counter_account_id: Option<i64>,
    pub txn_type: TxnType,
    pub amount: f64,
    pub category: String,
    pub description: Option<String>,
    // 外部引用，收费流水为收据编号
    pub reference: Option<String>,
    pub staff_id: Option<i64>,
    pub txn_date: chrono::DateTime<chrono::Utc>,
    pub created_by: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Transaction {
    /// 该流水对指定账户余额的影响
    pub fn effect_on(&self, account_id: i64) -> f64 {
        match self.txn_type {
            TxnType::Income if self.account_id == account_id => self.amount,
            TxnType::Expense if self.account_id == account_id => -self.amount,
            TxnType::Transfer if self.account_id == account_id => -self.amount,
            TxnType::Transfer if self.counter_account_id == Some(account_id) => self.amount,
            _ => 0.0,
        }
    }
}

/// 新建流水（存储层参数）
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub account_id: i64,
    pub counter_account_id: Option<i64>,
    pub txn_type: TxnType,
    pub amount: f64,
    pub category: String,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub staff_id: Option<i64>,
    pub txn_date: chrono::DateTime<chrono::Utc>,
    pub created_by: Option<i64>,
}

/// 分类合计
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/finance.ts")]
pub struct CategoryTotal {
    pub txn_type: TxnType,
    pub category: String,
    pub total: f64,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/finance.ts")]
pub struct AccountBalance {
    pub id: i64,
    pub name: String,
    pub account_type: AccountType,
    pub balance: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txn(txn_type: TxnType, counter: Option<i64>) -> Transaction {
        Transaction {
            id: 1,
            account_id: 10,
            counter_account_id: counter,
            txn_type,
            amount: 250.0,
            category: "misc".to_string(),
            description: None,
            reference: None,
            staff_id: None,
            txn_date: chrono::Utc::now(),
            created_by: None,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_effect_on_accounts() {
        assert_eq!(txn(TxnType::Income, None).effect_on(10), 250.0);
        assert_eq!(txn(TxnType::Expense, None).effect_on(10), -250.0);
        assert_eq!(txn(TxnType::Income, None).effect_on(11), 0.0);

        let transfer = txn(TxnType::Transfer, Some(11));
        assert_eq!(transfer.effect_on(10), -250.0);
        assert_eq!(transfer.effect_on(11), 250.0);
        assert_eq!(transfer.effect_on(12), 0.0);
    }
}
