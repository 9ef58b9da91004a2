//! 财务账户与流水存储操作
//!
//! 余额只通过流水变更。写流水和改余额必须在同一个数据库事务里，
//! 缴费、发薪等操作复用这里的 `post_transaction` / `reverse_transaction`。
//! 事务内读取账户一律 `SELECT ... FOR UPDATE`，并发入账按行排队，不会互相覆盖余额。

use std::collections::BTreeMap;

use super::{SeaOrmStorage, write_error};
use crate::entity::accounts::{self, Entity as Accounts};
use crate::entity::transactions::{self, Entity as Transactions};
use crate::entity::{date_to_ts, fee_payments};
use crate::errors::{Result, SchoolError};
use crate::models::{
    PaginationInfo,
    common::pagination::page_bounds,
    fees::calculator::{AMOUNT_EPSILON, round_amount},
    finance::{
        entities::{Account, AccountBalance, CategoryTotal, NewTransaction, Transaction, TxnType},
        requests::{CreateAccountRequest, TransactionListQuery, UpdateAccountRequest},
        responses::{FinanceSummaryResponse, TransactionListResponse},
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

/// 读取并锁定账户行，直到事务结束
async fn find_account<C: ConnectionTrait>(conn: &C, id: i64) -> Result<accounts::Model> {
    Accounts::find_by_id(id)
        .lock_exclusive()
        .one(conn)
        .await
        .map_err(|e| SchoolError::database_operation(format!("查询账户失败: {e}")))?
        .ok_or_else(|| SchoolError::account_not_found(format!("账户不存在: {id}")))
}

/// 读取可用账户，不存在或已停用时报错
async fn active_account<C: ConnectionTrait>(conn: &C, id: i64) -> Result<accounts::Model> {
    let account = find_account(conn, id).await?;
    if !account.is_active {
        return Err(SchoolError::account_inactive(format!(
            "账户已停用: {}",
            account.name
        )));
    }
    Ok(account)
}

/// 调整账户余额，结果为负时拒绝
async fn adjust_balance<C: ConnectionTrait>(
    conn: &C,
    account: accounts::Model,
    delta: f64,
) -> Result<()> {
    let new_balance = round_amount(account.balance + delta);
    if new_balance < -AMOUNT_EPSILON {
        return Err(SchoolError::insufficient_balance(format!(
            "账户 {} 余额不足: 当前 {:.2}，需要 {:.2}",
            account.name,
            account.balance,
            -delta
        )));
    }

    let mut model: accounts::ActiveModel = account.into();
    model.balance = Set(new_balance.max(0.0));
    model.updated_at = Set(chrono::Utc::now().timestamp());
    model
        .update(conn)
        .await
        .map_err(|e| SchoolError::database_operation(format!("更新账户余额失败: {e}")))?;
    Ok(())
}

/// 写入一条流水并更新相关账户余额
pub(crate) async fn post_transaction<C: ConnectionTrait>(
    conn: &C,
    txn: NewTransaction,
) -> Result<transactions::Model> {
    if txn.amount <= 0.0 || !txn.amount.is_finite() {
        return Err(SchoolError::validation("金额必须大于 0"));
    }
    let amount = round_amount(txn.amount);

    match txn.txn_type {
        TxnType::Income => {
            let account = active_account(conn, txn.account_id).await?;
            adjust_balance(conn, account, amount).await?
        }
        TxnType::Expense => {
            let account = active_account(conn, txn.account_id).await?;
            adjust_balance(conn, account, -amount).await?
        }
        TxnType::Transfer => {
            let counter_id = txn
                .counter_account_id
                .ok_or_else(|| SchoolError::validation("转账需要指定目标账户"))?;
            if counter_id == txn.account_id {
                return Err(SchoolError::validation("转账的目标账户不能与来源账户相同"));
            }
            // 按 id 顺序加锁，两笔方向相反的转账不会互相等待
            let (account, counter) = if txn.account_id < counter_id {
                let account = active_account(conn, txn.account_id).await?;
                (account, active_account(conn, counter_id).await?)
            } else {
                let counter = active_account(conn, counter_id).await?;
                (active_account(conn, txn.account_id).await?, counter)
            };
            adjust_balance(conn, account, -amount).await?;
            adjust_balance(conn, counter, amount).await?;
        }
    }

    let model = transactions::ActiveModel {
        account_id: Set(txn.account_id),
        counter_account_id: Set(match txn.txn_type {
            TxnType::Transfer => txn.counter_account_id,
            _ => None,
        }),
        txn_type: Set(txn.txn_type.to_string()),
        amount: Set(amount),
        category: Set(txn.category),
        description: Set(txn.description),
        reference: Set(txn.reference),
        staff_id: Set(txn.staff_id),
        txn_date: Set(txn.txn_date.timestamp()),
        created_by: Set(txn.created_by),
        created_at: Set(chrono::Utc::now().timestamp()),
        ..Default::default()
    };

    model
        .insert(conn)
        .await
        .map_err(|e| SchoolError::database_operation(format!("写入流水失败: {e}")))
}

/// 删除流水并回滚余额
pub(crate) async fn reverse_transaction<C: ConnectionTrait>(
    conn: &C,
    txn: transactions::Model,
) -> Result<()> {
    let txn_id = txn.id;
    let business = txn.into_transaction();

    // 已停用账户仍允许回滚；与入账一样按 id 顺序加锁
    let mut affected: Vec<i64> = std::iter::once(business.account_id)
        .chain(business.counter_account_id)
        .collect();
    affected.sort_unstable();
    for account_id in affected {
        let account = find_account(conn, account_id).await?;
        adjust_balance(conn, account, -business.effect_on(account_id)).await?;
    }

    Transactions::delete_by_id(txn_id)
        .exec(conn)
        .await
        .map_err(|e| SchoolError::database_operation(format!("删除流水失败: {e}")))?;
    Ok(())
}

impl SeaOrmStorage {
    pub async fn create_account_impl(&self, req: CreateAccountRequest) -> Result<Account> {
        let now = chrono::Utc::now().timestamp();
        let opening = round_amount(req.opening_balance);

        let model = accounts::ActiveModel {
            name: Set(req.name.trim().to_string()),
            account_type: Set(req.account_type.to_string()),
            account_number: Set(req.account_number),
            opening_balance: Set(opening),
            balance: Set(opening),
            is_active: Set(true),
            description: Set(req.description),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(write_error("创建账户失败", "账户名称已存在"))?;

        Ok(result.into_account())
    }

    pub async fn get_account_by_id_impl(&self, id: i64) -> Result<Option<Account>> {
        let result = Accounts::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询账户失败: {e}")))?;

        Ok(result.map(|m| m.into_account()))
    }

    pub async fn list_accounts_impl(&self, include_inactive: bool) -> Result<Vec<Account>> {
        let mut select = Accounts::find();
        if !include_inactive {
            select = select.filter(accounts::Column::IsActive.eq(true));
        }

        let accounts = select
            .order_by_asc(accounts::Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询账户列表失败: {e}")))?;

        Ok(accounts.into_iter().map(|m| m.into_account()).collect())
    }

    pub async fn update_account_impl(
        &self,
        id: i64,
        update: UpdateAccountRequest,
    ) -> Result<Option<Account>> {
        if self.get_account_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = accounts::ActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };
        if let Some(name) = update.name {
            model.name = Set(name.trim().to_string());
        }
        if let Some(account_type) = update.account_type {
            model.account_type = Set(account_type.to_string());
        }
        if let Some(account_number) = update.account_number {
            model.account_number = Set(Some(account_number));
        }
        if let Some(is_active) = update.is_active {
            model.is_active = Set(is_active);
        }
        if let Some(description) = update.description {
            model.description = Set(Some(description));
        }

        model
            .update(&self.db)
            .await
            .map_err(write_error("更新账户失败", "账户名称已存在"))?;

        self.get_account_by_id_impl(id).await
    }

    /// 删除账户，存在流水或缴费入账记录时拒绝
    pub async fn delete_account_impl(&self, id: i64) -> Result<bool> {
        let txn_count = Transactions::find()
            .filter(
                Condition::any()
                    .add(transactions::Column::AccountId.eq(id))
                    .add(transactions::Column::CounterAccountId.eq(id)),
            )
            .count(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询账户流水失败: {e}")))?;
        let payment_count = fee_payments::Entity::find()
            .filter(fee_payments::Column::AccountId.eq(id))
            .count(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询账户缴费失败: {e}")))?;

        if txn_count + payment_count > 0 {
            return Err(SchoolError::conflict("账户已有流水记录，只能停用不能删除"));
        }

        let result = Accounts::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("删除账户失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn create_transaction_impl(&self, txn: NewTransaction) -> Result<Transaction> {
        let db_txn = self
            .db
            .begin()
            .await
            .map_err(|e| SchoolError::database_operation(format!("开启事务失败: {e}")))?;

        let model = post_transaction(&db_txn, txn).await?;

        db_txn
            .commit()
            .await
            .map_err(|e| SchoolError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(model.into_transaction())
    }

    pub async fn get_transaction_by_id_impl(&self, id: i64) -> Result<Option<Transaction>> {
        let result = Transactions::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询流水失败: {e}")))?;

        Ok(result.map(|m| m.into_transaction()))
    }

    pub async fn list_transactions_impl(
        &self,
        query: TransactionListQuery,
    ) -> Result<TransactionListResponse> {
        let (page, size) = page_bounds(query.page, query.size, 20);

        let mut select = Transactions::find();
        if let Some(account_id) = query.account_id {
            select = select.filter(
                Condition::any()
                    .add(transactions::Column::AccountId.eq(account_id))
                    .add(transactions::Column::CounterAccountId.eq(account_id)),
            );
        }
        if let Some(txn_type) = query.txn_type {
            select = select.filter(transactions::Column::TxnType.eq(txn_type.to_string()));
        }
        if let Some(ref category) = query.category {
            select = select.filter(transactions::Column::Category.eq(category.as_str()));
        }
        if let Some(from) = query.from {
            select = select.filter(transactions::Column::TxnDate.gte(date_to_ts(from)));
        }
        if let Some(to) = query.to {
            select = select.filter(transactions::Column::TxnDate.lt(date_to_ts(to) + 86_400));
        }
        select = select
            .order_by_desc(transactions::Column::TxnDate)
            .order_by_desc(transactions::Column::Id);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询流水总数失败: {e}")))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询流水页数失败: {e}")))?;
        let items = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询流水列表失败: {e}")))?;

        Ok(TransactionListResponse {
            items: items.into_iter().map(|m| m.into_transaction()).collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    /// 删除流水并回滚余额
    pub async fn delete_transaction_impl(&self, id: i64) -> Result<bool> {
        let db_txn = self
            .db
            .begin()
            .await
            .map_err(|e| SchoolError::database_operation(format!("开启事务失败: {e}")))?;

        let Some(txn) = Transactions::find_by_id(id)
            .one(&db_txn)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询流水失败: {e}")))?
        else {
            return Ok(false);
        };

        let linked = fee_payments::Entity::find()
            .filter(fee_payments::Column::TransactionId.eq(id))
            .count(&db_txn)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询关联缴费失败: {e}")))?;
        if linked > 0 {
            return Err(SchoolError::conflict(
                "该流水由缴费生成，请通过冲销缴费删除",
            ));
        }

        reverse_transaction(&db_txn, txn).await?;

        db_txn
            .commit()
            .await
            .map_err(|e| SchoolError::database_operation(format!("提交事务失败: {e}")))?;
        Ok(true)
    }

    /// 收支汇总：转账不计入收入和支出
    pub async fn finance_summary_impl(
        &self,
        from: Option<chrono::NaiveDate>,
        to: Option<chrono::NaiveDate>,
    ) -> Result<FinanceSummaryResponse> {
        let mut select = Transactions::find()
            .filter(transactions::Column::TxnType.ne(TxnType::Transfer.to_string()));
        if let Some(from) = from {
            select = select.filter(transactions::Column::TxnDate.gte(date_to_ts(from)));
        }
        if let Some(to) = to {
            select = select.filter(transactions::Column::TxnDate.lt(date_to_ts(to) + 86_400));
        }
        let txns = select
            .all(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询流水失败: {e}")))?;

        let mut income = 0.0;
        let mut expense = 0.0;
        let mut categories: BTreeMap<(String, String), (f64, i64)> = BTreeMap::new();
        for txn in txns {
            let txn = txn.into_transaction();
            match txn.txn_type {
                TxnType::Income => income += txn.amount,
                TxnType::Expense => expense += txn.amount,
                TxnType::Transfer => continue,
            }
            let entry = categories
                .entry((txn.txn_type.to_string(), txn.category.clone()))
                .or_insert((0.0, 0));
            entry.0 += txn.amount;
            entry.1 += 1;
        }

        let accounts: Vec<AccountBalance> = self
            .list_accounts_impl(false)
            .await?
            .into_iter()
            .map(|a| AccountBalance {
                id: a.id,
                name: a.name,
                account_type: a.account_type,
                balance: a.balance,
            })
            .collect();
        let total_balance = round_amount(accounts.iter().map(|a| a.balance).sum());

        Ok(FinanceSummaryResponse {
            from,
            to,
            income: round_amount(income),
            expense: round_amount(expense),
            net: round_amount(income - expense),
            categories: categories
                .into_iter()
                .filter_map(|((txn_type, category), (total, count))| {
                    Some(CategoryTotal {
                        txn_type: txn_type.parse().ok()?,
                        category,
                        total: round_amount(total),
                        count,
                    })
                })
                .collect(),
            accounts,
            total_balance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::finance::entities::AccountType;
    use crate::storage::sea_orm_storage::{test_storage, tests_support::seed_account};

    fn new_txn(account_id: i64, txn_type: TxnType, amount: f64) -> NewTransaction {
        NewTransaction {
            account_id,
            counter_account_id: None,
            txn_type,
            amount,
            category: "misc".to_string(),
            description: None,
            reference: None,
            staff_id: None,
            txn_date: chrono::Utc::now(),
            created_by: None,
        }
    }

    #[tokio::test]
    async fn test_income_expense_and_overdraft() {
        let storage = test_storage().await;
        let cash = seed_account(&storage, "Cash Box", 100.0).await;

        storage
            .create_transaction_impl(new_txn(cash.id, TxnType::Income, 50.0))
            .await
            .unwrap();
        storage
            .create_transaction_impl(new_txn(cash.id, TxnType::Expense, 120.0))
            .await
            .unwrap();
        let account = storage.get_account_by_id_impl(cash.id).await.unwrap().unwrap();
        assert_eq!(account.balance, 30.0);

        let err = storage
            .create_transaction_impl(new_txn(cash.id, TxnType::Expense, 30.01))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E019");
        // 失败的事务不改变余额
        let account = storage.get_account_by_id_impl(cash.id).await.unwrap().unwrap();
        assert_eq!(account.balance, 30.0);
    }

    #[tokio::test]
    async fn test_transfer_and_delete() {
        let storage = test_storage().await;
        let cash = seed_account(&storage, "Cash", 500.0).await;
        let bank = seed_account(&storage, "Bank", 0.0).await;

        let mut same = new_txn(cash.id, TxnType::Transfer, 10.0);
        same.counter_account_id = Some(cash.id);
        assert_eq!(
            storage.create_transaction_impl(same).await.unwrap_err().code(),
            "E007"
        );

        let mut transfer = new_txn(cash.id, TxnType::Transfer, 200.0);
        transfer.counter_account_id = Some(bank.id);
        let txn = storage.create_transaction_impl(transfer).await.unwrap();

        let cash_now = storage.get_account_by_id_impl(cash.id).await.unwrap().unwrap();
        let bank_now = storage.get_account_by_id_impl(bank.id).await.unwrap().unwrap();
        assert_eq!(cash_now.balance, 300.0);
        assert_eq!(bank_now.balance, 200.0);

        assert!(storage.delete_transaction_impl(txn.id).await.unwrap());
        let cash_now = storage.get_account_by_id_impl(cash.id).await.unwrap().unwrap();
        let bank_now = storage.get_account_by_id_impl(bank.id).await.unwrap().unwrap();
        assert_eq!(cash_now.balance, 500.0);
        assert_eq!(bank_now.balance, 0.0);
        assert!(!storage.delete_transaction_impl(txn.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_account_delete_and_summary() {
        let storage = test_storage().await;
        let cash = seed_account(&storage, "Petty", 0.0).await;
        let spare = storage
            .create_account_impl(CreateAccountRequest {
                name: "Spare".to_string(),
                account_type: AccountType::Bank,
                account_number: None,
                opening_balance: 10.0,
                description: None,
            })
            .await
            .unwrap();

        let mut income = new_txn(cash.id, TxnType::Income, 80.0);
        income.category = "donation".to_string();
        storage.create_transaction_impl(income).await.unwrap();
        storage
            .create_transaction_impl(new_txn(cash.id, TxnType::Expense, 30.0))
            .await
            .unwrap();

        assert_eq!(
            storage.delete_account_impl(cash.id).await.unwrap_err().code(),
            "E014"
        );
        assert!(storage.delete_account_impl(spare.id).await.unwrap());

        let summary = storage.finance_summary_impl(None, None).await.unwrap();
        assert_eq!(summary.income, 80.0);
        assert_eq!(summary.expense, 30.0);
        assert_eq!(summary.net, 50.0);
        assert_eq!(summary.categories.len(), 2);
        assert_eq!(summary.total_balance, 50.0);
    }

    #[tokio::test]
    async fn test_concurrent_postings_do_not_lose_updates() {
        let storage = test_storage().await;
        let cash = seed_account(&storage, "Petty Cash", 500.0).await;
        let bank = seed_account(&storage, "Bank", 0.0).await;

        let mut transfer = new_txn(cash.id, TxnType::Transfer, 100.0);
        transfer.counter_account_id = Some(bank.id);
        let (a, b, c, d) = tokio::join!(
            storage.create_transaction_impl(new_txn(cash.id, TxnType::Expense, 200.0)),
            storage.create_transaction_impl(new_txn(cash.id, TxnType::Expense, 200.0)),
            storage.create_transaction_impl(new_txn(cash.id, TxnType::Income, 50.0)),
            storage.create_transaction_impl(transfer),
        );
        for result in [a, b, c, d] {
            result.unwrap();
        }

        let cash = storage.get_account_by_id_impl(cash.id).await.unwrap().unwrap();
        assert_eq!(cash.balance, 50.0);
        let bank = storage.get_account_by_id_impl(bank.id).await.unwrap().unwrap();
        assert_eq!(bank.balance, 100.0);
    }
}
