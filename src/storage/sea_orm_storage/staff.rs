//! 教职工存储操作

use super::finance::post_transaction;
use super::{SeaOrmStorage, write_error};
use crate::entity::staff::{ActiveModel, Column, Entity as StaffEntity};
use crate::entity::{format_date, transactions};
use crate::errors::{Result, SchoolError};
use crate::models::{
    PaginationInfo,
    common::pagination::page_bounds,
    finance::entities::{CATEGORY_SALARY, NewTransaction, TxnType},
    staff::{
        entities::{SalaryStatus, Staff, StaffCounts, StaffStatus, parse_salary_month},
        requests::{CreateStaffRequest, SalaryPayment, StaffListQuery, UpdateStaffRequest},
        responses::{SalaryPaymentResponse, StaffListResponse},
    },
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};

/// 发薪流水的关联号：`工号:YYYY-MM`
fn salary_reference(employee_code: &str, month: &str) -> String {
    format!("{employee_code}:{month}")
}

impl SeaOrmStorage {
    pub async fn create_staff_impl(&self, req: CreateStaffRequest) -> Result<Staff> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            employee_code: Set(req.employee_code.trim().to_string()),
            full_name: Set(req.full_name.trim().to_string()),
            designation: Set(req.designation),
            department: Set(req.department),
            phone: Set(req.phone),
            email: Set(req.email),
            joining_date: Set(format_date(req.joining_date)),
            salary: Set(req.salary),
            salary_status: Set(SalaryStatus::Unpaid.to_string()),
            last_salary_paid_at: Set(None),
            last_salary_month: Set(None),
            status: Set(StaffStatus::Active.to_string()),
            deleted_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(write_error("创建教职工失败", "工号已存在"))?;

        Ok(result.into_staff())
    }

    /// 通过 ID 获取教职工，已删除的返回 None
    pub async fn get_staff_by_id_impl(&self, id: i64) -> Result<Option<Staff>> {
        let result = StaffEntity::find_by_id(id)
            .filter(Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询教职工失败: {e}")))?;

        Ok(result.map(|m| m.into_staff()))
    }

    pub async fn list_staff_with_pagination_impl(
        &self,
        query: StaffListQuery,
    ) -> Result<StaffListResponse> {
        let (page, size) = page_bounds(query.page, query.size, 10);

        let mut select = StaffEntity::find().filter(Column::DeletedAt.is_null());

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(
                Condition::any()
                    .add(Column::FullName.contains(&escaped))
                    .add(Column::EmployeeCode.contains(&escaped))
                    .add(Column::Phone.contains(&escaped)),
            );
        }
        if let Some(ref department) = query.department {
            select = select.filter(Column::Department.eq(department.as_str()));
        }
        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.to_string()));
        }
        if let Some(salary_status) = query.salary_status {
            select = select.filter(Column::SalaryStatus.eq(salary_status.to_string()));
        }

        select = select
            .order_by_asc(Column::FullName)
            .order_by_asc(Column::Id);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询教职工总数失败: {e}")))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询教职工页数失败: {e}")))?;
        let items = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询教职工列表失败: {e}")))?;

        Ok(StaffListResponse {
            items: items.into_iter().map(|m| m.into_staff()).collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    pub async fn update_staff_impl(
        &self,
        id: i64,
        update: UpdateStaffRequest,
    ) -> Result<Option<Staff>> {
        if self.get_staff_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(code) = update.employee_code {
            model.employee_code = Set(code.trim().to_string());
        }
        if let Some(name) = update.full_name {
            model.full_name = Set(name.trim().to_string());
        }
        if let Some(designation) = update.designation {
            model.designation = Set(designation);
        }
        if let Some(department) = update.department {
            model.department = Set(Some(department));
        }
        if let Some(phone) = update.phone {
            model.phone = Set(Some(phone));
        }
        if let Some(email) = update.email {
            model.email = Set(Some(email));
        }
        if let Some(date) = update.joining_date {
            model.joining_date = Set(format_date(Some(date)));
        }
        if let Some(salary) = update.salary {
            model.salary = Set(salary);
        }
        if let Some(status) = update.status {
            model.status = Set(status.to_string());
        }

        model
            .update(&self.db)
            .await
            .map_err(write_error("更新教职工失败", "工号已存在"))?;

        self.get_staff_by_id_impl(id).await
    }

    /// 软删除教职工
    pub async fn delete_staff_impl(&self, id: i64) -> Result<bool> {
        if self.get_staff_by_id_impl(id).await?.is_none() {
            return Ok(false);
        }

        let now = chrono::Utc::now().timestamp();
        let model = ActiveModel {
            id: Set(id),
            status: Set(StaffStatus::Inactive.to_string()),
            deleted_at: Set(Some(now)),
            updated_at: Set(now),
            ..Default::default()
        };
        model
            .update(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("删除教职工失败: {e}")))?;

        Ok(true)
    }

    /// 发放工资：写支出流水并标记已发薪
    pub async fn pay_salary_impl(&self, payment: SalaryPayment) -> Result<SalaryPaymentResponse> {
        if parse_salary_month(&payment.month).is_none() {
            return Err(SchoolError::validation(format!(
                "月份格式错误，应为 YYYY-MM: {}",
                payment.month
            )));
        }

        let db_txn = self
            .db
            .begin()
            .await
            .map_err(|e| SchoolError::database_operation(format!("开启事务失败: {e}")))?;

        // 锁定教职工行，同一人的发薪请求排队执行
        let staff = StaffEntity::find_by_id(payment.staff_id)
            .filter(Column::DeletedAt.is_null())
            .lock_exclusive()
            .one(&db_txn)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询教职工失败: {e}")))?
            .ok_or_else(|| SchoolError::not_found(format!("教职工不存在: {}", payment.staff_id)))?;

        // 每月只发一次，补发历史月份也要检查
        let reference = salary_reference(&staff.employee_code, &payment.month);
        let already_paid = transactions::Entity::find()
            .filter(transactions::Column::StaffId.eq(staff.id))
            .filter(transactions::Column::Category.eq(CATEGORY_SALARY))
            .filter(transactions::Column::Reference.eq(reference.as_str()))
            .count(&db_txn)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询发薪流水失败: {e}")))?;
        if already_paid > 0 {
            return Err(SchoolError::conflict(format!(
                "{} 的 {} 工资已发放",
                staff.full_name, payment.month
            )));
        }

        let now = chrono::Utc::now();
        let txn = post_transaction(
            &db_txn,
            NewTransaction {
                account_id: payment.account_id,
                counter_account_id: None,
                txn_type: TxnType::Expense,
                amount: payment.amount,
                category: CATEGORY_SALARY.to_string(),
                description: Some(payment.remarks.unwrap_or_else(|| {
                    format!("{} {} 工资", staff.full_name, payment.month)
                })),
                reference: Some(reference),
                staff_id: Some(staff.id),
                txn_date: now,
                created_by: payment.paid_by,
            },
        )
        .await?;

        // 补发历史月份不改变当前发薪状态，最近发薪月份只前进不后退
        let is_latest = staff
            .last_salary_month
            .as_deref()
            .is_none_or(|last| payment.month.as_str() >= last);
        let mut model: ActiveModel = staff.into();
        if is_latest {
            model.salary_status = Set(SalaryStatus::Paid.to_string());
            model.last_salary_month = Set(Some(payment.month));
        }
        model.last_salary_paid_at = Set(Some(now.timestamp()));
        model.updated_at = Set(now.timestamp());
        let staff = model
            .update(&db_txn)
            .await
            .map_err(|e| SchoolError::database_operation(format!("更新发薪状态失败: {e}")))?;

        db_txn
            .commit()
            .await
            .map_err(|e| SchoolError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(SalaryPaymentResponse {
            staff: staff.into_staff(),
            transaction: txn.into_transaction(),
        })
    }

    /// 将上月及更早已发薪的状态重置为未发薪
    pub async fn reset_salary_statuses_impl(&self, current_month: &str) -> Result<u64> {
        let result = StaffEntity::update_many()
            .col_expr(
                Column::SalaryStatus,
                sea_orm::sea_query::Expr::value(SalaryStatus::Unpaid.to_string()),
            )
            .filter(Column::SalaryStatus.eq(SalaryStatus::Paid.to_string()))
            .filter(
                Condition::any()
                    .add(Column::LastSalaryMonth.is_null())
                    .add(Column::LastSalaryMonth.lt(current_month)),
            )
            .exec(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("重置发薪状态失败: {e}")))?;

        Ok(result.rows_affected)
    }

    pub async fn count_staff_impl(&self) -> Result<StaffCounts> {
        let base = StaffEntity::find()
            .filter(Column::DeletedAt.is_null())
            .filter(Column::Status.eq(StaffStatus::Active.to_string()));

        let active = base
            .clone()
            .count(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("统计教职工失败: {e}")))?;
        let salary_paid = base
            .filter(Column::SalaryStatus.eq(SalaryStatus::Paid.to_string()))
            .count(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("统计发薪人数失败: {e}")))?;

        Ok(StaffCounts {
            active: active as i64,
            salary_paid: salary_paid as i64,
            salary_unpaid: (active - salary_paid) as i64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::test_storage;
    use crate::storage::sea_orm_storage::tests_support::{seed_account, seed_staff};

    fn salary(staff_id: i64, account_id: i64, month: &str) -> SalaryPayment {
        SalaryPayment {
            staff_id,
            account_id,
            amount: 25000.0,
            month: month.to_string(),
            remarks: None,
            paid_by: None,
        }
    }

    #[tokio::test]
    async fn test_pay_salary_once_per_month() {
        let storage = test_storage().await;
        let bank = seed_account(&storage, "Salary Account", 60000.0).await;
        let staff = seed_staff(&storage, "EMP-001").await;

        let paid = storage
            .pay_salary_impl(salary(staff.id, bank.id, "2025-03"))
            .await
            .unwrap();
        assert_eq!(paid.staff.salary_status, SalaryStatus::Paid);
        assert_eq!(paid.transaction.category, CATEGORY_SALARY);
        assert_eq!(paid.transaction.txn_type, TxnType::Expense);

        let err = storage
            .pay_salary_impl(salary(staff.id, bank.id, "2025-03"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E014");

        let account = storage.get_account_by_id_impl(bank.id).await.unwrap().unwrap();
        assert_eq!(account.balance, 35000.0);
    }

    #[tokio::test]
    async fn test_pay_salary_insufficient_balance_rolls_back() {
        let storage = test_storage().await;
        let bank = seed_account(&storage, "Thin Account", 100.0).await;
        let staff = seed_staff(&storage, "EMP-002").await;

        let err = storage
            .pay_salary_impl(salary(staff.id, bank.id, "2025-03"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E019");

        let staff = storage.get_staff_by_id_impl(staff.id).await.unwrap().unwrap();
        assert_eq!(staff.salary_status, SalaryStatus::Unpaid);
        assert!(staff.last_salary_month.is_none());
    }

    #[tokio::test]
    async fn test_reset_and_counts() {
        let storage = test_storage().await;
        let bank = seed_account(&storage, "Main", 100000.0).await;
        let a = seed_staff(&storage, "EMP-010").await;
        let b = seed_staff(&storage, "EMP-011").await;
        seed_staff(&storage, "EMP-012").await;

        storage
            .pay_salary_impl(salary(a.id, bank.id, "2025-03"))
            .await
            .unwrap();
        storage
            .pay_salary_impl(salary(b.id, bank.id, "2025-04"))
            .await
            .unwrap();

        let counts = storage.count_staff_impl().await.unwrap();
        assert_eq!(counts.active, 3);
        assert_eq!(counts.salary_paid, 2);
        assert_eq!(counts.salary_unpaid, 1);

        assert_eq!(storage.reset_salary_statuses_impl("2025-04").await.unwrap(), 1);
        let counts = storage.count_staff_impl().await.unwrap();
        assert_eq!(counts.salary_paid, 1);
    }

    #[tokio::test]
    async fn test_earlier_month_cannot_be_paid_twice() {
        let storage = test_storage().await;
        let bank = seed_account(&storage, "Payroll", 100000.0).await;
        let staff = seed_staff(&storage, "EMP-030").await;

        for month in ["2025-03", "2025-04"] {
            storage
                .pay_salary_impl(salary(staff.id, bank.id, month))
                .await
                .unwrap();
        }

        let err = storage
            .pay_salary_impl(salary(staff.id, bank.id, "2025-03"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E014");

        let account = storage.get_account_by_id_impl(bank.id).await.unwrap().unwrap();
        assert_eq!(account.balance, 50000.0);
        let staff = storage.get_staff_by_id_impl(staff.id).await.unwrap().unwrap();
        assert_eq!(staff.last_salary_month.as_deref(), Some("2025-04"));
    }

    #[tokio::test]
    async fn test_arrears_keep_latest_month() {
        let storage = test_storage().await;
        let bank = seed_account(&storage, "Payroll", 100000.0).await;
        let staff = seed_staff(&storage, "EMP-031").await;

        storage
            .pay_salary_impl(salary(staff.id, bank.id, "2025-05"))
            .await
            .unwrap();
        // 补发 4 月
        let arrears = storage
            .pay_salary_impl(salary(staff.id, bank.id, "2025-04"))
            .await
            .unwrap();
        assert_eq!(arrears.staff.last_salary_month.as_deref(), Some("2025-05"));
        assert_eq!(arrears.staff.salary_status, SalaryStatus::Paid);
        assert_eq!(arrears.transaction.reference.as_deref(), Some("EMP-031:2025-04"));

        // 5 月已发，进入 5 月时不应被重置；进入 6 月才重置
        assert_eq!(storage.reset_salary_statuses_impl("2025-05").await.unwrap(), 0);
        assert_eq!(storage.reset_salary_statuses_impl("2025-06").await.unwrap(), 1);

        let staff = storage.get_staff_by_id_impl(staff.id).await.unwrap().unwrap();
        assert_eq!(staff.salary_status, SalaryStatus::Unpaid);
        assert_eq!(staff.last_salary_month.as_deref(), Some("2025-05"));
    }

    #[tokio::test]
    async fn test_arrears_after_reset_stay_unpaid() {
        let storage = test_storage().await;
        let bank = seed_account(&storage, "Payroll", 100000.0).await;
        let staff = seed_staff(&storage, "EMP-032").await;

        storage
            .pay_salary_impl(salary(staff.id, bank.id, "2025-05"))
            .await
            .unwrap();
        storage.reset_salary_statuses_impl("2025-06").await.unwrap();

        // 6 月未发，补发 3 月不能把状态改成已发
        let arrears = storage
            .pay_salary_impl(salary(staff.id, bank.id, "2025-03"))
            .await
            .unwrap();
        assert_eq!(arrears.staff.salary_status, SalaryStatus::Unpaid);
        assert_eq!(arrears.staff.last_salary_month.as_deref(), Some("2025-05"));
    }

    #[tokio::test]
    async fn test_soft_delete() {
        let storage = test_storage().await;
        let staff = seed_staff(&storage, "EMP-020").await;

        assert!(storage.delete_staff_impl(staff.id).await.unwrap());
        assert!(storage.get_staff_by_id_impl(staff.id).await.unwrap().is_none());
        assert!(!storage.delete_staff_impl(staff.id).await.unwrap());

        let dup = storage
            .create_staff_impl(CreateStaffRequest {
                employee_code: "EMP-020".to_string(),
                full_name: "Another".to_string(),
                designation: "Clerk".to_string(),
                department: None,
                phone: None,
                email: None,
                joining_date: None,
                salary: 0.0,
            })
            .await
            .unwrap_err();
        assert_eq!(dup.code(), "E014");
    }
}
