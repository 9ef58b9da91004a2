//! 缴费存储操作

use super::finance::{post_transaction, reverse_transaction};
use super::fee_records::{apply_record_amounts, record_details};
use super::{SeaOrmStorage, lookups, write_error};
use crate::entity::fee_payments::{ActiveModel, Column, Entity as FeePayments, Model};
use crate::entity::{date_to_ts, student_fee_records, transactions};
use crate::errors::{Result, SchoolError};
use crate::models::{
    PaginationInfo,
    common::pagination::page_bounds,
    fees::{
        calculator::{AMOUNT_EPSILON, FeeContext, round_amount},
        entities::{FeePaymentDetail, FeeRecordDetail, FeeStatus, NewFeePayment},
        requests::PaymentListQuery,
        responses::{PaymentListResponse, PaymentResponse},
    },
    finance::entities::{CATEGORY_FEES, NewTransaction, TxnType},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

/// 组装缴费详情
async fn payment_details<C: ConnectionTrait>(
    conn: &C,
    rows: Vec<Model>,
) -> Result<Vec<FeePaymentDetail>> {
    let records: std::collections::HashMap<i64, student_fee_records::Model> =
        student_fee_records::Entity::find()
            .filter(student_fee_records::Column::Id.is_in(rows.iter().map(|p| p.record_id)))
            .all(conn)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询收费记录失败: {e}")))?
            .into_iter()
            .map(|r| (r.id, r))
            .collect();
    let students = lookups::students_by_id(conn, rows.iter().map(|p| p.student_id)).await?;
    let fee_types =
        lookups::fee_type_names(conn, records.values().map(|r| r.fee_type_id)).await?;
    let classes =
        lookups::class_names(conn, records.values().filter_map(|r| r.class_id)).await?;
    let users = lookups::user_names(conn, rows.iter().filter_map(|p| p.collected_by)).await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let payment = row.into_payment();
            let record = records.get(&payment.record_id);
            let student = students.get(&payment.student_id);
            FeePaymentDetail {
                student_name: student.map(|s| s.full_name()).unwrap_or_default(),
                admission_number: student
                    .map(|s| s.admission_number.clone())
                    .unwrap_or_default(),
                class_name: record
                    .and_then(|r| r.class_id)
                    .and_then(|id| classes.get(&id).cloned()),
                fee_type_name: record
                    .and_then(|r| fee_types.get(&r.fee_type_id).cloned())
                    .unwrap_or_default(),
                academic_year: record.map(|r| r.academic_year.clone()).unwrap_or_default(),
                collected_by_name: payment.collected_by.and_then(|id| users.get(&id).cloned()),
                payment,
            }
        })
        .collect())
}

/// 事务内读取并锁定收费记录
async fn lock_record<C: ConnectionTrait>(
    conn: &C,
    record_id: i64,
) -> Result<student_fee_records::Model> {
    student_fee_records::Entity::find_by_id(record_id)
        .lock_exclusive()
        .one(conn)
        .await
        .map_err(|e| SchoolError::database_operation(format!("查询收费记录失败: {e}")))?
        .ok_or_else(|| SchoolError::fee_record_not_found(format!("收费记录不存在: {record_id}")))
}

impl SeaOrmStorage {
    /// 登记缴费：更新收费记录，指定账户时同时写收入流水
    pub async fn record_fee_payment_impl(
        &self,
        payment: NewFeePayment,
        ctx: FeeContext,
    ) -> Result<PaymentResponse> {
        let amount = round_amount(payment.amount);
        let discount = round_amount(payment.discount);
        if !amount.is_finite() || !discount.is_finite() || amount < 0.0 || discount < 0.0 {
            return Err(SchoolError::validation("缴费金额和减免金额不能为负数"));
        }
        if amount + discount <= 0.0 {
            return Err(SchoolError::validation("缴费金额与减免金额之和必须大于 0"));
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| SchoolError::database_operation(format!("开启事务失败: {e}")))?;

        // 锁定收费记录，同一记录的并发缴费排队执行，剩余应缴校验基于最新金额
        let row = lock_record(&txn, payment.record_id).await?;
        let record = row.clone().into_record();

        if record.status == FeeStatus::Waived {
            return Err(SchoolError::fee_record_waived("该收费记录已免收，不能缴费"));
        }
        let remaining = record.remaining();
        if amount + discount > remaining + AMOUNT_EPSILON {
            return Err(SchoolError::payment_exceeds_balance(format!(
                "缴费金额 {:.2} 超过剩余应缴 {:.2}",
                amount + discount,
                remaining
            )));
        }

        let transaction_id = match payment.account_id {
            Some(account_id) if amount > 0.0 => {
                let posted = post_transaction(
                    &txn,
                    NewTransaction {
                        account_id,
                        counter_account_id: None,
                        txn_type: TxnType::Income,
                        amount,
                        category: CATEGORY_FEES.to_string(),
                        description: Some(format!("学费收款 {}", payment.receipt_number)),
                        reference: Some(payment.receipt_number.clone()),
                        staff_id: None,
                        txn_date: payment.paid_at,
                        created_by: payment.collected_by,
                    },
                )
                .await?;
                Some(posted.id)
            }
            _ => None,
        };

        let saved = ActiveModel {
            record_id: Set(record.id),
            student_id: Set(record.student_id),
            amount: Set(amount),
            discount: Set(discount),
            method: Set(payment.method.to_string()),
            receipt_number: Set(payment.receipt_number),
            paid_at: Set(payment.paid_at.timestamp()),
            account_id: Set(transaction_id.and(payment.account_id)),
            transaction_id: Set(transaction_id),
            collected_by: Set(payment.collected_by),
            remarks: Set(payment.remarks),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(write_error("登记缴费失败", "收据编号已存在"))?;

        let updated = apply_record_amounts(
            &txn,
            row,
            round_amount(record.paid_amount + amount),
            round_amount(record.discount_amount + discount),
            ctx,
        )
        .await?;

        txn.commit()
            .await
            .map_err(|e| SchoolError::database_operation(format!("提交事务失败: {e}")))?;

        let payment = payment_details(&self.db, vec![saved])
            .await?
            .pop()
            .ok_or_else(|| SchoolError::not_found("缴费记录不存在"))?;
        let record = record_details(&self.db, vec![updated], ctx)
            .await?
            .pop()
            .ok_or_else(|| SchoolError::not_found("收费记录不存在"))?;

        Ok(PaymentResponse { payment, record })
    }

    pub async fn list_fee_payments_impl(
        &self,
        query: PaymentListQuery,
    ) -> Result<PaymentListResponse> {
        let (page, size) = page_bounds(query.page, query.size, 20);

        let mut select = FeePayments::find();
        if let Some(student_id) = query.student_id {
            select = select.filter(Column::StudentId.eq(student_id));
        }
        if let Some(record_id) = query.record_id {
            select = select.filter(Column::RecordId.eq(record_id));
        }
        if let Some(method) = query.method {
            select = select.filter(Column::Method.eq(method.to_string()));
        }
        if let Some(from) = query.from {
            select = select.filter(Column::PaidAt.gte(date_to_ts(from)));
        }
        if let Some(to) = query.to {
            select = select.filter(Column::PaidAt.lt(date_to_ts(to) + 86_400));
        }
        select = select
            .order_by_desc(Column::PaidAt)
            .order_by_desc(Column::Id);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询缴费总数失败: {e}")))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询缴费页数失败: {e}")))?;
        let rows = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询缴费列表失败: {e}")))?;

        Ok(PaymentListResponse {
            items: payment_details(&self.db, rows).await?,
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    pub async fn get_fee_payment_detail_impl(&self, id: i64) -> Result<Option<FeePaymentDetail>> {
        let Some(row) = FeePayments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询缴费记录失败: {e}")))?
        else {
            return Ok(None);
        };

        Ok(payment_details(&self.db, vec![row]).await?.pop())
    }

    /// 冲销缴费：删除缴费、回滚收费记录和入账流水
    pub async fn delete_fee_payment_impl(
        &self,
        id: i64,
        ctx: FeeContext,
    ) -> Result<Option<FeeRecordDetail>> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| SchoolError::database_operation(format!("开启事务失败: {e}")))?;

        let Some(payment) = FeePayments::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询缴费记录失败: {e}")))?
        else {
            return Ok(None);
        };

        // 先锁收费记录再动账户，与登记缴费的加锁顺序一致
        let row = lock_record(&txn, payment.record_id).await?;

        FeePayments::delete_by_id(payment.id)
            .exec(&txn)
            .await
            .map_err(|e| SchoolError::database_operation(format!("删除缴费记录失败: {e}")))?;

        if let Some(transaction_id) = payment.transaction_id {
            let linked = transactions::Entity::find_by_id(transaction_id)
                .one(&txn)
                .await
                .map_err(|e| SchoolError::database_operation(format!("查询流水失败: {e}")))?;
            if let Some(linked) = linked {
                reverse_transaction(&txn, linked).await?;
            }
        }

        let paid = round_amount((row.paid_amount - payment.amount).max(0.0));
        let discount = round_amount((row.discount_amount - payment.discount).max(0.0));
        let updated = apply_record_amounts(&txn, row, paid, discount, ctx).await?;

        txn.commit()
            .await
            .map_err(|e| SchoolError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(record_details(&self.db, vec![updated], ctx).await?.pop())
    }

    pub async fn recent_fee_payments_impl(&self, limit: u64) -> Result<Vec<FeePaymentDetail>> {
        let rows = FeePayments::find()
            .order_by_desc(Column::PaidAt)
            .order_by_desc(Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询最近缴费失败: {e}")))?;

        payment_details(&self.db, rows).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fees::{
        calculator::FeeCalendar,
        entities::{FeeFrequency, PaymentMethod},
        requests::{FeeRecordListQuery, GenerateFeeRecordsRequest, UpsertFeeStructureRequest},
    };
    use crate::storage::sea_orm_storage::test_storage;
    use crate::storage::sea_orm_storage::tests_support::{
        seed_account, seed_class, seed_fee_type, seed_student,
    };
    use chrono::NaiveDate;

    fn ctx() -> FeeContext {
        FeeContext {
            calendar: FeeCalendar {
                start_month: 4,
                due_day: 10,
                grace_days: 0,
            },
            as_of: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        }
    }

    /// 一个学生、一条 3000 元的年度收费记录
    async fn seeded_record(storage: &SeaOrmStorage) -> i64 {
        let class = seed_class(storage, "Grade 7", 7).await;
        let fee_type = seed_fee_type(storage, "Annual", FeeFrequency::Yearly).await;
        seed_student(storage, "P-1", Some(class.id), "2025-2026").await;
        storage
            .upsert_fee_structure_impl(UpsertFeeStructureRequest {
                class_id: class.id,
                fee_type_id: fee_type.id,
                academic_year: "2025-2026".to_string(),
                amount: 3000.0,
            })
            .await
            .unwrap();
        storage
            .generate_fee_records_impl(
                GenerateFeeRecordsRequest {
                    academic_year: "2025-2026".to_string(),
                    class_id: None,
                    student_id: None,
                },
                ctx(),
            )
            .await
            .unwrap();
        storage
            .list_fee_records_impl(FeeRecordListQuery::default(), ctx())
            .await
            .unwrap()
            .items[0]
            .record
            .id
    }

    fn payment(record_id: i64, amount: f64, discount: f64, receipt: &str) -> NewFeePayment {
        NewFeePayment {
            record_id,
            amount,
            discount,
            method: PaymentMethod::Cash,
            receipt_number: receipt.to_string(),
            paid_at: chrono::Utc::now(),
            account_id: None,
            collected_by: None,
            remarks: None,
        }
    }

    #[tokio::test]
    async fn test_partial_then_full_payment() {
        let storage = test_storage().await;
        let record_id = seeded_record(&storage).await;
        let cash = seed_account(&storage, "Front Desk", 0.0).await;

        let mut first = payment(record_id, 1000.0, 0.0, "RCP-20250301-AAAAAA");
        first.account_id = Some(cash.id);
        let res = storage.record_fee_payment_impl(first, ctx()).await.unwrap();
        assert_eq!(res.record.record.status, FeeStatus::Partial);
        assert_eq!(res.record.remaining, 2000.0);
        assert!(res.payment.payment.transaction_id.is_some());
        assert!(!res.payment.student_name.is_empty());

        let over = storage
            .record_fee_payment_impl(
                payment(record_id, 1900.0, 200.0, "RCP-20250301-BBBBBB"),
                ctx(),
            )
            .await
            .unwrap_err();
        assert_eq!(over.code(), "E022");

        let res = storage
            .record_fee_payment_impl(
                payment(record_id, 1800.0, 200.0, "RCP-20250301-CCCCCC"),
                ctx(),
            )
            .await
            .unwrap();
        assert_eq!(res.record.record.status, FeeStatus::Paid);
        assert_eq!(res.record.remaining, 0.0);
        assert!(res.payment.payment.transaction_id.is_none());

        let account = storage.get_account_by_id_impl(cash.id).await.unwrap().unwrap();
        assert_eq!(account.balance, 1000.0);
    }

    #[tokio::test]
    async fn test_payment_validation() {
        let storage = test_storage().await;
        let record_id = seeded_record(&storage).await;

        let zero = storage
            .record_fee_payment_impl(payment(record_id, 0.0, 0.0, "R-1"), ctx())
            .await
            .unwrap_err();
        assert_eq!(zero.code(), "E007");

        let negative = storage
            .record_fee_payment_impl(payment(record_id, -5.0, 10.0, "R-2"), ctx())
            .await
            .unwrap_err();
        assert_eq!(negative.code(), "E007");

        let missing = storage
            .record_fee_payment_impl(payment(9999, 5.0, 0.0, "R-3"), ctx())
            .await
            .unwrap_err();
        assert_eq!(missing.code(), "E020");

        storage
            .record_fee_payment_impl(payment(record_id, 5.0, 0.0, "R-4"), ctx())
            .await
            .unwrap();
        let dup = storage
            .record_fee_payment_impl(payment(record_id, 5.0, 0.0, "R-4"), ctx())
            .await
            .unwrap_err();
        assert_eq!(dup.code(), "E014");
    }

    #[tokio::test]
    async fn test_reversal_restores_record_and_account() {
        let storage = test_storage().await;
        let record_id = seeded_record(&storage).await;
        let bank = seed_account(&storage, "School Bank", 0.0).await;

        let mut full = payment(record_id, 3000.0, 0.0, "RCP-20250301-FULL01");
        full.account_id = Some(bank.id);
        let res = storage.record_fee_payment_impl(full, ctx()).await.unwrap();
        let txn_id = res.payment.payment.transaction_id.unwrap();

        // 缴费产生的流水不能直接删除
        let locked = storage.delete_transaction_impl(txn_id).await.unwrap_err();
        assert_eq!(locked.code(), "E014");

        let record = storage
            .delete_fee_payment_impl(res.payment.payment.id, ctx())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.record.status, FeeStatus::Pending);
        assert_eq!(record.record.paid_amount, 0.0);

        let account = storage.get_account_by_id_impl(bank.id).await.unwrap().unwrap();
        assert_eq!(account.balance, 0.0);
        assert!(storage.get_transaction_by_id_impl(txn_id).await.unwrap().is_none());
        assert!(
            storage
                .delete_fee_payment_impl(res.payment.payment.id, ctx())
                .await
                .unwrap()
                .is_none()
        );
        assert!(storage.recent_fee_payments_impl(5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_payments_keep_totals() {
        let storage = test_storage().await;
        let record_id = seeded_record(&storage).await;
        let bank = seed_account(&storage, "Collections", 0.0).await;

        let pay = |receipt: &'static str| {
            let mut p = payment(record_id, 1000.0, 0.0, receipt);
            p.account_id = Some(bank.id);
            storage.record_fee_payment_impl(p, ctx())
        };
        let (a, b, c, d) = tokio::join!(
            pay("RCP-20250301-PAR001"),
            pay("RCP-20250301-PAR002"),
            pay("RCP-20250301-PAR003"),
            pay("RCP-20250301-PAR004"),
        );

        // 3000 元只够三笔，第四笔必须因超额被拒
        let results = [a, b, c, d];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 3);
        let rejected = results.into_iter().find_map(|r| r.err()).unwrap();
        assert_eq!(rejected.code(), "E022");

        let detail = storage
            .get_fee_record_detail_impl(record_id, ctx())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(detail.payments.len(), 3);
        let record = detail.record;
        assert_eq!(record.record.paid_amount, 3000.0);
        assert_eq!(record.record.status, FeeStatus::Paid);

        let account = storage.get_account_by_id_impl(bank.id).await.unwrap().unwrap();
        assert_eq!(account.balance, 3000.0);
    }
}
