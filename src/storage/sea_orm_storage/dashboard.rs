//! 统计查询

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Datelike, NaiveDate};

use super::{SeaOrmStorage, lookups};
use crate::entity::{date_to_ts, fee_payments, from_ts, student_fee_records};
use crate::errors::{Result, SchoolError};
use crate::models::{
    dashboard::responses::{ClassFeeSummary, FeeSummary, MonthlyCollection},
    fees::{calculator::round_amount, entities::FeeStatus},
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

impl SeaOrmStorage {
    /// 学年内未免收的收费记录
    async fn year_records(&self, academic_year: &str) -> Result<Vec<student_fee_records::Model>> {
        student_fee_records::Entity::find()
            .filter(student_fee_records::Column::AcademicYear.eq(academic_year))
            .filter(student_fee_records::Column::Status.ne(FeeStatus::Waived.to_string()))
            .all(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询收费记录失败: {e}")))
    }

    pub async fn fee_summary_impl(&self, academic_year: &str) -> Result<FeeSummary> {
        let (due, collected, discount) = self
            .year_records(academic_year)
            .await?
            .iter()
            .fold((0.0, 0.0, 0.0), |(due, paid, discount), r| {
                (
                    due + r.total_amount,
                    paid + r.paid_amount,
                    discount + r.discount_amount,
                )
            });

        Ok(FeeSummary::new(due, collected, discount))
    }

    /// 自然年内每月收款，固定 12 个月
    pub async fn monthly_collections_impl(&self, year: i32) -> Result<Vec<MonthlyCollection>> {
        let (Some(start), Some(end)) = (
            NaiveDate::from_ymd_opt(year, 1, 1),
            NaiveDate::from_ymd_opt(year + 1, 1, 1),
        ) else {
            return Err(SchoolError::validation(format!("年份无效: {year}")));
        };

        let payments = fee_payments::Entity::find()
            .filter(fee_payments::Column::PaidAt.gte(date_to_ts(start)))
            .filter(fee_payments::Column::PaidAt.lt(date_to_ts(end)))
            .all(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询缴费记录失败: {e}")))?;

        let mut months: Vec<MonthlyCollection> = (1..=12)
            .map(|month| MonthlyCollection {
                month,
                amount: 0.0,
                discount: 0.0,
                count: 0,
            })
            .collect();
        for payment in payments {
            let index = from_ts(payment.paid_at).month0() as usize;
            if let Some(bucket) = months.get_mut(index) {
                bucket.amount += payment.amount;
                bucket.discount += payment.discount;
                bucket.count += 1;
            }
        }
        for bucket in &mut months {
            bucket.amount = round_amount(bucket.amount);
            bucket.discount = round_amount(bucket.discount);
        }

        Ok(months)
    }

    /// 按班级汇总应收、已收、减免
    pub async fn class_fee_summaries_impl(
        &self,
        academic_year: &str,
    ) -> Result<Vec<ClassFeeSummary>> {
        let records = self.year_records(academic_year).await?;

        let mut groups: BTreeMap<Option<i64>, (f64, f64, f64, HashSet<i64>)> = BTreeMap::new();
        for r in &records {
            let entry = groups.entry(r.class_id).or_default();
            entry.0 += r.total_amount;
            entry.1 += r.paid_amount;
            entry.2 += r.discount_amount;
            entry.3.insert(r.student_id);
        }

        let names: HashMap<i64, String> =
            lookups::class_names(&self.db, groups.keys().filter_map(|id| *id)).await?;

        let mut items: Vec<ClassFeeSummary> = groups
            .into_iter()
            .map(|(class_id, (due, collected, discount, students))| ClassFeeSummary {
                class_id,
                class_name: class_id
                    .and_then(|id| names.get(&id).cloned())
                    .unwrap_or_else(|| "未分班".to_string()),
                student_count: students.len() as i64,
                fees: FeeSummary::new(due, collected, discount),
            })
            .collect();
        items.sort_by(|a, b| a.class_name.cmp(&b.class_name));

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fees::{
        calculator::{FeeCalendar, FeeContext},
        entities::{FeeFrequency, NewFeePayment, PaymentMethod},
        requests::{FeeRecordListQuery, GenerateFeeRecordsRequest, UpsertFeeStructureRequest},
    };
    use crate::storage::sea_orm_storage::test_storage;
    use crate::storage::sea_orm_storage::tests_support::{seed_class, seed_fee_type, seed_student};
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_fee_and_collection_summaries() {
        let storage = test_storage().await;
        let ctx = FeeContext {
            calendar: FeeCalendar {
                start_month: 4,
                due_day: 10,
                grace_days: 0,
            },
            as_of: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        };
        let g1 = seed_class(&storage, "Grade 1", 1).await;
        let g2 = seed_class(&storage, "Grade 2", 2).await;
        let fee = seed_fee_type(&storage, "Annual", FeeFrequency::Yearly).await;
        for (class_id, amount) in [(g1.id, 1000.0), (g2.id, 2000.0)] {
            storage
                .upsert_fee_structure_impl(UpsertFeeStructureRequest {
                    class_id,
                    fee_type_id: fee.id,
                    academic_year: "2025-2026".to_string(),
                    amount,
                })
                .await
                .unwrap();
        }
        seed_student(&storage, "D-1", Some(g1.id), "2025-2026").await;
        seed_student(&storage, "D-2", Some(g1.id), "2025-2026").await;
        seed_student(&storage, "D-3", Some(g2.id), "2025-2026").await;
        storage
            .generate_fee_records_impl(
                GenerateFeeRecordsRequest {
                    academic_year: "2025-2026".to_string(),
                    class_id: None,
                    student_id: None,
                },
                ctx,
            )
            .await
            .unwrap();

        let records = storage
            .list_fee_records_impl(
                FeeRecordListQuery {
                    class_id: Some(g2.id),
                    ..Default::default()
                },
                ctx,
            )
            .await
            .unwrap();
        storage
            .record_fee_payment_impl(
                NewFeePayment {
                    record_id: records.items[0].record.id,
                    amount: 1500.0,
                    discount: 500.0,
                    method: PaymentMethod::BankTransfer,
                    receipt_number: "RCP-20250512-ZZZZZZ".to_string(),
                    paid_at: chrono::Utc.with_ymd_and_hms(2025, 5, 12, 9, 0, 0).unwrap(),
                    account_id: None,
                    collected_by: None,
                    remarks: None,
                },
                ctx,
            )
            .await
            .unwrap();

        let summary = storage.fee_summary_impl("2025-2026").await.unwrap();
        assert_eq!(summary.due, 4000.0);
        assert_eq!(summary.collected, 1500.0);
        assert_eq!(summary.discount, 500.0);
        assert_eq!(summary.outstanding, 2000.0);
        assert_eq!(summary.collection_rate, 50.0);

        let months = storage.monthly_collections_impl(2025).await.unwrap();
        assert_eq!(months.len(), 12);
        assert_eq!(months[4].month, 5);
        assert_eq!(months[4].amount, 1500.0);
        assert_eq!(months[4].count, 1);
        assert_eq!(months[0].count, 0);

        let classes = storage.class_fee_summaries_impl("2025-2026").await.unwrap();
        assert_eq!(classes.len(), 2);
        assert_eq!(classes[0].class_name, "Grade 1");
        assert_eq!(classes[0].student_count, 2);
        assert_eq!(classes[1].fees.outstanding, 0.0);
    }
}
