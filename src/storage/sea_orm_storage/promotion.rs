//! 学年升级存储操作

use super::SeaOrmStorage;
use super::fee_records::generate_for_students;
use crate::entity::students::{ActiveModel, Column, Entity as Students};
use crate::errors::{Result, SchoolError};
use crate::models::{
    fees::calculator::FeeContext, promotion::entities::PromotionStep,
    students::entities::StudentStatus,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait};

impl SeaOrmStorage {
    /// 单个学生升级或毕业，需要时生成新学年收费记录
    pub async fn promote_student_impl(&self, step: PromotionStep, ctx: FeeContext) -> Result<i64> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| SchoolError::database_operation(format!("开启事务失败: {e}")))?;

        let student = Students::find_by_id(step.student_id)
            .filter(Column::DeletedAt.is_null())
            .one(&txn)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询学生失败: {e}")))?
            .ok_or_else(|| SchoolError::not_found(format!("学生不存在: {}", step.student_id)))?;

        if student.status != StudentStatus::Active.to_string() {
            return Err(SchoolError::business_rule(format!(
                "学生 {} 不在读，不能升级",
                student.admission_number
            )));
        }

        let mut model: ActiveModel = student.into();
        model.updated_at = Set(chrono::Utc::now().timestamp());
        match step.target_class_id {
            Some(class_id) => {
                model.class_id = Set(Some(class_id));
                model.academic_year = Set(step.to_academic_year.clone());
            }
            None => model.status = Set(StudentStatus::Graduated.to_string()),
        }
        model
            .update(&txn)
            .await
            .map_err(|e| SchoolError::database_operation(format!("更新学生失败: {e}")))?;

        let mut created = 0;
        if let (Some(class_id), Some(first_due), true) =
            (step.target_class_id, step.first_due_date, step.generate_fees)
        {
            let outcome = generate_for_students(
                &txn,
                &[(step.student_id, class_id)],
                &step.to_academic_year,
                first_due,
                ctx,
            )
            .await?;
            created = outcome.created;
        }

        txn.commit()
            .await
            .map_err(|e| SchoolError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fees::{
        calculator::FeeCalendar, entities::FeeFrequency, requests::UpsertFeeStructureRequest,
    };
    use crate::storage::sea_orm_storage::test_storage;
    use crate::storage::sea_orm_storage::tests_support::{seed_class, seed_fee_type, seed_student};
    use chrono::NaiveDate;

    fn ctx() -> FeeContext {
        FeeContext {
            calendar: FeeCalendar {
                start_month: 4,
                due_day: 10,
                grace_days: 0,
            },
            as_of: NaiveDate::from_ymd_opt(2026, 3, 20).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_promote_with_fees() {
        let storage = test_storage().await;
        let g1 = seed_class(&storage, "Grade 1", 1).await;
        let g2 = seed_class(&storage, "Grade 2", 2).await;
        let fee = seed_fee_type(&storage, "Tuition", FeeFrequency::Quarterly).await;
        storage
            .upsert_fee_structure_impl(UpsertFeeStructureRequest {
                class_id: g2.id,
                fee_type_id: fee.id,
                academic_year: "2026-2027".to_string(),
                amount: 2500.0,
            })
            .await
            .unwrap();
        let student = seed_student(&storage, "PR-1", Some(g1.id), "2025-2026").await;

        let step = PromotionStep {
            student_id: student.id,
            target_class_id: Some(g2.id),
            to_academic_year: "2026-2027".to_string(),
            generate_fees: true,
            first_due_date: ctx().first_due_date("2026-2027"),
        };
        assert_eq!(storage.promote_student_impl(step, ctx()).await.unwrap(), 1);

        let promoted = storage.get_student_by_id_impl(student.id).await.unwrap().unwrap();
        assert_eq!(promoted.class_id, Some(g2.id));
        assert_eq!(promoted.academic_year, "2026-2027");

        let records = storage
            .list_student_fee_records_impl(student.id, Some("2026-2027".to_string()), ctx())
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].record.total_amount, 10000.0);
    }

    #[tokio::test]
    async fn test_graduate_and_reject_inactive() {
        let storage = test_storage().await;
        let g10 = seed_class(&storage, "Grade 10", 10).await;
        let student = seed_student(&storage, "PR-9", Some(g10.id), "2025-2026").await;

        let graduate = PromotionStep {
            student_id: student.id,
            target_class_id: None,
            to_academic_year: "2026-2027".to_string(),
            generate_fees: true,
            first_due_date: None,
        };
        assert_eq!(
            storage
                .promote_student_impl(graduate.clone(), ctx())
                .await
                .unwrap(),
            0
        );
        let graduated = storage.get_student_by_id_impl(student.id).await.unwrap().unwrap();
        assert_eq!(graduated.status, StudentStatus::Graduated);

        let again = storage.promote_student_impl(graduate, ctx()).await.unwrap_err();
        assert_eq!(again.code(), "E015");
    }
}
