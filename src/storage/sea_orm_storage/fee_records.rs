//! 学生收费记录存储操作

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use super::{SeaOrmStorage, lookups};
use crate::entity::student_fee_records::{self, ActiveModel, Column, Entity as FeeRecords};
use crate::entity::{
    class_fee_structures, date_to_ts, fee_payments, fee_types, student_fee_customs, students,
};
use crate::errors::{Result, SchoolError};
use crate::models::{
    PaginationInfo,
    common::pagination::page_bounds,
    fees::{
        calculator::{FeeContext, FeeStanding, due_schedule, yearly_amount},
        entities::{FeeFrequency, FeeRecordDetail, FeeRecordNames, FeeStatus},
        requests::{FeeRecordListQuery, GenerateFeeRecordsRequest, UpdateFeeRecordRequest},
        responses::{FeeRecordListResponse, FeeRecordWithPayments, GenerateFeeRecordsResponse},
    },
    students::entities::StudentStatus,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

/// 组装收费记录详情，状态按 `ctx.as_of` 重新推导
pub(crate) async fn record_details<C: ConnectionTrait>(
    conn: &C,
    rows: Vec<student_fee_records::Model>,
    ctx: FeeContext,
) -> Result<Vec<FeeRecordDetail>> {
    let students = lookups::students_by_id(conn, rows.iter().map(|r| r.student_id)).await?;
    let fee_types = lookups::fee_type_names(conn, rows.iter().map(|r| r.fee_type_id)).await?;
    let classes = lookups::class_names(conn, rows.iter().filter_map(|r| r.class_id)).await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let mut record = row.into_record();
            record.status = record.derive_status(ctx.as_of, ctx.grace_days());
            let student = students.get(&record.student_id);
            let names = FeeRecordNames {
                student_name: student.map(|s| s.full_name()).unwrap_or_default(),
                admission_number: student
                    .map(|s| s.admission_number.clone())
                    .unwrap_or_default(),
                fee_type_name: fee_types
                    .get(&record.fee_type_id)
                    .cloned()
                    .unwrap_or_default(),
                class_name: record.class_id.and_then(|id| classes.get(&id).cloned()),
            };
            FeeRecordDetail::new(record, names, ctx.as_of, ctx.grace_days())
        })
        .collect())
}

/// 按新的已缴和减免金额重算记录状态并保存
pub(crate) async fn apply_record_amounts<C: ConnectionTrait>(
    conn: &C,
    row: student_fee_records::Model,
    paid: f64,
    discount: f64,
    ctx: FeeContext,
) -> Result<student_fee_records::Model> {
    let mut record = row.clone().into_record();
    record.paid_amount = paid;
    record.discount_amount = discount;
    let status = record.derive_status(ctx.as_of, ctx.grace_days());

    let mut model: ActiveModel = row.into();
    model.paid_amount = Set(paid);
    model.discount_amount = Set(discount);
    model.status = Set(status.to_string());
    model.updated_at = Set(chrono::Utc::now().timestamp());
    model
        .update(conn)
        .await
        .map_err(|e| SchoolError::database_operation(format!("更新收费记录失败: {e}")))
}

/// 为一组 (学生, 班级) 生成学年收费记录，已存在的跳过
pub(crate) async fn generate_for_students<C: ConnectionTrait>(
    conn: &C,
    targets: &[(i64, i64)],
    academic_year: &str,
    first_due: NaiveDate,
    ctx: FeeContext,
) -> Result<GenerateFeeRecordsResponse> {
    let mut outcome = GenerateFeeRecordsResponse::default();
    if targets.is_empty() {
        return Ok(outcome);
    }

    let class_ids: HashSet<i64> = targets.iter().map(|(_, class_id)| *class_id).collect();
    let student_ids: HashSet<i64> = targets.iter().map(|(student_id, _)| *student_id).collect();

    let structures = class_fee_structures::Entity::find()
        .filter(class_fee_structures::Column::ClassId.is_in(class_ids))
        .filter(class_fee_structures::Column::AcademicYear.eq(academic_year))
        .order_by_asc(class_fee_structures::Column::FeeTypeId)
        .all(conn)
        .await
        .map_err(|e| SchoolError::database_operation(format!("查询收费标准失败: {e}")))?;
    let mut by_class: HashMap<i64, Vec<&class_fee_structures::Model>> = HashMap::new();
    for structure in &structures {
        by_class.entry(structure.class_id).or_default().push(structure);
    }

    // 停用的收费项目不再生成记录
    let frequencies: HashMap<i64, FeeFrequency> = fee_types::Entity::find()
        .filter(fee_types::Column::Id.is_in(structures.iter().map(|s| s.fee_type_id)))
        .filter(fee_types::Column::IsActive.eq(true))
        .all(conn)
        .await
        .map_err(|e| SchoolError::database_operation(format!("查询收费项目失败: {e}")))?
        .into_iter()
        .filter_map(|t| Some((t.id, t.frequency.parse::<FeeFrequency>().ok()?)))
        .collect();

    let customs: HashMap<(i64, i64), student_fee_customs::Model> =
        student_fee_customs::Entity::find()
            .filter(student_fee_customs::Column::StudentId.is_in(student_ids.iter().copied()))
            .filter(student_fee_customs::Column::AcademicYear.eq(academic_year))
            .all(conn)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询个别收费失败: {e}")))?
            .into_iter()
            .map(|c| ((c.student_id, c.fee_type_id), c))
            .collect();

    let existing: HashSet<(i64, i64)> = FeeRecords::find()
        .filter(Column::StudentId.is_in(student_ids.iter().copied()))
        .filter(Column::AcademicYear.eq(academic_year))
        .all(conn)
        .await
        .map_err(|e| SchoolError::database_operation(format!("查询收费记录失败: {e}")))?
        .into_iter()
        .map(|r| (r.student_id, r.fee_type_id))
        .collect();

    let now = chrono::Utc::now().timestamp();
    for (student_id, class_id) in targets {
        let Some(class_structures) = by_class.get(class_id) else {
            continue;
        };
        for structure in class_structures {
            let Some(&frequency) = frequencies.get(&structure.fee_type_id) else {
                continue;
            };
            let key = (*student_id, structure.fee_type_id);
            if existing.contains(&key) {
                outcome.skipped += 1;
                continue;
            }
            let custom = customs.get(&key);
            if custom.is_some_and(|c| !c.is_applicable) {
                outcome.not_applicable += 1;
                continue;
            }

            let per_period = custom
                .and_then(|c| c.custom_amount)
                .unwrap_or(structure.amount);
            let total = yearly_amount(per_period, frequency);
            let schedule = due_schedule(first_due, frequency);
            let status = FeeStanding {
                amount_per_period: per_period,
                total,
                paid: 0.0,
                discount: 0.0,
                schedule: &schedule,
                waived: false,
            }
            .status(ctx.as_of, ctx.grace_days());

            ActiveModel {
                student_id: Set(*student_id),
                fee_type_id: Set(structure.fee_type_id),
                class_id: Set(Some(*class_id)),
                academic_year: Set(academic_year.to_string()),
                frequency: Set(frequency.to_string()),
                amount_per_period: Set(per_period),
                periods: Set(frequency.periods_per_year() as i32),
                total_amount: Set(total),
                paid_amount: Set(0.0),
                discount_amount: Set(0.0),
                first_due_at: Set(date_to_ts(first_due)),
                status: Set(status.to_string()),
                remarks: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(conn)
            .await
            .map_err(|e| SchoolError::database_operation(format!("创建收费记录失败: {e}")))?;
            outcome.created += 1;
        }
    }

    Ok(outcome)
}

impl SeaOrmStorage {
    pub async fn list_fee_records_impl(
        &self,
        query: FeeRecordListQuery,
        ctx: FeeContext,
    ) -> Result<FeeRecordListResponse> {
        let (page, size) = page_bounds(query.page, query.size, 20);

        let mut select = FeeRecords::find();
        if let Some(student_id) = query.student_id {
            select = select.filter(Column::StudentId.eq(student_id));
        }
        if let Some(class_id) = query.class_id {
            select = select.filter(Column::ClassId.eq(class_id));
        }
        if let Some(fee_type_id) = query.fee_type_id {
            select = select.filter(Column::FeeTypeId.eq(fee_type_id));
        }
        if let Some(ref year) = query.academic_year {
            select = select.filter(Column::AcademicYear.eq(year.as_str()));
        }
        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.to_string()));
        }
        select = select
            .order_by_asc(Column::StudentId)
            .order_by_asc(Column::FeeTypeId)
            .order_by_asc(Column::Id);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询收费记录总数失败: {e}")))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询收费记录页数失败: {e}")))?;
        let rows = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询收费记录列表失败: {e}")))?;

        Ok(FeeRecordListResponse {
            items: record_details(&self.db, rows, ctx).await?,
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    /// 为学年内在读学生批量生成收费记录
    pub async fn generate_fee_records_impl(
        &self,
        req: GenerateFeeRecordsRequest,
        ctx: FeeContext,
    ) -> Result<GenerateFeeRecordsResponse> {
        let first_due = ctx.first_due_date(&req.academic_year).ok_or_else(|| {
            SchoolError::validation(format!("学年格式错误: {}", req.academic_year))
        })?;

        let mut select = students::Entity::find()
            .filter(students::Column::DeletedAt.is_null())
            .filter(students::Column::Status.eq(StudentStatus::Active.to_string()))
            .filter(students::Column::AcademicYear.eq(req.academic_year.as_str()))
            .filter(students::Column::ClassId.is_not_null());
        if let Some(class_id) = req.class_id {
            select = select.filter(students::Column::ClassId.eq(class_id));
        }
        if let Some(student_id) = req.student_id {
            select = select.filter(students::Column::Id.eq(student_id));
        }
        let targets: Vec<(i64, i64)> = select
            .order_by_asc(students::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询在读学生失败: {e}")))?
            .into_iter()
            .filter_map(|s| Some((s.id, s.class_id?)))
            .collect();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| SchoolError::database_operation(format!("开启事务失败: {e}")))?;
        let outcome =
            generate_for_students(&txn, &targets, &req.academic_year, first_due, ctx).await?;
        txn.commit()
            .await
            .map_err(|e| SchoolError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(outcome)
    }

    pub async fn get_fee_record_detail_impl(
        &self,
        id: i64,
        ctx: FeeContext,
    ) -> Result<Option<FeeRecordWithPayments>> {
        let Some(row) = FeeRecords::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询收费记录失败: {e}")))?
        else {
            return Ok(None);
        };

        let payments = fee_payments::Entity::find()
            .filter(fee_payments::Column::RecordId.eq(id))
            .order_by_asc(fee_payments::Column::PaidAt)
            .order_by_asc(fee_payments::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询缴费记录失败: {e}")))?;

        let record = record_details(&self.db, vec![row], ctx)
            .await?
            .pop()
            .ok_or_else(|| SchoolError::fee_record_not_found(format!("收费记录不存在: {id}")))?;

        Ok(Some(FeeRecordWithPayments {
            record,
            payments: payments.into_iter().map(|p| p.into_payment()).collect(),
        }))
    }

    /// 修改备注或免收标记
    pub async fn update_fee_record_impl(
        &self,
        id: i64,
        update: UpdateFeeRecordRequest,
        ctx: FeeContext,
    ) -> Result<Option<FeeRecordDetail>> {
        let Some(row) = FeeRecords::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询收费记录失败: {e}")))?
        else {
            return Ok(None);
        };

        let mut record = row.clone().into_record();
        let mut model: ActiveModel = row.into();
        if let Some(remarks) = update.remarks {
            model.remarks = Set(Some(remarks));
        }
        match update.waived {
            Some(true) => model.status = Set(FeeStatus::Waived.to_string()),
            Some(false) if record.status == FeeStatus::Waived => {
                record.status = FeeStatus::Pending;
                let status = record.derive_status(ctx.as_of, ctx.grace_days());
                model.status = Set(status.to_string());
            }
            _ => {}
        }
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let saved = model
            .update(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("更新收费记录失败: {e}")))?;

        Ok(record_details(&self.db, vec![saved], ctx).await?.pop())
    }

    pub async fn list_student_fee_records_impl(
        &self,
        student_id: i64,
        academic_year: Option<String>,
        ctx: FeeContext,
    ) -> Result<Vec<FeeRecordDetail>> {
        let mut select = FeeRecords::find().filter(Column::StudentId.eq(student_id));
        if let Some(ref year) = academic_year {
            select = select.filter(Column::AcademicYear.eq(year.as_str()));
        }

        let rows = select
            .order_by_desc(Column::AcademicYear)
            .order_by_asc(Column::FeeTypeId)
            .all(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询学生收费记录失败: {e}")))?;

        record_details(&self.db, rows, ctx).await
    }

    pub async fn list_fee_records_for_export_impl(
        &self,
        academic_year: Option<String>,
        class_id: Option<i64>,
        ctx: FeeContext,
    ) -> Result<Vec<FeeRecordDetail>> {
        let mut select = FeeRecords::find();
        if let Some(ref year) = academic_year {
            select = select.filter(Column::AcademicYear.eq(year.as_str()));
        }
        if let Some(class_id) = class_id {
            select = select.filter(Column::ClassId.eq(class_id));
        }

        let rows = select
            .order_by_asc(Column::ClassId)
            .order_by_asc(Column::StudentId)
            .order_by_asc(Column::FeeTypeId)
            .all(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询收费记录失败: {e}")))?;

        record_details(&self.db, rows, ctx).await
    }

    /// 重新推导未结清记录的状态
    pub async fn refresh_fee_statuses_impl(&self, ctx: FeeContext) -> Result<u64> {
        let rows = FeeRecords::find()
            .filter(Column::Status.is_in([
                FeeStatus::Pending.to_string(),
                FeeStatus::Partial.to_string(),
                FeeStatus::Overdue.to_string(),
            ]))
            .all(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询收费记录失败: {e}")))?;

        let mut changed = 0;
        for row in rows {
            let record = row.clone().into_record();
            let status = record.derive_status(ctx.as_of, ctx.grace_days());
            if status == record.status {
                continue;
            }
            let mut model: ActiveModel = row.into();
            model.status = Set(status.to_string());
            model.updated_at = Set(chrono::Utc::now().timestamp());
            model
                .update(&self.db)
                .await
                .map_err(|e| SchoolError::database_operation(format!("更新收费状态失败: {e}")))?;
            changed += 1;
        }

        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fees::{
        calculator::FeeCalendar,
        requests::{UpsertFeeCustomRequest, UpsertFeeStructureRequest},
    };
    use crate::storage::sea_orm_storage::test_storage;
    use crate::storage::sea_orm_storage::tests_support::{seed_class, seed_fee_type, seed_student};

    fn ctx(as_of: NaiveDate) -> FeeContext {
        FeeContext {
            calendar: FeeCalendar {
                start_month: 4,
                due_day: 10,
                grace_days: 5,
            },
            as_of,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn generate_all() -> GenerateFeeRecordsRequest {
        GenerateFeeRecordsRequest {
            academic_year: "2025-2026".to_string(),
            class_id: None,
            student_id: None,
        }
    }

    async fn setup(storage: &SeaOrmStorage) -> (i64, i64, i64) {
        let class = seed_class(storage, "Grade 5", 5).await;
        let tuition = seed_fee_type(storage, "Tuition", FeeFrequency::Monthly).await;
        let exam = seed_fee_type(storage, "Exam", FeeFrequency::Yearly).await;
        for (fee_type_id, amount) in [(tuition.id, 1000.0), (exam.id, 500.0)] {
            storage
                .upsert_fee_structure_impl(UpsertFeeStructureRequest {
                    class_id: class.id,
                    fee_type_id,
                    academic_year: "2025-2026".to_string(),
                    amount,
                })
                .await
                .unwrap();
        }
        (class.id, tuition.id, exam.id)
    }

    #[tokio::test]
    async fn test_generate_is_idempotent() {
        let storage = test_storage().await;
        let (class_id, tuition_id, exam_id) = setup(&storage).await;
        let a = seed_student(&storage, "G-1", Some(class_id), "2025-2026").await;
        let b = seed_student(&storage, "G-2", Some(class_id), "2025-2026").await;
        seed_student(&storage, "G-3", Some(class_id), "2024-2025").await;

        storage
            .upsert_fee_custom_impl(UpsertFeeCustomRequest {
                student_id: b.id,
                fee_type_id: exam_id,
                academic_year: "2025-2026".to_string(),
                custom_amount: None,
                is_applicable: false,
                remarks: None,
            })
            .await
            .unwrap();
        storage
            .upsert_fee_custom_impl(UpsertFeeCustomRequest {
                student_id: b.id,
                fee_type_id: tuition_id,
                academic_year: "2025-2026".to_string(),
                custom_amount: Some(800.0),
                is_applicable: true,
                remarks: None,
            })
            .await
            .unwrap();

        let ctx = ctx(date(2025, 3, 1));
        let first = storage
            .generate_fee_records_impl(generate_all(), ctx)
            .await
            .unwrap();
        assert_eq!(first.created, 3);
        assert_eq!(first.not_applicable, 1);
        assert_eq!(first.skipped, 0);

        let second = storage
            .generate_fee_records_impl(generate_all(), ctx)
            .await
            .unwrap();
        assert_eq!(second.created, 0);
        assert_eq!(second.skipped, 3);

        let records = storage
            .list_student_fee_records_impl(b.id, None, ctx)
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].record.total_amount, 9600.0);
        assert_eq!(records[0].record.first_due_date, date(2025, 4, 10));
        assert_eq!(records[0].record.status, FeeStatus::Pending);

        let records = storage
            .list_student_fee_records_impl(a.id, Some("2025-2026".to_string()), ctx)
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn test_generate_rejects_bad_year() {
        let storage = test_storage().await;
        let err = storage
            .generate_fee_records_impl(
                GenerateFeeRecordsRequest {
                    academic_year: "2025".to_string(),
                    class_id: None,
                    student_id: None,
                },
                ctx(date(2025, 3, 1)),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E007");
    }

    #[tokio::test]
    async fn test_refresh_and_waive() {
        let storage = test_storage().await;
        let (class_id, _, _) = setup(&storage).await;
        seed_student(&storage, "R-1", Some(class_id), "2025-2026").await;

        storage
            .generate_fee_records_impl(generate_all(), ctx(date(2025, 3, 1)))
            .await
            .unwrap();

        // 4 月 10 日到期，宽限 5 天后逾期
        assert_eq!(
            storage
                .refresh_fee_statuses_impl(ctx(date(2025, 4, 15)))
                .await
                .unwrap(),
            0
        );
        let late = ctx(date(2025, 4, 16));
        assert_eq!(storage.refresh_fee_statuses_impl(late).await.unwrap(), 2);

        let overdue = storage
            .list_fee_records_impl(
                FeeRecordListQuery {
                    status: Some(FeeStatus::Overdue),
                    ..Default::default()
                },
                late,
            )
            .await
            .unwrap();
        assert_eq!(overdue.pagination.total, 2);
        let record_id = overdue.items[0].record.id;

        let waived = storage
            .update_fee_record_impl(
                record_id,
                UpdateFeeRecordRequest {
                    remarks: Some("scholarship".to_string()),
                    waived: Some(true),
                },
                late,
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(waived.record.status, FeeStatus::Waived);
        assert_eq!(waived.overdue, 0.0);
        assert!(waived.next_due_date.is_none());

        // 免收状态不会被定时刷新覆盖
        assert_eq!(storage.refresh_fee_statuses_impl(late).await.unwrap(), 0);

        let restored = storage
            .update_fee_record_impl(
                record_id,
                UpdateFeeRecordRequest {
                    remarks: None,
                    waived: Some(false),
                },
                late,
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(restored.record.status, FeeStatus::Overdue);

        let detail = storage
            .get_fee_record_detail_impl(record_id, late)
            .await
            .unwrap()
            .unwrap();
        assert!(detail.payments.is_empty());
        assert_eq!(detail.record.record.remarks.as_deref(), Some("scholarship"));
    }
}
