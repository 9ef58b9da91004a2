//! 班级收费标准与学生个别收费存储操作

use super::{SeaOrmStorage, lookups};
use crate::entity::class_fee_structures::{self, Entity as ClassFeeStructures};
use crate::entity::student_fee_customs::{self, Entity as StudentFeeCustoms};
use crate::entity::{classes, fee_types, students};
use crate::errors::{Result, SchoolError};
use crate::models::fees::{
    calculator::{AcademicYear, yearly_amount},
    entities::{ClassFeeStructureDetail, FeeFrequency, StudentFeeCustom},
    requests::{
        FeeCustomListParams, FeeStructureListParams, UpsertFeeCustomRequest,
        UpsertFeeStructureRequest,
    },
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

fn check_academic_year(academic_year: &str) -> Result<()> {
    academic_year
        .parse::<AcademicYear>()
        .map(|_| ())
        .map_err(SchoolError::validation)
}

fn check_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(SchoolError::validation("金额不能为负数"));
    }
    Ok(())
}

impl SeaOrmStorage {
    async fn require_fee_type(&self, id: i64) -> Result<fee_types::Model> {
        fee_types::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询收费项目失败: {e}")))?
            .ok_or_else(|| SchoolError::not_found(format!("收费项目不存在: {id}")))
    }

    pub async fn list_fee_structures_impl(
        &self,
        params: FeeStructureListParams,
    ) -> Result<Vec<ClassFeeStructureDetail>> {
        let mut select = ClassFeeStructures::find();
        if let Some(class_id) = params.class_id {
            select = select.filter(class_fee_structures::Column::ClassId.eq(class_id));
        }
        if let Some(ref year) = params.academic_year {
            select = select.filter(class_fee_structures::Column::AcademicYear.eq(year.as_str()));
        }

        let rows = select
            .order_by_asc(class_fee_structures::Column::AcademicYear)
            .order_by_asc(class_fee_structures::Column::ClassId)
            .order_by_asc(class_fee_structures::Column::FeeTypeId)
            .all(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询收费标准失败: {e}")))?;

        let class_names = lookups::class_names(&self.db, rows.iter().map(|r| r.class_id)).await?;
        let fee_types: std::collections::HashMap<i64, fee_types::Model> = fee_types::Entity::find()
            .filter(fee_types::Column::Id.is_in(rows.iter().map(|r| r.fee_type_id)))
            .all(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询收费项目失败: {e}")))?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();

        Ok(rows
            .into_iter()
            .map(|row| {
                let structure = row.into_structure();
                let fee_type = fee_types.get(&structure.fee_type_id);
                let frequency = fee_type
                    .and_then(|t| t.frequency.parse::<FeeFrequency>().ok())
                    .unwrap_or(FeeFrequency::Yearly);
                ClassFeeStructureDetail {
                    class_name: class_names
                        .get(&structure.class_id)
                        .cloned()
                        .unwrap_or_default(),
                    fee_type_name: fee_type.map(|t| t.name.clone()).unwrap_or_default(),
                    frequency,
                    yearly_amount: yearly_amount(structure.amount, frequency),
                    structure,
                }
            })
            .collect())
    }

    /// 按 (班级, 收费项目, 学年) 新增或更新每期金额
    pub async fn upsert_fee_structure_impl(
        &self,
        req: UpsertFeeStructureRequest,
    ) -> Result<ClassFeeStructureDetail> {
        check_academic_year(&req.academic_year)?;
        check_amount(req.amount)?;
        self.require_fee_type(req.fee_type_id).await?;
        if classes::Entity::find_by_id(req.class_id)
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询班级失败: {e}")))?
            .is_none()
        {
            return Err(SchoolError::not_found(format!("班级不存在: {}", req.class_id)));
        }

        let now = chrono::Utc::now().timestamp();
        let existing = ClassFeeStructures::find()
            .filter(class_fee_structures::Column::ClassId.eq(req.class_id))
            .filter(class_fee_structures::Column::FeeTypeId.eq(req.fee_type_id))
            .filter(class_fee_structures::Column::AcademicYear.eq(req.academic_year.as_str()))
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询收费标准失败: {e}")))?;

        let saved = match existing {
            Some(row) => {
                let mut model: class_fee_structures::ActiveModel = row.into();
                model.amount = Set(req.amount);
                model.updated_at = Set(now);
                model.update(&self.db).await
            }
            None => {
                class_fee_structures::ActiveModel {
                    class_id: Set(req.class_id),
                    fee_type_id: Set(req.fee_type_id),
                    academic_year: Set(req.academic_year.clone()),
                    amount: Set(req.amount),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(&self.db)
                .await
            }
        }
        .map_err(|e| SchoolError::database_operation(format!("保存收费标准失败: {e}")))?;

        let mut details = self
            .list_fee_structures_impl(FeeStructureListParams {
                class_id: Some(saved.class_id),
                academic_year: Some(saved.academic_year.clone()),
            })
            .await?;
        let index = details
            .iter()
            .position(|d| d.structure.id == saved.id)
            .ok_or_else(|| SchoolError::not_found("收费标准不存在"))?;
        Ok(details.swap_remove(index))
    }

    pub async fn delete_fee_structure_impl(&self, id: i64) -> Result<bool> {
        let result = ClassFeeStructures::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("删除收费标准失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn list_fee_customs_impl(
        &self,
        params: FeeCustomListParams,
    ) -> Result<Vec<StudentFeeCustom>> {
        let mut select = StudentFeeCustoms::find();
        if let Some(student_id) = params.student_id {
            select = select.filter(student_fee_customs::Column::StudentId.eq(student_id));
        }
        if let Some(ref year) = params.academic_year {
            select = select.filter(student_fee_customs::Column::AcademicYear.eq(year.as_str()));
        }

        let rows = select
            .order_by_asc(student_fee_customs::Column::StudentId)
            .order_by_asc(student_fee_customs::Column::FeeTypeId)
            .all(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询个别收费失败: {e}")))?;

        Ok(rows.into_iter().map(|m| m.into_custom()).collect())
    }

    /// 按 (学生, 收费项目, 学年) 新增或更新个别收费设置
    pub async fn upsert_fee_custom_impl(
        &self,
        req: UpsertFeeCustomRequest,
    ) -> Result<StudentFeeCustom> {
        check_academic_year(&req.academic_year)?;
        if let Some(amount) = req.custom_amount {
            check_amount(amount)?;
        }
        self.require_fee_type(req.fee_type_id).await?;
        if students::Entity::find_by_id(req.student_id)
            .filter(students::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询学生失败: {e}")))?
            .is_none()
        {
            return Err(SchoolError::not_found(format!(
                "学生不存在: {}",
                req.student_id
            )));
        }

        let now = chrono::Utc::now().timestamp();
        let existing = StudentFeeCustoms::find()
            .filter(student_fee_customs::Column::StudentId.eq(req.student_id))
            .filter(student_fee_customs::Column::FeeTypeId.eq(req.fee_type_id))
            .filter(student_fee_customs::Column::AcademicYear.eq(req.academic_year.as_str()))
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询个别收费失败: {e}")))?;

        let saved = match existing {
            Some(row) => {
                let mut model: student_fee_customs::ActiveModel = row.into();
                model.custom_amount = Set(req.custom_amount);
                model.is_applicable = Set(req.is_applicable);
                model.remarks = Set(req.remarks);
                model.updated_at = Set(now);
                model.update(&self.db).await
            }
            None => {
                student_fee_customs::ActiveModel {
                    student_id: Set(req.student_id),
                    fee_type_id: Set(req.fee_type_id),
                    academic_year: Set(req.academic_year),
                    custom_amount: Set(req.custom_amount),
                    is_applicable: Set(req.is_applicable),
                    remarks: Set(req.remarks),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(&self.db)
                .await
            }
        }
        .map_err(|e| SchoolError::database_operation(format!("保存个别收费失败: {e}")))?;

        Ok(saved.into_custom())
    }

    pub async fn delete_fee_custom_impl(&self, id: i64) -> Result<bool> {
        let result = StudentFeeCustoms::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("删除个别收费失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::test_storage;
    use crate::storage::sea_orm_storage::tests_support::{seed_class, seed_fee_type, seed_student};

    #[tokio::test]
    async fn test_structure_upsert_replaces_amount() {
        let storage = test_storage().await;
        let class = seed_class(&storage, "Grade 2", 2).await;
        let tuition = seed_fee_type(&storage, "Tuition", FeeFrequency::Monthly).await;

        let req = UpsertFeeStructureRequest {
            class_id: class.id,
            fee_type_id: tuition.id,
            academic_year: "2025-2026".to_string(),
            amount: 1000.0,
        };
        let first = storage.upsert_fee_structure_impl(req.clone()).await.unwrap();
        assert_eq!(first.yearly_amount, 12000.0);
        assert_eq!(first.fee_type_name, "Tuition");

        let second = storage
            .upsert_fee_structure_impl(UpsertFeeStructureRequest {
                amount: 1200.0,
                ..req
            })
            .await
            .unwrap();
        assert_eq!(second.structure.id, first.structure.id);
        assert_eq!(second.yearly_amount, 14400.0);

        let listed = storage
            .list_fee_structures_impl(FeeStructureListParams::default())
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn test_structure_validation() {
        let storage = test_storage().await;
        let class = seed_class(&storage, "Grade 3", 3).await;
        let tuition = seed_fee_type(&storage, "Tuition", FeeFrequency::Monthly).await;

        let bad_year = storage
            .upsert_fee_structure_impl(UpsertFeeStructureRequest {
                class_id: class.id,
                fee_type_id: tuition.id,
                academic_year: "2025-2027".to_string(),
                amount: 10.0,
            })
            .await
            .unwrap_err();
        assert_eq!(bad_year.code(), "E007");

        let negative = storage
            .upsert_fee_structure_impl(UpsertFeeStructureRequest {
                class_id: class.id,
                fee_type_id: tuition.id,
                academic_year: "2025-2026".to_string(),
                amount: -1.0,
            })
            .await
            .unwrap_err();
        assert_eq!(negative.code(), "E007");

        let missing = storage
            .upsert_fee_structure_impl(UpsertFeeStructureRequest {
                class_id: 9999,
                fee_type_id: tuition.id,
                academic_year: "2025-2026".to_string(),
                amount: 10.0,
            })
            .await
            .unwrap_err();
        assert_eq!(missing.code(), "E008");
    }

    #[tokio::test]
    async fn test_custom_upsert() {
        let storage = test_storage().await;
        let class = seed_class(&storage, "Grade 4", 4).await;
        let student = seed_student(&storage, "ADM-100", Some(class.id), "2025-2026").await;
        let bus = seed_fee_type(&storage, "Bus", FeeFrequency::Monthly).await;

        let req = UpsertFeeCustomRequest {
            student_id: student.id,
            fee_type_id: bus.id,
            academic_year: "2025-2026".to_string(),
            custom_amount: Some(400.0),
            is_applicable: true,
            remarks: None,
        };
        let first = storage.upsert_fee_custom_impl(req.clone()).await.unwrap();
        let second = storage
            .upsert_fee_custom_impl(UpsertFeeCustomRequest {
                custom_amount: None,
                is_applicable: false,
                remarks: Some("walks to school".to_string()),
                ..req
            })
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
        assert!(!second.is_applicable);

        let listed = storage
            .list_fee_customs_impl(FeeCustomListParams {
                student_id: Some(student.id),
                academic_year: None,
            })
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert!(storage.delete_fee_custom_impl(second.id).await.unwrap());
    }
}
