//! 收费项目存储操作

use super::{SeaOrmStorage, write_error};
use crate::entity::fee_types::{ActiveModel, Column, Entity as FeeTypes};
use crate::entity::{class_fee_structures, student_fee_records};
use crate::errors::{Result, SchoolError};
use crate::models::fees::{
    entities::FeeType,
    requests::{CreateFeeTypeRequest, UpdateFeeTypeRequest},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    pub async fn create_fee_type_impl(&self, req: CreateFeeTypeRequest) -> Result<FeeType> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            name: Set(req.name.trim().to_string()),
            description: Set(req.description),
            frequency: Set(req.frequency.to_string()),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(write_error("创建收费项目失败", "收费项目名称已存在"))?;

        Ok(result.into_fee_type())
    }

    pub async fn get_fee_type_by_id_impl(&self, id: i64) -> Result<Option<FeeType>> {
        let result = FeeTypes::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询收费项目失败: {e}")))?;

        Ok(result.map(|m| m.into_fee_type()))
    }

    pub async fn list_fee_types_impl(&self, include_inactive: bool) -> Result<Vec<FeeType>> {
        let mut select = FeeTypes::find();
        if !include_inactive {
            select = select.filter(Column::IsActive.eq(true));
        }

        let items = select
            .order_by_asc(Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询收费项目列表失败: {e}")))?;

        Ok(items.into_iter().map(|m| m.into_fee_type()).collect())
    }

    pub async fn update_fee_type_impl(
        &self,
        id: i64,
        update: UpdateFeeTypeRequest,
    ) -> Result<Option<FeeType>> {
        if self.get_fee_type_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };
        if let Some(name) = update.name {
            model.name = Set(name.trim().to_string());
        }
        if let Some(description) = update.description {
            model.description = Set(Some(description));
        }
        if let Some(frequency) = update.frequency {
            model.frequency = Set(frequency.to_string());
        }
        if let Some(is_active) = update.is_active {
            model.is_active = Set(is_active);
        }

        model
            .update(&self.db)
            .await
            .map_err(write_error("更新收费项目失败", "收费项目名称已存在"))?;

        self.get_fee_type_by_id_impl(id).await
    }

    /// 删除收费项目，仍被收费标准或收费记录引用时拒绝
    pub async fn delete_fee_type_impl(&self, id: i64) -> Result<bool> {
        let structures = class_fee_structures::Entity::find()
            .filter(class_fee_structures::Column::FeeTypeId.eq(id))
            .count(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询收费标准失败: {e}")))?;
        let records = student_fee_records::Entity::find()
            .filter(student_fee_records::Column::FeeTypeId.eq(id))
            .count(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询收费记录失败: {e}")))?;

        if structures + records > 0 {
            return Err(SchoolError::conflict(format!(
                "收费项目仍被 {structures} 条收费标准和 {records} 条收费记录引用"
            )));
        }

        let result = FeeTypes::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("删除收费项目失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fees::{entities::FeeFrequency, requests::UpsertFeeStructureRequest};
    use crate::storage::sea_orm_storage::test_storage;
    use crate::storage::sea_orm_storage::tests_support::{seed_class, seed_fee_type};

    #[tokio::test]
    async fn test_fee_type_crud() {
        let storage = test_storage().await;
        let tuition = seed_fee_type(&storage, "Tuition", FeeFrequency::Monthly).await;

        let dup = storage
            .create_fee_type_impl(CreateFeeTypeRequest {
                name: " Tuition ".to_string(),
                description: None,
                frequency: FeeFrequency::Yearly,
            })
            .await
            .unwrap_err();
        assert_eq!(dup.code(), "E014");

        let updated = storage
            .update_fee_type_impl(
                tuition.id,
                UpdateFeeTypeRequest {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert!(!updated.is_active);
        assert!(storage.list_fee_types_impl(false).await.unwrap().is_empty());
        assert_eq!(storage.list_fee_types_impl(true).await.unwrap().len(), 1);

        assert!(storage.delete_fee_type_impl(tuition.id).await.unwrap());
        assert!(!storage.delete_fee_type_impl(tuition.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_fee_type_in_use() {
        let storage = test_storage().await;
        let class = seed_class(&storage, "Grade 1", 1).await;
        let transport = seed_fee_type(&storage, "Transport", FeeFrequency::Quarterly).await;

        storage
            .upsert_fee_structure_impl(UpsertFeeStructureRequest {
                class_id: class.id,
                fee_type_id: transport.id,
                academic_year: "2025-2026".to_string(),
                amount: 900.0,
            })
            .await
            .unwrap();

        let err = storage.delete_fee_type_impl(transport.id).await.unwrap_err();
        assert_eq!(err.code(), "E014");
    }
}
