//! 班级存储操作

use std::collections::HashMap;

use super::{SeaOrmStorage, lookups, write_error};
use crate::entity::classes::{ActiveModel, Column, Entity as Classes};
use crate::entity::students;
use crate::errors::{Result, SchoolError};
use crate::models::{
    PaginationInfo,
    common::pagination::page_bounds,
    classes::{
        entities::{Class, ClassWithStats},
        requests::{ClassListQuery, CreateClassRequest, UpdateClassRequest},
        responses::ClassListResponse,
    },
    students::entities::StudentStatus,
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

/// 各班级在读学生人数
pub(crate) async fn active_student_counts<C: ConnectionTrait>(
    conn: &C,
    class_ids: &[i64],
) -> Result<HashMap<i64, i64>> {
    if class_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<(Option<i64>, i64)> = students::Entity::find()
        .select_only()
        .column(students::Column::ClassId)
        .column_as(students::Column::Id.count(), "student_count")
        .filter(students::Column::ClassId.is_in(class_ids.to_vec()))
        .filter(students::Column::Status.eq(StudentStatus::Active.to_string()))
        .filter(students::Column::DeletedAt.is_null())
        .group_by(students::Column::ClassId)
        .into_tuple()
        .all(conn)
        .await
        .map_err(|e| SchoolError::database_operation(format!("统计班级人数失败: {e}")))?;

    Ok(rows
        .into_iter()
        .filter_map(|(class_id, count)| class_id.map(|id| (id, count)))
        .collect())
}

impl SeaOrmStorage {
    /// 创建班级
    pub async fn create_class_impl(&self, req: CreateClassRequest) -> Result<Class> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            name: Set(req.name.trim().to_string()),
            section: Set(req.section),
            class_teacher_id: Set(req.class_teacher_id),
            capacity: Set(req.capacity),
            sort_order: Set(req.sort_order.unwrap_or(0)),
            description: Set(req.description),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(write_error("创建班级失败", "班级名称已存在"))?;

        Ok(result.into_class())
    }

    /// 通过 ID 获取班级
    pub async fn get_class_by_id_impl(&self, class_id: i64) -> Result<Option<Class>> {
        let result = Classes::find_by_id(class_id)
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询班级失败: {e}")))?;

        Ok(result.map(|m| m.into_class()))
    }

    /// 通过名称获取班级
    pub async fn get_class_by_name_impl(&self, name: &str) -> Result<Option<Class>> {
        let result = Classes::find()
            .filter(Column::Name.eq(name.trim()))
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询班级失败: {e}")))?;

        Ok(result.map(|m| m.into_class()))
    }

    /// 分页列出班级
    pub async fn list_classes_with_pagination_impl(
        &self,
        query: ClassListQuery,
    ) -> Result<ClassListResponse> {
        let (page, size) = page_bounds(query.page, query.size, 10);

        let mut select = Classes::find();

        // 搜索条件
        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(Column::Name.contains(&escaped));
        }

        select = select.order_by_asc(Column::SortOrder).order_by_asc(Column::Name);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询班级总数失败: {e}")))?;

        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询班级页数失败: {e}")))?;

        let classes: Vec<Class> = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询班级列表失败: {e}")))?
            .into_iter()
            .map(|m| m.into_class())
            .collect();

        let ids: Vec<i64> = classes.iter().map(|c| c.id).collect();
        let counts = active_student_counts(&self.db, &ids).await?;
        let teachers =
            lookups::staff_names(&self.db, classes.iter().filter_map(|c| c.class_teacher_id))
                .await?;

        let items = classes
            .into_iter()
            .map(|class| ClassWithStats {
                student_count: counts.get(&class.id).copied().unwrap_or(0),
                class_teacher_name: class
                    .class_teacher_id
                    .and_then(|id| teachers.get(&id).cloned()),
                class,
            })
            .collect();

        Ok(ClassListResponse {
            items,
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    /// 全部班级，按排序字段
    pub async fn list_all_classes_impl(&self) -> Result<Vec<Class>> {
        let classes = Classes::find()
            .order_by_asc(Column::SortOrder)
            .order_by_asc(Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询班级列表失败: {e}")))?;

        Ok(classes.into_iter().map(|m| m.into_class()).collect())
    }

    /// 更新班级信息
    pub async fn update_class_impl(
        &self,
        class_id: i64,
        update: UpdateClassRequest,
    ) -> Result<Option<Class>> {
        let existing = self.get_class_by_id_impl(class_id).await?;
        if existing.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(class_id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(name) = update.name {
            model.name = Set(name.trim().to_string());
        }
        if let Some(section) = update.section {
            model.section = Set(Some(section));
        }
        if let Some(teacher_id) = update.class_teacher_id {
            model.class_teacher_id = Set(Some(teacher_id));
        }
        if let Some(capacity) = update.capacity {
            model.capacity = Set(Some(capacity));
        }
        if let Some(sort_order) = update.sort_order {
            model.sort_order = Set(sort_order);
        }
        if let Some(description) = update.description {
            model.description = Set(Some(description));
        }

        model
            .update(&self.db)
            .await
            .map_err(write_error("更新班级失败", "班级名称已存在"))?;

        self.get_class_by_id_impl(class_id).await
    }

    /// 删除班级
    pub async fn delete_class_impl(&self, class_id: i64) -> Result<bool> {
        let active = self.count_active_students_impl(class_id).await?;
        if active > 0 {
            return Err(SchoolError::conflict(format!(
                "班级仍有 {active} 名在读学生，无法删除"
            )));
        }

        let result = Classes::delete_by_id(class_id)
            .exec(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("删除班级失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 班级在读学生人数
    pub async fn count_active_students_impl(&self, class_id: i64) -> Result<i64> {
        let counts = active_student_counts(&self.db, &[class_id]).await?;
        Ok(counts.get(&class_id).copied().unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::{
        test_storage,
        tests_support::{seed_class, seed_student},
    };

    #[tokio::test]
    async fn test_class_crud_and_stats() {
        let storage = test_storage().await;
        let grade2 = seed_class(&storage, "Grade 2", 2).await;
        let grade1 = seed_class(&storage, "Grade 1", 1).await;
        seed_student(&storage, "A001", Some(grade1.id), "2025-2026").await;
        seed_student(&storage, "A002", Some(grade1.id), "2025-2026").await;

        let list = storage
            .list_classes_with_pagination_impl(ClassListQuery::default())
            .await
            .unwrap();
        assert_eq!(list.pagination.total, 2);
        assert_eq!(list.items[0].class.id, grade1.id);
        assert_eq!(list.items[0].student_count, 2);
        assert_eq!(list.items[1].student_count, 0);

        let dup = storage
            .create_class_impl(CreateClassRequest {
                name: "Grade 2".to_string(),
                section: None,
                class_teacher_id: None,
                capacity: None,
                sort_order: None,
                description: None,
            })
            .await
            .unwrap_err();
        assert_eq!(dup.code(), "E014");

        let found = storage.get_class_by_name_impl(" Grade 2 ").await.unwrap();
        assert_eq!(found.map(|c| c.id), Some(grade2.id));
    }

    #[tokio::test]
    async fn test_delete_class_with_students_rejected() {
        let storage = test_storage().await;
        let class = seed_class(&storage, "Grade 3", 3).await;
        let student = seed_student(&storage, "B001", Some(class.id), "2025-2026").await;

        let err = storage.delete_class_impl(class.id).await.unwrap_err();
        assert_eq!(err.code(), "E014");

        storage.delete_student_impl(student.id).await.unwrap();
        assert!(storage.delete_class_impl(class.id).await.unwrap());
    }
}
