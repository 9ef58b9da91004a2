//! 学生存储操作

use super::{SeaOrmStorage, lookups, write_error};
use crate::entity::students::{ActiveModel, Column, Entity as Students};
use crate::entity::format_date;
use crate::errors::{Result, SchoolError};
use crate::models::{
    PaginationInfo,
    common::pagination::page_bounds,
    dashboard::responses::StudentCounts,
    students::{
        entities::{Student, StudentDetail, StudentStatus},
        requests::{
            CreateStudentRequest, EnrolledStudentFilter, StudentListQuery, UpdateStudentRequest,
        },
        responses::StudentListResponse,
    },
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

impl SeaOrmStorage {
    /// 创建学生
    pub async fn create_student_impl(&self, req: CreateStudentRequest) -> Result<Student> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            admission_number: Set(req.admission_number.trim().to_string()),
            first_name: Set(req.first_name.trim().to_string()),
            last_name: Set(req.last_name.trim().to_string()),
            gender: Set(req.gender),
            date_of_birth: Set(format_date(req.date_of_birth)),
            class_id: Set(req.class_id),
            roll_number: Set(req.roll_number),
            guardian_name: Set(req.guardian_name),
            guardian_phone: Set(req.guardian_phone),
            guardian_email: Set(req.guardian_email),
            address: Set(req.address),
            photo_url: Set(req.photo_url),
            admission_date: Set(format_date(req.admission_date)),
            academic_year: Set(req.academic_year.unwrap_or_default()),
            status: Set(StudentStatus::Active.to_string()),
            deleted_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(write_error("创建学生失败", "学籍号已存在"))?;

        Ok(result.into_student())
    }

    /// 通过 ID 获取学生，已删除的学生返回 None
    pub async fn get_student_by_id_impl(&self, id: i64) -> Result<Option<Student>> {
        let result = Students::find_by_id(id)
            .filter(Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询学生失败: {e}")))?;

        Ok(result.map(|m| m.into_student()))
    }

    /// 学生详情（含班级名称）
    pub async fn get_student_detail_impl(&self, id: i64) -> Result<Option<StudentDetail>> {
        let Some(student) = self.get_student_by_id_impl(id).await? else {
            return Ok(None);
        };
        let classes = lookups::class_names(&self.db, student.class_id).await?;

        Ok(Some(StudentDetail {
            class_name: student.class_id.and_then(|id| classes.get(&id).cloned()),
            student,
        }))
    }

    /// 分页列出学生
    pub async fn list_students_with_pagination_impl(
        &self,
        query: StudentListQuery,
    ) -> Result<StudentListResponse> {
        let (page, size) = page_bounds(query.page, query.size, 10);

        let mut select = Students::find().filter(Column::DeletedAt.is_null());

        // 按姓名、学籍号、监护人电话搜索
        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(
                Condition::any()
                    .add(Column::FirstName.contains(&escaped))
                    .add(Column::LastName.contains(&escaped))
                    .add(Column::AdmissionNumber.contains(&escaped))
                    .add(Column::GuardianPhone.contains(&escaped)),
            );
        }

        if let Some(class_id) = query.class_id {
            select = select.filter(Column::ClassId.eq(class_id));
        }
        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.to_string()));
        }
        if let Some(ref year) = query.academic_year {
            select = select.filter(Column::AcademicYear.eq(year.as_str()));
        }

        select = select
            .order_by_asc(Column::ClassId)
            .order_by_asc(Column::FirstName)
            .order_by_asc(Column::Id);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询学生总数失败: {e}")))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询学生页数失败: {e}")))?;
        let students: Vec<Student> = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询学生列表失败: {e}")))?
            .into_iter()
            .map(|m| m.into_student())
            .collect();

        let classes =
            lookups::class_names(&self.db, students.iter().filter_map(|s| s.class_id)).await?;

        Ok(StudentListResponse {
            items: students
                .into_iter()
                .map(|student| StudentDetail {
                    class_name: student.class_id.and_then(|id| classes.get(&id).cloned()),
                    student,
                })
                .collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    /// 更新学生信息
    pub async fn update_student_impl(
        &self,
        id: i64,
        update: UpdateStudentRequest,
    ) -> Result<Option<Student>> {
        if self.get_student_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(admission_number) = update.admission_number {
            model.admission_number = Set(admission_number.trim().to_string());
        }
        if let Some(first_name) = update.first_name {
            model.first_name = Set(first_name.trim().to_string());
        }
        if let Some(last_name) = update.last_name {
            model.last_name = Set(last_name.trim().to_string());
        }
        if let Some(gender) = update.gender {
            model.gender = Set(Some(gender));
        }
        if update.date_of_birth.is_some() {
            model.date_of_birth = Set(format_date(update.date_of_birth));
        }
        if let Some(class_id) = update.class_id {
            model.class_id = Set(Some(class_id));
        }
        if let Some(roll_number) = update.roll_number {
            model.roll_number = Set(Some(roll_number));
        }
        if let Some(guardian_name) = update.guardian_name {
            model.guardian_name = Set(Some(guardian_name));
        }
        if let Some(guardian_phone) = update.guardian_phone {
            model.guardian_phone = Set(Some(guardian_phone));
        }
        if let Some(guardian_email) = update.guardian_email {
            model.guardian_email = Set(Some(guardian_email));
        }
        if let Some(address) = update.address {
            model.address = Set(Some(address));
        }
        if let Some(photo_url) = update.photo_url {
            model.photo_url = Set(Some(photo_url));
        }
        if update.admission_date.is_some() {
            model.admission_date = Set(format_date(update.admission_date));
        }
        if let Some(academic_year) = update.academic_year {
            model.academic_year = Set(academic_year);
        }
        if let Some(status) = update.status {
            model.status = Set(status.to_string());
        }

        model
            .update(&self.db)
            .await
            .map_err(write_error("更新学生失败", "学籍号已存在"))?;

        self.get_student_by_id_impl(id).await
    }

    /// 软删除学生：记录删除时间并置为非在读
    pub async fn delete_student_impl(&self, id: i64) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();

        let result = Students::update_many()
            .col_expr(Column::DeletedAt, sea_orm::sea_query::Expr::value(now))
            .col_expr(
                Column::Status,
                sea_orm::sea_query::Expr::value(StudentStatus::Inactive.to_string()),
            )
            .col_expr(Column::UpdatedAt, sea_orm::sea_query::Expr::value(now))
            .filter(Column::Id.eq(id))
            .filter(Column::DeletedAt.is_null())
            .exec(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("删除学生失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 在读学生
    pub async fn list_enrolled_students_impl(
        &self,
        filter: EnrolledStudentFilter,
    ) -> Result<Vec<Student>> {
        let mut select = Students::find()
            .filter(Column::DeletedAt.is_null())
            .filter(Column::Status.eq(StudentStatus::Active.to_string()));

        if let Some(ref year) = filter.academic_year {
            select = select.filter(Column::AcademicYear.eq(year.as_str()));
        }
        if let Some(class_id) = filter.class_id {
            select = select.filter(Column::ClassId.eq(class_id));
        }
        if let Some(student_id) = filter.student_id {
            select = select.filter(Column::Id.eq(student_id));
        }

        let students = select
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询在读学生失败: {e}")))?;

        Ok(students.into_iter().map(|m| m.into_student()).collect())
    }

    /// 各状态人数（不含已删除）
    pub async fn count_students_by_status_impl(&self) -> Result<StudentCounts> {
        let rows: Vec<(String, i64)> = Students::find()
            .select_only()
            .column(Column::Status)
            .column_as(Column::Id.count(), "student_count")
            .filter(Column::DeletedAt.is_null())
            .group_by(Column::Status)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("统计学生人数失败: {e}")))?;

        let mut counts = StudentCounts::default();
        for (status, count) in rows {
            counts.total += count;
            match status.parse::<StudentStatus>() {
                Ok(StudentStatus::Active) => counts.active += count,
                Ok(StudentStatus::Inactive) => counts.inactive += count,
                Ok(StudentStatus::Graduated) => counts.graduated += count,
                Ok(StudentStatus::Transferred) => counts.transferred += count,
                Err(_) => {}
            }
        }
        Ok(counts)
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
    async fn test_list_hides_deleted_and_searches() {
        let storage = test_storage().await;
        let class = seed_class(&storage, "Grade 4", 4).await;
        let a = seed_student(&storage, "ADM-100", Some(class.id), "2025-2026").await;
        let b = seed_student(&storage, "ADM-200", Some(class.id), "2025-2026").await;

        storage.delete_student_impl(b.id).await.unwrap();
        assert!(storage.get_student_by_id_impl(b.id).await.unwrap().is_none());
        // 重复删除无效果
        assert!(!storage.delete_student_impl(b.id).await.unwrap());

        let list = storage
            .list_students_with_pagination_impl(StudentListQuery::default())
            .await
            .unwrap();
        assert_eq!(list.pagination.total, 1);
        assert_eq!(list.items[0].student.id, a.id);
        assert_eq!(list.items[0].class_name.as_deref(), Some("Grade 4"));

        let searched = storage
            .list_students_with_pagination_impl(StudentListQuery {
                search: Some("ADM-1".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(searched.pagination.total, 1);

        let counts = storage.count_students_by_status_impl().await.unwrap();
        assert_eq!(counts.total, 1);
        assert_eq!(counts.active, 1);
    }

    #[tokio::test]
    async fn test_duplicate_admission_number() {
        let storage = test_storage().await;
        seed_student(&storage, "DUP-1", None, "2025-2026").await;
        let err = storage
            .create_student_impl(CreateStudentRequest {
                admission_number: "DUP-1".to_string(),
                first_name: "Other".to_string(),
                last_name: String::new(),
                gender: None,
                date_of_birth: None,
                class_id: None,
                roll_number: None,
                guardian_name: None,
                guardian_phone: None,
                guardian_email: None,
                address: None,
                photo_url: None,
                admission_date: None,
                academic_year: Some("2025-2026".to_string()),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E014");
    }

    #[tokio::test]
    async fn test_enrolled_filter() {
        let storage = test_storage().await;
        let class = seed_class(&storage, "Grade 6", 6).await;
        let a = seed_student(&storage, "E-1", Some(class.id), "2025-2026").await;
        seed_student(&storage, "E-2", Some(class.id), "2024-2025").await;
        let c = seed_student(&storage, "E-3", Some(class.id), "2025-2026").await;
        storage
            .update_student_impl(
                c.id,
                UpdateStudentRequest {
                    status: Some(StudentStatus::Transferred),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let enrolled = storage
            .list_enrolled_students_impl(EnrolledStudentFilter {
                academic_year: Some("2025-2026".to_string()),
                class_id: Some(class.id),
                student_id: None,
            })
            .await
            .unwrap();
        assert_eq!(enrolled.len(), 1);
        assert_eq!(enrolled[0].id, a.id);
    }
}
