//! 批量查询名称，用于组装列表详情

use std::collections::HashMap;

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect};

use crate::entity::prelude::{Classes, FeeTypes, Staff, Students, Users};
use crate::entity::{classes, fee_types, staff, students, users};
use crate::errors::{Result, SchoolError};
use crate::models::students::entities::Student;

fn unique(ids: impl IntoIterator<Item = i64>) -> Vec<i64> {
    let mut ids: Vec<i64> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// 班级 ID -> 班级展示名
pub(crate) async fn class_names<C: ConnectionTrait>(
    conn: &C,
    ids: impl IntoIterator<Item = i64>,
) -> Result<HashMap<i64, String>> {
    let ids = unique(ids);
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = Classes::find()
        .filter(classes::Column::Id.is_in(ids))
        .all(conn)
        .await
        .map_err(|e| SchoolError::database_operation(format!("查询班级失败: {e}")))?;

    Ok(rows
        .into_iter()
        .map(|m| {
            let class = m.into_class();
            (class.id, class.display_name())
        })
        .collect())
}

/// 收费项目 ID -> 名称
pub(crate) async fn fee_type_names<C: ConnectionTrait>(
    conn: &C,
    ids: impl IntoIterator<Item = i64>,
) -> Result<HashMap<i64, String>> {
    let ids = unique(ids);
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<(i64, String)> = FeeTypes::find()
        .select_only()
        .column(fee_types::Column::Id)
        .column(fee_types::Column::Name)
        .filter(fee_types::Column::Id.is_in(ids))
        .into_tuple()
        .all(conn)
        .await
        .map_err(|e| SchoolError::database_operation(format!("查询收费项目失败: {e}")))?;

    Ok(rows.into_iter().collect())
}

/// 学生 ID -> 学生（含已删除的学生，历史记录仍需显示姓名）
pub(crate) async fn students_by_id<C: ConnectionTrait>(
    conn: &C,
    ids: impl IntoIterator<Item = i64>,
) -> Result<HashMap<i64, Student>> {
    let ids = unique(ids);
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = Students::find()
        .filter(students::Column::Id.is_in(ids))
        .all(conn)
        .await
        .map_err(|e| SchoolError::database_operation(format!("查询学生失败: {e}")))?;

    Ok(rows
        .into_iter()
        .map(|m| {
            let student = m.into_student();
            (student.id, student)
        })
        .collect())
}

/// 教职工 ID -> 姓名
pub(crate) async fn staff_names<C: ConnectionTrait>(
    conn: &C,
    ids: impl IntoIterator<Item = i64>,
) -> Result<HashMap<i64, String>> {
    let ids = unique(ids);
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<(i64, String)> = Staff::find()
        .select_only()
        .column(staff::Column::Id)
        .column(staff::Column::FullName)
        .filter(staff::Column::Id.is_in(ids))
        .into_tuple()
        .all(conn)
        .await
        .map_err(|e| SchoolError::database_operation(format!("查询教职工失败: {e}")))?;

    Ok(rows.into_iter().collect())
}

/// 用户 ID -> 显示名（无显示名时用用户名）
pub(crate) async fn user_names<C: ConnectionTrait>(
    conn: &C,
    ids: impl IntoIterator<Item = i64>,
) -> Result<HashMap<i64, String>> {
    let ids = unique(ids);
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = Users::find()
        .filter(users::Column::Id.is_in(ids))
        .all(conn)
        .await
        .map_err(|e| SchoolError::database_operation(format!("查询用户失败: {e}")))?;

    Ok(rows
        .into_iter()
        .map(|m| (m.id, m.display_name.unwrap_or(m.username)))
        .collect())
}
