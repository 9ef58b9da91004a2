use chrono::NaiveDate;
use serde::Deserialize;
use ts_rs::TS;

use super::entities::StudentStatus;
use crate::models::common::PaginationQuery;

// 学生列表查询参数（来自HTTP请求）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct StudentListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    // 按姓名、学籍号或监护人电话搜索
    pub search: Option<String>,
    pub class_id: Option<i64>,
    pub status: Option<StudentStatus>,
    pub academic_year: Option<String>,
}

// 学生列表查询参数（用于存储层）
#[derive(Debug, Clone, Default)]
pub struct StudentListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub search: Option<String>,
    pub class_id: Option<i64>,
    pub status: Option<StudentStatus>,
    pub academic_year: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct CreateStudentRequest {
    pub admission_number: String,
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub class_id: Option<i64>,
    pub roll_number: Option<String>,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub guardian_email: Option<String>,
    pub address: Option<String>,
    pub photo_url: Option<String>,
    pub admission_date: Option<NaiveDate>,
    // 为空时使用当前学年
    pub academic_year: Option<String>,
}

#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct UpdateStudentRequest {
    pub admission_number: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub class_id: Option<i64>,
    pub roll_number: Option<String>,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub guardian_email: Option<String>,
    pub address: Option<String>,
    pub photo_url: Option<String>,
    pub admission_date: Option<NaiveDate>,
    pub academic_year: Option<String>,
    pub status: Option<StudentStatus>,
}

// 学生收费查询参数
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct StudentFeesParams {
    pub academic_year: Option<String>,
}

/// 按范围筛选在读学生（收费生成、升级使用）
#[derive(Debug, Clone, Default)]
pub struct EnrolledStudentFilter {
    pub academic_year: Option<String>,
    pub class_id: Option<i64>,
    pub student_id: Option<i64>,
}
