use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

crate::define_string_enum! {
    // 学生状态
    #[derive(TS)]
    #[ts(export, export_to = "../frontend/src/types/generated/student.ts", rename_all = "snake_case")]
    pub enum StudentStatus {
        Active => "active",           // 在读
        Inactive => "inactive",       // 停用（含软删除）
        Graduated => "graduated",     // 已毕业
        Transferred => "transferred", // 已转学
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct Student {
    pub id: i64,
    // 学籍号，全局唯一
    pub admission_number: String,
    pub first_name: String,
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
    // 所属学年，格式 YYYY-YYYY
    pub academic_year: String,
    pub status: StudentStatus,
    pub deleted_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// 是否参与收费和升级
    pub fn is_enrolled(&self) -> bool {
        self.status == StudentStatus::Active && self.deleted_at.is_none()
    }
}

/// 带班级名称的学生信息
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct StudentDetail {
    #[serde(flatten)]
    #[ts(flatten)]
    pub student: Student,
    pub class_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student() -> Student {
        Student {
            id: 1,
            admission_number: "ADM-001".to_string(),
            first_name: "Asha".to_string(),
            last_name: "Verma".to_string(),
            gender: None,
            date_of_birth: NaiveDate::from_ymd_opt(2014, 6, 1),
            class_id: Some(3),
            roll_number: None,
            guardian_name: None,
            guardian_phone: None,
            guardian_email: None,
            address: None,
            photo_url: None,
            admission_date: None,
            academic_year: "2025-2026".to_string(),
            status: StudentStatus::Active,
            deleted_at: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_full_name() {
        let mut s = student();
        assert_eq!(s.full_name(), "Asha Verma");
        s.last_name = String::new();
        assert_eq!(s.full_name(), "Asha");
    }

    #[test]
    fn test_enrolled() {
        let mut s = student();
        assert!(s.is_enrolled());
        s.status = StudentStatus::Graduated;
        assert!(!s.is_enrolled());
        s.status = StudentStatus::Active;
        s.deleted_at = Some(chrono::Utc::now());
        assert!(!s.is_enrolled());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(
            "transferred".parse::<StudentStatus>().unwrap(),
            StudentStatus::Transferred
        );
        assert!("expelled".parse::<StudentStatus>().is_err());
    }
}
