use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/class.ts")]
pub struct Class {
    // 班级ID
    pub id: i64,
    // 班级名称，全局唯一
    pub name: String,
    // 分班
    pub section: Option<String>,
    // 班主任（教职工ID）
    pub class_teacher_id: Option<i64>,
    // 容量
    pub capacity: Option<i32>,
    // 排序，升级映射和报表按此顺序
    pub sort_order: i32,
    pub description: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Class {
    /// 展示名称，例如 "Grade 5 - A"
    pub fn display_name(&self) -> String {
        match &self.section {
            Some(section) if !section.trim().is_empty() => format!("{} - {}", self.name, section),
            _ => self.name.clone(),
        }
    }
}

/// 带统计信息的班级
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/class.ts")]
pub struct ClassWithStats {
    #[serde(flatten)]
    #[ts(flatten)]
    pub class: Class,
    // 在读学生数
    pub student_count: i64,
    pub class_teacher_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        let mut class = Class {
            id: 1,
            name: "Grade 5".to_string(),
            section: Some("A".to_string()),
            class_teacher_id: None,
            capacity: Some(40),
            sort_order: 5,
            description: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        assert_eq!(class.display_name(), "Grade 5 - A");
        class.section = Some("  ".to_string());
        assert_eq!(class.display_name(), "Grade 5");
    }
}
