use std::collections::{BTreeMap, HashMap};

use crate::models::classes::entities::Class;
use crate::models::promotion::entities::PromotionTarget;
use crate::models::students::entities::Student;

/// 单个学生的升级计划
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedMove {
    Promote { class_id: i64, class_name: String },
    Graduate,
    Skip(String),
}

/// 班级名与 id 的双向索引
pub struct ClassIndex {
    by_id: HashMap<i64, String>,
    by_name: HashMap<String, i64>,
}

impl ClassIndex {
    pub fn new(classes: &[Class]) -> Self {
        Self {
            by_id: classes.iter().map(|c| (c.id, c.name.clone())).collect(),
            by_name: classes.iter().map(|c| (c.name.clone(), c.id)).collect(),
        }
    }

    pub fn name_of(&self, class_id: i64) -> Option<&str> {
        self.by_id.get(&class_id).map(String::as_str)
    }

    pub fn id_of(&self, name: &str) -> Option<i64> {
        self.by_name.get(name).copied()
    }
}

/// 映射中引用了不存在的班级
pub fn unknown_targets(map: &BTreeMap<String, PromotionTarget>, index: &ClassIndex) -> Vec<String> {
    map.values()
        .filter_map(|target| match target {
            PromotionTarget::Class(name) if index.id_of(name).is_none() => Some(name.clone()),
            _ => None,
        })
        .collect()
}

pub fn plan_student(
    student: &Student,
    map: &BTreeMap<String, PromotionTarget>,
    index: &ClassIndex,
) -> PlannedMove {
    let Some(class_id) = student.class_id else {
        return PlannedMove::Skip("未分班".to_string());
    };
    let Some(class_name) = index.name_of(class_id) else {
        return PlannedMove::Skip(format!("班级 #{class_id} 不存在"));
    };
    match map.get(class_name) {
        None => PlannedMove::Skip(format!("升级映射中没有班级 {class_name}")),
        Some(PromotionTarget::Graduate) => PlannedMove::Graduate,
        Some(PromotionTarget::Class(target)) => match index.id_of(target) {
            Some(target_id) => PlannedMove::Promote {
                class_id: target_id,
                class_name: target.clone(),
            },
            None => PlannedMove::Skip(format!("目标班级 {target} 不存在")),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::promotion::entities::parse_class_map;
    use crate::models::students::entities::StudentStatus;

    fn class(id: i64, name: &str) -> Class {
        Class {
            id,
            name: name.to_string(),
            section: None,
            class_teacher_id: None,
            capacity: None,
            sort_order: id as i32,
            description: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn student(class_id: Option<i64>) -> Student {
        Student {
            id: 1,
            admission_number: "A-001".to_string(),
            first_name: "Asha".to_string(),
            last_name: "Rao".to_string(),
            gender: None,
            date_of_birth: None,
            class_id,
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

    fn setup() -> (BTreeMap<String, PromotionTarget>, ClassIndex) {
        let map = parse_class_map(
            r#"{"Grade 1":"Grade 2","Grade 2":"Grade 3","Grade 3":"GRADUATE","Grade 4":"Grade 9"}"#,
        )
        .unwrap();
        let index = ClassIndex::new(&[
            class(1, "Grade 1"),
            class(2, "Grade 2"),
            class(3, "Grade 3"),
            class(4, "Grade 4"),
            class(5, "Nursery"),
        ]);
        (map, index)
    }

    #[test]
    fn test_plan_student() {
        let (map, index) = setup();
        assert_eq!(
            plan_student(&student(Some(1)), &map, &index),
            PlannedMove::Promote {
                class_id: 2,
                class_name: "Grade 2".to_string()
            }
        );
        assert_eq!(plan_student(&student(Some(3)), &map, &index), PlannedMove::Graduate);
        assert!(matches!(
            plan_student(&student(Some(5)), &map, &index),
            PlannedMove::Skip(_)
        ));
        assert!(matches!(
            plan_student(&student(None), &map, &index),
            PlannedMove::Skip(_)
        ));
        // 目标班级不存在
        assert!(matches!(
            plan_student(&student(Some(4)), &map, &index),
            PlannedMove::Skip(_)
        ));
    }

    #[test]
    fn test_unknown_targets() {
        let (map, index) = setup();
        assert_eq!(unknown_targets(&map, &index), vec!["Grade 9".to_string()]);
    }
}
