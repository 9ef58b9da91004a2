use std::collections::BTreeMap;

use serde::Serialize;
use ts_rs::TS;

/// 映射中表示毕业的取值
pub const GRADUATE_MARKER: &str = "GRADUATE";

/// 某个班级学生的去向
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromotionTarget {
    Class(String),
    Graduate,
}

/// 解析升级映射 JSON 对象
pub fn parse_class_map(raw: &str) -> Result<BTreeMap<String, PromotionTarget>, String> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| format!("升级映射不是有效的 JSON: {e}"))?;
    let object = value
        .as_object()
        .ok_or_else(|| "升级映射必须是 JSON 对象".to_string())?;

    let mut map = BTreeMap::new();
    for (from, to) in object {
        let to = to
            .as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| format!("班级 '{from}' 的目标必须是非空字符串"))?;
        let from = from.trim();
        if from.is_empty() {
            return Err("升级映射中存在空班级名".to_string());
        }
        let target = if to.eq_ignore_ascii_case(GRADUATE_MARKER) {
            PromotionTarget::Graduate
        } else if to == from {
            return Err(format!("班级 '{from}' 不能升级到自身"));
        } else {
            PromotionTarget::Class(to.to_string())
        };
        map.insert(from.to_string(), target);
    }
    Ok(map)
}

crate::define_string_enum! {
    // 单个学生的升级结果
    #[derive(TS)]
    #[ts(export, export_to = "../frontend/src/types/generated/promotion.ts", rename_all = "snake_case")]
    pub enum PromotionOutcome {
        Promoted => "promoted",
        Graduated => "graduated",
        Skipped => "skipped",
        Failed => "failed",
    }
}

/// 存储层执行单个学生升级所需的参数
#[derive(Debug, Clone)]
pub struct PromotionStep {
    pub student_id: i64,
    // None 表示毕业
    pub target_class_id: Option<i64>,
    pub to_academic_year: String,
    pub generate_fees: bool,
    pub first_due_date: Option<chrono::NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_class_map() {
        let map = parse_class_map(r#"{"Grade 1":"Grade 2"," Grade 10 ":"graduate"}"#).unwrap();
        assert_eq!(
            map.get("Grade 1"),
            Some(&PromotionTarget::Class("Grade 2".to_string()))
        );
        assert_eq!(map.get("Grade 10"), Some(&PromotionTarget::Graduate));
        assert!(parse_class_map("{}").unwrap().is_empty());
    }

    #[test]
    fn test_parse_class_map_rejects_invalid() {
        assert!(parse_class_map("not json").is_err());
        assert!(parse_class_map(r#"["a"]"#).is_err());
        assert!(parse_class_map(r#"{"A":""}"#).is_err());
        assert!(parse_class_map(r#"{"A":"A"}"#).is_err());
        assert!(parse_class_map(r#"{"A":null}"#).is_err());
    }
}
