use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::fees::calculator::AcademicYear;

crate::define_string_enum! {
    /// 配置值类型
    #[derive(TS)]
    #[ts(export, export_to = "../frontend/src/types/generated/system.ts", rename_all = "snake_case")]
    pub enum SettingValueType {
        String => "string",
        Integer => "integer",
        Boolean => "boolean",
        JsonArray => "json_array",
        JsonObject => "json_object",
        AcademicYear => "academic_year",
        Month => "month",
        DayOfMonth => "day_of_month",
    }
}

impl SettingValueType {
    /// 校验字符串形式的配置值，返回规范化后的值
    pub fn normalize(&self, raw: &str) -> Result<String, String> {
        let value = raw.trim();
        match self {
            SettingValueType::String => {
                if value.is_empty() {
                    return Err("值不能为空".to_string());
                }
                Ok(value.to_string())
            }
            SettingValueType::Integer => value
                .parse::<i64>()
                .map(|v| v.to_string())
                .map_err(|_| format!("'{value}' 不是有效的整数")),
            SettingValueType::Boolean => value
                .parse::<bool>()
                .map(|v| v.to_string())
                .map_err(|_| format!("'{value}' 不是有效的布尔值")),
            SettingValueType::JsonArray => match serde_json::from_str::<serde_json::Value>(value) {
                Ok(v @ serde_json::Value::Array(_)) => Ok(v.to_string()),
                _ => Err("值必须是 JSON 数组".to_string()),
            },
            SettingValueType::JsonObject => match serde_json::from_str::<serde_json::Value>(value)
            {
                Ok(v @ serde_json::Value::Object(_)) => Ok(v.to_string()),
                _ => Err("值必须是 JSON 对象".to_string()),
            },
            SettingValueType::AcademicYear => value
                .parse::<AcademicYear>()
                .map(|y| y.to_string())
                .map_err(|e| e.to_string()),
            SettingValueType::Month => match value.parse::<u32>() {
                Ok(m) if (1..=12).contains(&m) => Ok(m.to_string()),
                _ => Err("月份必须在 1-12 之间".to_string()),
            },
            SettingValueType::DayOfMonth => match value.parse::<u32>() {
                Ok(d) if (1..=28).contains(&d) => Ok(d.to_string()),
                _ => Err("日期必须在 1-28 之间".to_string()),
            },
        }
    }
}

/// 已知配置键
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnownSettingKey {
    SchoolName,
    CurrentAcademicYear,
    AcademicYearStartMonth,
    FeeDueDay,
    FeeGraceDays,
    ReceiptPrefix,
    PromotionClassMap,
    UploadMaxSize,
    UploadAllowedTypes,
}

impl KnownSettingKey {
    pub const ALL: &'static [KnownSettingKey] = &[
        KnownSettingKey::SchoolName,
        KnownSettingKey::CurrentAcademicYear,
        KnownSettingKey::AcademicYearStartMonth,
        KnownSettingKey::FeeDueDay,
        KnownSettingKey::FeeGraceDays,
        KnownSettingKey::ReceiptPrefix,
        KnownSettingKey::PromotionClassMap,
        KnownSettingKey::UploadMaxSize,
        KnownSettingKey::UploadAllowedTypes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            KnownSettingKey::SchoolName => "school.name",
            KnownSettingKey::CurrentAcademicYear => "school.current_academic_year",
            KnownSettingKey::AcademicYearStartMonth => "school.academic_year_start_month",
            KnownSettingKey::FeeDueDay => "fees.due_day",
            KnownSettingKey::FeeGraceDays => "fees.grace_days",
            KnownSettingKey::ReceiptPrefix => "fees.receipt_prefix",
            KnownSettingKey::PromotionClassMap => "promotion.class_map",
            KnownSettingKey::UploadMaxSize => "upload.max_size",
            KnownSettingKey::UploadAllowedTypes => "upload.allowed_types",
        }
    }

    pub fn value_type(&self) -> SettingValueType {
        match self {
            KnownSettingKey::SchoolName | KnownSettingKey::ReceiptPrefix => {
                SettingValueType::String
            }
            KnownSettingKey::CurrentAcademicYear => SettingValueType::AcademicYear,
            KnownSettingKey::AcademicYearStartMonth => SettingValueType::Month,
            KnownSettingKey::FeeDueDay => SettingValueType::DayOfMonth,
            KnownSettingKey::FeeGraceDays | KnownSettingKey::UploadMaxSize => {
                SettingValueType::Integer
            }
            KnownSettingKey::PromotionClassMap => SettingValueType::JsonObject,
            KnownSettingKey::UploadAllowedTypes => SettingValueType::JsonArray,
        }
    }

    /// 按键校验配置值，返回写入数据库的规范化值
    pub fn validate(&self, raw: &str) -> Result<String, String> {
        let value = self.value_type().normalize(raw)?;
        match self {
            KnownSettingKey::FeeGraceDays => {
                let days: i64 = value.parse().unwrap_or(-1);
                if !(0..=365).contains(&days) {
                    return Err("宽限天数必须在 0-365 之间".to_string());
                }
            }
            KnownSettingKey::UploadMaxSize => {
                let size: i64 = value.parse().unwrap_or(0);
                if size <= 0 {
                    return Err("上传大小限制必须大于 0".to_string());
                }
            }
            KnownSettingKey::ReceiptPrefix => {
                if value.len() > 10 || !value.chars().all(|c| c.is_ascii_alphanumeric()) {
                    return Err("收据前缀只能包含字母和数字，且不超过 10 个字符".to_string());
                }
            }
            KnownSettingKey::PromotionClassMap => {
                crate::models::promotion::parse_class_map(&value)?;
            }
            KnownSettingKey::UploadAllowedTypes => {
                let types: Vec<String> =
                    serde_json::from_str(&value).map_err(|_| "文件类型必须是字符串数组")?;
                if types.iter().any(|t| !t.starts_with('.')) {
                    return Err("文件类型必须以 '.' 开头".to_string());
                }
            }
            _ => {}
        }
        Ok(value)
    }
}

impl std::str::FromStr for KnownSettingKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KnownSettingKey::ALL
            .iter()
            .find(|k| k.as_str() == s)
            .copied()
            .ok_or_else(|| format!("Unknown setting key: {s}"))
    }
}

/// 系统设置实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/system.ts")]
pub struct SystemSetting {
    pub key: String,
    pub value: String,
    pub value_type: SettingValueType,
    pub description: Option<String>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub updated_by: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_keys_roundtrip() {
        for key in KnownSettingKey::ALL {
            assert_eq!(key.as_str().parse::<KnownSettingKey>().unwrap(), *key);
        }
        assert!("app.system_name".parse::<KnownSettingKey>().is_err());
    }

    #[test]
    fn test_validate_values() {
        assert_eq!(
            KnownSettingKey::CurrentAcademicYear.validate(" 2026-2027 "),
            Ok("2026-2027".to_string())
        );
        assert!(KnownSettingKey::CurrentAcademicYear.validate("2026-2028").is_err());
        assert!(KnownSettingKey::AcademicYearStartMonth.validate("13").is_err());
        assert!(KnownSettingKey::FeeDueDay.validate("29").is_err());
        assert!(KnownSettingKey::FeeGraceDays.validate("-1").is_err());
        assert!(KnownSettingKey::ReceiptPrefix.validate("RC-P").is_err());
        assert!(KnownSettingKey::UploadAllowedTypes.validate(r#"["pdf"]"#).is_err());
        assert!(KnownSettingKey::UploadAllowedTypes.validate(r#"[".pdf"]"#).is_ok());
    }

    #[test]
    fn test_validate_class_map() {
        assert!(
            KnownSettingKey::PromotionClassMap
                .validate(r#"{"Grade 1":"Grade 2","Grade 10":"GRADUATE"}"#)
                .is_ok()
        );
        assert!(KnownSettingKey::PromotionClassMap.validate("[]").is_err());
        assert!(KnownSettingKey::PromotionClassMap.validate(r#"{"A":1}"#).is_err());
    }
}
