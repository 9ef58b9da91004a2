use serde::Deserialize;
use ts_rs::TS;

/// 配置值，JSON 类配置允许直接传对象或数组，统一按字符串存储
#[derive(Debug, Clone, PartialEq, Deserialize, TS)]
#[serde(untagged)]
#[ts(export, export_to = "../frontend/src/types/generated/system.ts")]
pub enum SettingValue {
    Text(String),
    Json(serde_json::Value),
}

impl SettingValue {
    /// 存储使用的原始字符串
    pub fn as_raw(&self) -> String {
        match self {
            SettingValue::Text(s) => s.trim().to_string(),
            SettingValue::Json(v) => v.to_string(),
        }
    }
}

/// `PUT /api/v1/config/settings/{key}`
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/system.ts")]
pub struct UpdateSettingRequest {
    pub value: SettingValue,
}

/// 批量更新，任一项校验失败则整体不写入
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/system.ts")]
pub struct BatchUpdateSettingsRequest {
    pub settings: Vec<UpdateSettingItem>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/system.ts")]
pub struct UpdateSettingItem {
    pub key: String,
    pub value: SettingValue,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setting_value_forms() {
        let text: UpdateSettingRequest = serde_json::from_str(r#"{"value":" 2025-2026 "}"#).unwrap();
        assert_eq!(text.value.as_raw(), "2025-2026");

        let number: UpdateSettingRequest = serde_json::from_str(r#"{"value":15}"#).unwrap();
        assert_eq!(number.value.as_raw(), "15");

        let map: UpdateSettingRequest =
            serde_json::from_str(r#"{"value":{"Grade 1":"Grade 2"}}"#).unwrap();
        assert_eq!(map.value.as_raw(), r#"{"Grade 1":"Grade 2"}"#);
    }
}
