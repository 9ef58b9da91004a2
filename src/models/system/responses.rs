use serde::Serialize;
use ts_rs::TS;

use super::entities::SystemSetting;

/// 公开的学校配置（任意登录用户可读）
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/system.ts")]
pub struct SchoolSettingsResponse {
    pub school_name: String,
    pub current_academic_year: String,
    pub academic_year_start_month: u32,
    pub fee_due_day: u32,
    pub fee_grace_days: i64,
    pub receipt_prefix: String,
    pub max_file_size: i64,
    pub allowed_file_types: Vec<String>,
    pub environment: String,
}

/// 管理员配置列表响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/system.ts")]
pub struct AdminSettingsListResponse {
    pub settings: Vec<SystemSetting>,
}

/// 单个配置响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/system.ts")]
pub struct SettingResponse {
    pub setting: SystemSetting,
}
