use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/promotion.ts")]
pub struct PromotionRequest {
    pub from_academic_year: String,
    pub to_academic_year: String,
    #[serde(default = "default_generate_fees")]
    pub generate_fees: bool,
    // true 时以 xlsx 返回报告
    #[serde(default)]
    pub export: bool,
}

fn default_generate_fees() -> bool {
    true
}
