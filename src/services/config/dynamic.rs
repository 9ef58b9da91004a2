//! 动态配置缓存
//!
//! 启动时从 `system_settings` 表加载，写配置时热更新。
//! 未配置或值非法时回落到配置文件中的默认值。

use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;
use tokio::sync::RwLock;

use crate::config::AppConfig;
use crate::models::fees::calculator::{FeeCalendar, FeeContext};
use crate::models::promotion::{PromotionTarget, parse_class_map};
use crate::models::system::entities::KnownSettingKey;

static DYNAMIC_CONFIG: OnceLock<RwLock<DynamicConfigCache>> = OnceLock::new();

#[derive(Debug, Default)]
struct DynamicConfigCache {
    settings: HashMap<String, String>,
}

/// 动态配置访问接口
pub struct DynamicConfig;

impl DynamicConfig {
    /// 应用启动时调用，从数据库加载配置
    pub async fn init(settings: Vec<(String, String)>) {
        let cache = DYNAMIC_CONFIG.get_or_init(|| RwLock::new(DynamicConfigCache::default()));

        let mut guard = cache.write().await;
        guard.settings.clear();
        guard.settings.extend(settings);

        tracing::info!(
            "动态配置缓存初始化完成，加载了 {} 个配置项",
            guard.settings.len()
        );
    }

    /// 更新单个配置项
    pub async fn update(key: &str, value: &str) {
        let cache = DYNAMIC_CONFIG.get_or_init(|| RwLock::new(DynamicConfigCache::default()));
        let mut guard = cache.write().await;
        guard.settings.insert(key.to_string(), value.to_string());
        tracing::debug!("动态配置更新: {} = {}", key, value);
    }

    async fn get_string(key: KnownSettingKey) -> Option<String> {
        let cache = DYNAMIC_CONFIG.get()?;
        let guard = cache.read().await;
        guard.settings.get(key.as_str()).cloned()
    }

    // 缓存值不合法时视为未配置
    async fn get_valid(key: KnownSettingKey) -> Option<String> {
        let raw = Self::get_string(key).await?;
        match key.validate(&raw) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("配置 {} 的值无效，使用默认值: {}", key.as_str(), e);
                None
            }
        }
    }

    async fn get_parsed<T: std::str::FromStr>(key: KnownSettingKey) -> Option<T> {
        Self::get_valid(key).await.and_then(|v| v.parse().ok())
    }

    // ============================================
    // 具体配置项访问方法
    // ============================================

    pub async fn school_name() -> String {
        Self::get_valid(KnownSettingKey::SchoolName)
            .await
            .unwrap_or_else(|| AppConfig::get().school.name.clone())
    }

    pub async fn academic_year_start_month() -> u32 {
        Self::get_parsed(KnownSettingKey::AcademicYearStartMonth)
            .await
            .unwrap_or(AppConfig::get().school.academic_year_start_month)
    }

    pub async fn fee_due_day() -> u32 {
        Self::get_parsed(KnownSettingKey::FeeDueDay)
            .await
            .unwrap_or(AppConfig::get().school.fee_due_day)
    }

    pub async fn fee_grace_days() -> i64 {
        Self::get_parsed(KnownSettingKey::FeeGraceDays)
            .await
            .unwrap_or(AppConfig::get().school.fee_grace_days)
    }

    pub async fn receipt_prefix() -> String {
        Self::get_valid(KnownSettingKey::ReceiptPrefix)
            .await
            .unwrap_or_else(|| AppConfig::get().school.receipt_prefix.clone())
    }

    pub async fn fee_calendar() -> FeeCalendar {
        FeeCalendar {
            start_month: Self::academic_year_start_month().await,
            due_day: Self::fee_due_day().await,
            grace_days: Self::fee_grace_days().await,
        }
    }

    /// 以今天为参照的收费上下文
    pub async fn fee_context() -> FeeContext {
        FeeContext {
            calendar: Self::fee_calendar().await,
            as_of: chrono::Utc::now().date_naive(),
        }
    }

    /// 当前学年，未配置时按今天和学年起始月推算
    pub async fn current_academic_year() -> String {
        match Self::get_valid(KnownSettingKey::CurrentAcademicYear).await {
            Some(year) => year,
            None => Self::fee_calendar()
                .await
                .current_year(chrono::Utc::now().date_naive())
                .to_string(),
        }
    }

    /// 升级映射，未配置时为空
    pub async fn promotion_class_map() -> BTreeMap<String, PromotionTarget> {
        Self::get_valid(KnownSettingKey::PromotionClassMap)
            .await
            .and_then(|raw| parse_class_map(&raw).ok())
            .unwrap_or_default()
    }

    /// 上传文件大小限制（字节）
    pub async fn upload_max_size() -> usize {
        Self::get_parsed::<i64>(KnownSettingKey::UploadMaxSize)
            .await
            .map(|v| v as usize)
            .unwrap_or_else(|| AppConfig::get().upload.max_size)
    }

    /// 允许上传的扩展名
    pub async fn upload_allowed_types() -> Vec<String> {
        Self::get_valid(KnownSettingKey::UploadAllowedTypes)
            .await
            .and_then(|v| serde_json::from_str(&v).ok())
            .unwrap_or_else(|| AppConfig::get().upload.allowed_types.clone())
    }
}
