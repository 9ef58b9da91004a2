//! 系统设置存储实现

use sea_orm::{ActiveModelTrait, EntityTrait, Order, QueryOrder, Set};

use crate::entity::prelude::SystemSettings;
use crate::errors::{Result, SchoolError};
use crate::models::system::entities::SystemSetting;

use super::SeaOrmStorage;

impl SeaOrmStorage {
    /// 获取所有设置
    pub(crate) async fn list_all_settings_impl(&self) -> Result<Vec<SystemSetting>> {
        let settings = SystemSettings::find()
            .order_by(crate::entity::system_settings::Column::Key, Order::Asc)
            .all(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("获取设置列表失败: {e}")))?;

        Ok(settings.into_iter().map(SystemSetting::from).collect())
    }

    /// 通过 key 获取设置
    pub(crate) async fn get_setting_by_key_impl(&self, key: &str) -> Result<Option<SystemSetting>> {
        let setting = SystemSettings::find_by_id(key.to_string())
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("获取设置失败: {e}")))?;

        Ok(setting.map(SystemSetting::from))
    }

    /// 更新设置，配置项不存在时返回 None
    pub(crate) async fn update_setting_impl(
        &self,
        key: &str,
        value: &str,
        updated_by: Option<i64>,
    ) -> Result<Option<SystemSetting>> {
        let Some(existing) = SystemSettings::find_by_id(key.to_string())
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("获取设置失败: {e}")))?
        else {
            return Ok(None);
        };

        let mut active_model: crate::entity::system_settings::ActiveModel = existing.into();
        active_model.value = Set(value.to_string());
        active_model.updated_at = Set(chrono::Utc::now().timestamp());
        active_model.updated_by = Set(updated_by);

        let updated = active_model
            .update(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("更新设置失败: {e}")))?;

        Ok(Some(SystemSetting::from(updated)))
    }
}

#[cfg(test)]
mod tests {
    use crate::storage::sea_orm_storage::test_storage;

    #[tokio::test]
    async fn test_default_settings_seeded() {
        let storage = test_storage().await;
        let settings = storage.list_all_settings_impl().await.unwrap();
        assert_eq!(settings.len(), 9);

        let updated = storage
            .update_setting_impl("fees.grace_days", "5", Some(1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.value, "5");
        assert_eq!(updated.updated_by, Some(1));

        assert!(
            storage
                .update_setting_impl("missing.key", "1", None)
                .await
                .unwrap()
                .is_none()
        );
    }
}
