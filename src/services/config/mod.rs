pub mod dynamic;
pub mod settings;

pub use dynamic::DynamicConfig;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::system::requests::{BatchUpdateSettingsRequest, UpdateSettingRequest};
use crate::storage::Storage;

pub struct ConfigService {
    storage: Option<Arc<dyn Storage>>,
}

impl ConfigService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        self.storage
            .clone()
            .unwrap_or_else(|| super::app_storage(request))
    }

    // 学校公开配置
    pub async fn get_settings(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        settings::get_settings(self, request).await
    }

    pub async fn list_settings(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        settings::list_settings(self, request).await
    }

    pub async fn update_setting(
        &self,
        request: &HttpRequest,
        key: String,
        body: UpdateSettingRequest,
    ) -> ActixResult<HttpResponse> {
        settings::update_setting(self, request, key, body).await
    }

    pub async fn batch_update_settings(
        &self,
        request: &HttpRequest,
        body: BatchUpdateSettingsRequest,
    ) -> ActixResult<HttpResponse> {
        settings::batch_update_settings(self, request, body).await
    }
}
