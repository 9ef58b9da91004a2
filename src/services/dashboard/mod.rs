pub mod class_fees;
pub mod collections;
pub mod summary;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::dashboard::requests::{CollectionsParams, DashboardParams};
use crate::storage::Storage;

pub struct DashboardService {
    storage: Option<Arc<dyn Storage>>,
}

impl DashboardService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        self.storage
            .clone()
            .unwrap_or_else(|| super::app_storage(request))
    }

    pub async fn get_summary(
        &self,
        request: &HttpRequest,
        params: DashboardParams,
    ) -> ActixResult<HttpResponse> {
        summary::get_summary(self, request, params).await
    }

    // 按月收款
    pub async fn get_collections(
        &self,
        request: &HttpRequest,
        params: CollectionsParams,
    ) -> ActixResult<HttpResponse> {
        collections::get_collections(self, request, params).await
    }

    pub async fn get_class_fees(
        &self,
        request: &HttpRequest,
        params: DashboardParams,
    ) -> ActixResult<HttpResponse> {
        class_fees::get_class_fees(self, request, params).await
    }
}

/// 参数为空时使用当前学年
pub(super) async fn resolve_academic_year(param: Option<String>) -> Result<String, String> {
    match param.map(|y| y.trim().to_string()).filter(|y| !y.is_empty()) {
        Some(year) => year
            .parse::<crate::models::fees::calculator::AcademicYear>()
            .map(|y| y.to_string()),
        None => Ok(crate::services::DynamicConfig::current_academic_year().await),
    }
}
