use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::{
    ApiResponse, ErrorCode,
    activity::{
        entities::{ActivityAction, EntityType},
        requests::{ActivityListParams, ActivityListQuery},
    },
};
use crate::services::{export, record_activity, storage_error_response};
use crate::storage::Storage;

pub struct ActivityService {
    storage: Option<Arc<dyn Storage>>,
}

impl ActivityService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        self.storage
            .clone()
            .unwrap_or_else(|| super::app_storage(request))
    }

    pub async fn list_logs(
        &self,
        request: &HttpRequest,
        params: ActivityListParams,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);

        match storage.list_activity_logs(params.into()).await {
            Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                response,
                "Activity logs retrieved successfully",
            ))),
            Err(e) => Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
        }
    }

    // 导出不分页，沿用列表的筛选条件
    pub async fn export_logs(
        &self,
        request: &HttpRequest,
        params: ActivityListParams,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);

        let query = ActivityListQuery::from(params);
        let logs = match storage.list_activity_logs_for_export(query).await {
            Ok(logs) => logs,
            Err(e) => return Ok(storage_error_response(&e, ErrorCode::ExportFailed)),
        };

        let buffer = match export::activity_logs_xlsx(&logs) {
            Ok(buffer) => buffer,
            Err(e) => return Ok(storage_error_response(&e, ErrorCode::ExportFailed)),
        };

        record_activity(
            &storage,
            request,
            ActivityAction::Export,
            EntityType::ActivityLog,
            None,
            format!("导出操作日志 {} 条", logs.len()),
        )
        .await;

        Ok(export::xlsx_response(buffer, "activity_logs"))
    }
}
