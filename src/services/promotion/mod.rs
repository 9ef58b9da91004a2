//! 学年升级：按配置的升级映射把在读学生移到下一班级或标记毕业

pub mod plan;
pub mod run;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::promotion::requests::PromotionRequest;
use crate::storage::Storage;

pub struct PromotionService {
    storage: Option<Arc<dyn Storage>>,
}

impl PromotionService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        self.storage
            .clone()
            .unwrap_or_else(|| super::app_storage(request))
    }

    // 只计算结果，不写数据库
    pub async fn preview(
        &self,
        request: &HttpRequest,
        req: PromotionRequest,
    ) -> ActixResult<HttpResponse> {
        run::promote(self, request, req, true).await
    }

    pub async fn execute(
        &self,
        request: &HttpRequest,
        req: PromotionRequest,
    ) -> ActixResult<HttpResponse> {
        run::promote(self, request, req, false).await
    }
}
