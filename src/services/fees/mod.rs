//! 收费：收费项目、班级收费标准、学生个别收费、收费记录与缴费

pub mod customs;
pub mod payments;
pub mod receipt;
pub mod records;
pub mod structures;
pub mod types;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::fees::requests::{
    CreateFeeTypeRequest, FeeCustomListParams, FeeExportParams, FeeRecordListParams,
    FeeStructureListParams, FeeTypeListParams, GenerateFeeRecordsRequest, PaymentListParams,
    RecordPaymentRequest, UpdateFeeRecordRequest, UpdateFeeTypeRequest, UpsertFeeCustomRequest,
    UpsertFeeStructureRequest,
};
use crate::storage::Storage;

pub struct FeeService {
    storage: Option<Arc<dyn Storage>>,
}

impl FeeService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        self.storage
            .clone()
            .unwrap_or_else(|| super::app_storage(request))
    }

    // ==================== 收费项目 ====================

    pub async fn list_fee_types(
        &self,
        request: &HttpRequest,
        params: FeeTypeListParams,
    ) -> ActixResult<HttpResponse> {
        types::list_fee_types(self, request, params).await
    }

    pub async fn create_fee_type(
        &self,
        request: &HttpRequest,
        req: CreateFeeTypeRequest,
    ) -> ActixResult<HttpResponse> {
        types::create_fee_type(self, request, req).await
    }

    pub async fn get_fee_type(&self, request: &HttpRequest, id: i64) -> ActixResult<HttpResponse> {
        types::get_fee_type(self, request, id).await
    }

    pub async fn update_fee_type(
        &self,
        request: &HttpRequest,
        id: i64,
        update: UpdateFeeTypeRequest,
    ) -> ActixResult<HttpResponse> {
        types::update_fee_type(self, request, id, update).await
    }

    pub async fn delete_fee_type(
        &self,
        request: &HttpRequest,
        id: i64,
    ) -> ActixResult<HttpResponse> {
        types::delete_fee_type(self, request, id).await
    }

    // ==================== 班级收费标准 ====================

    pub async fn list_fee_structures(
        &self,
        request: &HttpRequest,
        params: FeeStructureListParams,
    ) -> ActixResult<HttpResponse> {
        structures::list_fee_structures(self, request, params).await
    }

    pub async fn upsert_fee_structure(
        &self,
        request: &HttpRequest,
        req: UpsertFeeStructureRequest,
    ) -> ActixResult<HttpResponse> {
        structures::upsert_fee_structure(self, request, req).await
    }

    pub async fn delete_fee_structure(
        &self,
        request: &HttpRequest,
        id: i64,
    ) -> ActixResult<HttpResponse> {
        structures::delete_fee_structure(self, request, id).await
    }

    // ==================== 学生个别收费 ====================

    pub async fn list_fee_customs(
        &self,
        request: &HttpRequest,
        params: FeeCustomListParams,
    ) -> ActixResult<HttpResponse> {
        customs::list_fee_customs(self, request, params).await
    }

    pub async fn upsert_fee_custom(
        &self,
        request: &HttpRequest,
        req: UpsertFeeCustomRequest,
    ) -> ActixResult<HttpResponse> {
        customs::upsert_fee_custom(self, request, req).await
    }

    pub async fn delete_fee_custom(
        &self,
        request: &HttpRequest,
        id: i64,
    ) -> ActixResult<HttpResponse> {
        customs::delete_fee_custom(self, request, id).await
    }

    // ==================== 收费记录 ====================

    pub async fn list_fee_records(
        &self,
        request: &HttpRequest,
        params: FeeRecordListParams,
    ) -> ActixResult<HttpResponse> {
        records::list_fee_records(self, request, params).await
    }

    pub async fn generate_fee_records(
        &self,
        request: &HttpRequest,
        req: GenerateFeeRecordsRequest,
    ) -> ActixResult<HttpResponse> {
        records::generate_fee_records(self, request, req).await
    }

    pub async fn get_fee_record(
        &self,
        request: &HttpRequest,
        id: i64,
    ) -> ActixResult<HttpResponse> {
        records::get_fee_record(self, request, id).await
    }

    pub async fn update_fee_record(
        &self,
        request: &HttpRequest,
        id: i64,
        update: UpdateFeeRecordRequest,
    ) -> ActixResult<HttpResponse> {
        records::update_fee_record(self, request, id, update).await
    }

    pub async fn export_fee_records(
        &self,
        request: &HttpRequest,
        params: FeeExportParams,
    ) -> ActixResult<HttpResponse> {
        records::export_fee_records(self, request, params).await
    }

    // ==================== 缴费 ====================

    pub async fn record_payment(
        &self,
        request: &HttpRequest,
        req: RecordPaymentRequest,
    ) -> ActixResult<HttpResponse> {
        payments::record_payment(self, request, req).await
    }

    pub async fn list_payments(
        &self,
        request: &HttpRequest,
        params: PaymentListParams,
    ) -> ActixResult<HttpResponse> {
        payments::list_payments(self, request, params).await
    }

    pub async fn get_payment(&self, request: &HttpRequest, id: i64) -> ActixResult<HttpResponse> {
        payments::get_payment(self, request, id).await
    }

    // 冲销缴费
    pub async fn delete_payment(
        &self,
        request: &HttpRequest,
        id: i64,
    ) -> ActixResult<HttpResponse> {
        payments::delete_payment(self, request, id).await
    }

    pub async fn payment_receipt(
        &self,
        request: &HttpRequest,
        id: i64,
    ) -> ActixResult<HttpResponse> {
        receipt::payment_receipt(self, request, id).await
    }
}
