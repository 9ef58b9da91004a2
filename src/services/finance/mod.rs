pub mod accounts;
pub mod summary;
pub mod transactions;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::finance::requests::{
    AccountListParams, CreateAccountRequest, CreateTransactionRequest, FinanceSummaryParams,
    TransactionListParams, UpdateAccountRequest,
};
use crate::storage::Storage;

pub struct FinanceService {
    storage: Option<Arc<dyn Storage>>,
}

impl FinanceService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        self.storage
            .clone()
            .unwrap_or_else(|| super::app_storage(request))
    }

    pub async fn list_accounts(
        &self,
        request: &HttpRequest,
        params: AccountListParams,
    ) -> ActixResult<HttpResponse> {
        accounts::list_accounts(self, request, params).await
    }

    pub async fn create_account(
        &self,
        request: &HttpRequest,
        req: CreateAccountRequest,
    ) -> ActixResult<HttpResponse> {
        accounts::create_account(self, request, req).await
    }

    pub async fn get_account(&self, request: &HttpRequest, id: i64) -> ActixResult<HttpResponse> {
        accounts::get_account(self, request, id).await
    }

    pub async fn update_account(
        &self,
        request: &HttpRequest,
        id: i64,
        update: UpdateAccountRequest,
    ) -> ActixResult<HttpResponse> {
        accounts::update_account(self, request, id, update).await
    }

    pub async fn delete_account(
        &self,
        request: &HttpRequest,
        id: i64,
    ) -> ActixResult<HttpResponse> {
        accounts::delete_account(self, request, id).await
    }

    pub async fn list_transactions(
        &self,
        request: &HttpRequest,
        params: TransactionListParams,
    ) -> ActixResult<HttpResponse> {
        transactions::list_transactions(self, request, params).await
    }

    pub async fn create_transaction(
        &self,
        request: &HttpRequest,
        req: CreateTransactionRequest,
    ) -> ActixResult<HttpResponse> {
        transactions::create_transaction(self, request, req).await
    }

    pub async fn get_transaction(
        &self,
        request: &HttpRequest,
        id: i64,
    ) -> ActixResult<HttpResponse> {
        transactions::get_transaction(self, request, id).await
    }

    // 删除并回滚余额
    pub async fn delete_transaction(
        &self,
        request: &HttpRequest,
        id: i64,
    ) -> ActixResult<HttpResponse> {
        transactions::delete_transaction(self, request, id).await
    }

    pub async fn get_summary(
        &self,
        request: &HttpRequest,
        params: FinanceSummaryParams,
    ) -> ActixResult<HttpResponse> {
        summary::get_summary(self, request, params).await
    }
}
