pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod salary;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::staff::requests::{
    CreateStaffRequest, PaySalaryRequest, StaffListParams, UpdateStaffRequest,
};
use crate::storage::Storage;

pub struct StaffService {
    storage: Option<Arc<dyn Storage>>,
}

impl StaffService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        self.storage
            .clone()
            .unwrap_or_else(|| super::app_storage(request))
    }

    pub async fn list_staff(
        &self,
        request: &HttpRequest,
        query: StaffListParams,
    ) -> ActixResult<HttpResponse> {
        list::list_staff(self, request, query).await
    }

    pub async fn create_staff(
        &self,
        request: &HttpRequest,
        staff: CreateStaffRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_staff(self, request, staff).await
    }

    pub async fn get_staff(&self, request: &HttpRequest, staff_id: i64) -> ActixResult<HttpResponse> {
        get::get_staff(self, request, staff_id).await
    }

    pub async fn update_staff(
        &self,
        request: &HttpRequest,
        staff_id: i64,
        update: UpdateStaffRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_staff(self, request, staff_id, update).await
    }

    pub async fn delete_staff(
        &self,
        request: &HttpRequest,
        staff_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_staff(self, request, staff_id).await
    }

    // 发薪：支出流水 + 发薪状态
    pub async fn pay_salary(
        &self,
        request: &HttpRequest,
        staff_id: i64,
        payment: PaySalaryRequest,
    ) -> ActixResult<HttpResponse> {
        salary::pay_salary(self, request, staff_id, payment).await
    }
}
