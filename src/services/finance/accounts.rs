use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::FinanceService;
use crate::errors::SchoolError;
use crate::models::{
    ApiResponse, ErrorCode,
    activity::entities::{ActivityAction, EntityType},
    finance::{
        requests::{AccountListParams, CreateAccountRequest, UpdateAccountRequest},
        responses::AccountListResponse,
    },
};
use crate::services::{record_activity, storage_error_response};

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(
        ErrorCode::AccountNotFound,
        "Account not found",
    ))
}

fn invalid_name(name: &str) -> bool {
    let len = name.chars().count();
    len == 0 || len > 64
}

pub async fn list_accounts(
    service: &FinanceService,
    request: &HttpRequest,
    params: AccountListParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.list_accounts(params.include_inactive).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            AccountListResponse { items },
            "Accounts retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::AccountNotFound)),
    }
}

pub async fn create_account(
    service: &FinanceService,
    request: &HttpRequest,
    mut req: CreateAccountRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    req.name = req.name.trim().to_string();
    if invalid_name(&req.name) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "账户名称长度应为 1-64 个字符",
        )));
    }
    if !req.opening_balance.is_finite() || req.opening_balance < 0.0 {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "期初余额不能为负数",
        )));
    }

    match storage.create_account(req).await {
        Ok(account) => {
            record_activity(
                &storage,
                request,
                ActivityAction::Create,
                EntityType::Account,
                Some(account.id),
                format!(
                    "新增账户 {}（期初余额 {:.2}）",
                    account.name, account.opening_balance
                ),
            )
            .await;
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(account, "Account created successfully")))
        }
        Err(e) => Ok(storage_error_response(&e, ErrorCode::AccountAlreadyExists)),
    }
}

pub async fn get_account(
    service: &FinanceService,
    request: &HttpRequest,
    id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_account_by_id(id).await {
        Ok(Some(account)) => Ok(HttpResponse::Ok()
            .json(ApiResponse::success(account, "Account retrieved successfully"))),
        Ok(None) => Ok(not_found()),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::AccountNotFound)),
    }
}

pub async fn update_account(
    service: &FinanceService,
    request: &HttpRequest,
    id: i64,
    mut update: UpdateAccountRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    update.name = update.name.map(|n| n.trim().to_string());
    if update.name.as_deref().is_some_and(invalid_name) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "账户名称长度应为 1-64 个字符",
        )));
    }

    match storage.update_account(id, update).await {
        Ok(Some(account)) => {
            record_activity(
                &storage,
                request,
                ActivityAction::Update,
                EntityType::Account,
                Some(account.id),
                format!("修改账户 {}", account.name),
            )
            .await;
            Ok(HttpResponse::Ok()
                .json(ApiResponse::success(account, "Account updated successfully")))
        }
        Ok(None) => Ok(not_found()),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::AccountAlreadyExists)),
    }
}

pub async fn delete_account(
    service: &FinanceService,
    request: &HttpRequest,
    id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.delete_account(id).await {
        Ok(true) => {
            record_activity(
                &storage,
                request,
                ActivityAction::Delete,
                EntityType::Account,
                Some(id),
                format!("删除账户 #{id}"),
            )
            .await;
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Account deleted successfully")))
        }
        Ok(false) => Ok(not_found()),
        Err(e @ SchoolError::Conflict(_)) => Ok(storage_error_response(&e, ErrorCode::AccountInUse)),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::AccountNotFound)),
    }
}
