use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Utc;
use tracing::info;

use super::FinanceService;
use crate::errors::SchoolError;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    activity::entities::{ActivityAction, EntityType},
    finance::{
        entities::{NewTransaction, TxnType},
        requests::{CreateTransactionRequest, TransactionListParams, TransactionListQuery},
    },
};
use crate::services::{record_activity, storage_error_response};

// 未指定分类时使用
const DEFAULT_CATEGORY: &str = "general";

/// 请求转为存储层参数，金额与转账账户不合法时返回错误信息
fn build_transaction(
    req: CreateTransactionRequest,
    created_by: Option<i64>,
) -> Result<NewTransaction, &'static str> {
    if !req.amount.is_finite() || req.amount <= 0.0 {
        return Err("金额必须大于 0");
    }
    let counter_account_id = match req.txn_type {
        TxnType::Transfer => match req.counter_account_id {
            Some(id) if id == req.account_id => {
                return Err("转账的目标账户不能与来源账户相同");
            }
            Some(id) => Some(id),
            None => return Err("转账需要指定目标账户"),
        },
        _ => None,
    };
    let category = req
        .category
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

    Ok(NewTransaction {
        account_id: req.account_id,
        counter_account_id,
        txn_type: req.txn_type,
        amount: req.amount,
        category,
        description: req.description,
        reference: req.reference,
        staff_id: None,
        txn_date: req.txn_date.unwrap_or_else(Utc::now),
        created_by,
    })
}

pub async fn list_transactions(
    service: &FinanceService,
    request: &HttpRequest,
    params: TransactionListParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let query = TransactionListQuery {
        page: Some(params.pagination.page),
        size: Some(params.pagination.size),
        account_id: params.account_id,
        txn_type: params.txn_type,
        category: params.category,
        from: params.from,
        to: params.to,
    };

    match storage.list_transactions(query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Transactions retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::TransactionNotFound)),
    }
}

pub async fn create_transaction(
    service: &FinanceService,
    request: &HttpRequest,
    req: CreateTransactionRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let txn = match build_transaction(req, RequireJWT::extract_user_id(request)) {
        Ok(txn) => txn,
        Err(msg) => {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::TransactionInvalid, msg)));
        }
    };

    match storage.create_transaction(txn).await {
        Ok(txn) => {
            info!(
                "Transaction {} created: {} {:.2} on account {}",
                txn.id, txn.txn_type, txn.amount, txn.account_id
            );
            record_activity(
                &storage,
                request,
                ActivityAction::Create,
                EntityType::Transaction,
                Some(txn.id),
                format!("新增{}流水 {:.2}（{}）", txn.txn_type, txn.amount, txn.category),
            )
            .await;
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(txn, "Transaction created successfully")))
        }
        Err(e) => Ok(storage_error_response(&e, ErrorCode::TransactionInvalid)),
    }
}

pub async fn get_transaction(
    service: &FinanceService,
    request: &HttpRequest,
    id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_transaction_by_id(id).await {
        Ok(Some(txn)) => Ok(HttpResponse::Ok()
            .json(ApiResponse::success(txn, "Transaction retrieved successfully"))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::TransactionNotFound,
            "Transaction not found",
        ))),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::TransactionNotFound)),
    }
}

pub async fn delete_transaction(
    service: &FinanceService,
    request: &HttpRequest,
    id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.delete_transaction(id).await {
        Ok(true) => {
            record_activity(
                &storage,
                request,
                ActivityAction::Delete,
                EntityType::Transaction,
                Some(id),
                format!("删除流水 #{id}"),
            )
            .await;
            Ok(HttpResponse::Ok()
                .json(ApiResponse::success_empty("Transaction deleted successfully")))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::TransactionNotFound,
            "Transaction not found",
        ))),
        Err(e @ SchoolError::Conflict(_)) => {
            Ok(storage_error_response(&e, ErrorCode::TransactionLocked))
        }
        Err(e) => Ok(storage_error_response(&e, ErrorCode::TransactionNotFound)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(txn_type: TxnType, counter: Option<i64>, amount: f64) -> CreateTransactionRequest {
        CreateTransactionRequest {
            account_id: 1,
            counter_account_id: counter,
            txn_type,
            amount,
            category: None,
            description: None,
            reference: None,
            txn_date: None,
        }
    }

    #[test]
    fn test_transfer_needs_distinct_counter_account() {
        assert!(build_transaction(request(TxnType::Transfer, None, 10.0), None).is_err());
        assert!(build_transaction(request(TxnType::Transfer, Some(1), 10.0), None).is_err());
        let txn = build_transaction(request(TxnType::Transfer, Some(2), 10.0), Some(9)).unwrap();
        assert_eq!(txn.counter_account_id, Some(2));
        assert_eq!(txn.created_by, Some(9));
    }

    #[test]
    fn test_amount_and_category() {
        assert!(build_transaction(request(TxnType::Income, None, 0.0), None).is_err());
        // 非转账忽略目标账户
        let txn = build_transaction(request(TxnType::Expense, Some(5), 20.0), None).unwrap();
        assert_eq!(txn.counter_account_id, None);
        assert_eq!(txn.category, DEFAULT_CATEGORY);

        let mut req = request(TxnType::Income, None, 20.0);
        req.category = Some(" Donation ".to_string());
        assert_eq!(build_transaction(req, None).unwrap().category, "donation");
    }
}
