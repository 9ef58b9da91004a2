use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Utc;
use tracing::{info, warn};

use super::FeeService;
use crate::errors::SchoolError;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    activity::entities::{ActivityAction, EntityType},
    fees::{
        entities::NewFeePayment,
        requests::{PaymentListParams, PaymentListQuery, RecordPaymentRequest},
    },
};
use crate::services::{DynamicConfig, record_activity, storage_error_response};
use crate::utils::generate_receipt_number;

// 收据编号冲突时重新生成的次数
const RECEIPT_ATTEMPTS: usize = 3;

fn validate_amounts(amount: f64, discount: f64) -> Result<(), &'static str> {
    if !amount.is_finite() || !discount.is_finite() {
        return Err("金额无效");
    }
    if amount < 0.0 || discount < 0.0 {
        return Err("缴费金额和减免金额不能为负数");
    }
    if amount + discount <= 0.0 {
        return Err("缴费金额与减免金额之和必须大于 0");
    }
    Ok(())
}

pub async fn record_payment(
    service: &FeeService,
    request: &HttpRequest,
    req: RecordPaymentRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    if let Err(msg) = validate_amounts(req.amount, req.discount) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::PaymentInvalid, msg)));
    }

    let paid_at = req.paid_at.unwrap_or_else(Utc::now);
    let prefix = DynamicConfig::receipt_prefix().await;
    let ctx = DynamicConfig::fee_context().await;
    let collected_by = RequireJWT::extract_user_id(request);

    let mut attempt = 0;
    let result = loop {
        attempt += 1;
        let payment = NewFeePayment {
            record_id: req.record_id,
            amount: req.amount,
            discount: req.discount,
            method: req.method,
            receipt_number: generate_receipt_number(&prefix, paid_at.date_naive()),
            paid_at,
            account_id: req.account_id,
            collected_by,
            remarks: req.remarks.clone(),
        };
        match storage.record_fee_payment(payment, ctx).await {
            Err(SchoolError::Conflict(msg)) if attempt < RECEIPT_ATTEMPTS => {
                warn!("Receipt number collision, retrying: {}", msg);
            }
            other => break other,
        }
    };

    match result {
        Ok(response) => {
            let payment = &response.payment;
            info!(
                "Payment {} recorded for record {} ({}): amount {:.2}, discount {:.2}",
                payment.payment.receipt_number,
                req.record_id,
                payment.admission_number,
                payment.payment.amount,
                payment.payment.discount
            );
            record_activity(
                &storage,
                request,
                ActivityAction::Payment,
                EntityType::FeePayment,
                Some(payment.payment.id),
                format!(
                    "{} 缴纳 {} {:.2}（减免 {:.2}），收据 {}",
                    payment.student_name,
                    payment.fee_type_name,
                    payment.payment.amount,
                    payment.payment.discount,
                    payment.payment.receipt_number
                ),
            )
            .await;
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(response, "Payment recorded successfully")))
        }
        Err(e) => Ok(storage_error_response(&e, ErrorCode::PaymentInvalid)),
    }
}

pub async fn list_payments(
    service: &FeeService,
    request: &HttpRequest,
    params: PaymentListParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let query = PaymentListQuery {
        page: Some(params.pagination.page),
        size: Some(params.pagination.size),
        student_id: params.student_id,
        record_id: params.record_id,
        method: params.method,
        from: params.from,
        to: params.to,
    };

    match storage.list_fee_payments(query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Payments retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::PaymentNotFound)),
    }
}

pub async fn get_payment(
    service: &FeeService,
    request: &HttpRequest,
    id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_fee_payment_detail(id).await {
        Ok(Some(payment)) => Ok(HttpResponse::Ok()
            .json(ApiResponse::success(payment, "Payment retrieved successfully"))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::PaymentNotFound,
            "Payment not found",
        ))),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::PaymentNotFound)),
    }
}

pub async fn delete_payment(
    service: &FeeService,
    request: &HttpRequest,
    id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let ctx = DynamicConfig::fee_context().await;

    // 冲销后缴费记录不再存在，先取收据编号用于日志
    let receipt_number = match storage.get_fee_payment_detail(id).await {
        Ok(Some(payment)) => payment.payment.receipt_number,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::PaymentNotFound,
                "Payment not found",
            )));
        }
        Err(e) => return Ok(storage_error_response(&e, ErrorCode::PaymentNotFound)),
    };

    match storage.delete_fee_payment(id, ctx).await {
        Ok(Some(record)) => {
            info!("Payment {} reversed, record {} recomputed", receipt_number, record.record.id);
            record_activity(
                &storage,
                request,
                ActivityAction::Reversal,
                EntityType::FeePayment,
                Some(id),
                format!(
                    "冲销 {} 的 {} 缴费，收据 {}",
                    record.student_name, record.fee_type_name, receipt_number
                ),
            )
            .await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(record, "Payment reversed successfully")))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::PaymentNotFound,
            "Payment not found",
        ))),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::PaymentNotFound)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_amounts() {
        assert!(validate_amounts(100.0, 0.0).is_ok());
        assert!(validate_amounts(0.0, 50.0).is_ok());
        assert!(validate_amounts(0.0, 0.0).is_err());
        assert!(validate_amounts(-1.0, 5.0).is_err());
        assert!(validate_amounts(f64::NAN, 0.0).is_err());
    }
}
