//! 可打印的 HTML 收据

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::FeeService;
use crate::models::{
    ApiResponse, ErrorCode,
    fees::entities::{FeePaymentDetail, FeeRecordDetail},
};
use crate::services::{DynamicConfig, storage_error_response};

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// 渲染收据；record 为缴费所属的收费记录（当前状态）
pub fn render_receipt(
    school_name: &str,
    payment: &FeePaymentDetail,
    record: Option<&FeeRecordDetail>,
) -> String {
    let p = &payment.payment;
    let mut rows = vec![
        ("收据编号", p.receipt_number.clone()),
        ("缴费日期", p.paid_at.format("%Y-%m-%d %H:%M").to_string()),
        ("学生", payment.student_name.clone()),
        ("学籍号", payment.admission_number.clone()),
        ("班级", payment.class_name.clone().unwrap_or_else(|| "-".to_string())),
        ("学年", payment.academic_year.clone()),
        ("收费项目", payment.fee_type_name.clone()),
        ("缴费方式", p.method.to_string()),
        ("实缴金额", format!("{:.2}", p.amount)),
        ("减免金额", format!("{:.2}", p.discount)),
    ];
    if let Some(record) = record {
        rows.push(("应收总额", format!("{:.2}", record.record.total_amount)));
        rows.push(("剩余应缴", format!("{:.2}", record.remaining)));
    }
    if let Some(name) = &payment.collected_by_name {
        rows.push(("经办人", name.clone()));
    }
    if let Some(remarks) = p.remarks.as_deref().filter(|r| !r.is_empty()) {
        rows.push(("备注", remarks.to_string()));
    }

    let body: String = rows
        .iter()
        .map(|(label, value)| {
            format!(
                "<tr><th>{}</th><td>{}</td></tr>",
                label,
                escape_html(value)
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="zh-CN">
<head>
<meta charset="utf-8">
<title>收据 {receipt}</title>
<style>
body {{ font-family: sans-serif; max-width: 640px; margin: 24px auto; }}
h1 {{ text-align: center; margin-bottom: 4px; }}
h2 {{ text-align: center; font-weight: normal; margin-top: 0; }}
table {{ width: 100%; border-collapse: collapse; }}
th, td {{ border: 1px solid #999; padding: 6px 10px; text-align: left; }}
th {{ width: 30%; background: #f3f3f3; }}
.sign {{ margin-top: 48px; text-align: right; }}
@media print {{ button {{ display: none; }} }}
</style>
</head>
<body>
<h1>{school}</h1>
<h2>缴费收据</h2>
<table>{body}</table>
<p class="sign">签章：______________</p>
<button onclick="window.print()">打印</button>
</body>
</html>
"#,
        receipt = escape_html(&p.receipt_number),
        school = escape_html(school_name),
        body = body,
    )
}

pub async fn payment_receipt(
    service: &FeeService,
    request: &HttpRequest,
    id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let payment = match storage.get_fee_payment_detail(id).await {
        Ok(Some(payment)) => payment,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::PaymentNotFound,
                "Payment not found",
            )));
        }
        Err(e) => return Ok(storage_error_response(&e, ErrorCode::PaymentNotFound)),
    };

    let ctx = DynamicConfig::fee_context().await;
    let record = match storage
        .get_fee_record_detail(payment.payment.record_id, ctx)
        .await
    {
        Ok(detail) => detail.map(|d| d.record),
        Err(e) => return Ok(storage_error_response(&e, ErrorCode::FeeRecordNotFound)),
    };

    let school_name = DynamicConfig::school_name().await;
    let html = render_receipt(&school_name, &payment, record.as_ref());

    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fees::entities::{FeePayment, PaymentMethod};

    fn payment(remarks: Option<&str>) -> FeePaymentDetail {
        FeePaymentDetail {
            payment: FeePayment {
                id: 1,
                record_id: 2,
                student_id: 3,
                amount: 1500.0,
                discount: 100.0,
                method: PaymentMethod::Cash,
                receipt_number: "RCP-20250410-ABC234".to_string(),
                paid_at: chrono::Utc::now(),
                account_id: None,
                transaction_id: None,
                collected_by: None,
                remarks: remarks.map(str::to_string),
                created_at: chrono::Utc::now(),
            },
            student_name: "Asha <Rao>".to_string(),
            admission_number: "A-001".to_string(),
            class_name: Some("Grade 3".to_string()),
            fee_type_name: "Tuition".to_string(),
            academic_year: "2025-2026".to_string(),
            collected_by_name: Some("frontdesk".to_string()),
        }
    }

    #[test]
    fn test_receipt_contains_fields() {
        let html = render_receipt("Green Valley School", &payment(None), None);
        assert!(html.contains("RCP-20250410-ABC234"));
        assert!(html.contains("1500.00"));
        assert!(html.contains("Green Valley School"));
        assert!(html.contains("frontdesk"));
        assert!(!html.contains("备注"));
    }

    #[test]
    fn test_receipt_escapes_html() {
        let html = render_receipt("S&S", &payment(Some("<script>")), None);
        assert!(html.contains("Asha &lt;Rao&gt;"));
        assert!(html.contains("S&amp;S"));
        assert!(!html.contains("<script>"));
    }
}
