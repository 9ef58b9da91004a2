//! XLSX 报表生成
//!
//! 收费记录、操作日志和升级报告的导出共用这里的表格写入。

use actix_web::HttpResponse;
use chrono::Utc;
use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::errors::Result;
use crate::models::{
    activity::entities::ActivityLog, fees::entities::FeeRecordDetail,
    promotion::responses::PromotionReport,
};

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// 以附件形式返回 XLSX，文件名带时间戳
pub fn xlsx_response(buffer: Vec<u8>, name: &str) -> HttpResponse {
    let timestamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
    let filename = format!("{name}_{timestamp}.xlsx");

    HttpResponse::Ok()
        .content_type(XLSX_CONTENT_TYPE)
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{filename}\""),
        ))
        .body(buffer)
}

fn write_header(sheet: &mut Worksheet, headers: &[&str], format: &Format) -> Result<()> {
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, format)?;
    }
    Ok(())
}

/// 收费记录明细
pub fn fee_records_xlsx(records: &[FeeRecordDetail]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let money_format = Format::new().set_num_format("0.00");

    let sheet = workbook.add_worksheet().set_name("收费记录")?;
    write_header(
        sheet,
        &[
            "学号",
            "姓名",
            "班级",
            "收费项目",
            "学年",
            "频率",
            "应收",
            "已缴",
            "减免",
            "剩余",
            "已到期",
            "逾期",
            "状态",
            "下次截止",
        ],
        &header_format,
    )?;

    for (i, d) in records.iter().enumerate() {
        let row = (i + 1) as u32;
        sheet.write_string(row, 0, &d.admission_number)?;
        sheet.write_string(row, 1, &d.student_name)?;
        sheet.write_string(row, 2, d.class_name.as_deref().unwrap_or(""))?;
        sheet.write_string(row, 3, &d.fee_type_name)?;
        sheet.write_string(row, 4, &d.record.academic_year)?;
        sheet.write_string(row, 5, d.record.frequency.as_str())?;
        sheet.write_number_with_format(row, 6, d.record.total_amount, &money_format)?;
        sheet.write_number_with_format(row, 7, d.record.paid_amount, &money_format)?;
        sheet.write_number_with_format(row, 8, d.record.discount_amount, &money_format)?;
        sheet.write_number_with_format(row, 9, d.remaining, &money_format)?;
        sheet.write_number_with_format(row, 10, d.accrued, &money_format)?;
        sheet.write_number_with_format(row, 11, d.overdue, &money_format)?;
        sheet.write_string(row, 12, d.record.status.as_str())?;
        let next_due = d
            .next_due_date
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        sheet.write_string(row, 13, &next_due)?;
    }
    sheet.autofit();

    Ok(workbook.save_to_buffer()?)
}

/// 操作日志
pub fn activity_logs_xlsx(logs: &[ActivityLog]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let sheet = workbook.add_worksheet().set_name("操作日志")?;
    write_header(
        sheet,
        &["时间", "用户", "操作", "对象", "对象 ID", "描述", "IP"],
        &header_format,
    )?;

    for (i, log) in logs.iter().enumerate() {
        let row = (i + 1) as u32;
        sheet.write_string(
            row,
            0,
            log.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        )?;
        sheet.write_string(row, 1, log.username.as_deref().unwrap_or("-"))?;
        sheet.write_string(row, 2, log.action.as_str())?;
        sheet.write_string(row, 3, log.entity_type.as_str())?;
        if let Some(id) = log.entity_id {
            sheet.write_number(row, 4, id as f64)?;
        }
        sheet.write_string(row, 5, &log.description)?;
        sheet.write_string(row, 6, log.ip_address.as_deref().unwrap_or(""))?;
    }
    sheet.autofit();

    Ok(workbook.save_to_buffer()?)
}

/// 升级报告：摘要 + 学生明细
pub fn promotion_report_xlsx(report: &PromotionReport) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let title_format = Format::new().set_bold().set_font_size(14);

    let summary = workbook.add_worksheet().set_name("升级摘要")?;
    let title = if report.dry_run {
        "学年升级预览"
    } else {
        "学年升级报告"
    };
    summary.write_string_with_format(0, 0, title, &title_format)?;
    let rows: [(&str, String); 7] = [
        ("原学年", report.from_academic_year.clone()),
        ("新学年", report.to_academic_year.clone()),
        ("升级", report.promoted.to_string()),
        ("毕业", report.graduated.to_string()),
        ("跳过", report.skipped.to_string()),
        ("失败", report.failed.to_string()),
        ("新建收费记录", report.fee_records_created.to_string()),
    ];
    for (i, (label, value)) in rows.iter().enumerate() {
        let row = (i + 2) as u32;
        summary.write_string_with_format(row, 0, *label, &header_format)?;
        summary.write_string(row, 1, value)?;
    }
    summary.autofit();

    let details = workbook.add_worksheet().set_name("学生明细")?;
    write_header(
        details,
        &["学号", "姓名", "原班级", "新班级", "结果", "原因", "新建收费记录"],
        &header_format,
    )?;
    for (i, item) in report.items.iter().enumerate() {
        let row = (i + 1) as u32;
        details.write_string(row, 0, &item.admission_number)?;
        details.write_string(row, 1, &item.student_name)?;
        details.write_string(row, 2, item.from_class.as_deref().unwrap_or(""))?;
        details.write_string(row, 3, item.to_class.as_deref().unwrap_or(""))?;
        details.write_string(row, 4, item.outcome.as_str())?;
        details.write_string(row, 5, item.reason.as_deref().unwrap_or(""))?;
        details.write_number(row, 6, item.fee_records_created as f64)?;
    }
    details.autofit();

    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::promotion::{entities::PromotionOutcome, responses::PromotionItem};

    // xlsx 是 zip 格式
    fn is_zip(buffer: &[u8]) -> bool {
        buffer.starts_with(b"PK\x03\x04")
    }

    #[test]
    fn test_promotion_report_xlsx() {
        let mut report = PromotionReport::new("2025-2026", "2026-2027", true);
        report.push(PromotionItem {
            student_id: 1,
            admission_number: "A001".to_string(),
            student_name: "张三".to_string(),
            from_class: Some("Grade 1".to_string()),
            to_class: Some("Grade 2".to_string()),
            outcome: PromotionOutcome::Promoted,
            reason: None,
            fee_records_created: 2,
        });
        let buffer = promotion_report_xlsx(&report).unwrap();
        assert!(is_zip(&buffer));
    }

    #[test]
    fn test_empty_exports() {
        assert!(is_zip(&fee_records_xlsx(&[]).unwrap()));
        assert!(is_zip(&activity_logs_xlsx(&[]).unwrap()));
    }

    #[test]
    fn test_xlsx_response_headers() {
        let resp = xlsx_response(vec![1, 2, 3], "fees");
        let disposition = resp
            .headers()
            .get("Content-Disposition")
            .and_then(|v| v.to_str().ok())
            .unwrap();
        assert!(disposition.starts_with("attachment; filename=\"fees_"));
        assert!(disposition.ends_with(".xlsx\""));
    }
}
