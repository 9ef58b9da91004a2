use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use once_cell::sync::Lazy;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::{
    PromotionService,
    plan::{ClassIndex, PlannedMove, plan_student, unknown_targets},
};
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    activity::entities::{ActivityAction, EntityType},
    fees::calculator::AcademicYear,
    promotion::{
        entities::{PromotionOutcome, PromotionStep},
        requests::PromotionRequest,
        responses::{PromotionItem, PromotionReport},
    },
    students::requests::EnrolledStudentFilter,
    system::entities::KnownSettingKey,
};
use crate::services::{DynamicConfig, export, record_activity, storage_error_response};

// 同一时间只允许一个升级任务写入
static PROMOTION_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

fn bad_request(code: ErrorCode, msg: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(code, msg))
}

/// 校验学年：新学年必须紧接原学年
pub(super) fn check_years(from: &str, to: &str) -> Result<(AcademicYear, AcademicYear), String> {
    let from_year = from.trim().parse::<AcademicYear>()?;
    let to_year = to.trim().parse::<AcademicYear>()?;
    if to_year != from_year.next() {
        return Err(format!("新学年应为 {}，实际为 {to_year}", from_year.next()));
    }
    Ok((from_year, to_year))
}

pub async fn promote(
    service: &PromotionService,
    request: &HttpRequest,
    req: PromotionRequest,
    dry_run: bool,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let (from_year, to_year) = match check_years(&req.from_academic_year, &req.to_academic_year) {
        Ok(years) => years,
        Err(msg) => return Ok(bad_request(ErrorCode::BadRequest, msg)),
    };
    let (from_str, to_str) = (from_year.to_string(), to_year.to_string());

    let map = DynamicConfig::promotion_class_map().await;
    if map.is_empty() {
        return Ok(bad_request(
            ErrorCode::PromotionMapInvalid,
            "未配置升级映射 promotion.class_map",
        ));
    }

    let classes = match storage.list_all_classes().await {
        Ok(classes) => classes,
        Err(e) => return Ok(storage_error_response(&e, ErrorCode::PromotionFailed)),
    };
    let index = ClassIndex::new(&classes);
    let missing = unknown_targets(&map, &index);
    if !missing.is_empty() {
        warn!("Promotion map references unknown classes: {:?}", missing);
    }

    // 预览不持有锁
    let _guard = if dry_run {
        None
    } else {
        match PROMOTION_LOCK.try_lock() {
            Ok(guard) => Some(guard),
            Err(_) => {
                return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                    ErrorCode::PromotionFailed,
                    "已有升级任务正在执行",
                )));
            }
        }
    };

    let students = match storage
        .list_enrolled_students(EnrolledStudentFilter {
            academic_year: Some(from_str.clone()),
            ..Default::default()
        })
        .await
    {
        Ok(students) => students,
        Err(e) => return Ok(storage_error_response(&e, ErrorCode::PromotionFailed)),
    };

    let ctx = DynamicConfig::fee_context().await;
    let first_due_date = ctx.calendar.first_due_date(to_year);
    let mut report = PromotionReport::new(&from_str, &to_str, dry_run);

    for student in &students {
        let from_class = student
            .class_id
            .and_then(|id| index.name_of(id))
            .map(str::to_string);
        let mut item = PromotionItem {
            student_id: student.id,
            admission_number: student.admission_number.clone(),
            student_name: student.full_name(),
            from_class,
            to_class: None,
            outcome: PromotionOutcome::Skipped,
            reason: None,
            fee_records_created: 0,
        };

        let target_class_id = match plan_student(student, &map, &index) {
            PlannedMove::Skip(reason) => {
                item.reason = Some(reason);
                report.push(item);
                continue;
            }
            PlannedMove::Graduate => {
                item.outcome = PromotionOutcome::Graduated;
                None
            }
            PlannedMove::Promote {
                class_id,
                class_name,
            } => {
                item.outcome = PromotionOutcome::Promoted;
                item.to_class = Some(class_name);
                Some(class_id)
            }
        };

        if !dry_run {
            let step = PromotionStep {
                student_id: student.id,
                target_class_id,
                to_academic_year: to_str.clone(),
                generate_fees: req.generate_fees,
                first_due_date,
            };
            match storage.promote_student(step, ctx).await {
                Ok(created) => item.fee_records_created = created,
                Err(e) => {
                    warn!(
                        "Promotion failed for student {} ({}): {}",
                        student.id,
                        student.admission_number,
                        e.format_simple()
                    );
                    item.outcome = PromotionOutcome::Failed;
                    item.reason = Some(e.message().to_string());
                }
            }
        }
        report.push(item);
    }

    info!(
        "Promotion {} -> {}{}: promoted {}, graduated {}, skipped {}, failed {}, fee records {}",
        from_str,
        to_str,
        if dry_run { " (preview)" } else { "" },
        report.promoted,
        report.graduated,
        report.skipped,
        report.failed,
        report.fee_records_created
    );

    if !dry_run {
        advance_academic_year(&storage, request, &to_str).await;
        record_activity(
            &storage,
            request,
            ActivityAction::Promote,
            EntityType::Promotion,
            None,
            format!(
                "{from_str} 升级到 {to_str}：升级 {}，毕业 {}，跳过 {}，失败 {}",
                report.promoted, report.graduated, report.skipped, report.failed
            ),
        )
        .await;
    }

    if req.export {
        return match export::promotion_report_xlsx(&report) {
            Ok(buffer) => {
                let name = if dry_run {
                    format!("promotion_preview_{from_str}")
                } else {
                    format!("promotion_{from_str}")
                };
                Ok(export::xlsx_response(buffer, &name))
            }
            Err(e) => Ok(storage_error_response(&e, ErrorCode::ExportFailed)),
        };
    }

    let message = if dry_run {
        "Promotion preview generated"
    } else {
        "Promotion executed"
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(report, message)))
}

// 升级完成后当前学年切换到新学年，失败只记录日志
async fn advance_academic_year(
    storage: &std::sync::Arc<dyn crate::storage::Storage>,
    request: &HttpRequest,
    to_year: &str,
) {
    let key = KnownSettingKey::CurrentAcademicYear.as_str();
    let user_id = RequireJWT::extract_user_id(request);
    match storage.update_setting(key, to_year, user_id).await {
        Ok(Some(_)) => {
            DynamicConfig::update(key, to_year).await;
            info!("Current academic year advanced to {}", to_year);
        }
        Ok(None) => warn!("Setting {} not found, academic year not advanced", key),
        Err(e) => warn!("Failed to advance academic year: {}", e.format_simple()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_years() {
        let (from, to) = check_years("2025-2026", " 2026-2027 ").unwrap();
        assert_eq!(from.to_string(), "2025-2026");
        assert_eq!(to.to_string(), "2026-2027");
        assert!(check_years("2025-2026", "2027-2028").is_err());
        assert!(check_years("2025-2026", "2025-2026").is_err());
        assert!(check_years("2025", "2026-2027").is_err());
    }
}
