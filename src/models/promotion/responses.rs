use serde::Serialize;
use ts_rs::TS;

use super::entities::PromotionOutcome;

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/promotion.ts")]
pub struct PromotionItem {
    pub student_id: i64,
    pub admission_number: String,
    pub student_name: String,
    pub from_class: Option<String>,
    pub to_class: Option<String>,
    pub outcome: PromotionOutcome,
    pub reason: Option<String>,
    pub fee_records_created: i64,
}

// 升级报告
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/promotion.ts")]
pub struct PromotionReport {
    pub from_academic_year: String,
    pub to_academic_year: String,
    // 预览时为 true，不写入数据库
    pub dry_run: bool,
    pub promoted: i64,
    pub graduated: i64,
    pub skipped: i64,
    pub failed: i64,
    pub fee_records_created: i64,
    pub items: Vec<PromotionItem>,
}

impl PromotionReport {
    pub fn new(from: &str, to: &str, dry_run: bool) -> Self {
        Self {
            from_academic_year: from.to_string(),
            to_academic_year: to.to_string(),
            dry_run,
            promoted: 0,
            graduated: 0,
            skipped: 0,
            failed: 0,
            fee_records_created: 0,
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, item: PromotionItem) {
        match item.outcome {
            PromotionOutcome::Promoted => self.promoted += 1,
            PromotionOutcome::Graduated => self.graduated += 1,
            PromotionOutcome::Skipped => self.skipped += 1,
            PromotionOutcome::Failed => self.failed += 1,
        }
        self.fee_records_created += item.fee_records_created;
        self.items.push(item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(outcome: PromotionOutcome, fees: i64) -> PromotionItem {
        PromotionItem {
            student_id: 1,
            admission_number: "A001".to_string(),
            student_name: "Test".to_string(),
            from_class: Some("Grade 1".to_string()),
            to_class: None,
            outcome,
            reason: None,
            fee_records_created: fees,
        }
    }

    #[test]
    fn test_report_counts() {
        let mut report = PromotionReport::new("2025-2026", "2026-2027", false);
        report.push(item(PromotionOutcome::Promoted, 3));
        report.push(item(PromotionOutcome::Promoted, 2));
        report.push(item(PromotionOutcome::Graduated, 0));
        report.push(item(PromotionOutcome::Skipped, 0));
        assert_eq!(report.promoted, 2);
        assert_eq!(report.graduated, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed, 0);
        assert_eq!(report.fee_records_created, 5);
        assert_eq!(report.items.len(), 4);
    }
}
