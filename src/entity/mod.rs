//! SeaORM 实体定义
//!
//! 这些实体用于数据库操作，与 models 模块中的业务实体分离。
//! Storage 层使用这些实体进行 CRUD 操作，然后转换为 models 中的业务实体。
//! 时间戳统一保存为 Unix 秒，日期保存为 `YYYY-MM-DD` 字符串。

pub mod prelude;

pub mod accounts;
pub mod active_sessions;
pub mod activity_logs;
pub mod class_fee_structures;
pub mod classes;
pub mod fee_payments;
pub mod fee_types;
pub mod files;
pub mod staff;
pub mod student_fee_customs;
pub mod student_fee_records;
pub mod students;
pub mod system_settings;
pub mod transactions;
pub mod users;

use chrono::{DateTime, NaiveDate, Utc};

/// Unix 秒 -> UTC 时间
pub(crate) fn from_ts(ts: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()
}

/// 数据库日期字符串 -> 日期，格式错误时视为空
pub(crate) fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    value.and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

/// 日期 -> 数据库日期字符串
pub(crate) fn format_date(value: Option<NaiveDate>) -> Option<String> {
    value.map(|d| d.format("%Y-%m-%d").to_string())
}

/// 日期当天零点（UTC）的 Unix 秒
pub(crate) fn date_to_ts(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_helpers() {
        let d = NaiveDate::from_ymd_opt(2025, 4, 10).unwrap();
        assert_eq!(format_date(Some(d)).as_deref(), Some("2025-04-10"));
        assert_eq!(parse_date(Some("2025-04-10")), Some(d));
        assert_eq!(parse_date(Some("10/04/2025")), None);
        assert_eq!(from_ts(date_to_ts(d)).date_naive(), d);
    }
}
