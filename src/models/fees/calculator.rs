//! 收费计算
//!
//! 学年、分期到期日、应收、剩余和状态推导都是纯函数，
//! 存储层、接口和定时任务共用同一套规则。

use chrono::{Datelike, Duration, Months, NaiveDate};
use std::fmt;
use std::str::FromStr;

use super::entities::{FeeFrequency, FeeStatus};

/// 金额比较容差
pub const AMOUNT_EPSILON: f64 = 0.005;

/// 金额保留两位小数
pub fn round_amount(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl FeeFrequency {
    /// 每学年的缴费期数
    pub fn periods_per_year(&self) -> u32 {
        match self {
            FeeFrequency::Monthly => 12,
            FeeFrequency::Quarterly => 4,
            FeeFrequency::Biannual => 2,
            FeeFrequency::Yearly | FeeFrequency::OneTime => 1,
        }
    }

    /// 相邻两期间隔的月数
    pub fn months_between_periods(&self) -> u32 {
        12 / self.periods_per_year()
    }
}

/// 学年应收总额
pub fn yearly_amount(amount: f64, frequency: FeeFrequency) -> f64 {
    round_amount(amount * frequency.periods_per_year() as f64)
}

/// 学年，文本格式 `YYYY-YYYY`，后一年必须等于前一年加一
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AcademicYear {
    start_year: i32,
}

impl AcademicYear {
    pub fn new(start_year: i32) -> Self {
        Self { start_year }
    }

    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    pub fn end_year(&self) -> i32 {
        self.start_year + 1
    }

    pub fn next(&self) -> Self {
        Self::new(self.start_year + 1)
    }

    /// 某日期所在的学年
    pub fn containing(date: NaiveDate, start_month: u32) -> Self {
        if date.month() >= start_month {
            Self::new(date.year())
        } else {
            Self::new(date.year() - 1)
        }
    }
}

impl FromStr for AcademicYear {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("Invalid academic year '{s}', expected format YYYY-YYYY");
        let (first, second) = s.trim().split_once('-').ok_or_else(invalid)?;
        if first.len() != 4 || second.len() != 4 {
            return Err(invalid());
        }
        let first: i32 = first.parse().map_err(|_| invalid())?;
        let second: i32 = second.parse().map_err(|_| invalid())?;
        if second != first + 1 {
            return Err(format!(
                "Invalid academic year '{s}', the second year must follow the first"
            ));
        }
        Ok(Self::new(first))
    }
}

impl fmt::Display for AcademicYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start_year, self.end_year())
    }
}

/// 收费日历：学年起始月、每期截止日、逾期宽限天数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeCalendar {
    pub start_month: u32,
    pub due_day: u32,
    pub grace_days: i64,
}

impl FeeCalendar {
    /// 学年第一期的截止日
    pub fn first_due_date(&self, year: AcademicYear) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year.start_year(), self.start_month, self.due_day)
    }

    /// 学年内所有分期的截止日
    pub fn due_dates(&self, year: AcademicYear, frequency: FeeFrequency) -> Vec<NaiveDate> {
        self.first_due_date(year)
            .map(|first| due_schedule(first, frequency))
            .unwrap_or_default()
    }

    /// 今天所属学年
    pub fn current_year(&self, today: NaiveDate) -> AcademicYear {
        AcademicYear::containing(today, self.start_month)
    }
}

/// 计算收费状态时的参照：日历与“今天”
#[derive(Debug, Clone, Copy)]
pub struct FeeContext {
    pub calendar: FeeCalendar,
    pub as_of: NaiveDate,
}

impl FeeContext {
    pub fn grace_days(&self) -> i64 {
        self.calendar.grace_days
    }

    /// 学年第一期截止日，学年格式错误时返回 None
    pub fn first_due_date(&self, academic_year: &str) -> Option<NaiveDate> {
        let year = academic_year.parse::<AcademicYear>().ok()?;
        self.calendar.first_due_date(year)
    }
}

/// 第 k 期在第一期之后 k × (12 / 期数) 个月到期
pub fn due_schedule(first_due: NaiveDate, frequency: FeeFrequency) -> Vec<NaiveDate> {
    let step = frequency.months_between_periods();
    (0..frequency.periods_per_year())
        .filter_map(|k| first_due.checked_add_months(Months::new(k * step)))
        .collect()
}

/// 截至 `as_of`（含当天）已到期的期数
pub fn periods_due(schedule: &[NaiveDate], as_of: NaiveDate) -> u32 {
    schedule.iter().filter(|due| **due <= as_of).count() as u32
}

/// 剩余应缴 = max(0, 总额 − 已缴 − 减免)
pub fn remaining_amount(total: f64, paid: f64, discount: f64) -> f64 {
    round_amount((total - paid - discount).max(0.0))
}

/// 一条收费记录在某一时刻的缴费情况
#[derive(Debug, Clone, Copy)]
pub struct FeeStanding<'a> {
    pub amount_per_period: f64,
    pub total: f64,
    pub paid: f64,
    pub discount: f64,
    pub schedule: &'a [NaiveDate],
    pub waived: bool,
}

impl FeeStanding<'_> {
    fn covered(&self) -> f64 {
        self.paid + self.discount
    }

    /// 截至 `as_of` 的应收金额
    pub fn accrued(&self, as_of: NaiveDate) -> f64 {
        let due = periods_due(self.schedule, as_of) as f64;
        round_amount((self.amount_per_period * due).min(self.total))
    }

    /// 超过宽限期仍未覆盖的金额
    pub fn overdue_amount(&self, as_of: NaiveDate, grace_days: i64) -> f64 {
        if self.waived {
            return 0.0;
        }
        let lapsed = self
            .schedule
            .iter()
            .filter(|due| **due + Duration::days(grace_days.max(0)) < as_of)
            .count() as f64;
        let owed = (self.amount_per_period * lapsed).min(self.total);
        round_amount((owed - self.covered()).max(0.0))
    }

    /// 状态推导：waived 不会被覆盖；缴清为 paid；
    /// 否则超过宽限期的已到期部分未覆盖为 overdue；有过缴费为 partial；其余 pending
    pub fn status(&self, as_of: NaiveDate, grace_days: i64) -> FeeStatus {
        if self.waived {
            return FeeStatus::Waived;
        }
        if self.total > 0.0 && self.covered() + AMOUNT_EPSILON >= self.total {
            return FeeStatus::Paid;
        }
        if self.overdue_amount(as_of, grace_days) > AMOUNT_EPSILON {
            return FeeStatus::Overdue;
        }
        if self.covered() > AMOUNT_EPSILON {
            return FeeStatus::Partial;
        }
        FeeStatus::Pending
    }

    /// 下一个尚未覆盖的分期截止日
    pub fn next_due_date(&self) -> Option<NaiveDate> {
        if self.amount_per_period <= 0.0 {
            return None;
        }
        let covered_periods = ((self.covered() + AMOUNT_EPSILON) / self.amount_per_period).floor();
        self.schedule.get(covered_periods as usize).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn calendar() -> FeeCalendar {
        FeeCalendar {
            start_month: 4,
            due_day: 10,
            grace_days: 0,
        }
    }

    #[test]
    fn test_yearly_amount_by_frequency() {
        assert_eq!(yearly_amount(1500.0, FeeFrequency::Monthly), 18000.0);
        assert_eq!(yearly_amount(4000.0, FeeFrequency::Quarterly), 16000.0);
        assert_eq!(yearly_amount(7000.0, FeeFrequency::Biannual), 14000.0);
        assert_eq!(yearly_amount(12000.0, FeeFrequency::Yearly), 12000.0);
        assert_eq!(yearly_amount(500.0, FeeFrequency::OneTime), 500.0);
    }

    #[test]
    fn test_academic_year_parse() {
        let year: AcademicYear = "2025-2026".parse().unwrap();
        assert_eq!(year.start_year(), 2025);
        assert_eq!(year.to_string(), "2025-2026");
        assert_eq!(year.next().to_string(), "2026-2027");
        assert!("2025-2027".parse::<AcademicYear>().is_err());
        assert!("25-26".parse::<AcademicYear>().is_err());
        assert!("2025".parse::<AcademicYear>().is_err());
    }

    #[test]
    fn test_academic_year_containing() {
        assert_eq!(AcademicYear::containing(date(2025, 3, 31), 4).start_year(), 2024);
        assert_eq!(AcademicYear::containing(date(2025, 4, 1), 4).start_year(), 2025);
        assert_eq!(AcademicYear::containing(date(2025, 1, 15), 1).start_year(), 2025);
    }

    #[test]
    fn test_due_dates_wrap_into_next_year() {
        let year: AcademicYear = "2025-2026".parse().unwrap();
        let quarterly = calendar().due_dates(year, FeeFrequency::Quarterly);
        assert_eq!(
            quarterly,
            vec![
                date(2025, 4, 10),
                date(2025, 7, 10),
                date(2025, 10, 10),
                date(2026, 1, 10)
            ]
        );

        let monthly = calendar().due_dates(year, FeeFrequency::Monthly);
        assert_eq!(monthly.len(), 12);
        assert_eq!(monthly[11], date(2026, 3, 10));

        let biannual = calendar().due_dates(year, FeeFrequency::Biannual);
        assert_eq!(biannual, vec![date(2025, 4, 10), date(2025, 10, 10)]);
    }

    #[test]
    fn test_accrued_and_remaining() {
        let schedule = due_schedule(date(2025, 4, 10), FeeFrequency::Monthly);
        let standing = FeeStanding {
            amount_per_period: 1000.0,
            total: 12000.0,
            paid: 0.0,
            discount: 0.0,
            schedule: &schedule,
            waived: false,
        };
        assert_eq!(standing.accrued(date(2025, 4, 9)), 0.0);
        assert_eq!(standing.accrued(date(2025, 4, 10)), 1000.0);
        assert_eq!(standing.accrued(date(2025, 6, 30)), 3000.0);
        assert_eq!(standing.accrued(date(2027, 1, 1)), 12000.0);

        assert_eq!(remaining_amount(12000.0, 2500.0, 500.0), 9000.0);
        assert_eq!(remaining_amount(100.0, 80.0, 30.0), 0.0);
    }

    #[test]
    fn test_status_paid_once_covered() {
        let schedule = due_schedule(date(2025, 4, 10), FeeFrequency::Yearly);
        let standing = FeeStanding {
            amount_per_period: 12000.0,
            total: 12000.0,
            paid: 11000.0,
            discount: 1000.0,
            schedule: &schedule,
            waived: false,
        };
        assert_eq!(standing.status(date(2025, 5, 1), 0), FeeStatus::Paid);
    }

    #[test]
    fn test_status_overdue_respects_grace() {
        let schedule = due_schedule(date(2025, 4, 10), FeeFrequency::Monthly);
        let standing = FeeStanding {
            amount_per_period: 1000.0,
            total: 12000.0,
            paid: 1000.0,
            discount: 0.0,
            schedule: &schedule,
            waived: false,
        };
        // 第一期已缴，第二期 5 月 10 日到期
        assert_eq!(standing.status(date(2025, 5, 10), 0), FeeStatus::Partial);
        assert_eq!(standing.status(date(2025, 5, 11), 0), FeeStatus::Overdue);
        assert_eq!(standing.status(date(2025, 5, 14), 5), FeeStatus::Partial);
        assert_eq!(standing.status(date(2025, 5, 16), 5), FeeStatus::Overdue);
        // 4/10、5/10、6/10 三期已过期，已缴一期
        assert_eq!(standing.overdue_amount(date(2025, 6, 11), 0), 2000.0);
    }

    #[test]
    fn test_status_pending_and_waived() {
        let schedule = due_schedule(date(2025, 4, 10), FeeFrequency::Quarterly);
        let mut standing = FeeStanding {
            amount_per_period: 3000.0,
            total: 12000.0,
            paid: 0.0,
            discount: 0.0,
            schedule: &schedule,
            waived: false,
        };
        assert_eq!(standing.status(date(2025, 4, 1), 0), FeeStatus::Pending);
        assert_eq!(standing.status(date(2025, 4, 11), 0), FeeStatus::Overdue);
        standing.waived = true;
        assert_eq!(standing.status(date(2025, 12, 1), 0), FeeStatus::Waived);
        assert_eq!(standing.overdue_amount(date(2025, 12, 1), 0), 0.0);
    }

    #[test]
    fn test_next_due_date() {
        let schedule = due_schedule(date(2025, 4, 10), FeeFrequency::Quarterly);
        let standing = FeeStanding {
            amount_per_period: 3000.0,
            total: 12000.0,
            paid: 4500.0,
            discount: 0.0,
            schedule: &schedule,
            waived: false,
        };
        assert_eq!(standing.next_due_date(), Some(date(2025, 7, 10)));
    }
}
