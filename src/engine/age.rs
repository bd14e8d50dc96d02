// ==========================================
// MooTracker 牧场管理系统 - 日龄/间隔计算
// ==========================================
// 职责: 日期差 → 整数天数/月数
// 红线: today 由调用方注入,引擎内部不读取系统时钟
// 说明: 月数按固定 30 天/月折算,阈值(6/12/24 月)按此口径校准,不改为日历月
// ==========================================

use chrono::{Duration, NaiveDate};

/// 固定折算: 1 月 = 30 天
pub const DAYS_PER_MONTH: i64 = 30;

/// `date` 至 `today` 经过的整天数（`date` 在未来时为负数）
pub fn days_since(date: NaiveDate, today: NaiveDate) -> i64 {
    (today - date).num_days()
}

/// 距 `date` 还有多少天（已过去时为负数）
pub fn days_until(date: NaiveDate, today: NaiveDate) -> i64 {
    -days_since(date, today)
}

/// `floor(days_since / 30)`,负数向下取整
pub fn months_since(date: NaiveDate, today: NaiveDate) -> i64 {
    days_since(date, today).div_euclid(DAYS_PER_MONTH)
}

/// `date` 加上若干天,超出日期范围时为 None
pub fn plus_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::try_days(days)?)
}

/// `date` 加上若干个（30 天）月,超出日期范围时为 None
pub fn plus_months(date: NaiveDate, months: i64) -> Option<NaiveDate> {
    plus_days(date, months.checked_mul(DAYS_PER_MONTH)?)
}
