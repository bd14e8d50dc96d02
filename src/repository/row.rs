// ==========================================
// MooTracker 牧场管理系统 - 行映射辅助
// ==========================================
// 日期统一存储为 "%Y-%m-%d",时间戳为 "%Y-%m-%d %H:%M:%S"
// 枚举统一存储为 to_db_str() 的大写形式
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::Type;

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";
pub(crate) const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn conversion_error(idx: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, message.into())
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub(crate) fn format_datetime(ts: NaiveDateTime) -> String {
    ts.format(DATETIME_FORMAT).to_string()
}

pub(crate) fn parse_date(idx: usize, raw: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| conversion_error(idx, format!("日期格式错误 '{}': {}", raw, e)))
}

pub(crate) fn parse_opt_date(idx: usize, raw: Option<String>) -> rusqlite::Result<Option<NaiveDate>> {
    raw.filter(|s| !s.trim().is_empty())
        .map(|s| parse_date(idx, s.trim()))
        .transpose()
}

pub(crate) fn parse_datetime(idx: usize, raw: &str) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT)
        .map_err(|e| conversion_error(idx, format!("时间格式错误 '{}': {}", raw, e)))
}

/// 解析枚举列（未知取值报错,不做静默兜底）
pub(crate) fn parse_enum<T>(idx: usize, raw: &str, parse: fn(&str) -> Option<T>) -> rusqlite::Result<T> {
    parse(raw).ok_or_else(|| conversion_error(idx, format!("未知取值: {}", raw)))
}

pub(crate) fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}
