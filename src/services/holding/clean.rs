//! 字段清洗
//!
//! 上传文件中的数值可能是数字，也可能是带千分位逗号、`%` 或 `.0` 的字符串。
//! 所有函数都不会失败：无法解析的数值返回 0，无法解析的日期返回 `None`。

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value;

/// 日期必须是 8 位数字 YYYYMMDD
static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{8}$").expect("日期正则无效"));

/// 转为字符串，缺失或 null 返回 `None`
pub fn stringify(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// 整数清洗
///
/// 去掉逗号和空白，先按浮点数解析（兼容 `25932525.0`），再截断为整数。
/// 空值、无法解析、非有限值和负数都返回 0。
pub fn clean_int(value: Option<&Value>) -> i64 {
    stringify(value).map(|s| parse_int(&s)).unwrap_or(0)
}

fn parse_int(text: &str) -> i64 {
    let cleaned = text.replace(',', "");
    match cleaned.trim().parse::<f64>() {
        // `as` 对超出范围的值取饱和
        Ok(n) if n.is_finite() && n > 0.0 => n.trunc() as i64,
        _ => 0,
    }
}

/// 浮点数清洗
///
/// 去掉逗号、空白和末尾的 `%`，无法解析返回 0.0
pub fn clean_float(value: Option<&Value>) -> f64 {
    stringify(value).map(|s| parse_float(&s)).unwrap_or(0.0)
}

fn parse_float(text: &str) -> f64 {
    let cleaned = text.replace(',', "");
    let trimmed = cleaned.trim();
    let trimmed = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => 0.0,
    }
}

/// 文本字段，缺失或 null 返回空字符串
pub fn clean_text(value: Option<&Value>) -> String {
    stringify(value).unwrap_or_default()
}

/// 解析 YYYYMMDD 日期
///
/// 先截掉第一个 `.` 之后的部分（`20260218.0`），格式不对返回 `None`
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let head = text.split_once('.').map_or(text, |(head, _)| head);
    if !DATE_PATTERN.is_match(head) {
        return None;
    }
    NaiveDate::parse_from_str(head, "%Y%m%d").ok()
}

/// 行日期：缺失或假值（null、false、0、空串、空数组/对象）直接跳过
pub fn row_date(value: Option<&Value>) -> Option<NaiveDate> {
    let value = value?;
    if is_falsy(value) {
        return None;
    }
    parse_date(&stringify(Some(value))?)
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}
