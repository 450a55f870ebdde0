//! 公共常量和辅助函数

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Asia::Taipei;
use chrono_tz::Tz;

/// 图表日期格式
pub const CHART_DATE_FORMAT: &str = "%Y/%m/%d";

/// 获取台北时间（UTC+8）
pub fn market_now() -> DateTime<Tz> {
    Utc::now().with_timezone(&Taipei)
}

/// 台北时间的当天日期，用于计算图表窗口
pub fn market_today() -> NaiveDate {
    market_now().date_naive()
}

/// 格式化为图表日期，如 2026/02/18
pub fn format_chart_date(date: NaiveDate) -> String {
    date.format(CHART_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_chart_date() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 8).unwrap();
        assert_eq!(format_chart_date(date), "2026/02/08");
    }

    #[test]
    fn test_market_now_offset() {
        assert!(market_now().to_rfc3339().ends_with("+08:00"));
    }
}
