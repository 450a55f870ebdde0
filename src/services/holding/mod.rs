//! 持股分布数据
//!
//! 字段清洗、SQLite 存储及公共时间函数

mod clean;
mod common;
mod store;

pub use clean::{clean_float, clean_int, clean_text, row_date, stringify};
pub use common::{format_chart_date, market_now, market_today};
pub use store::HoldingStore;
