//! 股票持股数据模型
//!
//! 定义持股分布记录、上传文件结构和看板视图

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Notice;

/// 单日持股分布记录
///
/// (stock_id, date) 为自然键，每只股票每天最多一笔
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StockRecord {
    /// 股票代码
    pub stock_id: String,
    /// 资料日期
    pub date: NaiveDate,
    /// 股票名称
    pub stock_name: String,
    /// 收盘价
    pub price: f64,
    /// 总股数
    pub total_shares: i64,
    /// 总人数
    pub total_people: i64,
    /// 大户门槛（原文）
    pub bengo_threshold: String,
    /// 大户人数
    pub major_people: i64,
    /// 大户持股比例（百分比）
    pub major_pct: f64,
    /// 备注
    pub note: String,
}

/// 股票列表项（代码 + 名称）
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct StockSummary {
    pub stock_id: String,
    pub stock_name: String,
}

/// 上传的 JSON 文件
///
/// 顶层字段可能是字符串或数字，由导入服务统一转换
#[derive(Debug, Deserialize)]
pub struct UploadDocument {
    #[serde(default)]
    pub stock_id: Option<Value>,
    #[serde(default)]
    pub stock_name: Option<Value>,
    #[serde(default)]
    pub history: Vec<HistoryRow>,
}

/// 历史资料中的一行，所有字段可选
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct HistoryRow {
    pub date: Option<Value>,
    pub price: Option<Value>,
    pub total_shares: Option<Value>,
    pub total_people: Option<Value>,
    pub threshold_str: Option<Value>,
    pub major_ppl: Option<Value>,
    pub major_pct: Option<Value>,
    pub note: Option<Value>,
}

/// 图表数据：三个等长序列
///
/// 无数据时序列化为 `{}`
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ChartData {
    /// 日期（YYYY/MM/DD）
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dates: Vec<String>,
    /// 价格
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prices: Vec<f64>,
    /// 大户持股比例
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub major_pcts: Vec<f64>,
}

/// 看板视图
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct DashboardView {
    /// 查询的股票代码
    pub query_stock: String,
    /// 显示名称
    pub stock_name_display: String,
    /// 图表数据
    pub chart_data: ChartData,
    /// 表格数据（新到旧）
    pub table_data: Vec<StockRecord>,
    /// 全部股票列表
    pub stock_list: Vec<StockSummary>,
    /// 提示消息
    pub notices: Vec<Notice>,
}

/// 看板查询参数
#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    /// 股票代码
    pub stock: Option<String>,
}

impl DashboardQuery {
    /// 空字符串视为未查询
    pub fn stock_id(&self) -> Option<&str> {
        self.stock.as_deref().filter(|s| !s.is_empty())
    }
}
