//! 看板查询服务
//!
//! 按股票代码取出全部记录，生成表格（新到旧）与图表序列（旧到新），
//! 同时返回全部股票列表供下拉选择。

use anyhow::Result;
use chrono::{NaiveDate, TimeDelta};

use crate::config::DashboardConfig;
use crate::models::{ChartData, DashboardView, Notice, StockRecord};
use crate::services::holding::{format_chart_date, HoldingStore};

/// 从新到旧排序的记录中选出图表区间
///
/// 取 today 往前 window_days 天内的记录；若为空，退回最近 fallback_count 笔。
/// 返回结果按日期由旧到新。窗口天数超出日期范围时视为不设下限。
pub fn chart_window<'a>(
    records_desc: &'a [StockRecord],
    today: NaiveDate,
    settings: &DashboardConfig,
) -> Vec<&'a StockRecord> {
    let cutoff = TimeDelta::try_days(settings.chart_window_days)
        .and_then(|days| today.checked_sub_signed(days));

    let mut window: Vec<&StockRecord> = records_desc
        .iter()
        .filter(|r| cutoff.map_or(true, |cutoff| r.date >= cutoff))
        .collect();
    if window.is_empty() {
        window = records_desc
            .iter()
            .take(settings.chart_fallback_count)
            .collect();
    }

    window.reverse();
    window
}

/// 生成图表数据
pub fn build_chart(records: &[&StockRecord]) -> ChartData {
    ChartData {
        dates: records.iter().map(|r| format_chart_date(r.date)).collect(),
        prices: records.iter().map(|r| r.price).collect(),
        major_pcts: records.iter().map(|r| r.major_pct).collect(),
    }
}

/// 由查询结果组装看板（不含股票列表）
pub fn shape_dashboard(
    stock_id: &str,
    records_desc: Vec<StockRecord>,
    today: NaiveDate,
    settings: &DashboardConfig,
) -> DashboardView {
    let Some(latest) = records_desc.first() else {
        return DashboardView {
            query_stock: stock_id.to_string(),
            stock_name_display: stock_id.to_string(),
            notices: vec![Notice::info(format!("查无股票代码 {} 的资料", stock_id))],
            ..DashboardView::default()
        };
    };

    let stock_name_display = latest.stock_name.clone();
    let chart_data = build_chart(&chart_window(&records_desc, today, settings));

    DashboardView {
        query_stock: stock_id.to_string(),
        stock_name_display,
        chart_data,
        table_data: records_desc,
        ..DashboardView::default()
    }
}

/// 加载看板
///
/// 未指定股票时只返回股票列表
pub async fn load_dashboard(
    store: &HoldingStore,
    stock_id: Option<&str>,
    today: NaiveDate,
    settings: &DashboardConfig,
) -> Result<DashboardView> {
    let stock_list = store.list_stocks().await?;

    let mut view = match stock_id {
        Some(stock_id) => {
            let records = store.find_by_stock(stock_id).await?;
            log::debug!("查询 {}: {} 笔", stock_id, records.len());
            shape_dashboard(stock_id, records, today, settings)
        }
        None => DashboardView::default(),
    };

    view.stock_list = stock_list;
    Ok(view)
}
