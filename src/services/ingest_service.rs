//! 持股资料导入服务
//!
//! 解析上传的 JSON 文件，清洗每一行后写入数据库。
//! 日期无效的行被跳过，其余字段无法解析时取默认值。

use anyhow::{anyhow, bail, Context, Result};
use serde_json::Value;

use crate::models::{HistoryRow, Notice, StockRecord, UploadDocument};
use crate::services::holding::{
    clean_float, clean_int, clean_text, row_date, stringify, HoldingStore,
};

/// 导入结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// 成功写入 count 笔
    Imported {
        stock_id: String,
        stock_name: String,
        count: usize,
    },
    /// 没有任何有效行，未写入
    Empty { stock_id: String, stock_name: String },
}

impl IngestOutcome {
    pub fn stock_id(&self) -> &str {
        match self {
            IngestOutcome::Imported { stock_id, .. } | IngestOutcome::Empty { stock_id, .. } => {
                stock_id
            }
        }
    }

    /// 转为页面提示消息
    pub fn notice(&self) -> Notice {
        match self {
            IngestOutcome::Imported {
                stock_id,
                stock_name,
                count,
            } => Notice::success(format!(
                "成功导入 {} ({}) 共 {} 笔资料！",
                stock_name, stock_id, count
            )),
            IngestOutcome::Empty {
                stock_id,
                stock_name,
            } => Notice::warning(format!(
                "{} ({}) 没有可导入的有效资料",
                stock_name, stock_id
            )),
        }
    }
}

/// 解析上传文件
///
/// 按 BOM 识别编码，stock_id 与 stock_name 必须存在
pub fn parse_document(bytes: &[u8]) -> Result<UploadDocument> {
    let (text, _, had_errors) = encoding_rs::UTF_8.decode(bytes);
    if had_errors {
        bail!("文件编码无效，请使用 UTF-8");
    }

    serde_json::from_str(&text).context("JSON 格式错误")
}

fn required_text(value: Option<&Value>, field: &str) -> Result<String> {
    match value {
        // 原样保存，只拒绝空白值
        Some(Value::String(_)) | Some(Value::Number(_)) => stringify(value)
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| anyhow!("字段 {} 不能为空", field)),
        Some(Value::Null) | None => Err(anyhow!("缺少字段 {}", field)),
        Some(other) => Err(anyhow!("字段 {} 类型错误: {}", field, other)),
    }
}

/// 清洗单行，日期无效返回 `None`
fn build_record(stock_id: &str, stock_name: &str, row: &HistoryRow) -> Option<StockRecord> {
    let date = row_date(row.date.as_ref())?;

    Some(StockRecord {
        stock_id: stock_id.to_string(),
        date,
        stock_name: stock_name.to_string(),
        price: clean_float(row.price.as_ref()),
        total_shares: clean_int(row.total_shares.as_ref()),
        total_people: clean_int(row.total_people.as_ref()),
        bengo_threshold: clean_text(row.threshold_str.as_ref()),
        major_people: clean_int(row.major_ppl.as_ref()),
        major_pct: clean_float(row.major_pct.as_ref()),
        note: clean_text(row.note.as_ref()),
    })
}

/// 清洗全部行，返回 (有效记录, 跳过行数)
pub fn build_records(
    stock_id: &str,
    stock_name: &str,
    history: &[HistoryRow],
) -> (Vec<StockRecord>, usize) {
    let mut records = Vec::with_capacity(history.len());
    let mut skipped = 0;

    for (index, row) in history.iter().enumerate() {
        match build_record(stock_id, stock_name, row) {
            Some(record) => records.push(record),
            None => {
                skipped += 1;
                log::debug!("跳过 {} 第 {} 行: 日期无效 {:?}", stock_id, index + 1, row.date);
            }
        }
    }

    (records, skipped)
}

/// 导入上传文件
pub async fn ingest(store: &HoldingStore, bytes: &[u8]) -> Result<IngestOutcome> {
    let document = parse_document(bytes)?;
    let stock_id = required_text(document.stock_id.as_ref(), "stock_id")?;
    let stock_name = required_text(document.stock_name.as_ref(), "stock_name")?;

    let (records, skipped) = build_records(&stock_id, &stock_name, &document.history);
    if records.is_empty() {
        log::warn!(
            "{} ({}) 没有有效资料，共 {} 行被跳过",
            stock_name,
            stock_id,
            skipped
        );
        return Ok(IngestOutcome::Empty {
            stock_id,
            stock_name,
        });
    }

    let count = store.upsert_records(&records).await?;
    log::info!(
        "导入 {} ({}) 完成: 写入 {} 笔，跳过 {} 行",
        stock_name,
        stock_id,
        count,
        skipped
    );

    Ok(IngestOutcome::Imported {
        stock_id,
        stock_name,
        count,
    })
}
