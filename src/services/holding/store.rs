//! SQLite 持股数据存储
//!
//! 表 stock_records 以 (stock_id, date) 唯一约束保证每只股票每天只有一笔，
//! 重复导入时覆盖原有字段。

use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use crate::config::DatabaseConfig;
use crate::models::{StockRecord, StockSummary};

const CREATE_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS stock_records (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        stock_id TEXT NOT NULL,
        date DATE NOT NULL,
        stock_name TEXT NOT NULL DEFAULT '',
        price REAL NOT NULL DEFAULT 0,
        total_shares INTEGER NOT NULL DEFAULT 0,
        total_people INTEGER NOT NULL DEFAULT 0,
        bengo_threshold TEXT NOT NULL DEFAULT '',
        major_people INTEGER NOT NULL DEFAULT 0,
        major_pct REAL NOT NULL DEFAULT 0,
        note TEXT NOT NULL DEFAULT '',
        updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
        UNIQUE (stock_id, date)
    )
"#;

const UPSERT_SQL: &str = r#"
    INSERT INTO stock_records
        (stock_id, date, stock_name, price, total_shares, total_people,
         bengo_threshold, major_people, major_pct, note)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
    ON CONFLICT (stock_id, date) DO UPDATE SET
        stock_name = excluded.stock_name,
        price = excluded.price,
        total_shares = excluded.total_shares,
        total_people = excluded.total_people,
        bengo_threshold = excluded.bengo_threshold,
        major_people = excluded.major_people,
        major_pct = excluded.major_pct,
        note = excluded.note,
        updated_at = CURRENT_TIMESTAMP
"#;

/// 持股数据存储
#[derive(Debug, Clone)]
pub struct HoldingStore {
    pool: SqlitePool,
}

impl HoldingStore {
    /// 打开数据库（不存在则创建）并初始化表结构
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        log::info!("打开 SQLite 数据库: {}", config.path.display());

        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("无法创建数据目录 {}", parent.display()))?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(config.busy_timeout_secs));

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .connect_with(options)
            .await
            .context("连接数据库失败")?;

        let store = Self { pool };
        store.initialize().await?;
        Ok(store)
    }

    /// 内存数据库，单连接保证所有查询看到同一份数据
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        let store = Self { pool };
        store.initialize().await?;
        Ok(store)
    }

    async fn initialize(&self) -> Result<()> {
        sqlx::query(CREATE_TABLE_SQL).execute(&self.pool).await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_stock_records_stock_date ON stock_records(stock_id, date DESC)",
        )
        .execute(&self.pool)
        .await?;

        log::debug!("stock_records 表结构已就绪");
        Ok(())
    }

    /// 批量写入，已存在的 (stock_id, date) 覆盖更新
    ///
    /// 返回处理的记录数
    pub async fn upsert_records(&self, records: &[StockRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut transaction = self.pool.begin().await?;

        for record in records {
            sqlx::query(UPSERT_SQL)
                .bind(&record.stock_id)
                .bind(record.date)
                .bind(&record.stock_name)
                .bind(record.price)
                .bind(record.total_shares)
                .bind(record.total_people)
                .bind(&record.bengo_threshold)
                .bind(record.major_people)
                .bind(record.major_pct)
                .bind(&record.note)
                .execute(&mut *transaction)
                .await
                .with_context(|| format!("写入 {} {} 失败", record.stock_id, record.date))?;
        }

        transaction.commit().await?;
        Ok(records.len())
    }

    /// 查询某只股票的全部记录，按日期由新到旧
    pub async fn find_by_stock(&self, stock_id: &str) -> Result<Vec<StockRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT stock_id, date, stock_name, price, total_shares, total_people,
                   bengo_threshold, major_people, major_pct, note
            FROM stock_records
            WHERE stock_id = ?1
            ORDER BY date DESC
            "#,
        )
        .bind(stock_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| row_to_record(&row).map_err(Into::into))
            .collect()
    }

    /// 全部 (代码, 名称) 组合，按代码排序
    pub async fn list_stocks(&self) -> Result<Vec<StockSummary>> {
        let rows = sqlx::query(
            "SELECT DISTINCT stock_id, stock_name FROM stock_records ORDER BY stock_id, stock_name",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut stocks = Vec::with_capacity(rows.len());
        for row in rows {
            stocks.push(StockSummary {
                stock_id: row.try_get("stock_id")?,
                stock_name: row.try_get("stock_name")?,
            });
        }
        Ok(stocks)
    }

    /// 记录总数
    pub async fn count_records(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stock_records")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// 检查数据库连接
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// 关闭连接池
    pub async fn close(&self) {
        self.pool.close().await;
        log::info!("SQLite 连接池已关闭");
    }
}

fn row_to_record(row: &SqliteRow) -> Result<StockRecord, sqlx::Error> {
    Ok(StockRecord {
        stock_id: row.try_get("stock_id")?,
        date: row.try_get("date")?,
        stock_name: row.try_get("stock_name")?,
        price: row.try_get("price")?,
        total_shares: row.try_get("total_shares")?,
        total_people: row.try_get("total_people")?,
        bengo_threshold: row.try_get("bengo_threshold")?,
        major_people: row.try_get("major_people")?,
        major_pct: row.try_get("major_pct")?,
        note: row.try_get("note")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(stock_id: &str, name: &str, ymd: (i32, u32, u32), price: f64) -> StockRecord {
        StockRecord {
            stock_id: stock_id.to_string(),
            date: NaiveDate::from_ymd_opt(ymd.0, ymd.1, ymd.2).unwrap(),
            stock_name: name.to_string(),
            price,
            total_shares: 1_000,
            total_people: 10,
            bengo_threshold: "400張以上".to_string(),
            major_people: 2,
            major_pct: 55.5,
            note: String::new(),
        }
    }

    #[tokio::test]
    async fn test_upsert_overwrites_same_key() {
        let store = HoldingStore::in_memory().await.unwrap();

        store
            .upsert_records(&[record("2330", "台積電", (2026, 1, 2), 100.0)])
            .await
            .unwrap();
        store
            .upsert_records(&[record("2330", "台積電新", (2026, 1, 2), 120.0)])
            .await
            .unwrap();

        let rows = store.find_by_stock("2330").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].price, 120.0);
        assert_eq!(rows[0].stock_name, "台積電新");
        assert_eq!(store.count_records().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_find_by_stock_orders_newest_first() {
        let store = HoldingStore::in_memory().await.unwrap();
        store
            .upsert_records(&[
                record("2330", "台積電", (2026, 1, 2), 100.0),
                record("2330", "台積電", (2026, 1, 16), 102.0),
                record("2330", "台積電", (2025, 12, 26), 98.0),
                record("2317", "鴻海", (2026, 1, 2), 50.0),
            ])
            .await
            .unwrap();

        let rows = store.find_by_stock("2330").await.unwrap();
        let prices: Vec<f64> = rows.iter().map(|r| r.price).collect();
        assert_eq!(prices, vec![102.0, 100.0, 98.0]);
        assert!(store.find_by_stock("9999").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_stocks_distinct_sorted() {
        let store = HoldingStore::in_memory().await.unwrap();
        store
            .upsert_records(&[
                record("2330", "台積電", (2026, 1, 2), 100.0),
                record("2330", "台積電", (2026, 1, 9), 101.0),
                record("2317", "鴻海", (2026, 1, 2), 50.0),
            ])
            .await
            .unwrap();

        let stocks = store.list_stocks().await.unwrap();
        let ids: Vec<&str> = stocks.iter().map(|s| s.stock_id.as_str()).collect();
        assert_eq!(ids, vec!["2317", "2330"]);
        store.ping().await.unwrap();
    }
}
