//! 业务逻辑服务模块
//! 
//! 封装数据导入、存储和查询逻辑

pub mod holding;            // 字段清洗与 SQLite 存储
pub mod ingest_service;     // JSON 导入服务
pub mod dashboard_service;  // 看板查询服务
