//! 持股分布看板后端服务
//!
//! 上传集保持股分布 JSON 文件，清洗后存入 SQLite，
//! 并按股票代码提供图表与表格数据

mod config;     // 配置加载
mod handlers;   // HTTP 请求处理器
mod models;     // 数据模型定义
mod services;   // 业务逻辑服务

use actix_web::{web, App, HttpServer, middleware::Logger};
use env_logger::Env;

use crate::config::AppConfig;
use crate::handlers::AppState;
use crate::services::holding::HoldingStore;

/// 应用程序入口
///
/// 加载配置、打开数据库后启动 HTTP 服务器
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load();

    // 初始化日志系统，RUST_LOG 优先于配置文件
    env_logger::init_from_env(Env::default().default_filter_or(config.log.level.as_str()));
    config.log_source();

    let store = HoldingStore::connect(&config.database).await?;
    let bind_addr = config.bind_addr();
    let workers = config.server.workers;

    log::info!("启动持股分布看板服务，监听 {}", bind_addr);

    let state = web::Data::new(AppState::new(store.clone(), config));

    // 创建并启动 HTTP 服务器
    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())  // 添加请求日志中间件
            .app_data(state.clone())
            .configure(handlers::config)  // 配置路由
    });
    if workers > 0 {
        server = server.workers(workers);
    }

    server.bind(&bind_addr)?.run().await?;

    store.close().await;
    Ok(())
}
