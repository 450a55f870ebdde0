pub mod dashboard;
pub mod stock;
pub mod health;

use actix_web::web;

use crate::config::AppConfig;
use crate::services::holding::HoldingStore;

/// 请求共享状态
pub struct AppState {
    pub store: HoldingStore,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(store: HoldingStore, config: AppConfig) -> Self {
        Self { store, config }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.configure(dashboard::config).service(
        web::scope("/api/v1")
            .configure(health::config)
            .configure(stock::config)
    );
}
