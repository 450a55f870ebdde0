use actix_web::{web, HttpResponse, Result};
use serde::Serialize;

use super::AppState;
use crate::models::ApiResponse;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub records: i64,
}

pub async fn health_check(state: web::Data<AppState>) -> Result<HttpResponse> {
    let checked = async {
        state.store.ping().await?;
        state.store.count_records().await
    }
    .await;

    match checked {
        Ok(records) => {
            let response = ApiResponse::success(HealthStatus { status: "healthy", records });
            Ok(HttpResponse::Ok().json(response))
        }
        Err(e) => {
            log::error!("数据库健康检查失败: {:?}", e);
            let response = ApiResponse::<HealthStatus>::error(e.to_string());
            Ok(HttpResponse::ServiceUnavailable().json(response))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}
