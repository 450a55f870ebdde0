//! 股票数据接口
//!
//! - GET /stocks - 已导入的股票列表
//! - GET /stocks/{stock_id}/history - 单只股票全部记录（新到旧）

use actix_web::{web, HttpResponse, Result};

use super::AppState;
use crate::models::{ApiResponse, StockRecord, StockSummary};

pub async fn list_stocks(state: web::Data<AppState>) -> Result<HttpResponse> {
    match state.store.list_stocks().await {
        Ok(stocks) => {
            let response = ApiResponse::success(stocks);
            Ok(HttpResponse::Ok().json(response))
        }
        Err(e) => {
            let response = ApiResponse::<Vec<StockSummary>>::error(e.to_string());
            Ok(HttpResponse::InternalServerError().json(response))
        }
    }
}

pub async fn get_stock_history(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let stock_id = path.into_inner();

    match state.store.find_by_stock(&stock_id).await {
        Ok(records) => {
            let response = ApiResponse::success(records);
            Ok(HttpResponse::Ok().json(response))
        }
        Err(e) => {
            let response = ApiResponse::<Vec<StockRecord>>::error(e.to_string());
            Ok(HttpResponse::InternalServerError().json(response))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/stocks")
            .route("", web::get().to(list_stocks))
            .route("/{stock_id}/history", web::get().to(get_stock_history))
    );
}
