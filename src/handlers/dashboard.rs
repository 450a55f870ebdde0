//! 看板处理器
//!
//! - GET / ?stock=<代码> - 看板数据（图表、表格、股票列表、提示消息）
//! - POST / - 上传 JSON 文件导入，完成后重定向到 /?stock=<代码>

use actix_multipart::Multipart;
use actix_web::cookie::Cookie;
use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse, Result};
use anyhow::{anyhow, bail};
use futures::TryStreamExt;
use url::form_urlencoded;

use super::AppState;
use crate::models::{
    decode_notices, encode_notices, ApiResponse, DashboardQuery, DashboardView, Notice,
    FLASH_COOKIE,
};
use crate::services::holding::market_today;
use crate::services::{dashboard_service, ingest_service};

/// 显示看板
///
/// GET /?stock=2330
pub async fn show_dashboard(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<DashboardQuery>,
) -> Result<HttpResponse> {
    let flashed = req.cookie(FLASH_COOKIE).map(|c| decode_notices(c.value()));
    let consumed = flashed.is_some();

    let mut response = render(&state, query.stock_id(), flashed.unwrap_or_default()).await;
    if consumed {
        // 消息只显示一次
        response.add_removal_cookie(&flash_cookie(String::new()))?;
    }
    Ok(response)
}

/// 上传 JSON 文件
///
/// POST /，表单文件字段默认为 json_file
pub async fn upload_file(
    state: web::Data<AppState>,
    query: web::Query<DashboardQuery>,
    payload: Multipart,
) -> Result<HttpResponse> {
    let upload = &state.config.upload;

    let bytes = match read_upload(payload, &upload.field_name, upload.max_file_bytes).await {
        Ok(Some(bytes)) => bytes,
        Ok(None) => {
            let notice = Notice::warning("请选择要上传的 JSON 文件");
            return Ok(render(&state, query.stock_id(), vec![notice]).await);
        }
        Err(e) => return Ok(upload_failed(&state, query.stock_id(), e).await),
    };

    match ingest_service::ingest(&state.store, &bytes).await {
        Ok(outcome) => Ok(redirect_to_stock(outcome.stock_id(), &[outcome.notice()])),
        Err(e) => Ok(upload_failed(&state, query.stock_id(), e).await),
    }
}

/// 读取指定字段的文件内容，其他字段丢弃
async fn read_upload(
    mut payload: Multipart,
    field_name: &str,
    max_bytes: usize,
) -> anyhow::Result<Option<Vec<u8>>> {
    let mut file = None;

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| anyhow!("读取上传内容失败: {}", e))?
    {
        let wanted = file.is_none() && field.content_disposition().get_name() == Some(field_name);
        let mut bytes = Vec::new();

        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|e| anyhow!("读取上传内容失败: {}", e))?
        {
            if !wanted {
                continue;
            }
            if bytes.len() + chunk.len() > max_bytes {
                bail!("文件超过 {} 字节上限", max_bytes);
            }
            bytes.extend_from_slice(&chunk);
        }

        if wanted {
            file = Some(bytes);
        }
    }

    Ok(file)
}

async fn upload_failed(
    state: &AppState,
    stock_id: Option<&str>,
    err: anyhow::Error,
) -> HttpResponse {
    log::error!("导入失败: {:?}", err);
    let notice = Notice::error(format!("导入错误: {:#}", err));
    render(state, stock_id, vec![notice]).await
}

/// 组装看板响应，notices 排在查询产生的消息之前
async fn render(state: &AppState, stock_id: Option<&str>, notices: Vec<Notice>) -> HttpResponse {
    let loaded = dashboard_service::load_dashboard(
        &state.store,
        stock_id,
        market_today(),
        &state.config.dashboard,
    )
    .await;

    match loaded {
        Ok(mut view) => {
            let mut all = notices;
            all.append(&mut view.notices);
            view.notices = all;
            HttpResponse::Ok().json(ApiResponse::success(view))
        }
        Err(e) => {
            log::error!("加载看板失败: {:?}", e);
            HttpResponse::InternalServerError().json(ApiResponse::<DashboardView>::error(e.to_string()))
        }
    }
}

fn flash_cookie(value: String) -> Cookie<'static> {
    Cookie::build(FLASH_COOKIE, value)
        .path("/")
        .http_only(true)
        .finish()
}

fn redirect_to_stock(stock_id: &str, notices: &[Notice]) -> HttpResponse {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("stock", stock_id)
        .finish();

    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, format!("/?{}", query)))
        .cookie(flash_cookie(encode_notices(notices)))
        .finish()
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/")
            .route(web::get().to(show_dashboard))
            .route(web::post().to(upload_file)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::models::NoticeLevel;
    use crate::services::holding::HoldingStore;
    use actix_web::{test, App};
    use serde_json::Value;

    const BOUNDARY: &str = "----holding-test-boundary";

    async fn test_state() -> web::Data<AppState> {
        let store = HoldingStore::in_memory().await.unwrap();
        web::Data::new(AppState::new(store, AppConfig::default()))
    }

    fn multipart_body(field: &str, content: &str) -> String {
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"{f}\"; filename=\"holding.json\"\r\nContent-Type: application/json\r\n\r\n{c}\r\n--{b}--\r\n",
            b = BOUNDARY,
            f = field,
            c = content
        )
    }

    fn upload_request(field: &str, content: &str) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/")
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            ))
            .set_payload(multipart_body(field, content))
    }

    #[actix_web::test]
    async fn test_upload_redirects_and_flashes_notice() {
        let state = test_state().await;
        let app = test::init_service(App::new().app_data(state.clone()).configure(config)).await;

        let content = r#"{"stock_id":"2330","stock_name":"台積電","history":[
            {"date":"20260213","price":"1,810","major_pct":"88.12%"},
            {"date":"oops","price":"1"}
        ]}"#;
        let resp = test::call_service(&app, upload_request("json_file", content).to_request()).await;

        assert_eq!(resp.status(), 303);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/?stock=2330");

        let flash = resp
            .response()
            .cookies()
            .find(|c| c.name() == FLASH_COOKIE)
            .map(|c| c.into_owned())
            .unwrap();
        assert_eq!(state.store.count_records().await.unwrap(), 1);

        let req = test::TestRequest::get()
            .uri("/?stock=2330")
            .cookie(flash)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        // 消息读取后应清除 cookie
        let removal = resp
            .response()
            .cookies()
            .find(|c| c.name() == FLASH_COOKIE)
            .map(|c| c.into_owned())
            .unwrap();
        assert!(removal.value().is_empty());
        assert!(removal.max_age().map_or(false, |age| age.is_zero()));

        let body: Value = test::read_body_json(resp).await;
        let data = &body["data"];
        assert_eq!(data["stock_name_display"], "台積電");
        assert_eq!(data["notices"][0]["level"], "success");
        assert_eq!(data["notices"][0]["message"], "成功导入 台積電 (2330) 共 1 笔资料！");
        assert_eq!(data["table_data"].as_array().unwrap().len(), 1);
        assert_eq!(data["stock_list"][0]["stock_id"], "2330");
    }

    #[actix_web::test]
    async fn test_empty_history_redirects_with_warning() {
        let state = test_state().await;
        let app = test::init_service(App::new().app_data(state.clone()).configure(config)).await;

        let content = r#"{"stock_id":"2330","stock_name":"TSMC","history":[]}"#;
        let resp = test::call_service(&app, upload_request("json_file", content).to_request()).await;

        assert_eq!(resp.status(), 303);
        let flash = resp
            .response()
            .cookies()
            .find(|c| c.name() == FLASH_COOKIE)
            .unwrap();
        let notices = decode_notices(flash.value());
        assert_eq!(notices[0].level, NoticeLevel::Warning);
        assert_eq!(state.store.count_records().await.unwrap(), 0);
    }

    #[actix_web::test]
    async fn test_oversized_upload_renders_error() {
        let store = HoldingStore::in_memory().await.unwrap();
        let mut app_config = AppConfig::default();
        app_config.upload.max_file_bytes = 10;
        let state = web::Data::new(AppState::new(store, app_config));
        let app = test::init_service(App::new().app_data(state.clone()).configure(config)).await;

        let content = r#"{"stock_id":"2330","stock_name":"TSMC","history":[{"date":"20260213"}]}"#;
        let resp = test::call_service(&app, upload_request("json_file", content).to_request()).await;
        assert_eq!(resp.status(), 200);

        let body: Value = test::read_body_json(resp).await;
        let notice = &body["data"]["notices"][0];
        assert_eq!(notice["level"], "error");
        assert!(notice["message"].as_str().unwrap().contains("10 字节上限"));
        assert_eq!(state.store.count_records().await.unwrap(), 0);
    }

    #[actix_web::test]
    async fn test_malformed_upload_renders_error() {
        let state = test_state().await;
        let app = test::init_service(App::new().app_data(state).configure(config)).await;

        let resp = test::call_service(&app, upload_request("json_file", "{ broken").to_request()).await;
        assert_eq!(resp.status(), 200);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["notices"][0]["level"], "error");
        assert!(body["data"]["notices"][0]["message"]
            .as_str()
            .unwrap()
            .starts_with("导入错误"));
    }

    #[actix_web::test]
    async fn test_missing_file_field_warns() {
        let state = test_state().await;
        let app = test::init_service(App::new().app_data(state).configure(config)).await;

        let resp = test::call_service(&app, upload_request("other", "{}").to_request()).await;
        assert_eq!(resp.status(), 200);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["notices"][0]["level"], "warning");
    }

    #[actix_web::test]
    async fn test_query_miss_renders_info() {
        let state = test_state().await;
        let app = test::init_service(App::new().app_data(state).configure(config)).await;

        let req = test::TestRequest::get().uri("/?stock=9999").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let data = &body["data"];

        assert_eq!(data["query_stock"], "9999");
        assert_eq!(data["stock_name_display"], "9999");
        assert_eq!(data["chart_data"], serde_json::json!({}));
        assert!(data["table_data"].as_array().unwrap().is_empty());
        assert_eq!(data["notices"][0]["level"], "info");
    }
}
