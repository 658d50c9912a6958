use std::future::Future;
use std::io;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use minijinja::context;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use uuid::Uuid;

use crate::error::SentimentResult;
use crate::market::MarketSnapshot;
use crate::service::{ReportStore, SentimentReport};
use crate::summary::SentimentSummary;
use crate::templates::{environment, INDEX_TEMPLATE};
use crate::types::SentimentRecord;

pub const CHART_ROUTE: &str = "/static/sentiment_plot.svg";

/// Cấu trúc phản hồi API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub message: String,
    pub data: Option<T>,
    pub timestamp: i64,
}

/// Cấu trúc lỗi API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub status: String,
    pub code: u16,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: "Operation successful".to_string(),
            data: Some(data),
            timestamp: Utc::now().timestamp(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            data: None,
            timestamp: Utc::now().timestamp(),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        match serde_json::to_value(&self) {
            Ok(json) => Json(json).into_response(),
            Err(err) => {
                let error_response = ApiResponse::<()>::error(format!("JSON serialization error: {}", err));
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error_response)).into_response()
            }
        }
    }
}

type ApiError = (StatusCode, Json<ApiErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ApiErrorResponse {
            status: "error".to_string(),
            code: status.as_u16(),
            message: message.into(),
        }),
    )
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ReportStore>,
    pub title: String,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(store: Arc<ReportStore>, title: impl Into<String>) -> Self {
        Self {
            store,
            title: title.into(),
            started_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SummaryView {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub summary: SentimentSummary,
    pub total: usize,
    pub skipped: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthView {
    pub status: String,
    pub report_ready: bool,
    pub uptime_secs: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshView {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub records: usize,
    pub skipped: usize,
}

#[derive(Serialize)]
struct RecordRow {
    headline: String,
    sentiment: String,
    score: String,
}

#[derive(Serialize)]
struct SummaryRow {
    label: String,
    count: usize,
}

#[derive(Serialize)]
struct MarketRow {
    date: String,
    open: String,
    high: String,
    low: String,
    close: String,
    volume: String,
}

#[derive(Serialize)]
struct MarketView {
    symbol: String,
    currency: Option<String>,
    rows: Vec<MarketRow>,
    last_close: Option<String>,
    change: Option<String>,
}

fn price(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".to_string())
}

fn market_view(market: &MarketSnapshot) -> MarketView {
    MarketView {
        symbol: market.symbol.clone(),
        currency: market.currency.clone(),
        rows: market
            .bars
            .iter()
            .map(|bar| MarketRow {
                date: bar.date.to_string(),
                open: price(bar.open),
                high: price(bar.high),
                low: price(bar.low),
                close: price(Some(bar.close)),
                volume: bar.volume.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string()),
            })
            .collect(),
        last_close: market.last_close().map(|close| format!("{:.2}", close)),
        change: market.change_pct().map(|pct| format!("{:+.2}%", pct)),
    }
}

/// Render trang HTML cho một báo cáo
pub fn render_index(report: &SentimentReport, title: &str) -> SentimentResult<String> {
    let records: Vec<RecordRow> = report
        .records
        .iter()
        .map(|record| RecordRow {
            headline: record.headline().to_string(),
            sentiment: record.label().to_string(),
            score: format!("{:.4}", record.score()),
        })
        .collect();
    let summary: Vec<SummaryRow> = report
        .summary
        .iter()
        .map(|(label, count)| SummaryRow {
            label: label.to_string(),
            count,
        })
        .collect();

    let template = environment()?.get_template(INDEX_TEMPLATE)?;
    let html = template.render(context! {
        title => title,
        query => &report.query,
        classifier => &report.classifier,
        generated_at => report.generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        run_id => report.run_id.to_string(),
        records => records,
        skipped => report.skipped.len(),
        summary => summary,
        has_chart => report.chart.is_some(),
        market => market_view(&report.market),
    })?;
    Ok(html)
}

async fn index(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let report = state.store.get_or_init().await;
    render_index(&report, &state.title).map(Html).map_err(|e| {
        error!("Lỗi render trang chủ: {}", e);
        api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })
}

async fn get_sentiment(State(state): State<AppState>) -> Json<Vec<SentimentRecord>> {
    let report = state.store.get_or_init().await;
    Json(report.records.clone())
}

async fn get_summary(State(state): State<AppState>) -> ApiResponse<SummaryView> {
    let report = state.store.get_or_init().await;
    ApiResponse::success(SummaryView {
        run_id: report.run_id,
        generated_at: report.generated_at,
        summary: report.summary.clone(),
        total: report.summary.total(),
        skipped: report.skipped.len(),
    })
}

async fn get_market(State(state): State<AppState>) -> ApiResponse<MarketSnapshot> {
    let report = state.store.get_or_init().await;
    ApiResponse::success(report.market.clone())
}

async fn health_check(State(state): State<AppState>) -> ApiResponse<HealthView> {
    ApiResponse::success(HealthView {
        status: "ok".to_string(),
        report_ready: state.store.current().await.is_some(),
        uptime_secs: (Utc::now() - state.started_at).num_seconds(),
    })
}

async fn refresh(State(state): State<AppState>) -> ApiResponse<RefreshView> {
    let report = state.store.refresh().await;
    ApiResponse::success(RefreshView {
        run_id: report.run_id,
        generated_at: report.generated_at,
        records: report.records.len(),
        skipped: report.skipped.len(),
    })
}

async fn chart(State(state): State<AppState>) -> Result<Response, ApiError> {
    let report = state.store.get_or_init().await;
    match &report.chart {
        Some(svg) => Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg.clone()).into_response()),
        None => Err(api_error(StatusCode::NOT_FOUND, "Biểu đồ chưa được tạo")),
    }
}

pub fn get_routes(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_headers(Any)
        .allow_methods(Any)
        .allow_origin(Any);

    Router::new()
        .route("/", get(index))
        .route("/api/sentiment", get(get_sentiment))
        .route("/api/summary", get(get_summary))
        .route("/api/market", get(get_market))
        .route("/api/health", get(health_check))
        .route("/api/refresh", post(refresh))
        .route(CHART_ROUTE, get(chart))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_on<F>(signal: F)
where
    F: Future<Output = io::Result<()>>,
{
    if let Err(e) = signal.await {
        // Không có tín hiệu thì server chạy đến khi process bị kill
        error!("Không lắng nghe được tín hiệu tắt: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Nhận Ctrl-C, đang dừng API server");
}

async fn shutdown_signal() {
    shutdown_on(tokio::signal::ctrl_c()).await
}

/// Chạy API server đến khi nhận Ctrl-C
pub async fn create_api_server(state: AppState, addr: &str) -> SentimentResult<()> {
    let app = get_routes(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("API server starting on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API server đã dừng");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::PriceBar;
    use chrono::NaiveDate;
    use std::time::Duration;

    fn bar(day: u32, close: f64) -> PriceBar {
        PriceBar {
            date: NaiveDate::from_ymd_opt(2024, 6, day).unwrap(),
            open: None,
            high: None,
            low: None,
            close,
            volume: Some(1000),
        }
    }

    #[test]
    fn test_render_index_market_section() {
        let report = SentimentReport {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            query: "JSE".to_string(),
            classifier: "lexicon".to_string(),
            records: Vec::new(),
            summary: SentimentSummary::default(),
            skipped: Vec::new(),
            market: MarketSnapshot {
                symbol: "JSE.JO".to_string(),
                currency: Some("ZAc".to_string()),
                bars: vec![bar(10, 13000.0), bar(11, 13130.0)],
            },
            chart: None,
        };

        let html = render_index(&report, "JSE News Sentiment Distribution").unwrap();
        assert!(html.contains("JSE.JO (ZAc)"));
        assert!(html.contains("2024-06-11"));
        assert!(html.contains("Last close: 13130.00"));
        assert!(html.contains("+1.00%"));
        assert!(!html.contains("<img"));
    }

    #[tokio::test]
    async fn test_shutdown_waits_when_signal_fails() {
        let failing = async { Err(io::Error::new(io::ErrorKind::Other, "no signal handler")) };
        let waited = tokio::time::timeout(Duration::from_millis(50), shutdown_on(failing)).await;
        assert!(waited.is_err(), "server must keep running without a signal handler");

        let received = tokio::time::timeout(Duration::from_millis(50), shutdown_on(async { Ok(()) })).await;
        assert!(received.is_ok());
    }
}
