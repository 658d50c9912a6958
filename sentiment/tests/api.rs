use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use jse_sentiment::api::{get_routes, AppState};
use jse_sentiment::classifier::three_way_labels;
use jse_sentiment::market::{MarketDataSource, MarketSnapshot};
use jse_sentiment::news::{HeadlineSource, NewsQuery};
use jse_sentiment::{
    Classification, Config, Headline, ReportStore, SentimentClassifier, SentimentError, SentimentLabel,
    SentimentResult, SentimentService,
};

struct FixedHeadlines(Vec<&'static str>);

#[async_trait]
impl HeadlineSource for FixedHeadlines {
    async fn fetch_headlines(&self, _query: &NewsQuery) -> SentimentResult<Vec<Headline>> {
        self.0.iter().map(Headline::new).collect()
    }
}

struct KeywordClassifier;

#[async_trait]
impl SentimentClassifier for KeywordClassifier {
    async fn classify(&self, text: &str) -> SentimentResult<Classification> {
        if text.contains("rallies") {
            Ok(Classification::new("positive", 0.91))
        } else if text.contains("plunges") {
            Ok(Classification::new("negative", 0.88))
        } else if text.contains("flat") {
            Ok(Classification::new("neutral", 0.67))
        } else {
            Err(SentimentError::ClassificationFailure("unknown headline".to_string()))
        }
    }

    fn known_labels(&self) -> Vec<SentimentLabel> {
        three_way_labels()
    }

    fn name(&self) -> &'static str {
        "keyword"
    }
}

struct NoMarket;

#[async_trait]
impl MarketDataSource for NoMarket {
    async fn fetch_daily(&self, _symbol: &str, _range: &str, _interval: &str) -> SentimentResult<MarketSnapshot> {
        Err(SentimentError::MarketData("offline".to_string()))
    }
}

fn app(dir: &tempfile::TempDir, headlines: Vec<&'static str>) -> Router {
    let mut config = Config::new("test-key");
    config.chart_path = dir.path().join("sentiment_plot.svg");

    let service = SentimentService::new(
        &config,
        Arc::new(FixedHeadlines(headlines)),
        Arc::new(KeywordClassifier),
        Arc::new(NoMarket),
    );
    let store = Arc::new(ReportStore::new(Arc::new(service)));
    get_routes(AppState::new(store, config.chart_title))
}

fn sample_headlines() -> Vec<&'static str> {
    vec![
        "Market rallies on rate cut",
        "Index plunges amid uncertainty",
        "Stocks flat ahead of earnings",
    ]
}

async fn send(app: &Router, method: &str, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec();
    (status, content_type, body)
}

async fn get_json(app: &Router, uri: &str) -> Value {
    let (status, _, body) = send(app, "GET", uri).await;
    assert_eq!(status, StatusCode::OK, "GET {}", uri);
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_sentiment_endpoint_returns_records() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir, sample_headlines());

    let json = get_json(&app, "/api/sentiment").await;
    assert_eq!(
        json,
        serde_json::json!([
            {"headline": "Market rallies on rate cut", "sentiment": "positive", "score": 0.91},
            {"headline": "Index plunges amid uncertainty", "sentiment": "negative", "score": 0.88},
            {"headline": "Stocks flat ahead of earnings", "sentiment": "neutral", "score": 0.67}
        ])
    );
}

#[tokio::test]
async fn test_summary_endpoint() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir, vec!["Market rallies on rate cut", "Something odd", "Stocks flat ahead of earnings"]);

    let json = get_json(&app, "/api/summary").await;
    assert_eq!(json["status"], "success");
    assert_eq!(
        json["data"]["summary"],
        serde_json::json!({"negative": 0, "neutral": 1, "positive": 1})
    );
    assert_eq!(json["data"]["total"], 2);
    assert_eq!(json["data"]["skipped"], 1);
}

#[tokio::test]
async fn test_index_page_escapes_headlines() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir, vec!["Gold & platinum stocks rallies <again>", "Stocks flat ahead of earnings"]);

    let (status, content_type, body) = send(&app, "GET", "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/html"));

    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("Gold &amp; platinum stocks rallies &lt;again&gt;"));
    assert!(html.contains("Stocks flat ahead of earnings"));
    assert!(html.contains("0.9100"));
    assert!(html.contains("/static/sentiment_plot.svg"));
    assert!(html.contains("Market data unavailable"));
}

#[tokio::test]
async fn test_chart_endpoint() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir, sample_headlines());

    let (status, content_type, body) = send(&app, "GET", "/static/sentiment_plot.svg").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("image/svg+xml"));
    let svg = String::from_utf8(body).unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(dir.path().join("sentiment_plot.svg").exists());
}

#[tokio::test]
async fn test_market_endpoint_falls_back_to_empty() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir, sample_headlines());

    let json = get_json(&app, "/api/market").await;
    assert_eq!(json["data"]["symbol"], "JSE.JO");
    assert_eq!(json["data"]["bars"], serde_json::json!([]));
}

#[tokio::test]
async fn test_health_and_refresh() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir, sample_headlines());

    let health = get_json(&app, "/api/health").await;
    assert_eq!(health["data"]["status"], "ok");
    assert_eq!(health["data"]["report_ready"], false);

    let first = get_json(&app, "/api/summary").await;
    let health = get_json(&app, "/api/health").await;
    assert_eq!(health["data"]["report_ready"], true);

    let (status, _, body) = send(&app, "POST", "/api/refresh").await;
    assert_eq!(status, StatusCode::OK);
    let refreshed: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(refreshed["data"]["records"], 3);
    assert_ne!(refreshed["data"]["run_id"], first["data"]["run_id"]);

    let after = get_json(&app, "/api/summary").await;
    assert_eq!(after["data"]["run_id"], refreshed["data"]["run_id"]);
}

#[tokio::test]
async fn test_empty_news_still_serves() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir, Vec::new());

    assert_eq!(get_json(&app, "/api/sentiment").await, serde_json::json!([]));
    let (status, _, body) = send(&app, "GET", "/static/sentiment_plot.svg").await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(body).unwrap().contains("No headlines"));
}
