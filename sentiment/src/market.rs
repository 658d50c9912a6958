use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SentimentError, SentimentResult};

/// Một phiên giao dịch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
    pub volume: Option<u64>,
}

/// Giá của chỉ số trong khoảng thời gian đã cấu hình
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketSnapshot {
    pub symbol: String,
    pub currency: Option<String>,
    pub bars: Vec<PriceBar>,
}

impl MarketSnapshot {
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            currency: None,
            bars: Vec::new(),
        }
    }

    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|bar| bar.close)
    }

    /// Thay đổi (%) giữa phiên đầu và phiên cuối
    pub fn change_pct(&self) -> Option<f64> {
        let first = self.bars.first()?.close;
        let last = self.bars.last()?.close;
        if first == 0.0 {
            return None;
        }
        Some((last - first) / first * 100.0)
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    async fn fetch_daily(&self, symbol: &str, range: &str, interval: &str) -> SentimentResult<MarketSnapshot>;
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    symbol: String,
    currency: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

fn at<T: Copy>(values: &[Option<T>], index: usize) -> Option<T> {
    values.get(index).copied().flatten()
}

/// Parse response của Yahoo chart API v8. Phiên không có giá đóng cửa bị bỏ.
pub fn parse_chart_response(body: &str) -> SentimentResult<MarketSnapshot> {
    let envelope: ChartEnvelope = serde_json::from_str(body)
        .map_err(|e| SentimentError::MarketData(format!("body chart không hợp lệ: {}", e)))?;

    if let Some(error) = envelope.chart.error {
        return Err(SentimentError::MarketData(format!("{}: {}", error.code, error.description)));
    }

    let result = envelope
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| SentimentError::MarketData("chart không có kết quả".to_string()))?;

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    let bars = result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, ts)| {
            let close = at(&quote.close, i)?;
            let date = DateTime::<Utc>::from_timestamp(*ts, 0)?.date_naive();
            Some(PriceBar {
                date,
                open: at(&quote.open, i),
                high: at(&quote.high, i),
                low: at(&quote.low, i),
                close,
                volume: at(&quote.volume, i),
            })
        })
        .collect();

    Ok(MarketSnapshot {
        symbol: result.meta.symbol,
        currency: result.meta.currency,
        bars,
    })
}

/// Client cho Yahoo Finance chart API
pub struct YahooChartClient {
    client: Client,
    base_url: String,
}

impl YahooChartClient {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn chart_url(&self, symbol: &str) -> String {
        format!("{}/v8/finance/chart/{}", self.base_url, symbol)
    }
}

#[async_trait]
impl MarketDataSource for YahooChartClient {
    async fn fetch_daily(&self, symbol: &str, range: &str, interval: &str) -> SentimentResult<MarketSnapshot> {
        let response = self
            .client
            .get(self.chart_url(symbol))
            .query(&[("range", range), ("interval", interval)])
            .send()
            .await
            .map_err(|e| SentimentError::MarketData(format!("lỗi kết nối: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SentimentError::MarketData(format!("lỗi đọc body: {}", e)))?;

        if !status.is_success() {
            // Yahoo vẫn trả body chart.error khi 404
            let detail = match parse_chart_response(&body) {
                Err(SentimentError::MarketData(msg)) => msg,
                _ => body.chars().take(200).collect(),
            };
            return Err(SentimentError::MarketData(format!("HTTP {}: {}", status, detail)));
        }

        let snapshot = parse_chart_response(&body)?;
        debug!(symbol = %snapshot.symbol, bars = snapshot.bars.len(), "Đã lấy dữ liệu thị trường");
        Ok(snapshot)
    }
}
