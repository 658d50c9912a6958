//! Chạy toàn bộ pipeline và giữ snapshot báo cáo cho các handler.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};
use uuid::Uuid;

use crate::chart::ChartRenderer;
use crate::classifier::SentimentClassifier;
use crate::config::Config;
use crate::market::{MarketDataSource, MarketSnapshot};
use crate::news::{HeadlineSource, NewsQuery};
use crate::pipeline::{classify_all, SkippedHeadline};
use crate::summary::{summarize, SentimentSummary};
use crate::types::SentimentRecord;

/// Kết quả một lượt chạy, không đổi sau khi tạo
#[derive(Debug, Clone, Serialize)]
pub struct SentimentReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub query: String,
    pub classifier: String,
    pub records: Vec<SentimentRecord>,
    pub summary: SentimentSummary,
    pub skipped: Vec<SkippedHeadline>,
    pub market: MarketSnapshot,
    #[serde(skip_serializing)]
    pub chart: Option<String>,
}

/// Tham số thị trường cho mỗi lượt chạy
#[derive(Debug, Clone)]
struct MarketQuery {
    symbol: String,
    range: String,
    interval: String,
}

pub struct SentimentService {
    source: Arc<dyn HeadlineSource>,
    classifier: Arc<dyn SentimentClassifier>,
    market: Arc<dyn MarketDataSource>,
    chart: ChartRenderer,
    query: NewsQuery,
    market_query: MarketQuery,
    concurrency: usize,
}

impl SentimentService {
    pub fn new(
        config: &Config,
        source: Arc<dyn HeadlineSource>,
        classifier: Arc<dyn SentimentClassifier>,
        market: Arc<dyn MarketDataSource>,
    ) -> Self {
        Self {
            source,
            classifier,
            market,
            chart: ChartRenderer::new(config.chart_title.clone(), config.chart_path.clone()),
            query: NewsQuery::from_config(config),
            market_query: MarketQuery {
                symbol: config.market_symbol.clone(),
                range: config.market_range.clone(),
                interval: config.market_interval.clone(),
            },
            concurrency: config.classify_concurrency,
        }
    }

    /// Lấy tin, phân loại, tổng hợp, vẽ biểu đồ và lấy giá thị trường.
    ///
    /// Lỗi của nguồn tin, dữ liệu thị trường hoặc biểu đồ chỉ được log; báo
    /// cáo vẫn được tạo với giá trị rỗng tương ứng.
    pub async fn build_report(&self) -> SentimentReport {
        let run_id = Uuid::new_v4();
        info!(%run_id, query = %self.query.term, classifier = self.classifier.name(), "Bắt đầu lượt phân tích sentiment");

        let headlines = match self.source.fetch_headlines(&self.query).await {
            Ok(headlines) => headlines,
            Err(e) => {
                warn!(%run_id, error = %e, "Không lấy được tin tức, dùng danh sách rỗng");
                Vec::new()
            }
        };

        let run = classify_all(&headlines, self.classifier.as_ref(), self.concurrency).await;
        let summary = summarize(&run.records, &self.classifier.known_labels());

        let chart = match self.chart.render_svg(&summary) {
            Ok(svg) => {
                if let Err(e) = self.chart.write(&svg) {
                    warn!(%run_id, error = %e, "Không ghi được file biểu đồ");
                }
                Some(svg)
            }
            Err(e) => {
                warn!(%run_id, error = %e, "Không vẽ được biểu đồ");
                None
            }
        };

        let MarketQuery { symbol, range, interval } = &self.market_query;
        let market = match self.market.fetch_daily(symbol, range, interval).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(%run_id, %symbol, error = %e, "Không lấy được dữ liệu thị trường");
                MarketSnapshot::empty(symbol.as_str())
            }
        };

        info!(
            %run_id,
            headlines = headlines.len(),
            classified = run.records.len(),
            skipped = run.skipped.len(),
            "Hoàn tất lượt phân tích"
        );

        SentimentReport {
            run_id,
            generated_at: Utc::now(),
            query: self.query.term.clone(),
            classifier: self.classifier.name().to_string(),
            records: run.records,
            summary,
            skipped: run.skipped,
            market,
            chart,
        }
    }
}

/// Snapshot báo cáo dùng chung giữa các request.
///
/// `compute` đảm bảo tại một thời điểm chỉ có một lượt chạy pipeline.
pub struct ReportStore {
    service: Arc<SentimentService>,
    current: RwLock<Option<Arc<SentimentReport>>>,
    compute: Mutex<()>,
}

impl ReportStore {
    pub fn new(service: Arc<SentimentService>) -> Self {
        Self {
            service,
            current: RwLock::new(None),
            compute: Mutex::new(()),
        }
    }

    pub async fn current(&self) -> Option<Arc<SentimentReport>> {
        self.current.read().await.clone()
    }

    /// Trả về báo cáo đã có, hoặc tính lần đầu. Các caller đồng thời chờ chung một lượt.
    pub async fn get_or_init(&self) -> Arc<SentimentReport> {
        if let Some(report) = self.current().await {
            return report;
        }

        let _guard = self.compute.lock().await;
        if let Some(report) = self.current().await {
            return report;
        }

        let report = Arc::new(self.service.build_report().await);
        *self.current.write().await = Some(report.clone());
        report
    }

    /// Chạy lại pipeline và thay snapshot
    pub async fn refresh(&self) -> Arc<SentimentReport> {
        let _guard = self.compute.lock().await;
        let report = Arc::new(self.service.build_report().await);
        *self.current.write().await = Some(report.clone());
        info!(run_id = %report.run_id, "Đã làm mới báo cáo");
        report
    }
}
