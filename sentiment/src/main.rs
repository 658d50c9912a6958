use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info};

use jse_common::{build_http_client, init_logging, HttpClientConfig, LoggerConfig};
use jse_sentiment::api::{create_api_server, AppState};
use jse_sentiment::market::YahooChartClient;
use jse_sentiment::news::GNewsClient;
use jse_sentiment::{build_classifier, Config, ReportStore, SentimentService};

const LOG_FILE: &str = "jse_sentiment.log";

#[tokio::main]
async fn main() -> ExitCode {
    // Lỗi cấu hình được báo trước khi có logger
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Không thể khởi động: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Dừng do lỗi: {:#}", e);
            eprintln!("Dừng do lỗi: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    let _guard = init_logging(&LoggerConfig::new(config.log_dir.clone(), LOG_FILE))
        .context("khởi tạo logging")?;
    info!(
        classifier = ?config.classifier_backend,
        query = %config.news_query,
        symbol = %config.market_symbol,
        "Khởi động JSE sentiment service"
    );

    let client = build_http_client(&HttpClientConfig::with_timeout_secs(config.http_timeout_secs))
        .context("tạo HTTP client")?;

    let source = Arc::new(GNewsClient::new(
        client.clone(),
        &config.news_api_url,
        config.news_api_key.clone(),
    ));
    let classifier = build_classifier(&config, client.clone());
    let market = Arc::new(YahooChartClient::new(client, &config.market_api_url));

    let service = SentimentService::new(&config, source, classifier, market);
    let store = Arc::new(ReportStore::new(Arc::new(service)));

    if config.warm_start {
        let store = store.clone();
        tokio::spawn(async move {
            let report = store.get_or_init().await;
            info!(run_id = %report.run_id, records = report.records.len(), "Warm-up hoàn tất");
        });
    }

    let state = AppState::new(store, config.chart_title.clone());
    create_api_server(state, &config.bind_addr())
        .await
        .with_context(|| format!("chạy API server tại {}", config.bind_addr()))?;

    Ok(())
}
