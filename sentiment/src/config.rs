use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use dotenv::dotenv;
use serde::{Deserialize, Serialize};

use crate::error::{SentimentError, SentimentResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ClassifierBackend {
    HuggingFace,
    Lexicon,
}

impl FromStr for ClassifierBackend {
    type Err = SentimentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "huggingface" | "hf" | "finbert" => Ok(ClassifierBackend::HuggingFace),
            "lexicon" => Ok(ClassifierBackend::Lexicon),
            _ => Err(SentimentError::InvalidConfig {
                key: "CLASSIFIER_BACKEND".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    // Tin tức (GNews)
    #[serde(skip_serializing)]
    pub news_api_key: String,
    pub news_api_url: String,
    pub news_query: String,
    pub news_lang: String,
    pub news_country: String,
    pub news_max_articles: u32,

    // Dữ liệu thị trường (Yahoo chart API)
    pub market_symbol: String,
    pub market_range: String,
    pub market_interval: String,
    pub market_api_url: String,

    // Classifier
    pub classifier_backend: ClassifierBackend,
    pub hf_api_url: String,
    pub hf_model: String,
    #[serde(skip_serializing)]
    pub hf_api_token: Option<String>,
    pub classify_concurrency: usize,
    pub http_timeout_secs: u64,

    // Biểu đồ
    pub chart_path: PathBuf,
    pub chart_title: String,

    // API
    pub api_host: String,
    pub api_port: u16,
    pub warm_start: bool,

    // Logging
    pub log_dir: PathBuf,
}

impl Config {
    /// Cấu hình mặc định với API key cho trước
    pub fn new(news_api_key: impl Into<String>) -> Self {
        Self {
            news_api_key: news_api_key.into(),
            news_api_url: "https://gnews.io/api/v4".to_string(),
            news_query: "JSE".to_string(),
            news_lang: "en".to_string(),
            news_country: "za".to_string(),
            news_max_articles: 10,
            market_symbol: "JSE.JO".to_string(),
            market_range: "7d".to_string(),
            market_interval: "1d".to_string(),
            market_api_url: "https://query1.finance.yahoo.com".to_string(),
            classifier_backend: ClassifierBackend::HuggingFace,
            hf_api_url: "https://api-inference.huggingface.co".to_string(),
            hf_model: "ProsusAI/finbert".to_string(),
            hf_api_token: None,
            classify_concurrency: 1,
            http_timeout_secs: 15,
            chart_path: PathBuf::from("static/sentiment_plot.svg"),
            chart_title: "JSE News Sentiment Distribution".to_string(),
            api_host: "0.0.0.0".to_string(),
            api_port: 8080,
            warm_start: true,
            log_dir: PathBuf::from("logs"),
        }
    }

    /// Đọc cấu hình từ biến môi trường (có hỗ trợ file .env)
    pub fn from_env() -> SentimentResult<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Đọc cấu hình từ một hàm tra cứu bất kỳ.
    ///
    /// `NEWS_API_KEY` là bắt buộc; các biến khác có giá trị mặc định,
    /// nhưng nếu có mặt mà sai định dạng thì trả về `InvalidConfig`.
    pub fn from_lookup<F>(lookup: F) -> SentimentResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let news_api_key = lookup("NEWS_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| SentimentError::ConfigurationMissing("NEWS_API_KEY".to_string()))?;

        let defaults = Self::new(news_api_key);
        let string = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Config {
            news_api_url: string("NEWS_API_URL", &defaults.news_api_url),
            news_query: string("NEWS_QUERY", &defaults.news_query),
            news_lang: string("NEWS_LANG", &defaults.news_lang),
            news_country: string("NEWS_COUNTRY", &defaults.news_country),
            news_max_articles: parse_var(&lookup, "NEWS_MAX_ARTICLES", defaults.news_max_articles)?,
            market_symbol: string("MARKET_SYMBOL", &defaults.market_symbol),
            market_range: string("MARKET_RANGE", &defaults.market_range),
            market_interval: string("MARKET_INTERVAL", &defaults.market_interval),
            market_api_url: string("MARKET_API_URL", &defaults.market_api_url),
            classifier_backend: parse_var(&lookup, "CLASSIFIER_BACKEND", defaults.classifier_backend)?,
            hf_api_url: string("HF_API_URL", &defaults.hf_api_url),
            hf_model: string("HF_MODEL", &defaults.hf_model),
            hf_api_token: lookup("HF_API_TOKEN").filter(|token| !token.trim().is_empty()),
            classify_concurrency: parse_var(&lookup, "CLASSIFY_CONCURRENCY", defaults.classify_concurrency)?,
            http_timeout_secs: parse_var(&lookup, "HTTP_TIMEOUT_SECS", defaults.http_timeout_secs)?,
            chart_path: lookup("CHART_PATH").map(PathBuf::from).unwrap_or(defaults.chart_path.clone()),
            chart_title: string("CHART_TITLE", &defaults.chart_title),
            api_host: string("API_HOST", &defaults.api_host),
            api_port: parse_var(&lookup, "API_PORT", defaults.api_port)?,
            warm_start: parse_var(&lookup, "WARM_START", defaults.warm_start)?,
            log_dir: lookup("LOG_DIR").map(PathBuf::from).unwrap_or(defaults.log_dir.clone()),
            ..defaults
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> SentimentResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<T>().map_err(|_| SentimentError::InvalidConfig {
            key: key.to_string(),
            value: raw,
        }),
    }
}
