use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{SentimentError, SentimentResult};
use crate::types::Headline;

/// Tham số tìm kiếm tin tức
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsQuery {
    pub term: String,
    pub lang: String,
    pub country: String,
    pub max: u32,
}

impl NewsQuery {
    pub fn from_config(config: &Config) -> Self {
        Self {
            term: config.news_query.clone(),
            lang: config.news_lang.clone(),
            country: config.news_country.clone(),
            max: config.news_max_articles,
        }
    }
}

/// Nguồn tiêu đề tin tức. Kết quả giữ nguyên thứ tự của API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HeadlineSource: Send + Sync {
    async fn fetch_headlines(&self, query: &NewsQuery) -> SentimentResult<Vec<Headline>>;
}

#[derive(Debug, Deserialize)]
struct GNewsArticle {
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GNewsResponse {
    #[serde(default)]
    articles: Vec<GNewsArticle>,
}

#[derive(Debug, Deserialize)]
struct GNewsErrorBody {
    #[serde(default)]
    errors: serde_json::Value,
}

/// Lấy tiêu đề từ body JSON của GNews, bỏ qua bài không có tiêu đề
pub fn parse_gnews_response(body: &str) -> SentimentResult<Vec<Headline>> {
    let response: GNewsResponse = serde_json::from_str(body)
        .map_err(|e| SentimentError::SourceUnavailable(format!("body GNews không hợp lệ: {}", e)))?;

    Ok(response
        .articles
        .into_iter()
        .filter_map(|article| article.title)
        .filter_map(|title| Headline::new(title).ok())
        .collect())
}

/// Client cho GNews search API
pub struct GNewsClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GNewsClient {
    pub fn new(client: Client, base_url: &str, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn search_url(&self) -> String {
        format!("{}/search", self.base_url)
    }
}

#[async_trait]
impl HeadlineSource for GNewsClient {
    async fn fetch_headlines(&self, query: &NewsQuery) -> SentimentResult<Vec<Headline>> {
        let max = query.max.to_string();
        let response = self
            .client
            .get(self.search_url())
            .query(&[
                ("q", query.term.as_str()),
                ("lang", query.lang.as_str()),
                ("country", query.country.as_str()),
                ("max", max.as_str()),
                ("token", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SentimentError::SourceUnavailable(format!("lỗi kết nối GNews: {}", e.without_url())))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SentimentError::SourceUnavailable(format!("lỗi đọc body GNews: {}", e)))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<GNewsErrorBody>(&body)
                .map(|b| b.errors.to_string())
                .unwrap_or_else(|_| status.to_string());
            return Err(SentimentError::SourceUnavailable(format!(
                "GNews trả về HTTP {}: {}",
                status.as_u16(),
                detail
            )));
        }

        let headlines = parse_gnews_response(&body)?;
        debug!(count = headlines.len(), term = %query.term, "Đã nhận tiêu đề từ GNews");
        info!("Lấy được {} tiêu đề cho từ khóa '{}'", headlines.len(), query.term);
        Ok(headlines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "totalArticles": 4,
        "articles": [
            {"title": "JSE closes higher as miners rally", "url": "https://example.com/1"},
            {"title": "   ", "url": "https://example.com/2"},
            {"url": "https://example.com/3"},
            {"title": "Rand weakens against dollar", "url": "https://example.com/4"}
        ]
    }"#;

    #[test]
    fn test_parse_gnews_response() {
        let headlines = parse_gnews_response(SAMPLE).unwrap();
        let titles: Vec<&str> = headlines.iter().map(|h| h.as_str()).collect();
        assert_eq!(titles, vec!["JSE closes higher as miners rally", "Rand weakens against dollar"]);
    }

    #[test]
    fn test_parse_empty_and_missing_articles() {
        assert!(parse_gnews_response(r#"{"totalArticles": 0, "articles": []}"#).unwrap().is_empty());
        assert!(parse_gnews_response(r#"{"totalArticles": 0}"#).unwrap().is_empty());
    }

    #[test]
    fn test_parse_invalid_body() {
        assert!(matches!(
            parse_gnews_response("not json"),
            Err(SentimentError::SourceUnavailable(_))
        ));
    }

    #[test]
    fn test_query_from_config() {
        let config = Config::new("key");
        let query = NewsQuery::from_config(&config);
        assert_eq!(
            query,
            NewsQuery {
                term: "JSE".to_string(),
                lang: "en".to_string(),
                country: "za".to_string(),
                max: 10,
            }
        );
    }

    #[test]
    fn test_search_url() {
        let client = GNewsClient::new(Client::new(), "https://gnews.io/api/v4/", "key");
        assert_eq!(client.search_url(), "https://gnews.io/api/v4/search");
    }

    use crate::test_support::spawn_server;
    use axum::{extract::Query, http::StatusCode, routing::get, Router};
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_fetch_headlines_sends_query() {
        let app = Router::new().route(
            "/search",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                assert_eq!(params["q"], "JSE");
                assert_eq!(params["lang"], "en");
                assert_eq!(params["country"], "za");
                assert_eq!(params["max"], "10");
                assert_eq!(params["token"], "secret");
                SAMPLE
            }),
        );
        let base_url = spawn_server(app).await;
        let client = GNewsClient::new(Client::new(), &base_url, "secret");
        let query = NewsQuery::from_config(&Config::new("unused"));

        let headlines = client.fetch_headlines(&query).await.unwrap();
        assert_eq!(headlines.len(), 2);
        assert_eq!(headlines[0].as_str(), "JSE closes higher as miners rally");
    }

    #[tokio::test]
    async fn test_fetch_headlines_forbidden() {
        let app = Router::new().route(
            "/search",
            get(|| async {
                (
                    StatusCode::FORBIDDEN,
                    r#"{"errors": ["You did not provide an API key."]}"#,
                )
            }),
        );
        let base_url = spawn_server(app).await;
        let client = GNewsClient::new(Client::new(), &base_url, "bad-key");
        let query = NewsQuery::from_config(&Config::new("unused"));

        match client.fetch_headlines(&query).await {
            Err(SentimentError::SourceUnavailable(msg)) => {
                assert!(msg.contains("403"), "{}", msg);
                assert!(msg.contains("API key"), "{}", msg);
                assert!(!msg.contains("bad-key"), "{}", msg);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_headlines_unreachable() {
        // Cổng 1 trên localhost không có gì lắng nghe
        let client = GNewsClient::new(Client::new(), "http://127.0.0.1:1", "secret");
        let query = NewsQuery::from_config(&Config::new("unused"));

        match client.fetch_headlines(&query).await {
            Err(SentimentError::SourceUnavailable(msg)) => assert!(!msg.contains("secret"), "{}", msg),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    #[ignore] // Bỏ qua trong CI vì cần kết nối internet và API key
    async fn test_fetch_headlines_live() {
        let key = std::env::var("NEWS_API_KEY").unwrap();
        let client = GNewsClient::new(Client::new(), "https://gnews.io/api/v4", key);
        let query = NewsQuery::from_config(&Config::new("unused"));
        let headlines = client.fetch_headlines(&query).await.unwrap();
        assert!(headlines.len() <= 10);
    }
}
