use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{three_way_labels, SentimentClassifier};
use crate::error::{SentimentError, SentimentResult};
use crate::types::{Classification, SentimentLabel};

/// Một ứng viên nhãn trong response của inference API
#[derive(Debug, Clone, Deserialize)]
struct Candidate {
    label: String,
    score: f64,
}

/// Inference API trả về `[[{..}]]` hoặc `[{..}]` tùy model, hoặc `{"error": ..}`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Nested(Vec<Vec<Candidate>>),
    Flat(Vec<Candidate>),
    Error { error: String },
}

/// Classifier gọi mô hình text-classification (mặc định ProsusAI/finbert)
/// qua Hugging Face inference API.
pub struct HuggingFaceClassifier {
    client: Client,
    endpoint: String,
    token: Option<String>,
}

impl HuggingFaceClassifier {
    pub fn new(client: Client, base_url: &str, model: &str, token: Option<String>) -> Self {
        let endpoint = format!("{}/models/{}", base_url.trim_end_matches('/'), model);
        Self {
            client,
            endpoint,
            token,
        }
    }
}

/// Chọn nhãn có score cao nhất từ body của inference API
pub fn parse_inference_response(body: &str) -> SentimentResult<Classification> {
    let response: InferenceResponse = serde_json::from_str(body).map_err(|e| {
        SentimentError::ClassificationFailure(format!("response không hợp lệ: {}", e))
    })?;

    let candidates = match response {
        InferenceResponse::Nested(batches) => batches.into_iter().next().unwrap_or_default(),
        InferenceResponse::Flat(candidates) => candidates,
        InferenceResponse::Error { error } => {
            return Err(SentimentError::ClassificationFailure(error));
        }
    };

    candidates
        .into_iter()
        .max_by(|a, b| a.score.total_cmp(&b.score))
        .map(|top| Classification::new(top.label, top.score))
        .ok_or_else(|| {
            SentimentError::ClassificationFailure("inference API không trả về nhãn nào".to_string())
        })
}

#[async_trait]
impl SentimentClassifier for HuggingFaceClassifier {
    async fn classify(&self, text: &str) -> SentimentResult<Classification> {
        let mut request = self.client.post(&self.endpoint).json(&json!({ "inputs": text }));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SentimentError::ClassificationFailure(format!("lỗi kết nối: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SentimentError::ClassificationFailure(format!("lỗi đọc body: {}", e)))?;

        if !status.is_success() {
            let detail = match serde_json::from_str::<InferenceResponse>(&body) {
                Ok(InferenceResponse::Error { error }) => error,
                _ => body.chars().take(200).collect(),
            };
            return Err(SentimentError::ClassificationFailure(format!(
                "HTTP {}: {}",
                status, detail
            )));
        }

        let classification = parse_inference_response(&body)?;
        debug!(label = %classification.label, score = classification.score, "FinBERT đã phân loại");
        Ok(classification)
    }

    fn known_labels(&self) -> Vec<SentimentLabel> {
        three_way_labels()
    }

    fn name(&self) -> &'static str {
        "huggingface"
    }
}
