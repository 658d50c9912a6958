// Standard library imports
use std::sync::Arc;

// Third party imports
use async_trait::async_trait;
use reqwest::Client;

// Internal imports
use crate::config::{ClassifierBackend, Config};
use crate::error::SentimentResult;
use crate::types::{Classification, SentimentLabel};

pub mod huggingface;
pub mod lexicon;

pub use huggingface::HuggingFaceClassifier;
pub use lexicon::LexiconClassifier;

/// Interface cho mô hình phân loại sentiment.
///
/// Mỗi lần gọi là độc lập, không có trạng thái giữa các tiêu đề.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    /// Phân loại một đoạn text, trả về nhãn và độ tin cậy
    async fn classify(&self, text: &str) -> SentimentResult<Classification>;

    /// Các nhãn mà classifier biết trước, dùng để điền 0 khi tổng hợp
    fn known_labels(&self) -> Vec<SentimentLabel>;

    /// Tên backend, dùng cho log
    fn name(&self) -> &'static str;
}

/// Nhãn của các mô hình tài chính ba lớp (FinBERT và lexicon)
pub fn three_way_labels() -> Vec<SentimentLabel> {
    vec![
        SentimentLabel::positive(),
        SentimentLabel::negative(),
        SentimentLabel::neutral(),
    ]
}

/// Tạo classifier theo cấu hình
pub fn build_classifier(config: &Config, client: Client) -> Arc<dyn SentimentClassifier> {
    match config.classifier_backend {
        ClassifierBackend::HuggingFace => Arc::new(HuggingFaceClassifier::new(
            client,
            &config.hf_api_url,
            &config.hf_model,
            config.hf_api_token.clone(),
        )),
        ClassifierBackend::Lexicon => Arc::new(LexiconClassifier::new()),
    }
}
