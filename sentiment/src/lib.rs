//! JSE news sentiment board: lấy tiêu đề tin tức, phân loại sentiment,
//! tổng hợp theo nhãn, vẽ biểu đồ và phục vụ kết quả qua HTTP.

// Public modules
pub mod api;
pub mod chart;
pub mod classifier;
pub mod config;
pub mod error;
pub mod market;
pub mod news;
pub mod pipeline;
pub mod service;
pub mod summary;
pub mod templates;
pub mod types;

#[cfg(test)]
mod test_support;

// Re-exports
pub use classifier::{build_classifier, SentimentClassifier};
pub use config::{ClassifierBackend, Config};
pub use error::{SentimentError, SentimentResult};
pub use pipeline::{classify_all, ClassificationRun, SkippedHeadline};
pub use service::{ReportStore, SentimentReport, SentimentService};
pub use summary::{summarize, SentimentSummary};
pub use types::{Classification, Headline, SentimentLabel, SentimentRecord};
