use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SentimentError {
    #[error("Nguồn tin tức không khả dụng: {0}")]
    SourceUnavailable(String),

    #[error("Không phân loại được tiêu đề: {0}")]
    ClassificationFailure(String),

    #[error("Thiếu cấu hình bắt buộc: {0}")]
    ConfigurationMissing(String),

    #[error("Cấu hình không hợp lệ {key}={value}")]
    InvalidConfig { key: String, value: String },

    #[error("Lỗi dữ liệu thị trường: {0}")]
    MarketData(String),

    #[error("Lỗi vẽ biểu đồ: {0}")]
    Render(String),

    #[error("Lỗi I/O: {0}")]
    Io(#[from] io::Error),
}

impl From<minijinja::Error> for SentimentError {
    fn from(err: minijinja::Error) -> Self {
        SentimentError::Render(err.to_string())
    }
}

pub type SentimentResult<T> = Result<T, SentimentError>;
