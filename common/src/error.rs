// Standard library imports
use std::io;

// Third party imports
use thiserror::Error;

/// Lỗi chung
#[derive(Debug, Error)]
pub enum CommonError {
    /// Lỗi mạng
    #[error("Network error: {0}")]
    Network(String),
    /// Lỗi khởi tạo logging
    #[error("Logging error: {0}")]
    Logging(String),
    /// Lỗi I/O
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<reqwest::Error> for CommonError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

/// Kiểu kết quả chung
pub type CommonResult<T> = Result<T, CommonError>;
