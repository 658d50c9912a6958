// Standard library imports
use std::path::{Path, PathBuf};

// Third party imports
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

// Internal imports
use crate::error::{CommonError, CommonResult};

/// Cấu hình logger
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Thư mục chứa file log
    pub log_dir: PathBuf,
    /// Tên file log (được thêm hậu tố ngày)
    pub file_name: String,
    /// Filter mặc định khi không có RUST_LOG
    pub default_filter: String,
}

impl LoggerConfig {
    /// Tạo cấu hình logger mới
    pub fn new(log_dir: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            log_dir: log_dir.into(),
            file_name: file_name.into(),
            default_filter: "info".to_string(),
        }
    }
}

/// Chuẩn bị thư mục log
pub fn ensure_log_dir(log_dir: &Path) -> CommonResult<()> {
    if !log_dir.exists() {
        std::fs::create_dir_all(log_dir)?;
    }
    Ok(())
}

/// Khởi tạo tracing: stderr có màu, file log xoay vòng theo ngày.
///
/// Guard trả về phải được giữ đến khi process kết thúc, nếu không log
/// trong buffer của writer non-blocking sẽ bị mất.
pub fn init_logging(config: &LoggerConfig) -> CommonResult<WorkerGuard> {
    ensure_log_dir(&config.log_dir)?;

    let file_appender = RollingFileAppender::new(
        Rotation::DAILY,
        &config.log_dir,
        &config.file_name,
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let default_filter = config.default_filter.clone();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into())
        )
        .with(
            fmt::Layer::new()
                .with_writer(std::io::stderr)
                .with_ansi(true)
        )
        .with(
            fmt::Layer::new()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_span_events(FmtSpan::CLOSE)
        )
        .try_init()
        .map_err(|e| CommonError::Logging(e.to_string()))?;

    Ok(guard)
}

/// Module tests
#[cfg(test)]
mod tests {
    use super::*;

    /// Test LoggerConfig
    #[test]
    fn test_logger_config() {
        let config = LoggerConfig::new("logs", "jse_sentiment.log");
        assert_eq!(config.log_dir, PathBuf::from("logs"));
        assert_eq!(config.file_name, "jse_sentiment.log");
        assert_eq!(config.default_filter, "info");
    }

    /// Test tạo thư mục log
    #[test]
    fn test_ensure_log_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        ensure_log_dir(&nested).unwrap();
        assert!(nested.is_dir());
        // Gọi lại lần hai không lỗi
        ensure_log_dir(&nested).unwrap();
    }
}
