// Modules
pub mod error;
pub mod http;
pub mod logger;

// Re-exports
pub use error::{CommonError, CommonResult};
pub use http::{build_http_client, HttpClientConfig, DEFAULT_USER_AGENT};
pub use logger::{ensure_log_dir, init_logging, LoggerConfig};
