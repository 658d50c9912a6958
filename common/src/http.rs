// Standard library imports
use std::time::Duration;

// Third party imports
use reqwest::Client;

// Internal imports
use crate::error::CommonResult;

/// User agent mặc định cho các request ra ngoài
pub const DEFAULT_USER_AGENT: &str = concat!("jse-sentiment/", env!("CARGO_PKG_VERSION"));

/// Cấu hình HTTP client dùng chung
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Timeout cho mỗi request
    pub timeout: Duration,
    /// User agent
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HttpClientConfig {
    /// Tạo cấu hình với timeout tính bằng giây
    pub fn with_timeout_secs(secs: u64) -> Self {
        Self {
            timeout: Duration::from_secs(secs),
            ..Self::default()
        }
    }
}

/// Tạo reqwest client theo cấu hình
pub fn build_http_client(config: &HttpClientConfig) -> CommonResult<Client> {
    let client = Client::builder()
        .timeout(config.timeout)
        .user_agent(config.user_agent.as_str())
        .build()?;
    Ok(client)
}

/// Module tests
#[cfg(test)]
mod tests {
    use super::*;

    /// Test cấu hình mặc định
    #[test]
    fn test_default_config() {
        let config = HttpClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert!(config.user_agent.starts_with("jse-sentiment/"));
    }

    /// Test tạo client
    #[test]
    fn test_build_http_client() {
        let config = HttpClientConfig::with_timeout_secs(3);
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert!(build_http_client(&config).is_ok());
    }
}
