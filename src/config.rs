use std::{env, time::Duration};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Connection settings for the remote store. The timeout applies to
/// every request the client issues.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Reads `TASKBOARD_API_URL`, `TASKBOARD_TOKEN` and
    /// `TASKBOARD_TIMEOUT_SECS`, falling back to defaults.
    pub fn from_env() -> Self {
        let base_url =
            env::var("TASKBOARD_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let token = env::var("TASKBOARD_TOKEN")
            .ok()
            .filter(|token| !token.is_empty());
        let timeout = env::var("TASKBOARD_TIMEOUT_SECS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Self {
            base_url,
            token,
            timeout: Duration::from_secs(timeout),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
