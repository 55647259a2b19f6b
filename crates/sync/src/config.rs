use std::time::Duration;

/// Remote API settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    /// Base URL including the `/api` prefix, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Minimum spacing between two remote calls.
    pub min_interval: Duration,
    /// Lifetime of a cached recommendation.
    pub cache_ttl: Duration,
    /// Skip the network entirely.
    pub offline: bool,
}

impl ApiConfig {
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:8000/api";

    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// Full URL for an endpoint path such as `/feedback`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            min_interval: Duration::from_secs(1),
            cache_ttl: Duration::from_secs(5 * 60),
            offline: false,
        }
    }
}
