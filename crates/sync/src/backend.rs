//! Recommendation backend seam and its HTTP implementation.

use serde_json::Value;

use crate::config::ApiConfig;

/// Endpoint paths relative to `ApiConfig::base_url`.
pub mod endpoints {
    pub const RECOMMENDATIONS: &str = "/recommendations";
    pub const FEEDBACK: &str = "/feedback";
    pub const PREFERENCES_UPDATE: &str = "/preferences/update";
    pub const HEALTH: &str = "/health";
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP error (status {status:?}): {message}")]
    Http {
        status: Option<u16>,
        message: String,
    },
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("remote calls are disabled")]
    Offline,
}

/// A JSON-over-HTTP recommendation service.
pub trait Backend {
    /// POST a JSON body, optionally with a bearer token, and return the JSON
    /// response. Non-2xx responses are errors.
    fn post(&self, path: &str, body: &Value, bearer: Option<&str>) -> Result<Value, ApiError>;

    /// Whether the service answers its health check.
    fn health(&self) -> bool;

    fn name(&self) -> &'static str;
}

/// Blocking `reqwest` implementation.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    config: ApiConfig,
    http_client: reqwest::blocking::Client,
}

impl HttpBackend {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        if config.base_url.trim().is_empty() {
            return Err(ApiError::Http {
                status: None,
                message: "base URL must not be empty".to_string(),
            });
        }
        let http_client = reqwest::blocking::Client::builder()
            .connect_timeout(config.timeout.min(std::time::Duration::from_secs(10)))
            .timeout(config.timeout)
            .build()
            .map_err(|error| ApiError::Http {
                status: None,
                message: error.to_string(),
            })?;
        let config = ApiConfig {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            ..config.clone()
        };
        Ok(Self {
            config,
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }
}

impl Backend for HttpBackend {
    fn post(&self, path: &str, body: &Value, bearer: Option<&str>) -> Result<Value, ApiError> {
        let endpoint = self.config.url(path);
        let mut request = self
            .http_client
            .post(&endpoint)
            .header("Accept", "application/json")
            .json(body);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request.send().map_err(|error| ApiError::Http {
            status: None,
            message: error.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .unwrap_or_else(|_| "unable to read error body".to_string());
            return Err(ApiError::Http {
                status: Some(status.as_u16()),
                message,
            });
        }

        response
            .json()
            .map_err(|error| ApiError::Decode(error.to_string()))
    }

    fn health(&self) -> bool {
        let endpoint = self.config.url(endpoints::HEALTH);
        match self.http_client.get(&endpoint).send() {
            Ok(response) => response.status().is_success(),
            Err(error) => {
                tracing::debug!(%error, "health check failed");
                false
            }
        }
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
