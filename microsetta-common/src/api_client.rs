//! Private REST API client
//!
//! Thin authenticated wrapper around `reqwest`. Every request carries the
//! caller's bearer token; a failed call is reported as an [`ApiFailure`]
//! value so callers can record it and move on.

use crate::config::ApiSettings;
use crate::{Error, Result};
use serde_json::Value;

const USER_AGENT: &str = concat!("microsetta-admin/", env!("CARGO_PKG_VERSION"));

/// Failure of a single upstream call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiFailure {
    /// Upstream answered with a non-success status
    #[error("{0} from api")]
    Status(u16),

    /// Connection, TLS or timeout failure before a status was received
    #[error("transport error from api: {0}")]
    Transport(String),

    /// Success status but the body was not valid JSON
    #[error("invalid json from api: {0}")]
    Decode(String),
}

/// Private API client
#[derive(Debug, Clone)]
pub struct ApiClient {
    http_client: reqwest::Client,
    base_url: String,
    token: String,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings, token: impl Into<String>) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(settings.timeout);

        if let Some(ca_file) = &settings.ca_file {
            let pem = std::fs::read(ca_file).map_err(|e| {
                Error::Config(format!("Read CA file failed ({}): {}", ca_file.display(), e))
            })?;
            let cert = reqwest::Certificate::from_pem(&pem)
                .map_err(|e| Error::Config(format!("Invalid CA file: {}", e)))?;
            builder = builder.add_root_certificate(cert);
        }

        let http_client = builder.build().map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `path` (relative to the base URL) and decode the JSON body
    pub async fn get_json(&self, path: &str) -> std::result::Result<Value, ApiFailure> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, "Querying private API");

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| ApiFailure::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(url = %url, status = status.as_u16(), "Private API returned error status");
            return Err(ApiFailure::Status(status.as_u16()));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ApiFailure::Decode(e.to_string()))
    }
}
