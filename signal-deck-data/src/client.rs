//! REST client for the signal-collector feeds
//!
//! Provides the two read endpoints the dashboard polls: `/api/coins` and
//! `/api/macro`. Both are idempotent reads; the backend computes the
//! trend/signal values, this client only transports them.

use crate::error::FeedError;
use crate::types::{AssetRecord, CoinsResponse, MacroRecord, MacrosResponse};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;

const COINS_ENDPOINT: &str = "/api/coins";
const MACRO_ENDPOINT: &str = "/api/macro";

/// Read access to the two dashboard feeds
///
/// Implemented by [`FeedClient`] for the live backend; tests substitute
/// in-memory sources.
#[async_trait]
pub trait FeedSource: Send + Sync + 'static {
    /// Fetch the per-asset trend/signal records
    async fn fetch_assets(&self) -> Result<Vec<AssetRecord>, FeedError>;

    /// Fetch the macro indicator records
    async fn fetch_macros(&self) -> Result<Vec<MacroRecord>, FeedError>;
}

/// Feed client configuration
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Base URL of the signal-collector backend
    pub base_url: String,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            request_timeout: Duration::from_secs(5),
        }
    }
}

impl FeedConfig {
    /// Create a new configuration with a custom base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            ..Default::default()
        }
    }

    /// Set the per-request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// REST client for the dashboard feeds
#[derive(Debug, Clone)]
pub struct FeedClient {
    config: FeedConfig,
    http: reqwest::Client,
}

impl FeedClient {
    /// Create a new client with the default configuration
    pub fn new() -> Self {
        Self::with_config(FeedConfig::default())
    }

    /// Create a new client with a custom configuration
    pub fn with_config(config: FeedConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, FeedError> {
        let url = format!("{}{}", self.config.base_url, endpoint);

        let response = self
            .http
            .get(&url)
            .timeout(self.config.request_timeout)
            .send()
            .await
            .map_err(|request_err| FeedError::Request(request_err.to_string()))?;

        if let Err(status_err) = response.error_for_status_ref() {
            return Err(FeedError::Status {
                status: status_err.status().map(|s| s.as_u16()).unwrap_or(0),
                endpoint: endpoint.to_string(),
            });
        }

        response.json::<T>().await.map_err(|parse_err| FeedError::Decode {
            endpoint: endpoint.to_string(),
            detail: parse_err.to_string(),
        })
    }
}

impl Default for FeedClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedSource for FeedClient {
    async fn fetch_assets(&self) -> Result<Vec<AssetRecord>, FeedError> {
        let payload: CoinsResponse = self.get_json(COINS_ENDPOINT).await?;
        Ok(payload.coins)
    }

    async fn fetch_macros(&self) -> Result<Vec<MacroRecord>, FeedError> {
        let payload: MacrosResponse = self.get_json(MACRO_ENDPOINT).await?;
        Ok(payload.macros)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = FeedConfig::new("http://10.0.0.5:9000/")
            .with_request_timeout(Duration::from_secs(2));

        assert_eq!(config.base_url, "http://10.0.0.5:9000");
        assert_eq!(config.request_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_default_config() {
        let config = FeedConfig::default();
        assert_eq!(config.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }
}
