//! Shopware Admin API transport
//!
//! Every operation talks to the shop through [`Transport::api_request`], which
//! takes an endpoint relative to `/api` (e.g. `/search/customer`).

use super::client::{HttpClient, HttpClientConfig, RequestConfig};
use crate::config::NodeConfig;
use crate::error::{Error, Result};
use crate::types::{JsonValue, Method};
use async_trait::async_trait;
use std::time::Duration;
use tracing::warn;

/// HTTP capability handed to operation handlers
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request to `{base_url}/api{endpoint}` and return the parsed body.
    ///
    /// An empty JSON object or `null` body is not sent. Responses without a
    /// body resolve to `JsonValue::Null`.
    async fn api_request(
        &self,
        method: Method,
        endpoint: &str,
        body: JsonValue,
        query: &[(String, String)],
    ) -> Result<JsonValue>;
}

/// Whether a request body carries anything worth sending
pub fn has_body(body: &JsonValue) -> bool {
    match body {
        JsonValue::Null => false,
        JsonValue::Object(map) => !map.is_empty(),
        _ => true,
    }
}

/// reqwest-backed transport for one Shopware installation
#[derive(Debug)]
pub struct ShopwareClient {
    http: HttpClient,
}

impl ShopwareClient {
    /// Build a client from a node config.
    ///
    /// A configured access token is sent as is; otherwise the integration's
    /// client credentials are exchanged for tokens on demand.
    pub fn new(config: &NodeConfig) -> Result<Self> {
        let auth = config.auth()?;
        let mut builder = HttpClientConfig::builder()
            .base_url(format!("{}/api", config.credentials.base_url()))
            .timeout(Duration::from_secs(config.http.timeout_secs));
        if let Some(agent) = &config.http.user_agent {
            builder = builder.user_agent(agent.clone());
        }

        let http = HttpClient::with_auth(builder.build(), auth)?;
        Ok(Self { http })
    }

    /// Credential test: fetch the shop's version info
    pub async fn check(&self) -> Result<JsonValue> {
        self.api_request(Method::GET, "/_info/version", JsonValue::Null, &[])
            .await
    }

    /// Drop the cached access token if a new one can be requested
    async fn clear_token(&self) -> bool {
        match self.http.authenticator() {
            Some(auth) if auth.can_refresh() => {
                auth.clear_cache().await;
                true
            }
            _ => false,
        }
    }

    async fn send(
        &self,
        method: Method,
        endpoint: &str,
        body: &JsonValue,
        query: &[(String, String)],
    ) -> Result<JsonValue> {
        let mut config = RequestConfig::new();
        for (key, value) in query {
            config = config.query(key.clone(), value.clone());
        }
        if has_body(body) {
            config = config.json(body.clone());
        }

        self.http
            .request_value(method.into(), endpoint, config)
            .await
    }
}

#[async_trait]
impl Transport for ShopwareClient {
    /// A `401` answer (token revoked or expired early) is retried once with a
    /// freshly requested token.
    async fn api_request(
        &self,
        method: Method,
        endpoint: &str,
        body: JsonValue,
        query: &[(String, String)],
    ) -> Result<JsonValue> {
        match self.send(method, endpoint, &body, query).await {
            Err(Error::HttpStatus { status: 401, .. }) if self.clear_token().await => {
                warn!(endpoint, "Access token rejected, requesting a new one");
                self.send(method, endpoint, &body, query).await
            }
            outcome => outcome,
        }
    }
}
