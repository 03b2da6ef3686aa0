//! reqwest-backed transport and its configuration.

use async_trait::async_trait;
use futures_util::{StreamExt, TryStreamExt};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

use crate::request::HttpRequest;
use crate::transport::{BoxError, HttpResponse, Transport, TransportError};

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Request timeout.
    pub request_timeout: Duration,
    /// User agent string. `None` leaves `user-agent` unset.
    pub user_agent: Option<String>,
    /// Maximum idle connections per host.
    pub pool_max_idle_per_host: usize,
    /// Enable gzip decompression.
    pub gzip: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            user_agent: None,
            pool_max_idle_per_host: 10,
            gzip: true,
        }
    }
}

/// Build a configured reqwest client.
pub fn build_client(config: &HttpConfig) -> Result<Client, TransportError> {
    let mut builder = ClientBuilder::new()
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .gzip(config.gzip);

    if let Some(user_agent) = &config.user_agent {
        builder = builder.user_agent(user_agent);
    }

    builder
        .build()
        .map_err(|e| TransportError::ClientBuild(Box::new(e)))
}

/// [`Transport`] over a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    inner: Client,
}

impl ReqwestTransport {
    /// Create a transport with default config.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_config(&HttpConfig::default())
    }

    /// Create a transport with custom config.
    pub fn with_config(config: &HttpConfig) -> Result<Self, TransportError> {
        let inner = build_client(config)?;
        Ok(Self { inner })
    }

    /// Wrap an existing client.
    pub fn from_client(inner: Client) -> Self {
        Self { inner }
    }

    /// Get the inner reqwest client.
    pub fn inner(&self) -> &Client {
        &self.inner
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let mut builder = self.inner.request(method, url).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response
            .bytes_stream()
            .map_err(|e| Box::new(e) as BoxError)
            .boxed();

        Ok(HttpResponse::new(status, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HttpConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.user_agent.is_none());
        assert_eq!(config.pool_max_idle_per_host, 10);
        assert!(config.gzip);
    }

    #[test]
    fn test_transport_creation() {
        assert!(ReqwestTransport::new().is_ok());
    }

    #[test]
    fn test_transport_with_custom_config() {
        let config = HttpConfig {
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(15),
            user_agent: Some("conduit-test".to_string()),
            pool_max_idle_per_host: 5,
            gzip: false,
        };

        assert!(ReqwestTransport::with_config(&config).is_ok());
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        // Port 9 (discard) is closed on test hosts.
        let transport = ReqwestTransport::new().unwrap();
        let request = HttpRequest::new("GET", "http://127.0.0.1:9/").unwrap();
        let err = transport.execute(request).await.unwrap_err();
        assert!(matches!(
            err,
            TransportError::Connect(_) | TransportError::Request(_)
        ));
    }
}
