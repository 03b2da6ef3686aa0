//! Base-URL bound request helpers with status validation.

use bytes::{Bytes, BytesMut};
use conduit_config::ConnectorConfig;
use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::client::ReqwestTransport;
use crate::error::{ConnectorError, FailRequestError};
use crate::registry::ClientRegistry;
use crate::request::{headers, HttpRequest, RequestError};
use crate::status::{StatusRange, DEFAULT_STATUS_RANGE};
use crate::transport::{BodyStream, BoxError, Transport, TransportError};

/// A transport bound to a base URL and a ping path.
///
/// Every helper builds `base_url + path`, sends it through the shared
/// transport, reads the whole body and checks the status against a
/// [`StatusRange`]. Nothing is retried except by [`ping`](Self::ping).
/// Cloning is cheap and clones share the transport.
#[derive(Clone)]
pub struct Connector {
    base_url: String,
    ping_path: String,
    transport: Arc<dyn Transport>,
}

impl Connector {
    /// Bind `transport` to `base_url`, probing `ping_path` for readiness.
    pub fn new(
        base_url: impl Into<String>,
        ping_path: impl Into<String>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            ping_path: ping_path.into(),
            transport,
        }
    }

    /// Connector over a fresh reqwest transport.
    ///
    /// Call [`ping`](Self::ping) before relying on the remote service.
    pub fn from_config(config: &ConnectorConfig) -> Result<Self, TransportError> {
        let transport = ReqwestTransport::new()?;
        Ok(Self::new(
            config.url.clone(),
            config.ping_endpoint.clone(),
            Arc::new(transport),
        ))
    }

    /// Connector over the registry's transport for `key`.
    pub fn from_registry<T>(
        config: &ConnectorConfig,
        registry: &ClientRegistry<T>,
        key: &str,
    ) -> Result<Self, TransportError>
    where
        T: Transport + 'static,
    {
        let transport: Arc<dyn Transport> = registry.get_or_create(key)?;
        Ok(Self::new(
            config.url.clone(),
            config.ping_endpoint.clone(),
            transport,
        ))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn ping_path(&self) -> &str {
        &self.ping_path
    }

    /// The shared transport.
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// GET `path`, accepting [`DEFAULT_STATUS_RANGE`].
    pub async fn get(&self, path: &str) -> Result<Bytes, ConnectorError> {
        self.simple_do("GET", path, None).await
    }

    /// POST `body` to `path`, accepting [`DEFAULT_STATUS_RANGE`].
    pub async fn post(&self, path: &str, body: impl Into<Bytes>) -> Result<Bytes, ConnectorError> {
        self.simple_do("POST", path, Some(body.into())).await
    }

    /// PUT `body` to `path`, accepting [`DEFAULT_STATUS_RANGE`].
    pub async fn put(&self, path: &str, body: impl Into<Bytes>) -> Result<Bytes, ConnectorError> {
        self.simple_do("PUT", path, Some(body.into())).await
    }

    /// DELETE `path` with `body`, accepting [`DEFAULT_STATUS_RANGE`].
    pub async fn delete(&self, path: &str, body: impl Into<Bytes>) -> Result<Bytes, ConnectorError> {
        self.simple_do("DELETE", path, Some(body.into())).await
    }

    /// Any method, no headers, [`DEFAULT_STATUS_RANGE`].
    pub async fn simple_do(
        &self,
        method: &str,
        path: &str,
        body: Option<Bytes>,
    ) -> Result<Bytes, ConnectorError> {
        self.do_with_header(method, path, None, body, DEFAULT_STATUS_RANGE)
            .await
    }

    /// Build a request to `base_url + path` and run it through
    /// [`do_with_status_check`](Self::do_with_status_check).
    ///
    /// When `headers` is given it replaces the request's application headers;
    /// nothing is merged into it. The transport still adds its own `host`,
    /// `accept` and `accept-encoding` where the set leaves them out.
    pub async fn do_with_header(
        &self,
        method: &str,
        path: &str,
        headers: Option<HeaderMap>,
        body: Option<Bytes>,
        expected: StatusRange,
    ) -> Result<Bytes, ConnectorError> {
        let mut request = HttpRequest::new(method, &self.url_for(path))?;

        if let Some(headers) = headers {
            request = request.with_headers(headers);
        }
        if let Some(body) = body {
            request = request.with_body(body);
        }

        self.do_with_status_check(request, expected).await
    }

    /// Send `request`, read the whole body, then validate the status.
    ///
    /// The body is read even when the status is rejected so that it can be
    /// attached to the [`FailRequestError`]. The response stream is dropped on
    /// every exit path.
    pub async fn do_with_status_check(
        &self,
        request: HttpRequest,
        expected: StatusRange,
    ) -> Result<Bytes, ConnectorError> {
        let method = request.method.clone();
        let url = request.url.clone();
        tracing::debug!(%method, %url, "sending request");

        let response = self.transport.execute(request).await?;
        let status = response.status;
        let body = read_body(response.body)
            .await
            .map_err(ConnectorError::BodyRead)?;

        tracing::debug!(%method, %url, status, bytes = body.len(), "received response");

        if !expected.contains(status) {
            return Err(FailRequestError::new(status, body).into());
        }

        Ok(body)
    }

    /// GET `path` and decode the JSON payload.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ConnectorError> {
        let mut header_set = HeaderMap::new();
        header_set.insert(ACCEPT, HeaderValue::from_static(headers::ACCEPT_JSON));

        let body = self
            .do_with_header("GET", path, Some(header_set), None, DEFAULT_STATUS_RANGE)
            .await?;
        decode_json(&body)
    }

    /// POST `body` as JSON to `path` and decode the JSON payload.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ConnectorError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = serde_json::to_vec(body).map_err(RequestError::Body)?;

        let mut header_set = HeaderMap::new();
        header_set.insert(CONTENT_TYPE, HeaderValue::from_static(headers::CONTENT_TYPE_JSON));
        header_set.insert(ACCEPT, HeaderValue::from_static(headers::ACCEPT_JSON));

        let body = self
            .do_with_header(
                "POST",
                path,
                Some(header_set),
                Some(Bytes::from(payload)),
                DEFAULT_STATUS_RANGE,
            )
            .await?;
        decode_json(&body)
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl fmt::Debug for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connector")
            .field("base_url", &self.base_url)
            .field("ping_path", &self.ping_path)
            .finish_non_exhaustive()
    }
}

async fn read_body(mut stream: BodyStream) -> Result<Bytes, BoxError> {
    let mut buf = BytesMut::new();
    while let Some(chunk) = stream.next().await {
        buf.extend_from_slice(&chunk?);
    }
    Ok(buf.freeze())
}

fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, ConnectorError> {
    serde_json::from_slice(body).map_err(|source| ConnectorError::Decode {
        body: String::from_utf8_lossy(body).into_owned(),
        source,
    })
}
