//! The network capability a connector delegates to.

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::{self, BoxStream, StreamExt};
use std::fmt;

use crate::request::HttpRequest;

/// Boxed error type used for wrapped causes.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Response body as a stream of chunks.
pub type BodyStream = BoxStream<'static, Result<Bytes, BoxError>>;

/// Performs one HTTP round trip.
///
/// Implementations must report network-level failures as [`TransportError`]
/// and hand back every received response, whatever its status code.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute `request` and return the status and unread body.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// A received response whose body has not been read yet.
///
/// Dropping the response releases the underlying body stream.
pub struct HttpResponse {
    pub status: u16,
    pub body: BodyStream,
}

impl HttpResponse {
    pub fn new(status: u16, body: BodyStream) -> Self {
        Self { status, body }
    }

    /// A response with a body delivered in a single chunk.
    pub fn from_bytes(status: u16, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        Self::new(status, stream::once(async move { Ok(body) }).boxed())
    }

    /// A response without a body.
    pub fn empty(status: u16) -> Self {
        Self::new(status, stream::empty().boxed())
    }
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Network-level failures, distinct from application status codes.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] BoxError),

    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(#[source] BoxError),

    #[error("request failed: {0}")]
    Request(#[source] BoxError),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_connect() {
            TransportError::Connect(Box::new(e))
        } else {
            TransportError::Request(Box::new(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::TryStreamExt;

    #[tokio::test]
    async fn test_from_bytes_yields_single_chunk() {
        let response = HttpResponse::from_bytes(200, "This is data");
        let chunks: Vec<Bytes> = response.body.try_collect().await.unwrap();
        assert_eq!(chunks, vec![Bytes::from_static(b"This is data")]);
    }

    #[tokio::test]
    async fn test_empty_yields_nothing() {
        let response = HttpResponse::empty(204);
        assert_eq!(response.status, 204);
        let chunks: Vec<Bytes> = response.body.try_collect().await.unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_debug_omits_body() {
        let response = HttpResponse::empty(404);
        let rendered = format!("{:?}", response);
        assert!(rendered.contains("404"));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(TransportError::Timeout.to_string(), "request timed out");
        let err = TransportError::Connect("connection refused".into());
        assert_eq!(err.to_string(), "connection failed: connection refused");
    }
}
