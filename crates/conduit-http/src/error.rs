//! Connector error types.

use bytes::Bytes;
use std::fmt;
use std::time::Duration;

use crate::request::RequestError;
use crate::transport::{BoxError, TransportError};

/// A response arrived and was fully read, but its status was not accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailRequestError {
    pub status_code: u16,
    pub body: Bytes,
}

impl FailRequestError {
    pub fn new(status_code: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status_code,
            body: body.into(),
        }
    }

    /// The response body decoded as UTF-8, lossily.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl fmt::Display for FailRequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.body.is_empty() {
            write!(f, "{} fail request", self.status_code)
        } else {
            write!(
                f,
                "{} fail request, error message: {}",
                self.status_code,
                self.body_text()
            )
        }
    }
}

impl std::error::Error for FailRequestError {}

/// Errors returned by [`Connector`](crate::Connector) operations.
#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    #[error("can't create the request: {0}")]
    RequestConstruction(#[from] RequestError),

    #[error("fail to execute HTTP request: {0}")]
    Transport(#[from] TransportError),

    #[error("can't read response body: {0}")]
    BodyRead(#[source] BoxError),

    #[error(transparent)]
    FailRequest(#[from] FailRequestError),

    #[error("failed to decode response body: {source}")]
    Decode {
        body: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("can't ping API ({url}): timeout after {} s", .timeout.as_secs_f64())]
    PingTimeout { url: String, timeout: Duration },
}

impl ConnectorError {
    /// Status code of a rejected response, if that is what this error is.
    pub fn status(&self) -> Option<u16> {
        match self {
            ConnectorError::FailRequest(e) => Some(e.status_code),
            _ => None,
        }
    }

    /// The request was rejected with a 4xx status.
    pub fn is_client_error(&self) -> bool {
        matches!(self.status(), Some(400..=499))
    }

    /// The request was rejected with a 5xx status.
    pub fn is_server_error(&self) -> bool {
        matches!(self.status(), Some(500..=599))
    }

    /// A transport or ping deadline expired.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            ConnectorError::Transport(TransportError::Timeout) | ConnectorError::PingTimeout { .. }
        )
    }
}
