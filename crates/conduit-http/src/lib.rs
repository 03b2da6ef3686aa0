//! HTTP connector utilities for Conduit.
//!
//! A [`Connector`] binds a shared [`Transport`], a base URL and a ping path,
//! and funnels every request through one status-validating executor.
//! Transports are usually handed out by a [`ClientRegistry`] so that many
//! connectors can share one connection pool.

pub mod cancel;
pub mod client;
pub mod connector;
pub mod error;
pub mod ping;
pub mod registry;
pub mod request;
pub mod status;
pub mod transport;

pub use cancel::{CancellationToken, CancellationWatcher, DropGuard};
pub use client::{build_client, HttpConfig, ReqwestTransport};
pub use connector::Connector;
pub use error::{ConnectorError, FailRequestError};
pub use ping::TICK_INTERVAL;
pub use registry::ClientRegistry;
pub use request::{header_map, headers, HttpRequest, RequestError};
pub use status::{InvalidStatusRange, StatusRange, DEFAULT_STATUS_RANGE};
pub use transport::{BodyStream, BoxError, HttpResponse, Transport, TransportError};
