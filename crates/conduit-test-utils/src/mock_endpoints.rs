//! Mock HTTP endpoints backed by wiremock.
//!
//! Each constructor starts a fresh server that answers one verb on one path
//! and replies `404 Status not found` to everything else.

use wiremock::matchers::{any, header_exists, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Body returned by every successful data endpoint.
pub const DATA: &str = "This is data";
/// Body of the catch-all 404 response.
pub const NOT_FOUND_BODY: &str = "Status not found";
/// Header required by [`MockEndpoint::get_with_header`].
pub const REQUIRED_HEADER: &str = "test-header";
/// Body returned when [`REQUIRED_HEADER`] is missing.
pub const MISSING_HEADER_BODY: &str = "Missing test-header Header in request.";

/// A running mock server.
pub struct MockEndpoint {
    server: MockServer,
}

impl MockEndpoint {
    async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// `GET /` answers `200` with an empty body.
    pub async fn ping() -> Self {
        Self::ping_ready_after(0).await
    }

    /// `GET /` answers `503` to the first `failures` requests, then `200`.
    pub async fn ping_ready_after(failures: u64) -> Self {
        let endpoint = Self::start().await;

        if failures > 0 {
            Mock::given(method("GET"))
                .and(path("/"))
                .respond_with(ResponseTemplate::new(503).set_body_string("starting"))
                .up_to_n_times(failures)
                .with_priority(1)
                .mount(&endpoint.server)
                .await;
        }

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200))
            .with_priority(2)
            .mount(&endpoint.server)
            .await;

        endpoint.mount_not_found().await;
        endpoint
    }

    /// `GET /get` answers `200 This is data`.
    pub async fn get() -> Self {
        Self::serving("GET", "/get").await
    }

    /// `POST /post` answers `200 This is data`.
    pub async fn post() -> Self {
        Self::serving("POST", "/post").await
    }

    /// `PUT /put` answers `200 This is data`.
    pub async fn put() -> Self {
        Self::serving("PUT", "/put").await
    }

    /// `DELETE /delete` answers `200 This is data`.
    pub async fn delete() -> Self {
        Self::serving("DELETE", "/delete").await
    }

    /// `GET /get` answers `200 This is data` only when [`REQUIRED_HEADER`] is
    /// present, and `400` otherwise.
    pub async fn get_with_header() -> Self {
        let endpoint = Self::start().await;

        Mock::given(method("GET"))
            .and(path("/get"))
            .and(header_exists(REQUIRED_HEADER))
            .respond_with(ResponseTemplate::new(200).set_body_string(DATA))
            .with_priority(1)
            .mount(&endpoint.server)
            .await;

        Mock::given(method("GET"))
            .and(path("/get"))
            .respond_with(ResponseTemplate::new(400).set_body_string(MISSING_HEADER_BODY))
            .with_priority(2)
            .mount(&endpoint.server)
            .await;

        endpoint.mount_not_found().await;
        endpoint
    }

    async fn serving(verb: &str, endpoint_path: &str) -> Self {
        let endpoint = Self::start().await;

        Mock::given(method(verb))
            .and(path(endpoint_path))
            .respond_with(ResponseTemplate::new(200).set_body_string(DATA))
            .with_priority(1)
            .mount(&endpoint.server)
            .await;

        endpoint.mount_not_found().await;
        endpoint
    }

    async fn mount_not_found(&self) {
        Mock::given(any())
            .respond_with(ResponseTemplate::new(404).set_body_string(NOT_FOUND_BODY))
            .with_priority(u8::MAX)
            .mount(&self.server)
            .await;
    }

    /// Base URL, such as `http://127.0.0.1:PORT`.
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// URL for a specific path.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.server.uri(), path)
    }

    /// Access the underlying MockServer.
    pub fn inner(&self) -> &MockServer {
        &self.server
    }

    /// Every request received so far.
    pub async fn received_requests(&self) -> Vec<Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    /// Number of requests received for `endpoint_path`.
    pub async fn received_count(&self, endpoint_path: &str) -> usize {
        self.received_requests()
            .await
            .iter()
            .filter(|r| r.url.path() == endpoint_path)
            .count()
    }
}
