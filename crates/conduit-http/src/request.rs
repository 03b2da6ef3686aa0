//! HTTP request types and builders.

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use url::Url;

/// Common HTTP headers.
pub mod headers {
    pub const CONTENT_TYPE_JSON: &str = "application/json";
    pub const ACCEPT_JSON: &str = "application/json";
}

/// Errors raised while building a request, before any network activity.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("invalid method {method:?}")]
    InvalidMethod { method: String },

    #[error("invalid URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid control character in URL {url:?}")]
    ControlCharacter { url: String },

    #[error("invalid header {name:?}")]
    InvalidHeader { name: String },

    #[error("failed to encode JSON body: {0}")]
    Body(#[source] serde_json::Error),
}

/// A fully validated request, ready to hand to a transport.
///
/// Starts with an empty header set. Attached headers are the only application
/// headers sent; the transport may add protocol headers such as `host`.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl HttpRequest {
    /// Validate `method` and `url` and build a request without headers or body.
    pub fn new(method: &str, url: &str) -> Result<Self, RequestError> {
        let parsed_method =
            Method::from_bytes(method.as_bytes()).map_err(|_| RequestError::InvalidMethod {
                method: method.to_string(),
            })?;

        // The URL parser silently strips tabs and newlines, so reject them first.
        if url.chars().any(char::is_control) {
            return Err(RequestError::ControlCharacter {
                url: url.to_string(),
            });
        }

        let parsed_url = Url::parse(url).map_err(|source| RequestError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        Ok(Self {
            method: parsed_method,
            url: parsed_url,
            headers: HeaderMap::new(),
            body: None,
        })
    }

    /// Replace the header set.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Attach a body. An empty body is treated as no body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        self.body = if body.is_empty() { None } else { Some(body) };
        self
    }
}

/// Build a header map from string pairs.
pub fn header_map<I, K, V>(pairs: I) -> Result<HeaderMap, RequestError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut map = HeaderMap::new();
    for (name, value) in pairs {
        let invalid = || RequestError::InvalidHeader {
            name: name.as_ref().to_string(),
        };
        let header_name = HeaderName::try_from(name.as_ref()).map_err(|_| invalid())?;
        let header_value = HeaderValue::try_from(value.as_ref()).map_err(|_| invalid())?;
        map.append(header_name, header_value);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_request_has_no_headers() {
        let request = HttpRequest::new("GET", "http://localhost:8080/get").unwrap();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.url.path(), "/get");
        assert!(request.headers.is_empty());
        assert!(request.body.is_none());
    }

    #[test]
    fn test_custom_method_is_accepted() {
        let request = HttpRequest::new("PURGE", "http://localhost/cache").unwrap();
        assert_eq!(request.method.as_str(), "PURGE");
    }

    #[test]
    fn test_tab_in_method_is_rejected() {
        let err = HttpRequest::new("GE\tT", "http://localhost/get").unwrap_err();
        assert!(matches!(err, RequestError::InvalidMethod { .. }));
    }

    #[test]
    fn test_control_character_in_url_is_rejected() {
        let err = HttpRequest::new("GET", "http://localhost/ge\tt").unwrap_err();
        assert!(matches!(err, RequestError::ControlCharacter { .. }));
    }

    #[test]
    fn test_relative_url_is_rejected() {
        let err = HttpRequest::new("GET", "/get").unwrap_err();
        assert!(matches!(err, RequestError::InvalidUrl { .. }));
    }

    #[test]
    fn test_with_headers_replaces() {
        let first = header_map([("a", "1")]).unwrap();
        let second = header_map([("b", "2")]).unwrap();
        let request = HttpRequest::new("GET", "http://localhost/")
            .unwrap()
            .with_headers(first)
            .with_headers(second);
        assert!(request.headers.get("a").is_none());
        assert_eq!(request.headers.get("b").unwrap(), "2");
    }

    #[test]
    fn test_empty_body_is_none() {
        let request = HttpRequest::new("POST", "http://localhost/")
            .unwrap()
            .with_body(Bytes::new());
        assert!(request.body.is_none());

        let request = request.with_body("data");
        assert_eq!(request.body.as_deref(), Some(&b"data"[..]));
    }

    #[test]
    fn test_header_map_rejects_invalid_name() {
        let err = header_map([("bad header", "value")]).unwrap_err();
        assert!(matches!(err, RequestError::InvalidHeader { name } if name == "bad header"));
    }

    #[test]
    fn test_header_map_keeps_repeated_names() {
        let map = header_map([("x-tag", "a"), ("x-tag", "b")]).unwrap();
        assert_eq!(map.get_all("x-tag").iter().count(), 2);
    }
}
