//! Configuration types.

use serde::{Deserialize, Serialize};

use crate::loader::ConfigError;

/// Where a connector points and how it checks readiness.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectorConfig {
    /// Base URL, such as `https://host:port`. Paths are appended verbatim.
    pub url: String,
    /// Path probed by ping, such as `/health`.
    #[serde(alias = "pingEndpoint")]
    pub ping_endpoint: String,
}

impl ConnectorConfig {
    pub fn new(url: impl Into<String>, ping_endpoint: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ping_endpoint: ping_endpoint.into(),
        }
    }

    /// Reject configs that can never produce a request.
    ///
    /// Connectors do not call this; malformed URLs otherwise surface on first use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "url must not be empty".to_string(),
            });
        }

        if !self.ping_endpoint.is_empty() && !self.ping_endpoint.starts_with('/') {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "ping_endpoint must start with '/', got {:?}",
                    self.ping_endpoint
                ),
            });
        }

        Ok(())
    }
}
