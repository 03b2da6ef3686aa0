//! Environment variable handling.

use std::env;
use thiserror::Error;

use crate::types::ConnectorConfig;

/// Environment variable errors.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("required environment variable not set: {var}")]
    NotSet { var: String },

    #[error("failed to load .env file: {0}")]
    DotenvError(#[from] dotenvy::Error),
}

/// Environment variable names, appended to a caller-chosen prefix.
pub mod vars {
    pub const PREFIX_ENV: &str = "CLIENT_";
    pub const CLIENT_URL: &str = "CLIENT_URL";
    pub const CLIENT_PING_ENDPOINT: &str = "CLIENT_PING_ENDPOINT";

    /// Every variable [`ConnectorConfig::override_with_env`](crate::ConnectorConfig::override_with_env) reads.
    pub const CONF_ENV_VARS: &[&str] = &[CLIENT_URL, CLIENT_PING_ENDPOINT];
}

/// Environment configuration.
pub struct Environment {
    _guard: (), // Prevent construction outside module
}

impl Environment {
    /// Initialize environment from .env files.
    pub fn init() -> Result<Self, EnvError> {
        // Missing files are fine; .env.local wins over .env.
        match dotenvy::from_filename(".env") {
            Err(e) if !e.not_found() => return Err(e.into()),
            _ => {}
        }
        match dotenvy::from_filename_override(".env.local") {
            Err(e) if !e.not_found() => return Err(e.into()),
            _ => {}
        }

        Ok(Self { _guard: () })
    }

    /// Get a required string variable.
    pub fn require(var: &str) -> Result<String, EnvError> {
        env::var(var).map_err(|_| EnvError::NotSet {
            var: var.to_string(),
        })
    }

    /// Get an optional string variable.
    pub fn get(var: &str) -> Option<String> {
        env::var(var).ok()
    }
}

impl ConnectorConfig {
    /// Override fields from `{prefix}CLIENT_URL` and `{prefix}CLIENT_PING_ENDPOINT`.
    ///
    /// Unset variables leave the corresponding field untouched.
    pub fn override_with_env(&mut self, prefix: &str) {
        let targets: [(&str, &mut String); 2] = [
            (vars::CLIENT_URL, &mut self.url),
            (vars::CLIENT_PING_ENDPOINT, &mut self.ping_endpoint),
        ];

        for (name, field) in targets {
            let var = format!("{}{}", prefix, name);
            if let Some(value) = Environment::get(&var) {
                tracing::debug!(var = %var, "overriding connector config from environment");
                *field = value;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn set_env(vars: &HashMap<&str, &str>) {
        for (k, v) in vars {
            env::set_var(k, v);
        }
    }

    fn unset_env(vars: &HashMap<&str, &str>) {
        for k in vars.keys() {
            env::remove_var(k);
        }
    }

    #[test]
    fn test_override_without_env_keeps_config() {
        let mut config = ConnectorConfig::default();
        config.override_with_env("CONF_TC_1_");
        assert_eq!(config, ConnectorConfig::default());
    }

    #[test]
    fn test_override_url_from_env() {
        let vars = HashMap::from([("CONF_TC_2_CLIENT_URL", "http://127.0.0.1:8081")]);
        set_env(&vars);

        let mut config = ConnectorConfig::new("http://localhost:8080", "/health");
        config.override_with_env("CONF_TC_2_");

        assert_eq!(
            config,
            ConnectorConfig::new("http://127.0.0.1:8081", "/health")
        );
        unset_env(&vars);
    }

    #[test]
    fn test_override_all_fields_from_env() {
        let vars = HashMap::from([
            ("CONF_TC_3_CLIENT_URL", "https://api.example.com"),
            ("CONF_TC_3_CLIENT_PING_ENDPOINT", "/ready"),
        ]);
        set_env(&vars);

        let mut config = ConnectorConfig::default();
        config.override_with_env("CONF_TC_3_");

        assert_eq!(config, ConnectorConfig::new("https://api.example.com", "/ready"));
        unset_env(&vars);
    }

    #[test]
    fn test_require_missing_var() {
        match Environment::require("CONDUIT_DEFINITELY_UNSET_12345").unwrap_err() {
            EnvError::NotSet { var } => assert_eq!(var, "CONDUIT_DEFINITELY_UNSET_12345"),
            other => panic!("Expected NotSet, got {:?}", other),
        }
    }

    #[test]
    fn test_all_variable_names_share_prefix() {
        for var in vars::CONF_ENV_VARS {
            assert!(var.starts_with(vars::PREFIX_ENV));
        }
    }

    #[test]
    fn test_environment_init() {
        assert!(Environment::init().is_ok());
    }
}
