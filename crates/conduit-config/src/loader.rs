//! Configuration file loading and parsing.

use crate::types::ConnectorConfig;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;

static ENV_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}").expect("env reference pattern is valid")
});

/// Config loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read config: {source}")]
    ReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("invalid YAML at line {}: {message}", line.map(|l| l.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    ParseError { line: Option<usize>, message: String },

    #[error("validation error: {message}")]
    ValidationError { message: String },

    #[error("environment variable not found: {var}")]
    EnvVarNotFound { var: String },
}

/// Loads a [`ConnectorConfig`] from a YAML file.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    path: PathBuf,
}

impl ConfigLoader {
    /// Create a loader for the YAML file at `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The file this loader reads.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read, expand, parse and validate the file.
    pub fn load(&self) -> Result<ConnectorConfig, ConfigError> {
        let config = self.read()?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`load`](Self::load), but apply `{prefix}CLIENT_*` overrides before validating.
    pub fn load_with_env(&self, prefix: &str) -> Result<ConnectorConfig, ConfigError> {
        let mut config = self.read()?;
        config.override_with_env(prefix);
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a YAML document after expanding environment references.
    pub fn from_yaml_str(contents: &str) -> Result<ConnectorConfig, ConfigError> {
        let config = parse(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn read(&self) -> Result<ConnectorConfig, ConfigError> {
        if !self.path.exists() {
            return Err(ConfigError::NotFound {
                path: self.path.clone(),
            });
        }

        let contents = std::fs::read_to_string(&self.path)?;
        let config = parse(&contents)?;
        tracing::debug!(path = %self.path.display(), url = %config.url, "loaded connector config");
        Ok(config)
    }

    /// Write `config` to the loader's path, creating parent directories.
    pub fn save(&self, config: &ConnectorConfig) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(config).map_err(|e| ConfigError::ParseError {
            line: None,
            message: e.to_string(),
        })?;

        std::fs::write(&self.path, yaml)?;
        Ok(())
    }
}

fn parse(contents: &str) -> Result<ConnectorConfig, ConfigError> {
    let expanded = expand_env_vars(contents)?;

    serde_yaml::from_str(&expanded).map_err(|e| ConfigError::ParseError {
        line: e.location().map(|l| l.line()),
        message: e.to_string(),
    })
}

/// Expand environment variables in the form `${VAR}` or `${VAR:-default}`.
pub fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
    let mut result = content.to_string();

    for cap in ENV_REF.captures_iter(content) {
        let full_match = &cap[0];
        let var_name = &cap[1];
        let default = cap.get(2).map(|m| m.as_str());

        let value = match std::env::var(var_name) {
            Ok(v) => v,
            Err(_) => match default {
                Some(d) => d.to_string(),
                None => {
                    return Err(ConfigError::EnvVarNotFound {
                        var: var_name.to_string(),
                    })
                }
            },
        };

        result = result.replace(full_match, &value);
    }

    Ok(result)
}
