//! Logging infrastructure for Conduit.

use std::env;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing_subscriber::{
    filter::LevelFilter,
    fmt::{self, format::FmtSpan, MakeWriter, TestWriter},
    layer::{Layered, SubscriberExt},
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

/// Logging configuration.
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    /// Mirror every event to this file as well.
    pub file_path: Option<PathBuf>,
    /// Include file and line of each event.
    pub source_location: bool,
    /// Emit span open and close events.
    pub span_events: bool,
    /// Write through the test harness instead of stderr.
    pub test_writer: bool,
}

/// Minimum level passed through when `RUST_LOG` has no directives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(LogError::UnknownValue(s.to_string())),
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, human-readable.
    #[default]
    Pretty,
    /// One line per event.
    Compact,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            _ => Err(LogError::UnknownValue(s.to_string())),
        }
    }
}

impl LogConfig {
    /// Read `CONDUIT_LOG_*` variables over the defaults.
    ///
    /// Unparseable values are ignored. `RUST_LOG` is consulted for the level
    /// only when `CONDUIT_LOG_LEVEL` is unset.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        let level = env::var("CONDUIT_LOG_LEVEL").or_else(|_| env::var("RUST_LOG"));
        if let Some(level) = level.ok().and_then(|l| l.parse::<LogLevel>().ok()) {
            config.level = level;
        }
        let format = env::var("CONDUIT_LOG_FORMAT").ok();
        if let Some(format) = format.and_then(|f| f.parse::<LogFormat>().ok()) {
            config.format = format;
        }
        config.file_path = env::var_os("CONDUIT_LOG_FILE").map(PathBuf::from);
        config.source_location = env_flag("CONDUIT_LOG_SOURCE");
        config.span_events = env_flag("CONDUIT_LOG_SPANS");

        config
    }

    /// Debug-level compact output captured per test.
    pub fn for_tests() -> Self {
        Self {
            level: LogLevel::Debug,
            format: LogFormat::Compact,
            source_location: true,
            test_writer: true,
            ..Self::default()
        }
    }
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

type BoxedLayer = Box<dyn Layer<Layered<EnvFilter, Registry>> + Send + Sync>;

fn fmt_layer<W>(config: &LogConfig, writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let span_events = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    match config.format {
        LogFormat::Pretty => fmt::layer()
            .with_writer(writer)
            .with_ansi(ansi)
            .with_target(true)
            .with_file(config.source_location)
            .with_line_number(config.source_location)
            .with_span_events(span_events)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_writer(writer)
            .with_ansi(ansi)
            .with_file(config.source_location)
            .with_line_number(config.source_location)
            .with_span_events(span_events)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(writer)
            .with_file(config.source_location)
            .with_line_number(config.source_location)
            .with_span_events(span_events)
            .boxed(),
    }
}

/// Initialize logging with the given configuration.
///
/// `RUST_LOG` directives, when present, take precedence over `config.level`.
pub fn init(config: LogConfig) -> Result<(), LogError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    let mut layers: Vec<BoxedLayer> = Vec::with_capacity(2);

    if config.test_writer {
        layers.push(fmt_layer(&config, TestWriter::new(), false));
    } else {
        layers.push(fmt_layer(&config, io::stderr, true));
    }

    if let Some(file_path) = &config.file_path {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;
        layers.push(fmt_layer(&config, Arc::new(file), false));
    }

    tracing_subscriber::registry()
        .with(filter)
        .with(layers)
        .try_init()
        .map_err(|e| LogError::InitError(e.to_string()))
}

/// Logging errors.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("failed to initialize logging: {0}")]
    InitError(String),

    #[error("failed to open log file: {0}")]
    FileError(#[from] io::Error),

    #[error("unrecognised log setting {0:?}")]
    UnknownValue(String),
}

/// Convenience macros re-exported from tracing.
pub use tracing::{debug, error, info, trace, warn};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_str() {
        assert_eq!("info".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert_eq!("DEBUG".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!(" Warning ".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!(matches!(
            "verbose".parse::<LogLevel>(),
            Err(LogError::UnknownValue(v)) if v == "verbose"
        ));
    }

    #[test]
    fn test_level_filter_and_directive_agree() {
        for level in [
            LogLevel::Trace,
            LogLevel::Debug,
            LogLevel::Info,
            LogLevel::Warn,
            LogLevel::Error,
        ] {
            let filter = LevelFilter::from(level);
            assert!(filter.to_string().eq_ignore_ascii_case(level.as_str()));
        }
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("Compact".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_for_tests_config() {
        let config = LogConfig::for_tests();
        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.format, LogFormat::Compact);
        assert!(config.test_writer);
        assert!(config.file_path.is_none());
    }

    // All env handling lives in one test so parallel tests never race on the variables.
    #[test]
    fn test_config_from_env() {
        let keys = [
            "CONDUIT_LOG_LEVEL",
            "CONDUIT_LOG_FORMAT",
            "CONDUIT_LOG_FILE",
            "CONDUIT_LOG_SOURCE",
            "CONDUIT_LOG_SPANS",
            "RUST_LOG",
        ];
        let saved: Vec<_> = keys.iter().map(|k| (*k, env::var(k).ok())).collect();

        env::set_var("CONDUIT_LOG_LEVEL", "debug");
        env::set_var("CONDUIT_LOG_FORMAT", "json");
        env::set_var("CONDUIT_LOG_FILE", "/tmp/conduit-test.log");
        env::set_var("CONDUIT_LOG_SOURCE", "TRUE");
        env::set_var("CONDUIT_LOG_SPANS", "0");

        let config = LogConfig::from_env();
        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.file_path, Some(PathBuf::from("/tmp/conduit-test.log")));
        assert!(config.source_location);
        assert!(!config.span_events);

        env::remove_var("CONDUIT_LOG_LEVEL");
        env::set_var("RUST_LOG", "warn");
        env::set_var("CONDUIT_LOG_FORMAT", "fancy");
        let config = LogConfig::from_env();
        assert_eq!(config.level, LogLevel::Warn);
        assert_eq!(config.format, LogFormat::Pretty);

        for (k, v) in saved {
            match v {
                Some(v) => env::set_var(k, v),
                None => env::remove_var(k),
            }
        }
    }

    #[test]
    fn test_init_with_unwritable_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = LogConfig {
            file_path: Some(dir.path().join("missing").join("conduit.log")),
            ..LogConfig::for_tests()
        };

        assert!(matches!(init(config), Err(LogError::FileError(_))));
    }
}
