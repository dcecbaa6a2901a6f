//! Logging configuration

use std::path::PathBuf;
use std::str::FromStr;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::errors::DashboardError;

/// Parse a level name. `warning` is accepted as an alias of `warn`.
pub fn parse_level(name: &str) -> Result<Level, DashboardError> {
    let name = name.trim();
    if name.eq_ignore_ascii_case("warning") {
        return Ok(Level::WARN);
    }
    Level::from_str(name)
        .map_err(|_| DashboardError::ConfigError(format!("Invalid log level: {}", name)))
}

/// Serde adapter storing a [`Level`] as its lowercase name
pub mod level_name {
    use serde::{Deserialize, Deserializer, Serializer};
    use tracing::Level;

    pub fn serialize<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&level.as_str().to_lowercase())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        super::parse_level(&name).map_err(serde::de::Error::custom)
    }
}

/// Logging options
#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Log level, overridden by `RUST_LOG` when set
    pub log_level: Level,

    /// Write logs to stdout
    pub stdout: bool,

    /// Directory for daily rolling log files; file output is off when unset
    pub log_dir: Option<PathBuf>,

    /// Enable JSON format
    pub json_format: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            log_level: Level::INFO,
            stdout: true,
            log_dir: None,
            json_format: false,
        }
    }
}

const LOG_FILE_PREFIX: &str = "dokku-dashboard.log";

/// Initialize logging.
///
/// The returned guard flushes the file writer on drop and has to live as
/// long as the process logs.
pub fn init_logging(options: LogOptions) -> Result<Option<WorkerGuard>, DashboardError> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(options.log_level).into())
        .from_env_lossy();

    let stdout_layer = options.stdout.then(|| {
        if options.json_format {
            fmt::layer().json().boxed()
        } else {
            fmt::layer().boxed()
        }
    });

    let (file_layer, guard) = match &options.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer).boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| DashboardError::ConfigError(e.to_string()))?;

    Ok(guard)
}
