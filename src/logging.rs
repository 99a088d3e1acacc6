//! Logging System
//!
//! Structured logging using the `tracing` crate. Level, format and destination
//! come from `[logging]` in the config, with `AINO_LOG*` environment overrides.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

const LOG_FILE_NAME: &str = "aino.log";

/// `[logging]` section of the config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,

    /// trace, debug, info, warn, error, off
    pub level: String,

    /// json or text
    pub format: String,

    /// stdout, stderr, file, file+stderr, both
    pub output: String,

    /// Log file when `output` includes `file`; None means the platform state dir.
    pub file: Option<PathBuf>,

    /// ANSI colors for text output on a terminal stream.
    pub color: bool,

    /// Per-target levels, e.g. `aino::directory = "debug"`.
    pub modules: HashMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            format: "text".to_string(),
            output: "stderr".to_string(),
            file: None,
            color: true,
            modules: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(ApiError::ConfigError(format!(
                "Invalid log format: {} (must be 'json' or 'text')",
                other
            ))),
        }
    }
}

/// Where log lines go.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Sinks {
    stdout: bool,
    stderr: bool,
    file: bool,
}

impl FromStr for Sinks {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut sinks = Sinks::default();
        for part in s.split('+').map(str::trim) {
            match part {
                "stdout" => sinks.stdout = true,
                "stderr" => sinks.stderr = true,
                "file" => sinks.file = true,
                "both" => {
                    sinks.stdout = true;
                    sinks.stderr = true;
                }
                _ => {
                    return Err(ApiError::ConfigError(format!(
                        "Invalid log output: {} (expected stdout, stderr, file, file+stderr or both)",
                        s
                    )))
                }
            }
        }
        Ok(sinks)
    }
}

/// Environment first, then the config value.
fn env_or(var: &str, configured: &str) -> String {
    std::env::var(var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| configured.to_string())
}

/// Log file location: `AINO_LOG_FILE`, then the config, then the state dir.
pub fn log_file_path(configured: Option<&PathBuf>) -> Result<PathBuf, ApiError> {
    if let Some(path) = std::env::var_os("AINO_LOG_FILE").filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    if let Some(path) = configured.filter(|p| !p.as_os_str().is_empty()) {
        return Ok(path.clone());
    }
    let dirs = directories::ProjectDirs::from("", "aino", "aino").ok_or_else(|| {
        ApiError::ConfigError("Could not determine platform directories for log file".to_string())
    })?;
    let base = dirs.state_dir().unwrap_or_else(|| dirs.data_local_dir());
    Ok(base.join(LOG_FILE_NAME))
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: Option<&LoggingConfig>) -> Result<(), ApiError> {
    let defaults = LoggingConfig::default();
    let config = config.unwrap_or(&defaults);

    if !config.enabled {
        Registry::default()
            .with(EnvFilter::new("off"))
            .with(fmt::layer().with_writer(std::io::sink))
            .try_init()
            .map_err(|e| ApiError::ConfigError(format!("Failed to install log subscriber: {}", e)))?;
        return Ok(());
    }

    let filter = env_filter(config)?;
    let format: LogFormat = env_or("AINO_LOG_FORMAT", &config.format).parse()?;
    let sinks: Sinks = env_or("AINO_LOG_OUTPUT", &config.output).parse()?;
    let writer = make_writer(config, sinks)?;

    let registry = Registry::default().with(filter);
    let installed = match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(writer),
            )
            .try_init(),
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(config.color && !sinks.file)
                    .with_writer(writer),
            )
            .try_init(),
    };
    installed.map_err(|e| ApiError::ConfigError(format!("Failed to install log subscriber: {}", e)))
}

fn make_writer(config: &LoggingConfig, sinks: Sinks) -> Result<BoxMakeWriter, ApiError> {
    if sinks.file {
        let file = open_log_file(config)?;
        return Ok(if sinks.stderr {
            BoxMakeWriter::new(file.and(std::io::stderr))
        } else {
            BoxMakeWriter::new(file)
        });
    }
    Ok(match (sinks.stdout, sinks.stderr) {
        (true, true) => BoxMakeWriter::new(std::io::stdout.and(std::io::stderr)),
        (false, true) => BoxMakeWriter::new(std::io::stderr),
        _ => BoxMakeWriter::new(std::io::stdout),
    })
}

fn open_log_file(config: &LoggingConfig) -> Result<Arc<std::fs::File>, ApiError> {
    let path = log_file_path(config.file.as_ref())?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| ApiError::ConfigError(format!("Failed to create log directory: {}", e)))?;
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map(Arc::new)
        .map_err(|e| ApiError::ConfigError(format!("Failed to open log file {}: {}", path.display(), e)))
}

/// `AINO_LOG` replaces everything; otherwise the base level plus per-target
/// directives from the config and `AINO_LOG_MODULES` (`target=level,...`).
fn env_filter(config: &LoggingConfig) -> Result<EnvFilter, ApiError> {
    if let Ok(filter) = EnvFilter::try_from_env("AINO_LOG") {
        return Ok(filter);
    }
    if config.level.trim() == "off" {
        return Ok(EnvFilter::new("off"));
    }

    let from_env = std::env::var("AINO_LOG_MODULES").unwrap_or_default();
    let directives = config
        .modules
        .iter()
        .map(|(target, level)| format!("{}={}", target, level))
        .chain(
            from_env
                .split(',')
                .filter_map(|pair| pair.split_once('='))
                .map(|(target, level)| format!("{}={}", target.trim(), level.trim())),
        );

    let mut filter = EnvFilter::new(config.level.trim());
    for directive in directives {
        let parsed = directive.parse().map_err(|e| {
            ApiError::ConfigError(format!("Invalid log directive '{}': {}", directive, e))
        })?;
        filter = filter.add_directive(parsed);
    }
    Ok(filter)
}
