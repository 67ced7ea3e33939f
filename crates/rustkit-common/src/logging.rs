//! Logging configuration and setup.
//!
//! The geometry crates only emit `tracing` events; a host (test harness,
//! benchmark runner, embedding engine) picks a subscriber through
//! [`LogConfig`].

use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::RustKitError;

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format.
    #[default]
    Pretty,
    /// Compact single-line format.
    Compact,
    /// JSON format for structured logging.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level used when no filter is given.
    pub level: Level,
    /// Output format.
    pub format: LogFormat,
    /// Include source file location.
    pub include_location: bool,
    /// Include span events (enter, exit).
    pub include_span_events: bool,
    /// Custom filter string (e.g., "rustkit_layout::scroll=trace").
    pub filter: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Pretty,
            include_location: false,
            include_span_events: false,
            filter: None,
        }
    }
}

impl LogConfig {
    /// Create a debug configuration.
    pub fn debug() -> Self {
        Self {
            level: Level::DEBUG,
            include_location: true,
            include_span_events: true,
            ..Default::default()
        }
    }

    /// Everything, including per-box overflow and frame changes.
    pub fn trace() -> Self {
        Self {
            level: Level::TRACE,
            include_location: true,
            ..Default::default()
        }
    }

    /// Trace scroll origin, clamp and scrollbar existence decisions only.
    pub fn geometry() -> Self {
        Self {
            level: Level::WARN,
            format: LogFormat::Compact,
            filter: Some("warn,rustkit_layout::scroll=trace,rustkit_layout::overflow=debug".into()),
            ..Default::default()
        }
    }

    /// Create a production configuration.
    pub fn production() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Json,
            ..Default::default()
        }
    }

    /// Set a custom filter.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    fn env_filter(&self) -> Result<EnvFilter, RustKitError> {
        match self.filter {
            Some(ref custom) => EnvFilter::try_new(custom)
                .map_err(|e| RustKitError::config_with_source("invalid log filter", e)),
            None => Ok(EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(self.level.to_string()))),
        }
    }
}

/// Install a global subscriber for the given configuration.
///
/// Fails if the filter does not parse or a subscriber is already set.
pub fn try_init_logging(config: LogConfig) -> Result<(), RustKitError> {
    let filter = config.env_filter()?;

    let span_events = if config.include_span_events {
        FmtSpan::ENTER | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let registry = tracing_subscriber::registry().with(filter);
    let result = match config.format {
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_file(config.include_location)
                    .with_line_number(config.include_location)
                    .with_span_events(span_events),
            )
            .try_init(),
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .compact()
                    .with_target(true)
                    .with_span_events(span_events),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_span_events(span_events))
            .try_init(),
    };

    result.map_err(|e| RustKitError::Logging(e.to_string()))
}

/// Initialize logging, keeping any subscriber that is already installed.
pub fn init_logging(config: LogConfig) {
    if let Err(e) = try_init_logging(config) {
        tracing::debug!(error = %e, "logging already initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_config_default() {
        let config = LogConfig::default();
        assert_eq!(config.level, Level::INFO);
        assert!(!config.include_location);
    }

    #[test]
    fn test_geometry_preset_targets_scroll() {
        let config = LogConfig::geometry();
        assert_eq!(config.format, LogFormat::Compact);
        assert!(config
            .filter
            .as_deref()
            .is_some_and(|f| f.contains("rustkit_layout::scroll=trace")));
    }

    #[test]
    fn test_second_init_is_logging_error() {
        let _ = try_init_logging(LogConfig::default());
        let err = try_init_logging(LogConfig::default()).unwrap_err();
        assert_eq!(err.category(), "logging");
    }
}
