//! # RustKit Common
//!
//! Error types and logging configuration shared by the RustKit geometry crates.
//!
//! ## Features
//!
//! - Unified error type with backtrace support for internal failures
//! - Logging configuration and subscriber setup
//! - Result extension traits

use thiserror::Error;

pub mod logging;

pub use logging::{init_logging, try_init_logging, LogConfig, LogFormat};

/// Unified error type for RustKit.
#[derive(Error, Debug)]
pub enum RustKitError {
    /// Style input errors (unknown keyword, malformed length).
    #[error("Style error: {message}")]
    Style {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Layout tree errors.
    #[error("Layout error: {message}")]
    Layout {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration errors.
    #[error("Config error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Logging could not be initialized.
    #[error("Logging error: {0}")]
    Logging(String),

    /// I/O errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Resource not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Internal error (unexpected).
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        backtrace: Option<backtrace::Backtrace>,
    },
}

impl RustKitError {
    /// Create a style error.
    pub fn style(message: impl Into<String>) -> Self {
        Self::Style {
            message: message.into(),
            source: None,
        }
    }

    /// Create a style error with source.
    pub fn style_with_source<E: std::error::Error + Send + Sync + 'static>(
        message: impl Into<String>,
        source: E,
    ) -> Self {
        Self::Style {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a layout error.
    pub fn layout(message: impl Into<String>) -> Self {
        Self::Layout {
            message: message.into(),
            source: None,
        }
    }

    /// Create a layout error with source.
    pub fn layout_with_source<E: std::error::Error + Send + Sync + 'static>(
        message: impl Into<String>,
        source: E,
    ) -> Self {
        Self::Layout {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create a config error with source.
    pub fn config_with_source<E: std::error::Error + Send + Sync + 'static>(
        message: impl Into<String>,
        source: E,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an internal error with backtrace.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            backtrace: Some(backtrace::Backtrace::new()),
        }
    }

    /// Whether the caller supplied bad input, as opposed to an engine bug.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            RustKitError::Style { .. }
                | RustKitError::Config { .. }
                | RustKitError::NotFound(_)
                | RustKitError::InvalidArgument(_)
        )
    }

    /// Get the error category for log fields.
    pub fn category(&self) -> &'static str {
        match self {
            RustKitError::Style { .. } => "style",
            RustKitError::Layout { .. } => "layout",
            RustKitError::Config { .. } => "config",
            RustKitError::Logging(_) => "logging",
            RustKitError::Io(_) => "io",
            RustKitError::NotFound(_) => "not_found",
            RustKitError::InvalidArgument(_) => "invalid_argument",
            RustKitError::Internal { .. } => "internal",
        }
    }
}

/// Result type alias for RustKit operations.
pub type Result<T> = std::result::Result<T, RustKitError>;

/// Extension trait for Result.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Convert to a different error type.
    fn map_err_to<E: Into<RustKitError>>(self, f: impl FnOnce() -> E) -> Result<T>;
}

impl<T, E: std::error::Error + Send + Sync + 'static> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| RustKitError::Internal {
            message: format!("{}: {}", message.into(), e),
            backtrace: Some(backtrace::Backtrace::new()),
        })
    }

    fn map_err_to<E2: Into<RustKitError>>(self, f: impl FnOnce() -> E2) -> Result<T> {
        self.map_err(|_| f().into())
    }
}

/// Extension trait for Option.
pub trait OptionExt<T> {
    /// Convert None to a NotFound error.
    fn ok_or_not_found(self, resource: impl Into<String>) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, resource: impl Into<String>) -> Result<T> {
        self.ok_or_else(|| RustKitError::NotFound(resource.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert_eq!(RustKitError::style("bad keyword").category(), "style");
        assert_eq!(RustKitError::layout("detached box").category(), "layout");
        assert_eq!(RustKitError::config("bad json").category(), "config");
        assert_eq!(RustKitError::internal("oops").category(), "internal");
    }

    #[test]
    fn test_caller_errors() {
        assert!(RustKitError::style("test").is_caller_error());
        assert!(RustKitError::NotFound("box 7".into()).is_caller_error());
        assert!(!RustKitError::layout("test").is_caller_error());
        assert!(!RustKitError::internal("test").is_caller_error());
    }

    #[test]
    fn test_context_wraps_source_message() {
        let parsed: std::result::Result<i32, std::num::ParseIntError> = "x".parse::<i32>();
        let err = parsed.context("thickness").unwrap_err();
        assert!(err.to_string().contains("thickness"));
    }

    #[test]
    fn test_option_ext() {
        let some: Option<i32> = Some(42);
        assert_eq!(some.ok_or_not_found("test").unwrap(), 42);

        let none: Option<i32> = None;
        assert!(matches!(
            none.ok_or_not_found("test"),
            Err(RustKitError::NotFound(_))
        ));
    }
}
