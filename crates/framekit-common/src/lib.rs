//! # FrameKit Common
//!
//! Shared error types, logging setup and configuration for the FrameKit
//! web-frame binding layer.
//!
//! ## Features
//!
//! - Unified error type with backtraces for internal and invariant failures
//! - `tracing` subscriber configuration
//! - JSON configuration with validation
//! - Zoom level/factor conversion and its wire encoding
//! - Result/Option extension traits

use thiserror::Error;

pub mod config;
pub mod logging;
pub mod serde_helpers;
pub mod zoom;

pub use config::{BindingConfig, FrameKitConfig, LoggingSection, ZoomConfig};
pub use logging::{init_logging, LogConfig, LogFormat};
pub use zoom::{zoom_factor_to_level, zoom_level_to_factor, ZOOM_LEVEL_BASE};

/// Unified error type for FrameKit.
#[derive(Error, Debug)]
pub enum FrameKitError {
    /// Frame tree errors.
    #[error("Frame error: {message}")]
    Frame {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Cross-process messaging errors.
    #[error("IPC error: {message}")]
    Ipc {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Script execution errors.
    #[error("Script error: {message}")]
    Script {
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

    /// I/O errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Resource not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A host-architecture invariant did not hold.
    #[error("Invariant violated: {message}")]
    InvariantViolation {
        message: String,
        backtrace: Option<backtrace::Backtrace>,
    },

    /// Internal error (unexpected).
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        backtrace: Option<backtrace::Backtrace>,
    },
}

impl FrameKitError {
    /// Create a frame error.
    pub fn frame(message: impl Into<String>) -> Self {
        Self::Frame {
            message: message.into(),
            source: None,
        }
    }

    /// Create an IPC error.
    pub fn ipc(message: impl Into<String>) -> Self {
        Self::Ipc {
            message: message.into(),
            source: None,
        }
    }

    /// Create an IPC error with source.
    pub fn ipc_with_source<E: std::error::Error + Send + Sync + 'static>(
        message: impl Into<String>,
        source: E,
    ) -> Self {
        Self::Ipc {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a script error.
    pub fn script(message: impl Into<String>) -> Self {
        Self::Script {
            message: message.into(),
            source: None,
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

    /// Create an invariant violation with backtrace.
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::InvariantViolation {
            message: message.into(),
            backtrace: Some(backtrace::Backtrace::new()),
        }
    }

    /// Create an internal error with backtrace.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            backtrace: Some(backtrace::Backtrace::new()),
        }
    }

    /// Whether the caller may degrade to a default value instead of failing.
    ///
    /// Only transport-level failures qualify; invariant violations never do.
    pub fn is_degradable(&self) -> bool {
        matches!(self, FrameKitError::Ipc { .. } | FrameKitError::NotFound(_))
    }

    /// Get the error category for logging.
    pub fn category(&self) -> &'static str {
        match self {
            FrameKitError::Frame { .. } => "frame",
            FrameKitError::Ipc { .. } => "ipc",
            FrameKitError::Script { .. } => "script",
            FrameKitError::Config { .. } => "config",
            FrameKitError::Io(_) => "io",
            FrameKitError::NotFound(_) => "not_found",
            FrameKitError::InvalidArgument(_) => "invalid_argument",
            FrameKitError::InvariantViolation { .. } => "invariant",
            FrameKitError::Internal { .. } => "internal",
        }
    }
}

/// Result type alias for FrameKit operations.
pub type Result<T> = std::result::Result<T, FrameKitError>;

/// Extension trait for Result.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, message: impl Into<String>) -> Result<T>;
}

impl<T, E: std::error::Error + Send + Sync + 'static> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| FrameKitError::Internal {
            message: format!("{}: {}", message.into(), e),
            backtrace: Some(backtrace::Backtrace::new()),
        })
    }
}

/// Extension trait for Option.
pub trait OptionExt<T> {
    /// Convert None to a NotFound error.
    fn ok_or_not_found(self, resource: impl Into<String>) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, resource: impl Into<String>) -> Result<T> {
        self.ok_or_else(|| FrameKitError::NotFound(resource.into()))
    }
}
