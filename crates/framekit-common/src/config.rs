//! FrameKit configuration

use crate::logging::{LogConfig, LogFormat};
use crate::zoom::zoom_factor_to_level;
use crate::{FrameKitError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::Level;

/// Top-level configuration for a renderer/browser pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameKitConfig {
    /// Logging settings
    pub logging: LoggingSection,

    /// Zoom authority settings
    pub zoom: ZoomConfig,

    /// Binding behavior
    pub bindings: BindingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Level name ("trace" .. "error")
    pub level: String,

    /// Output format
    pub format: LogFormat,

    /// Optional `EnvFilter` directive string
    pub filter: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    /// Smallest zoom factor the authority accepts
    pub min_zoom_factor: f64,

    /// Largest zoom factor the authority accepts
    pub max_zoom_factor: f64,

    /// Zoom level reported for views that never had one set
    pub default_zoom_level: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BindingConfig {
    /// Panic on host-architecture invariant violations instead of
    /// returning an error
    pub fatal_invariants: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            filter: None,
        }
    }
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min_zoom_factor: 0.25,
            max_zoom_factor: 5.0,
            default_zoom_level: 0.0,
        }
    }
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            fatal_invariants: true,
        }
    }
}

impl LoggingSection {
    /// Convert into a subscriber configuration.
    pub fn to_log_config(&self) -> Result<LogConfig> {
        let level: Level = self.level.parse().map_err(|_| {
            FrameKitError::config(format!("unknown log level '{}'", self.level))
        })?;
        Ok(LogConfig {
            level,
            format: self.format,
            filter: self.filter.clone(),
            ..Default::default()
        })
    }
}

impl FrameKitConfig {
    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Parse and validate configuration JSON.
    pub fn from_json_str(contents: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(contents)
            .map_err(|e| FrameKitError::config_with_source("invalid configuration", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<()> {
        let zoom = &self.zoom;
        if !(zoom.min_zoom_factor > 0.0 && zoom.max_zoom_factor > 0.0) {
            return Err(FrameKitError::InvalidArgument(
                "zoom factors must be positive".into(),
            ));
        }
        if zoom.min_zoom_factor > zoom.max_zoom_factor {
            return Err(FrameKitError::InvalidArgument(format!(
                "min_zoom_factor {} exceeds max_zoom_factor {}",
                zoom.min_zoom_factor, zoom.max_zoom_factor
            )));
        }
        let min_level = zoom_factor_to_level(zoom.min_zoom_factor);
        let max_level = zoom_factor_to_level(zoom.max_zoom_factor);
        if !(zoom.default_zoom_level >= min_level && zoom.default_zoom_level <= max_level) {
            return Err(FrameKitError::InvalidArgument(format!(
                "default_zoom_level {} outside [{min_level:.2}, {max_level:.2}]",
                zoom.default_zoom_level
            )));
        }
        self.logging.to_log_config()?;
        Ok(())
    }
}
