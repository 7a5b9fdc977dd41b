//! Validator configuration.
//!
//! Configuration is loaded in the following order (later overrides earlier):
//! 1. Default values
//! 2. YAML config file (if specified via STATECHECK_CONFIG)
//! 3. Environment variables

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// How a scope without a terminating path is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticStyle {
    /// Pure cycles are reported as `CycleDetected`, everything else as
    /// `NoTerminalPath`.
    #[default]
    Split,
    /// Always report `NoTerminalPath`.
    Unified,
}

/// Validator configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Maximum depth of nested parallel branches (0 = unlimited).
    pub max_nesting_depth: usize,
    /// Reject states that cannot be reached from `StartAt`.
    pub reject_unreachable_states: bool,
    /// Reporting of non-terminating scopes.
    pub diagnostics: DiagnosticStyle,
}

impl ValidatorConfig {
    /// Loads configuration from file, then applies environment variable overrides.
    pub fn load() -> Result<Self, ConfigError> {
        // Start with defaults
        let mut config = Self::default();

        // Load from file if specified
        if let Ok(path) = std::env::var("STATECHECK_CONFIG") {
            config = Self::from_file(&path)?;
        }

        // Apply environment variable overrides
        config.apply_env_overrides();

        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;
        serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml)
            .map_err(|e| ConfigError::ParseError(PathBuf::from("<inline>"), e.to_string()))
    }

    /// Loads configuration from environment variables only.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    /// Saves configuration to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = serde_yaml::to_string(self)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ConfigError::IoError(path.to_path_buf(), e))
    }

    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    pub fn with_reject_unreachable_states(mut self, reject: bool) -> Self {
        self.reject_unreachable_states = reject;
        self
    }

    pub fn with_diagnostics(mut self, style: DiagnosticStyle) -> Self {
        self.diagnostics = style;
        self
    }

    /// Returns whether branch nesting is bounded.
    pub fn limits_nesting(&self) -> bool {
        self.max_nesting_depth > 0
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(depth) = std::env::var("STATECHECK_MAX_NESTING_DEPTH") {
            match depth.parse() {
                Ok(n) => self.max_nesting_depth = n,
                Err(_) => tracing::warn!(
                    "Ignoring unparseable STATECHECK_MAX_NESTING_DEPTH value '{}'",
                    depth
                ),
            }
        }

        if let Ok(reject) = std::env::var("STATECHECK_REJECT_UNREACHABLE") {
            match reject.to_lowercase().as_str() {
                "1" | "true" => self.reject_unreachable_states = true,
                "0" | "false" => self.reject_unreachable_states = false,
                other => tracing::warn!(
                    "Ignoring unknown STATECHECK_REJECT_UNREACHABLE value '{}'",
                    other
                ),
            }
        }

        if let Ok(style) = std::env::var("STATECHECK_DIAGNOSTICS") {
            match style.to_lowercase().as_str() {
                "split" => self.diagnostics = DiagnosticStyle::Split,
                "unified" => self.diagnostics = DiagnosticStyle::Unified,
                other => tracing::warn!("Ignoring unknown STATECHECK_DIAGNOSTICS value '{}'", other),
            }
        }
    }
}

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {}", .0.display(), .1)]
    IoError(PathBuf, #[source] std::io::Error),

    #[error("failed to parse config file '{}': {}", .0.display(), .1)]
    ParseError(PathBuf, String),
}
