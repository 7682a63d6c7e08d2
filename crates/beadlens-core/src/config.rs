use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ErrorCode;

/// Project-level configuration, read from `.beadlens/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

/// Knobs for the insights computation.
///
/// The iteration cap and tolerance bound the power iterations used for
/// influencer and hub/authority rankings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
        }
    }
}

impl AnalyticsConfig {
    /// Reject values that would make the rankings meaningless.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top_n == 0 {
            return Err(ConfigError::Invalid {
                field: "analytics.top_n",
                reason: "must be at least 1",
            });
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::Invalid {
                field: "analytics.max_iterations",
                reason: "must be at least 1",
            });
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "analytics.tolerance",
                reason: "must be a positive finite number",
            });
        }
        Ok(())
    }
}

const fn default_top_n() -> usize {
    10
}

const fn default_max_iterations() -> usize {
    100
}

const fn default_tolerance() -> f64 {
    1e-6
}

/// Configuration failures callers may want to match on.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {reason}", path.display())]
    Read { path: PathBuf, reason: String },

    #[error("failed to parse {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("invalid {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

impl ConfigError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Read { .. } | Self::Parse { .. } => ErrorCode::ConfigParseError,
            Self::Invalid { .. } => ErrorCode::InvalidConfigValue,
        }
    }
}

/// Path of the project config file under `project_root`.
#[must_use]
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".beadlens/config.toml")
}

/// Path of the per-user config file, if a config dir exists on this platform.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("beadlens/config.toml"))
}

/// Load a config file, returning `None` when it does not exist.
///
/// # Errors
///
/// Returns a [`ConfigError`] (possibly wrapped in context) if the file
/// exists but cannot be read, parsed, or fails validation.
pub fn load_config_file(path: &Path) -> Result<Option<ProjectConfig>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|err| ConfigError::Read {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;

    let config = toml::from_str::<ProjectConfig>(&content).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        reason: err.message().to_string(),
    })?;

    config
        .analytics
        .validate()
        .with_context(|| format!("Invalid config in {}", path.display()))?;

    Ok(Some(config))
}

/// Resolve the effective config: project file, then user file, then defaults.
///
/// # Errors
///
/// Returns an error if whichever file is found is malformed.
pub fn resolve_config(project_root: &Path) -> Result<ProjectConfig> {
    if let Some(config) = load_config_file(&project_config_path(project_root))? {
        tracing::debug!(source = "project", "loaded config");
        return Ok(config);
    }

    if let Some(path) = user_config_path() {
        if let Some(config) = load_config_file(&path)? {
            tracing::debug!(source = "user", "loaded config");
            return Ok(config);
        }
    }

    Ok(ProjectConfig::default())
}
