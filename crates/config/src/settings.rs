// Application settings
// Loaded from ~/.config/torent/settings.toml

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use torent_engine::model::{MatchOptions, TimelineView, DEFAULT_MAX_CANDIDATES, DEFAULT_THRESHOLD};

use crate::paths::{DataPaths, DatasetPaths};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid setting '{field}': {message}")]
    Invalid { field: &'static str, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Directory the dataset paths are relative to.
    pub data_dir: PathBuf,

    pub paths: DatasetPaths,

    /// Minimum similarity score (0-100) for an address candidate.
    pub threshold: u8,

    /// Maximum ranked candidates kept per lookup (top match + suggestions).
    pub max_candidates: usize,

    /// Timeline granularity used until changed.
    pub view: TimelineView,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            paths: DatasetPaths::default(),
            threshold: DEFAULT_THRESHOLD,
            max_candidates: DEFAULT_MAX_CANDIDATES,
            view: TimelineView::default(),
        }
    }
}

impl Settings {
    /// Default settings file location, if the platform has a config directory.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("torent").join("settings.toml"))
    }

    /// Parse and validate settings from TOML text. Missing keys take defaults.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(text).map_err(|e| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            message: e.message().to_string(),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings.
    ///
    /// An explicit `path` must exist and parse. Without one, the default
    /// config file is used when present; otherwise defaults apply.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::config_path().filter(|p| p.exists()) {
                Some(p) => p,
                None => {
                    tracing::debug!("no settings file; using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let text = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let settings = Self::from_toml(&text).map_err(|e| match e {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: path.clone(),
                message,
            },
            other => other,
        })?;
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threshold > 100 {
            return Err(ConfigError::Invalid {
                field: "threshold",
                message: format!("{} is out of range (expected 0-100)", self.threshold),
            });
        }
        if self.max_candidates == 0 {
            return Err(ConfigError::Invalid {
                field: "max_candidates",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn match_options(&self) -> MatchOptions {
        MatchOptions {
            threshold: self.threshold,
            limit: self.max_candidates,
        }
    }

    pub fn data_paths(&self) -> DataPaths {
        DataPaths::resolve(&self.data_dir, &self.paths)
    }
}
