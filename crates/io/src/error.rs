use std::path::PathBuf;

use thiserror::Error;
use torent_engine::SearchError;

/// Failure to load one dataset. The dataset is unavailable for the session;
/// other datasets are unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("file not found: {}", path.display())]
    MissingFile { dataset: String, path: PathBuf },

    #[error("missing required column '{column}'")]
    MissingColumn { dataset: String, column: String },

    #[error("malformed CSV: {message}")]
    Csv { dataset: String, message: String },

    #[error("cannot read {}: {message}", path.display())]
    Io {
        dataset: String,
        path: PathBuf,
        message: String,
    },
}

impl LoadError {
    pub fn dataset(&self) -> &str {
        match self {
            Self::MissingFile { dataset, .. }
            | Self::MissingColumn { dataset, .. }
            | Self::Csv { dataset, .. }
            | Self::Io { dataset, .. } => dataset,
        }
    }

    /// The lookup-facing form of this error.
    pub fn to_search_error(&self) -> SearchError {
        SearchError::unavailable(self.dataset(), self.to_string())
    }
}
