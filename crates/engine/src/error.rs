use thiserror::Error;

/// Failure while aggregating a joined table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A non-blank date cell could not be parsed. Fails the whole aggregation.
    #[error("column '{column}', row {row}: cannot parse date '{value}'")]
    DateParse {
        column: String,
        row: usize,
        value: String,
    },
}

/// Failure of one lookup section. Never affects the other section.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// A dataset the lookup needs was not loaded (missing file, missing column, bad CSV).
    #[error("dataset '{dataset}' is unavailable: {reason}")]
    DatasetUnavailable { dataset: String, reason: String },
}

impl SearchError {
    pub fn unavailable(dataset: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DatasetUnavailable {
            dataset: dataset.into(),
            reason: reason.into(),
        }
    }
}
