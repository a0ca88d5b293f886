//! Error types for projection and configuration loading

use thiserror::Error;

/// Errors raised by a single projection request
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {field}: {reason}")]
    InvalidConfiguration { field: String, reason: String },

    #[error("Missing exchange rate for {currency} (required by {context})")]
    MissingRate { currency: String, context: String },

    #[error("Metric {metric} is undefined for zero certificate volume")]
    UndefinedMetric { metric: String },
}

impl EngineError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        EngineError::InvalidConfiguration {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised while reading request, fee schedule, or rate files
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Row {row}: {reason}")]
    Parse { row: usize, reason: String },

    #[error(transparent)]
    Engine(#[from] EngineError),
}
