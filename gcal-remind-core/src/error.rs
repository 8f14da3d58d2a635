//! Error types for gcal-remind.

use thiserror::Error;

/// Errors that can occur in gcal-remind core operations.
#[derive(Error, Debug)]
pub enum RemindError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Could not parse time '{value}': {reason}")]
    TimeParse { value: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RemindError {
    pub(crate) fn time_parse(value: &str, reason: impl ToString) -> Self {
        RemindError::TimeParse {
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Result type alias for gcal-remind core operations.
pub type RemindResult<T> = Result<T, RemindError>;
