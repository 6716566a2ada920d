//! Error types for eventboard.
//!
//! Query handling never produces these: malformed parameters degrade to
//! defaults. Errors only come from loading events and configuration.

use thiserror::Error;

/// Errors that can occur in eventboard operations.
#[derive(Error, Debug)]
pub enum EventBoardError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Event source error: {0}")]
    EventSource(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for EventBoardError {
    fn from(err: serde_json::Error) -> Self {
        EventBoardError::Serialization(err.to_string())
    }
}

/// Result type alias for eventboard operations.
pub type EventBoardResult<T> = Result<T, EventBoardError>;
