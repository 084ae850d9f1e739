//! Error handling for credbridge-log

/// Errors raised while installing the subscriber
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// The filter directive could not be parsed
    #[error("Invalid filter '{filter}': {reason}")]
    Filter { filter: String, reason: String },

    /// An output format name was not recognized
    #[error("Unknown log format '{0}' (expected pretty, compact or json)")]
    UnknownFormat(String),

    /// A global subscriber is already installed
    #[error("Logger initialization failed: {0}")]
    Init(String),
}

/// Result alias for logging setup
pub type LogResult<T> = Result<T, LogError>;
