use thiserror::Error;

/// Errors surfaced to callers of the dispatch engine.
///
/// Failures inside a command never appear here; they are recorded on the
/// command itself and observed through the execution history.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Dispatcher has been shut down")]
    Shutdown,

    #[error("Dispatch loop is already running")]
    AlreadyRunning,
}

impl From<::config::ConfigError> for DispatchError {
    fn from(err: ::config::ConfigError) -> Self {
        DispatchError::Configuration(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DispatchError>;
