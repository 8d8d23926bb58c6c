//! Error types and handling
//!
//! Common error types used across the services. Component-level failures
//! never cross a component boundary; they are logged and turned into a
//! local degrade-or-terminate decision. `AppError` is what the wiring and
//! settings layers surface to their callers.

use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Telephony error: {0}")]
    Telephony(String),

    #[error("Service task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl AppError {
    /// Stable code for log output
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Io(_) => "IO_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Settings(_) => "SETTINGS_ERROR",
            AppError::Telephony(_) => "TELEPHONY_ERROR",
            AppError::Task(_) => "TASK_ERROR",
        }
    }
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
