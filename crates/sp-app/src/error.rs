//! Error types for the sp-app service layer.

use std::path::PathBuf;

/// Application error type that wraps errors from the backend crates.
///
/// Only failures that happen before a sweep starts reach the caller; a
/// single run's failure is recorded in its outcome instead.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Infrastructure unavailable: {what}")]
    InfrastructureUnavailable { what: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Project(String),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Failed to read raw output: {path}")]
    RawOutputRead {
        path: PathBuf,
        source: sp_reduce::ReduceError,
    },

    #[error("Oracle definition error: {0}")]
    Oracle(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for sp-app operations.
pub type AppResult<T> = Result<T, AppError>;

// Conversions from backend error types
impl From<sp_project::ProjectError> for AppError {
    fn from(err: sp_project::ProjectError) -> Self {
        AppError::Project(err.to_string())
    }
}

impl From<sp_results::ResultsError> for AppError {
    fn from(err: sp_results::ResultsError) -> Self {
        AppError::Results(err.to_string())
    }
}

impl From<sp_core::CoreError> for AppError {
    fn from(err: sp_core::CoreError) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}
