//! sp-results: per-velocity outcome records, sweep storage and report text.

pub mod report;
pub mod store;
pub mod types;

pub use report::{SUMMARY_REPORT_FILE, render_sweep_report};
pub use store::OutcomeStore;
pub use types::*;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Outcome not found for velocity {velocity}")]
    OutcomeNotFound { velocity: String },

    #[error("Inconsistent run record: {0}")]
    InvalidRecord(String),
}
