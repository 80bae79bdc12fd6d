//! sp-reduce: turns raw nested solver output into per-frame statistics.
//!
//! - samples: {max, min, mean} of one numeric sample set
//! - raw: the raw step/frame/field/component model read from the solver side
//! - extraction: the reduced, typed extraction structure
//! - engine: raw output → extraction
//! - summary: cross-cutting scalars for reports

pub mod engine;
pub mod extraction;
pub mod raw;
pub mod samples;
pub mod summary;

pub use engine::build_extraction;
pub use extraction::{ExtractionResult, FrameSnapshot, HistorySeries, StepExtraction, StepTimeline};
pub use raw::{RawFrame, RawOutput, RawStep};
pub use samples::{FieldSample, reduce_samples, reduce_samples_with};
pub use summary::{StepOverview, SummaryStatistics, max_field_overall, step_overviews, summarize};

pub type ReduceResult<T> = Result<T, ReduceError>;

#[derive(thiserror::Error, Debug)]
pub enum ReduceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
