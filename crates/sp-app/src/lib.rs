//! Shared application service layer for spallflow.
//!
//! This crate provides the interface used by the CLI, centralizing the sweep
//! orchestration, threshold analysis, result post-processing and artifact
//! export.

pub mod error;
pub mod export;
pub mod oracle;
pub mod postprocess;
pub mod sweep;
pub mod threshold;

// Re-export key types for convenience
pub use error::{AppError, AppResult};
pub use export::{
    ArtifactExporter, ExportError, ExportOutcome, SweepReport, default_extraction_exporters,
    default_sweep_exporters, export_artifacts, export_extraction, export_sweep,
};
pub use oracle::{
    CommandOracle, FnOracle, OracleFailure, RunSession, SimulationOracle, TableEntry, TableOracle,
};
pub use postprocess::{
    BatchEntry, BatchFileSummary, BatchSummary, ExtractionReport, ProcessedOutput, process_batch,
    process_output, reduce_output,
};
pub use sweep::{
    SweepProgress, SweepRequest, SweepResult, SweepStage, default_output_dir, run_sweep,
    run_sweep_with_progress,
};
pub use threshold::{AnalysisSummary, StressRange, analyze};
