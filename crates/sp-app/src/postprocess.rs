//! Reduction of raw solver output files into extraction reports.

use sp_project::ExtractionConfig;
use sp_reduce::{ExtractionResult, RawOutput, SummaryStatistics, build_extraction, summarize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::export::{ArtifactExporter, ExportOutcome, export_extraction};

pub const BATCH_SUMMARY_FILE: &str = "batch_summary.txt";

/// A reduced raw output with its summary statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionReport {
    pub source: Option<String>,
    /// RFC 3339 local time
    pub extracted_at: String,
    pub config: ExtractionConfig,
    pub extraction: ExtractionResult,
    pub stats: SummaryStatistics,
}

#[derive(Debug)]
pub struct ProcessedOutput {
    pub report: ExtractionReport,
    pub output_dir: PathBuf,
    pub exports: Vec<ExportOutcome>,
    pub elapsed_s: f64,
}

/// Reduce an in-memory raw output. No I/O.
pub fn reduce_output(raw: &RawOutput, config: &ExtractionConfig) -> ExtractionReport {
    let extraction = build_extraction(raw, config);
    let stats = summarize(&extraction);
    ExtractionReport {
        source: raw.source.clone(),
        extracted_at: chrono::Local::now().to_rfc3339(),
        config: config.clone(),
        extraction,
        stats,
    }
}

/// Load, reduce and export one raw output file.
///
/// A missing raw file means the extraction backend produced nothing and is
/// reported as [`AppError::InfrastructureUnavailable`].
pub fn process_output(
    raw_path: &Path,
    config: &ExtractionConfig,
    output_dir: &Path,
    exporters: &[Box<dyn ArtifactExporter<ExtractionReport>>],
) -> AppResult<ProcessedOutput> {
    let start = Instant::now();
    if !raw_path.is_file() {
        return Err(AppError::InfrastructureUnavailable {
            what: format!("raw output {} not found", raw_path.display()),
        });
    }

    let raw = RawOutput::load_json(raw_path).map_err(|source| AppError::RawOutputRead {
        path: raw_path.to_path_buf(),
        source,
    })?;
    let mut report = reduce_output(&raw, config);
    if report.source.is_none() {
        report.source = Some(raw_path.display().to_string());
    }

    std::fs::create_dir_all(output_dir)?;
    let exports = export_extraction(exporters, &report, output_dir);

    info!(
        source = %raw_path.display(),
        steps = report.stats.num_steps,
        frames = report.stats.total_frames,
        "raw output processed"
    );

    Ok(ProcessedOutput {
        report,
        output_dir: output_dir.to_path_buf(),
        exports,
        elapsed_s: start.elapsed().as_secs_f64(),
    })
}

#[derive(Debug)]
pub struct BatchEntry {
    pub source: PathBuf,
    pub output_dir: PathBuf,
    pub result: Result<BatchFileSummary, String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchFileSummary {
    pub stats: SummaryStatistics,
    pub elapsed_s: f64,
}

#[derive(Debug)]
pub struct BatchSummary {
    pub entries: Vec<BatchEntry>,
    pub summary_path: Option<PathBuf>,
}

impl BatchSummary {
    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|e| e.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.entries.len() - self.succeeded()
    }
}

/// Process several raw outputs into `<output_dir>/file_<i>/` (1-based).
///
/// A file that cannot be processed is recorded and the batch continues.
pub fn process_batch(
    raw_paths: &[PathBuf],
    config: &ExtractionConfig,
    output_dir: &Path,
    exporters: &[Box<dyn ArtifactExporter<ExtractionReport>>],
) -> AppResult<BatchSummary> {
    if raw_paths.is_empty() {
        return Err(AppError::InvalidInput(
            "batch processing needs at least one raw output".to_string(),
        ));
    }
    std::fs::create_dir_all(output_dir)?;

    let total = raw_paths.len();
    let mut entries = Vec::with_capacity(total);
    for (i, raw_path) in raw_paths.iter().enumerate() {
        let file_dir = output_dir.join(format!("file_{}", i + 1));
        info!(file = i + 1, total, source = %raw_path.display(), "processing raw output");
        let result = match process_output(raw_path, config, &file_dir, exporters) {
            Ok(processed) => Ok(BatchFileSummary {
                stats: processed.report.stats,
                elapsed_s: processed.elapsed_s,
            }),
            Err(e) => {
                warn!(file = i + 1, source = %raw_path.display(), error = %e, "raw output skipped");
                Err(e.to_string())
            }
        };
        entries.push(BatchEntry {
            source: raw_path.clone(),
            output_dir: file_dir,
            result,
        });
    }

    let mut summary = BatchSummary {
        entries,
        summary_path: None,
    };
    let text = render_batch_summary(&summary, &chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string());
    let path = output_dir.join(BATCH_SUMMARY_FILE);
    match std::fs::write(&path, text) {
        Ok(()) => summary.summary_path = Some(path),
        Err(e) => warn!(error = %e, "failed to write batch summary"),
    }

    info!(
        succeeded = summary.succeeded(),
        failed = summary.failed(),
        "batch processing finished"
    );
    Ok(summary)
}

pub fn render_batch_summary(summary: &BatchSummary, generated_at: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== BATCH PROCESSING SUMMARY ===");
    let _ = writeln!(out);
    let _ = writeln!(out, "Generated: {}", generated_at);
    let _ = writeln!(out, "Files: {}", summary.entries.len());
    let _ = writeln!(out, "Succeeded: {}", summary.succeeded());
    let _ = writeln!(out, "Failed: {}", summary.failed());
    let _ = writeln!(out);
    let _ = writeln!(out, "DETAILS:");
    let _ = writeln!(out, "{}", "-".repeat(60));
    for (i, entry) in summary.entries.iter().enumerate() {
        let name = entry
            .source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| entry.source.display().to_string());
        let _ = writeln!(out, "File {}: {}", i + 1, name);
        match &entry.result {
            Ok(file) => {
                let _ = writeln!(out, "  Steps: {}", file.stats.num_steps);
                let _ = writeln!(out, "  Frames: {}", file.stats.total_frames);
                let _ = writeln!(out, "  Processing time: {:.2} s", file.elapsed_s);
                let _ = writeln!(out, "  Status: ok");
            }
            Err(message) => {
                let _ = writeln!(out, "  Status: error | {}", message);
            }
        }
        let _ = writeln!(out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_raw_output_is_infrastructure_error() {
        let dir = std::env::temp_dir().join("sp_app_missing_raw");
        let err = process_output(
            &dir.join("does_not_exist.json"),
            &ExtractionConfig::default(),
            &dir,
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, AppError::InfrastructureUnavailable { .. }));
    }

    #[test]
    fn empty_raw_output_reduces_to_zeros() {
        let report = reduce_output(&RawOutput::default(), &ExtractionConfig::default());
        assert!(report.extraction.is_empty());
        assert_eq!(report.stats, SummaryStatistics::default());
    }
}
