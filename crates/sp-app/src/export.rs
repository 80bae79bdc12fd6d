//! Optional artifact exporters.
//!
//! Exporters only ever read finished results. A missing or failing exporter
//! is logged and skipped; it never invalidates what was already computed.

use serde::Serialize;
use sp_core::FieldType;
use sp_reduce::step_overviews;
use sp_results::RunOutcome;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::postprocess::ExtractionReport;
use crate::threshold::{AnalysisSummary, analyze};

pub const SWEEP_CSV_FILE: &str = "spall_fracture_results.csv";
pub const ANALYSIS_JSON_FILE: &str = "threshold_analysis.json";
pub const EXTRACTION_JSON_FILE: &str = "extracted_data.json";
pub const FIELD_CSV_FILE: &str = "field_samples.csv";
pub const HISTORY_CSV_FILE: &str = "history.csv";
pub const EXTRACTION_SUMMARY_FILE: &str = "extraction_summary.txt";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("exporter unavailable: {0}")]
    Unavailable(String),

    #[error("export failed: {0}")]
    Failed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Writes one kind of artifact for a finished result of type `T`.
pub trait ArtifactExporter<T> {
    fn name(&self) -> &str;

    /// Returns the files written.
    fn export(&self, artifact: &T, out_dir: &Path) -> Result<Vec<PathBuf>, ExportError>;
}

/// What happened to one exporter.
#[derive(Debug)]
pub struct ExportOutcome {
    pub exporter: String,
    pub result: Result<Vec<PathBuf>, ExportError>,
}

impl ExportOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Finished sweep outcomes together with their threshold analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepReport {
    pub outcomes: Vec<RunOutcome>,
    pub analysis: AnalysisSummary,
}

impl SweepReport {
    pub fn new(outcomes: Vec<RunOutcome>) -> Self {
        let analysis = analyze(&outcomes);
        Self { outcomes, analysis }
    }
}

/// Run every exporter, logging and skipping the ones that fail.
pub fn export_artifacts<T>(
    exporters: &[Box<dyn ArtifactExporter<T>>],
    artifact: &T,
    out_dir: &Path,
) -> Vec<ExportOutcome> {
    exporters
        .iter()
        .map(|exporter| {
            let result = exporter.export(artifact, out_dir);
            match &result {
                Ok(files) => {
                    info!(exporter = exporter.name(), files = files.len(), "artifacts exported")
                }
                Err(ExportError::Unavailable(reason)) => {
                    warn!(exporter = exporter.name(), %reason, "exporter unavailable, artifact skipped")
                }
                Err(e) => warn!(exporter = exporter.name(), error = %e, "export failed, artifact skipped"),
            }
            ExportOutcome {
                exporter: exporter.name().to_string(),
                result,
            }
        })
        .collect()
}

pub fn export_sweep(
    exporters: &[Box<dyn ArtifactExporter<SweepReport>>],
    report: &SweepReport,
    out_dir: &Path,
) -> Vec<ExportOutcome> {
    export_artifacts(exporters, report, out_dir)
}

pub fn export_extraction(
    exporters: &[Box<dyn ArtifactExporter<ExtractionReport>>],
    report: &ExtractionReport,
    out_dir: &Path,
) -> Vec<ExportOutcome> {
    export_artifacts(exporters, report, out_dir)
}

pub fn default_sweep_exporters() -> Vec<Box<dyn ArtifactExporter<SweepReport>>> {
    vec![Box::new(SweepCsvExporter), Box::new(AnalysisJsonExporter)]
}

pub fn default_extraction_exporters() -> Vec<Box<dyn ArtifactExporter<ExtractionReport>>> {
    vec![
        Box::new(ExtractionJsonExporter),
        Box::new(ExtractionCsvExporter),
        Box::new(ExtractionSummaryExporter),
    ]
}

fn write_file(out_dir: &Path, file_name: &str, content: &str) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(out_dir)?;
    let path = out_dir.join(file_name);
    std::fs::write(&path, content)?;
    Ok(path)
}

/// Quote a CSV cell when it contains a separator, quote or newline.
fn csv_cell(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Sweep table, one row per velocity in sweep order.
pub struct SweepCsvExporter;

pub fn render_sweep_csv(outcomes: &[RunOutcome]) -> String {
    let mut csv = String::from(
        "velocity_mps,job_name,status,max_stress_mpa,max_strain,fracture_time_us,fracture_occurred,error\n",
    );
    for outcome in outcomes {
        let status = match outcome.status() {
            sp_results::RunStatus::Completed => "completed",
            sp_results::RunStatus::Failed => "failed",
        };
        match outcome.metrics() {
            Some(m) => csv.push_str(&format!(
                "{},{},{},{},{},{},{},\n",
                outcome.velocity,
                csv_cell(&outcome.job_name),
                status,
                m.max_stress,
                m.max_strain,
                m.fracture_time,
                m.fracture_occurred
            )),
            None => csv.push_str(&format!(
                "{},{},{},,,,,{}\n",
                outcome.velocity,
                csv_cell(&outcome.job_name),
                status,
                csv_cell(outcome.error_message().unwrap_or_default())
            )),
        }
    }
    csv
}

impl ArtifactExporter<SweepReport> for SweepCsvExporter {
    fn name(&self) -> &str {
        "sweep-csv"
    }

    fn export(&self, report: &SweepReport, out_dir: &Path) -> Result<Vec<PathBuf>, ExportError> {
        let path = write_file(out_dir, SWEEP_CSV_FILE, &render_sweep_csv(&report.outcomes))?;
        Ok(vec![path])
    }
}

/// Threshold analysis as JSON.
pub struct AnalysisJsonExporter;

impl ArtifactExporter<SweepReport> for AnalysisJsonExporter {
    fn name(&self) -> &str {
        "analysis-json"
    }

    fn export(&self, report: &SweepReport, out_dir: &Path) -> Result<Vec<PathBuf>, ExportError> {
        let json = serde_json::to_string_pretty(&report.analysis)?;
        Ok(vec![write_file(out_dir, ANALYSIS_JSON_FILE, &json)?])
    }
}

#[derive(Serialize)]
struct ExtractionDocument<'a> {
    steps: &'a sp_reduce::ExtractionResult,
    summary: &'a sp_reduce::SummaryStatistics,
    metadata: ExtractionMetadata<'a>,
}

#[derive(Serialize)]
struct ExtractionMetadata<'a> {
    source: Option<&'a str>,
    extraction_time: &'a str,
    config: &'a sp_project::ExtractionConfig,
}

/// Full extraction with metadata as JSON.
pub struct ExtractionJsonExporter;

impl ArtifactExporter<ExtractionReport> for ExtractionJsonExporter {
    fn name(&self) -> &str {
        "extraction-json"
    }

    fn export(&self, report: &ExtractionReport, out_dir: &Path) -> Result<Vec<PathBuf>, ExportError> {
        let doc = ExtractionDocument {
            steps: &report.extraction,
            summary: &report.stats,
            metadata: ExtractionMetadata {
                source: report.source.as_deref(),
                extraction_time: &report.extracted_at,
                config: &report.config,
            },
        };
        let json = serde_json::to_string_pretty(&doc)?;
        Ok(vec![write_file(out_dir, EXTRACTION_JSON_FILE, &json)?])
    }
}

/// Flat tables of frame statistics and history channels.
pub struct ExtractionCsvExporter;

pub fn render_field_csv(report: &ExtractionReport) -> String {
    let mut csv = String::from("step,time_s,field,component,max,min,mean\n");
    for step in report.extraction.steps() {
        for frame in step.timeline.frames() {
            for (field, components) in &frame.fields {
                for (component, sample) in components {
                    csv.push_str(&format!(
                        "{},{},{},{},{},{},{}\n",
                        csv_cell(step.name.as_str()),
                        frame.time.seconds(),
                        csv_cell(field.as_str()),
                        csv_cell(component.as_str()),
                        sample.max,
                        sample.min,
                        sample.mean
                    ));
                }
            }
        }
    }
    csv
}

pub fn render_history_csv(report: &ExtractionReport) -> String {
    let mut csv = String::from("step,channel,time_s,value\n");
    for step in report.extraction.steps() {
        for (channel, series) in &step.history {
            for (t, value) in series.points() {
                csv.push_str(&format!(
                    "{},{},{},{}\n",
                    csv_cell(step.name.as_str()),
                    csv_cell(channel.as_str()),
                    t,
                    value
                ));
            }
        }
    }
    csv
}

impl ArtifactExporter<ExtractionReport> for ExtractionCsvExporter {
    fn name(&self) -> &str {
        "extraction-csv"
    }

    fn export(&self, report: &ExtractionReport, out_dir: &Path) -> Result<Vec<PathBuf>, ExportError> {
        Ok(vec![
            write_file(out_dir, FIELD_CSV_FILE, &render_field_csv(report))?,
            write_file(out_dir, HISTORY_CSV_FILE, &render_history_csv(report))?,
        ])
    }
}

/// Human-readable extraction overview.
pub struct ExtractionSummaryExporter;

pub fn render_extraction_summary(report: &ExtractionReport) -> String {
    let stats = &report.stats;
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(out, "=== EXTRACTION SUMMARY ===");
    let _ = writeln!(out);
    let _ = writeln!(out, "Source: {}", report.source.as_deref().unwrap_or("unknown"));
    let _ = writeln!(out, "Extracted: {}", report.extracted_at);
    let _ = writeln!(out, "Steps: {}", stats.num_steps);
    let _ = writeln!(out, "Total frames: {}", stats.total_frames);
    let _ = writeln!(out, "Total time: {} s", stats.total_time);
    let _ = writeln!(out, "Max stress overall: {}", stats.max_stress_overall);
    let _ = writeln!(out, "Max strain overall: {}", stats.max_strain_overall);
    let _ = writeln!(out);
    let _ = writeln!(out, "STEP DETAILS:");
    let _ = writeln!(out, "{}", "-".repeat(50));
    for overview in step_overviews(&report.extraction) {
        let _ = writeln!(out, "{}: {} frames", overview.name, overview.frame_count);
        if !overview.first_frame_stress.is_empty() {
            let _ = writeln!(out, "  First frame {}:", FieldType::STRESS);
        }
        for (component, sample) in &overview.first_frame_stress {
            let _ = writeln!(
                out,
                "    {}: max={:.3}, min={:.3}, mean={:.3}",
                component, sample.max, sample.min, sample.mean
            );
        }
    }
    out
}

impl ArtifactExporter<ExtractionReport> for ExtractionSummaryExporter {
    fn name(&self) -> &str {
        "extraction-summary"
    }

    fn export(&self, report: &ExtractionReport, out_dir: &Path) -> Result<Vec<PathBuf>, ExportError> {
        let text = render_extraction_summary(report);
        Ok(vec![write_file(out_dir, EXTRACTION_SUMMARY_FILE, &text)?])
    }
}
