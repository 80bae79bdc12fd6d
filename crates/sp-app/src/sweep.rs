//! Velocity sweep controller.
//!
//! Runs one simulation per velocity, strictly in the given order, and
//! persists each outcome as soon as it is known so an interrupted sweep
//! keeps everything finished so far.

use sp_core::Velocity;
use sp_project::AnalysisParams;
use sp_results::{OutcomeStore, RunOutcome, RunStatus, SweepManifest};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::oracle::{RunSession, SimulationOracle};

/// Directory under which timestamped sweep directories are created by default.
pub const DEFAULT_RESULTS_BASE: &str = "results";

#[derive(Debug, Clone, PartialEq)]
pub struct SweepRequest {
    pub velocities: Vec<Velocity>,
    pub params: AnalysisParams,
    /// `None` selects `results/spall_analysis_<timestamp>`
    pub output_dir: Option<PathBuf>,
}

/// Finished sweep: one outcome per requested velocity, in request order.
#[derive(Debug, Clone)]
pub struct SweepResult {
    outcomes: Vec<RunOutcome>,
    params: AnalysisParams,
    output_dir: PathBuf,
    elapsed_wall_s: f64,
}

impl SweepResult {
    pub fn outcomes(&self) -> &[RunOutcome] {
        &self.outcomes
    }

    pub fn params(&self) -> &AnalysisParams {
        &self.params
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn elapsed_wall_s(&self) -> f64 {
        self.elapsed_wall_s
    }

    pub fn completed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_completed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.completed_count()
    }

    pub fn into_outcomes(self) -> Vec<RunOutcome> {
        self.outcomes
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SweepStage {
    Starting,
    Finished(RunStatus),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepProgress {
    /// 0-based index of the current velocity
    pub index: usize,
    pub total: usize,
    pub velocity: Velocity,
    pub stage: SweepStage,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
}

/// `<base>/spall_analysis_<YYYYmmdd_HHMMSS>` in local time.
pub fn default_output_dir(base: &Path) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    base.join(format!("spall_analysis_{}", stamp))
}

pub fn run_sweep<O: SimulationOracle + ?Sized>(
    request: &SweepRequest,
    oracle: &O,
) -> AppResult<SweepResult> {
    run_sweep_with_progress(request, oracle, None)
}

/// Run the sweep and stream per-velocity progress events.
///
/// Fails before any run when the velocity list is empty, the parameters are
/// invalid, the oracle is unavailable, or the output directory cannot be
/// prepared. After that point, no single run can abort the sweep.
pub fn run_sweep_with_progress<O: SimulationOracle + ?Sized>(
    request: &SweepRequest,
    oracle: &O,
    mut progress_cb: Option<&mut dyn FnMut(SweepProgress)>,
) -> AppResult<SweepResult> {
    if request.velocities.is_empty() {
        return Err(AppError::InvalidInput(
            "velocity sweep needs at least one velocity".to_string(),
        ));
    }
    request.params.validate()?;

    oracle
        .check_available()
        .map_err(|what| AppError::InfrastructureUnavailable { what })?;

    let output_dir = request
        .output_dir
        .clone()
        .unwrap_or_else(|| default_output_dir(Path::new(DEFAULT_RESULTS_BASE)));
    let store = OutcomeStore::new(output_dir.clone())?;
    store.save_manifest(&SweepManifest {
        started_at: chrono::Local::now().to_rfc3339(),
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        velocities: request.velocities.clone(),
        params: request.params.clone(),
    })?;

    let start = Instant::now();
    let total = request.velocities.len();
    info!(
        oracle = oracle.name(),
        velocities = total,
        output_dir = %output_dir.display(),
        "starting velocity sweep"
    );

    let mut outcomes = Vec::with_capacity(total);
    for (index, &velocity) in request.velocities.iter().enumerate() {
        let job_name = velocity.job_name();
        info!(%velocity, index = index + 1, total, job = %job_name, "running simulation");
        emit_progress(&mut progress_cb, index, total, velocity, SweepStage::Starting, &start, None);

        let session = RunSession {
            index,
            total,
            velocity,
            params: request.params.clone(),
            job_name: job_name.clone(),
            work_dir: store.velocity_dir(velocity),
        };

        let outcome = match oracle.run(session) {
            Ok(metrics) => {
                info!(
                    %velocity,
                    max_stress = metrics.max_stress,
                    fracture = metrics.fracture_occurred,
                    "simulation completed"
                );
                RunOutcome::completed(velocity, job_name, metrics)
            }
            Err(failure) => {
                warn!(%velocity, error = %failure, "simulation failed");
                RunOutcome::failed(velocity, job_name, failure.message)
            }
        };

        if let Err(e) = store.save_outcome(&outcome) {
            warn!(%velocity, error = %e, "failed to persist run outcome");
        }

        emit_progress(
            &mut progress_cb,
            index,
            total,
            velocity,
            SweepStage::Finished(outcome.status()),
            &start,
            outcome.error_message().map(str::to_string),
        );
        outcomes.push(outcome);
    }

    if let Err(e) = store.write_summary_report(&outcomes) {
        warn!(error = %e, "failed to write summary report");
    }

    let result = SweepResult {
        outcomes,
        params: request.params.clone(),
        output_dir,
        elapsed_wall_s: start.elapsed().as_secs_f64(),
    };
    info!(
        completed = result.completed_count(),
        failed = result.failed_count(),
        elapsed_s = result.elapsed_wall_s,
        "velocity sweep finished"
    );
    Ok(result)
}

fn emit_progress(
    progress_cb: &mut Option<&mut dyn FnMut(SweepProgress)>,
    index: usize,
    total: usize,
    velocity: Velocity,
    stage: SweepStage,
    start: &Instant,
    message: Option<String>,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(SweepProgress {
            index,
            total,
            velocity,
            stage,
            elapsed_wall_s: start.elapsed().as_secs_f64(),
            message,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_dir_is_timestamped() {
        let dir = default_output_dir(Path::new("results"));
        let name = dir.file_name().unwrap().to_str().unwrap();
        assert!(dir.starts_with("results"));
        assert!(name.starts_with("spall_analysis_"));
        // spall_analysis_YYYYmmdd_HHMMSS
        assert_eq!(name.len(), "spall_analysis_".len() + 15);
    }
}
