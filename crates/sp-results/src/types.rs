//! Result data types.

use serde::{Deserialize, Serialize};
use sp_core::Velocity;
use sp_project::AnalysisParams;

/// Metrics reported by the simulation for one completed run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    /// Peak stress (MPa)
    pub max_stress: f64,
    pub max_strain: f64,
    /// Time of fracture onset (µs)
    pub fracture_time: f64,
    pub fracture_occurred: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcomeKind {
    Completed(RunMetrics),
    Failed { error: String },
}

/// Normalized result of one velocity's simulation attempt.
///
/// Persisted as a flat record: metric fields only for completed runs,
/// `error` only for failed ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "RunRecord", try_from = "RunRecord")]
pub struct RunOutcome {
    pub velocity: Velocity,
    pub job_name: String,
    pub kind: RunOutcomeKind,
}

impl RunOutcome {
    pub fn completed(velocity: Velocity, job_name: impl Into<String>, metrics: RunMetrics) -> Self {
        Self {
            velocity,
            job_name: job_name.into(),
            kind: RunOutcomeKind::Completed(metrics),
        }
    }

    pub fn failed(velocity: Velocity, job_name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            velocity,
            job_name: job_name.into(),
            kind: RunOutcomeKind::Failed {
                error: error.into(),
            },
        }
    }

    pub fn status(&self) -> RunStatus {
        match self.kind {
            RunOutcomeKind::Completed(_) => RunStatus::Completed,
            RunOutcomeKind::Failed { .. } => RunStatus::Failed,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status() == RunStatus::Completed
    }

    pub fn metrics(&self) -> Option<&RunMetrics> {
        match &self.kind {
            RunOutcomeKind::Completed(m) => Some(m),
            RunOutcomeKind::Failed { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.kind {
            RunOutcomeKind::Completed(_) => None,
            RunOutcomeKind::Failed { error } => Some(error),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct RunRecord {
    velocity: Velocity,
    status: RunStatus,
    #[serde(default)]
    job_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_stress: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_strain: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fracture_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fracture_occurred: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<RunOutcome> for RunRecord {
    fn from(outcome: RunOutcome) -> Self {
        let mut record = RunRecord {
            velocity: outcome.velocity,
            status: outcome.status(),
            job_name: outcome.job_name,
            max_stress: None,
            max_strain: None,
            fracture_time: None,
            fracture_occurred: None,
            error: None,
        };
        match outcome.kind {
            RunOutcomeKind::Completed(m) => {
                record.max_stress = Some(m.max_stress);
                record.max_strain = Some(m.max_strain);
                record.fracture_time = Some(m.fracture_time);
                record.fracture_occurred = Some(m.fracture_occurred);
            }
            RunOutcomeKind::Failed { error } => record.error = Some(error),
        }
        record
    }
}

impl TryFrom<RunRecord> for RunOutcome {
    type Error = crate::ResultsError;

    fn try_from(r: RunRecord) -> Result<Self, Self::Error> {
        let kind = match r.status {
            RunStatus::Completed => match (r.max_stress, r.max_strain, r.fracture_time, r.fracture_occurred) {
                (Some(max_stress), Some(max_strain), Some(fracture_time), Some(fracture_occurred)) => {
                    RunOutcomeKind::Completed(RunMetrics {
                        max_stress,
                        max_strain,
                        fracture_time,
                        fracture_occurred,
                    })
                }
                _ => {
                    return Err(crate::ResultsError::InvalidRecord(format!(
                        "completed run at {} m/s is missing metrics",
                        r.velocity
                    )));
                }
            },
            RunStatus::Failed => RunOutcomeKind::Failed {
                error: r.error.unwrap_or_else(|| "unknown error".to_string()),
            },
        };
        Ok(RunOutcome {
            velocity: r.velocity,
            job_name: r.job_name,
            kind,
        })
    }
}

/// Description of a sweep, written before its first run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepManifest {
    pub started_at: String,
    pub tool_version: String,
    pub velocities: Vec<Velocity>,
    pub params: AnalysisParams,
}
