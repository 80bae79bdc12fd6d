//! Fracture threshold analysis over sweep outcomes.

use serde::{Deserialize, Serialize};
use sp_core::Velocity;
use sp_results::RunOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressRange {
    /// MPa
    pub min: f64,
    pub max: f64,
}

/// Threshold view of a sweep. Pure function of its outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub total_velocities: usize,
    pub successful_count: usize,
    pub failed_count: usize,
    /// Lowest velocity at which fracture occurred
    pub critical_velocity: Option<Velocity>,
    /// In sweep order
    pub fracture_velocities: Vec<Velocity>,
    /// In sweep order
    pub no_fracture_velocities: Vec<Velocity>,
    pub stress_range: Option<StressRange>,
}

impl AnalysisSummary {
    /// False when no run completed.
    pub fn has_data(&self) -> bool {
        self.successful_count > 0
    }
}

pub fn analyze(outcomes: &[RunOutcome]) -> AnalysisSummary {
    let mut fracture_velocities = Vec::new();
    let mut no_fracture_velocities = Vec::new();
    let mut stress_range: Option<StressRange> = None;

    for (velocity, metrics) in outcomes
        .iter()
        .filter_map(|o| o.metrics().map(|m| (o.velocity, m)))
    {
        if metrics.fracture_occurred {
            fracture_velocities.push(velocity);
        } else {
            no_fracture_velocities.push(velocity);
        }
        stress_range = Some(match stress_range {
            None => StressRange {
                min: metrics.max_stress,
                max: metrics.max_stress,
            },
            Some(r) => StressRange {
                min: r.min.min(metrics.max_stress),
                max: r.max.max(metrics.max_stress),
            },
        });
    }

    let successful_count = fracture_velocities.len() + no_fracture_velocities.len();

    AnalysisSummary {
        total_velocities: outcomes.len(),
        successful_count,
        failed_count: outcomes.len() - successful_count,
        critical_velocity: fracture_velocities.iter().min().copied(),
        fracture_velocities,
        no_fracture_velocities,
        stress_range,
    }
}
