//! Cross-cutting scalars derived from an extraction.

use serde::{Deserialize, Serialize};
use sp_core::{ComponentName, FieldType, StepName};

use crate::extraction::ExtractionResult;
use crate::samples::FieldSample;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub num_steps: usize,
    pub total_frames: usize,
    /// Largest `max` over every stress component of every frame; 0 when there is no stress data
    pub max_stress_overall: f64,
    /// Largest `max` over every strain component of every frame; 0 when there is no strain data
    pub max_strain_overall: f64,
    /// Latest frame time over all steps (s)
    pub total_time: f64,
}

pub fn summarize(extraction: &ExtractionResult) -> SummaryStatistics {
    SummaryStatistics {
        num_steps: extraction.len(),
        total_frames: extraction.steps().iter().map(|s| s.timeline.len()).sum(),
        max_stress_overall: max_field_overall(extraction, FieldType::STRESS),
        max_strain_overall: max_field_overall(extraction, FieldType::STRAIN),
        total_time: extraction
            .steps()
            .iter()
            .filter_map(|s| s.timeline.last_time())
            .map(|t| t.seconds())
            .reduce(f64::max)
            .unwrap_or(0.0),
    }
}

/// Largest component `max` of `field` across all steps and frames, or 0 if the field never occurs.
pub fn max_field_overall(extraction: &ExtractionResult, field: &str) -> f64 {
    extraction
        .steps()
        .iter()
        .flat_map(|s| s.timeline.frames())
        .filter_map(|f| f.field(field))
        .flat_map(|components| components.values())
        .map(|sample| sample.max)
        .reduce(f64::max)
        .unwrap_or(0.0)
}

/// Per-step overview used by the text summary.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOverview {
    pub name: StepName,
    pub frame_count: usize,
    /// Stress components of the first frame
    pub first_frame_stress: Vec<(ComponentName, FieldSample)>,
}

pub fn step_overviews(extraction: &ExtractionResult) -> Vec<StepOverview> {
    extraction
        .steps()
        .iter()
        .map(|step| StepOverview {
            name: step.name.clone(),
            frame_count: step.timeline.len(),
            first_frame_stress: step
                .timeline
                .first()
                .and_then(|f| f.field(FieldType::STRESS))
                .map(|c| c.iter().map(|(k, v)| (k.clone(), *v)).collect())
                .unwrap_or_default(),
        })
        .collect()
}
