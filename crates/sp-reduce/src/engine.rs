//! Raw output → extraction structure.

use rayon::prelude::*;
use sp_core::FrameTime;
use sp_project::ExtractionConfig;
use std::collections::BTreeMap;
use tracing::debug;

use crate::extraction::{ExtractionResult, FrameSnapshot, HistorySeries, StepExtraction, StepTimeline};
use crate::raw::{RawFrame, RawOutput, RawStep};
use crate::samples::reduce_samples_with;

/// Reduce every step of `raw` according to `config`.
///
/// Only requested field types, components and history channels that are
/// present in the raw data end up in the result. Steps are reduced in
/// parallel; their order in the result matches `raw`.
pub fn build_extraction(raw: &RawOutput, config: &ExtractionConfig) -> ExtractionResult {
    let steps = raw
        .steps
        .par_iter()
        .map(|step| reduce_step(step, config))
        .collect();
    ExtractionResult::from_steps(steps)
}

fn reduce_step(step: &RawStep, config: &ExtractionConfig) -> StepExtraction {
    let mut timeline = StepTimeline::default();
    for frame in &step.frames {
        if timeline.insert(reduce_frame(frame, config)).is_some() {
            debug!(step = %step.name, time = frame.time, "duplicate frame time, keeping the later frame");
        }
    }

    let mut history = BTreeMap::new();
    for (channel, raw_channel) in &config.history_outputs {
        let Some(points) = step
            .history_regions
            .get(channel)
            .and_then(|region| region.get(raw_channel))
        else {
            continue;
        };
        if points.is_empty() && config.empty_samples == sp_project::EmptySamplePolicy::Skip {
            continue;
        }
        history.insert(channel.clone(), HistorySeries::from_points(points));
    }

    debug!(
        step = %step.name,
        frames = timeline.len(),
        channels = history.len(),
        "reduced step"
    );

    StepExtraction {
        name: step.name.clone(),
        timeline,
        history,
    }
}

fn reduce_frame(frame: &RawFrame, config: &ExtractionConfig) -> FrameSnapshot {
    let mut snapshot = FrameSnapshot::new(FrameTime::new(frame.time));

    for (field, components) in &config.field_outputs {
        let Some(raw_components) = frame.fields.get(field) else {
            continue;
        };

        let reduced: BTreeMap<_, _> = components
            .iter()
            .filter_map(|component| {
                let values = raw_components.get(component)?;
                reduce_samples_with(values, config.empty_samples)
                    .map(|sample| (component.clone(), sample))
            })
            .collect();

        if !reduced.is_empty() {
            snapshot.fields.insert(field.clone(), reduced);
        }
    }

    snapshot
}
