//! Reduced extraction structure: step → timeline of frames → field → component.

use serde::{Deserialize, Serialize};
use sp_core::{ChannelName, ComponentName, FieldType, FrameTime, StepName};
use std::collections::BTreeMap;

use crate::samples::{FieldSample, reduce_samples};

pub type FieldSamples = BTreeMap<ComponentName, FieldSample>;

/// Reduced field data at one point in simulated time.
///
/// Sparse: a missing field or component means it was not requested or not
/// present in the raw frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub time: FrameTime,
    #[serde(default)]
    pub fields: BTreeMap<FieldType, FieldSamples>,
}

impl FrameSnapshot {
    pub fn new(time: FrameTime) -> Self {
        Self {
            time,
            fields: BTreeMap::new(),
        }
    }

    pub fn field(&self, field: &str) -> Option<&FieldSamples> {
        self.fields.get(field)
    }

    pub fn sample(&self, field: &str, component: &str) -> Option<&FieldSample> {
        self.fields.get(field).and_then(|c| c.get(component))
    }
}

/// Frames of one step, ascending by time, at most one frame per time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<FrameSnapshot>", into = "Vec<FrameSnapshot>")]
pub struct StepTimeline {
    frames: Vec<FrameSnapshot>,
}

impl StepTimeline {
    /// Insert a frame at its time position. A frame already stored at the
    /// same time is replaced and returned.
    pub fn insert(&mut self, frame: FrameSnapshot) -> Option<FrameSnapshot> {
        match self.frames.binary_search_by(|f| f.time.cmp(&frame.time)) {
            Ok(idx) => Some(std::mem::replace(&mut self.frames[idx], frame)),
            Err(idx) => {
                self.frames.insert(idx, frame);
                None
            }
        }
    }

    pub fn frames(&self) -> &[FrameSnapshot] {
        &self.frames
    }

    pub fn frame_at(&self, time: FrameTime) -> Option<&FrameSnapshot> {
        self.frames
            .binary_search_by(|f| f.time.cmp(&time))
            .ok()
            .map(|idx| &self.frames[idx])
    }

    pub fn first(&self) -> Option<&FrameSnapshot> {
        self.frames.first()
    }

    pub fn last_time(&self) -> Option<FrameTime> {
        self.frames.last().map(|f| f.time)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl From<Vec<FrameSnapshot>> for StepTimeline {
    fn from(frames: Vec<FrameSnapshot>) -> Self {
        let mut timeline = Self::default();
        for frame in frames {
            timeline.insert(frame);
        }
        timeline
    }
}

impl From<StepTimeline> for Vec<FrameSnapshot> {
    fn from(timeline: StepTimeline) -> Self {
        timeline.frames
    }
}

/// One scalar history channel over a whole step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySeries {
    pub times: Vec<f64>,
    pub values: Vec<f64>,
    pub max: f64,
    pub min: f64,
    pub mean: f64,
}

impl HistorySeries {
    /// Build from `(time, value)` points, kept in the given order.
    pub fn from_points(points: &[(f64, f64)]) -> Self {
        let (times, values): (Vec<f64>, Vec<f64>) = points.iter().copied().unzip();
        let stats = reduce_samples(&values);
        Self {
            times,
            values,
            max: stats.max,
            min: stats.min,
            mean: stats.mean,
        }
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.times.iter().copied().zip(self.values.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

/// Reduced data of one analysis step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepExtraction {
    pub name: StepName,
    pub timeline: StepTimeline,
    #[serde(default)]
    pub history: BTreeMap<ChannelName, HistorySeries>,
}

/// Result of reducing one raw output.
///
/// Steps keep the order in which they were discovered in the raw output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    steps: Vec<StepExtraction>,
}

impl ExtractionResult {
    pub fn from_steps(steps: Vec<StepExtraction>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[StepExtraction] {
        &self.steps
    }

    /// First step with the given name.
    pub fn step(&self, name: &str) -> Option<&StepExtraction> {
        self.steps.iter().find(|s| s.name.as_str() == name)
    }

    pub fn step_names(&self) -> impl Iterator<Item = &StepName> {
        self.steps.iter().map(|s| &s.name)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(t: f64) -> FrameSnapshot {
        FrameSnapshot::new(FrameTime::new(t))
    }

    #[test]
    fn timeline_keeps_time_order() {
        let mut tl = StepTimeline::default();
        tl.insert(frame(0.002));
        tl.insert(frame(0.0));
        tl.insert(frame(0.001));
        let times: Vec<f64> = tl.frames().iter().map(|f| f.time.seconds()).collect();
        assert_eq!(times, vec![0.0, 0.001, 0.002]);
        assert_eq!(tl.last_time(), Some(FrameTime::new(0.002)));
    }

    #[test]
    fn timeline_replaces_same_time() {
        let mut tl = StepTimeline::default();
        assert!(tl.insert(frame(0.001)).is_none());
        assert!(tl.insert(frame(0.001)).is_some());
        assert_eq!(tl.len(), 1);
        assert!(tl.frame_at(FrameTime::new(0.001)).is_some());
        assert!(tl.frame_at(FrameTime::new(0.5)).is_none());
    }

    #[test]
    fn history_series_keeps_order_and_stats() {
        let series = HistorySeries::from_points(&[(0.0, 0.0), (0.001, 1250.5), (0.002, 2100.3)]);
        assert_eq!(series.times, vec![0.0, 0.001, 0.002]);
        assert_eq!(series.values, vec![0.0, 1250.5, 2100.3]);
        assert_eq!(series.max, 2100.3);
        assert_eq!(series.min, 0.0);
        assert!((series.mean - 1116.933_333_333_333_3).abs() < 1e-9);
    }

    #[test]
    fn timeline_serializes_as_frame_list() {
        let tl: StepTimeline = vec![frame(0.002), frame(0.001)].into();
        let json = serde_json::to_value(&tl).unwrap();
        assert!(json.is_array());
        let back: StepTimeline = serde_json::from_value(json).unwrap();
        assert_eq!(back, tl);
    }
}
