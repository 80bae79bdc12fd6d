//! Raw solver output as handed over by the extraction backend.
//!
//! Field values are stored per component, one entry per node or element.
//! History regions are named after the logical channel they carry and hold
//! one `(time, value)` series per raw output identifier.

use serde::{Deserialize, Serialize};
use sp_core::{ChannelName, ComponentName, FieldType, RawChannel, StepName};
use std::collections::BTreeMap;
use std::path::Path;

use crate::ReduceResult;

pub type RawComponents = BTreeMap<ComponentName, Vec<f64>>;
pub type RawHistoryRegion = BTreeMap<RawChannel, Vec<(f64, f64)>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawOutput {
    /// Where the output came from (e.g. the solver database file name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub steps: Vec<RawStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawStep {
    pub name: StepName,
    #[serde(default)]
    pub frames: Vec<RawFrame>,
    #[serde(default)]
    pub history_regions: BTreeMap<ChannelName, RawHistoryRegion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFrame {
    /// Frame time in seconds
    pub time: f64,
    #[serde(default)]
    pub fields: BTreeMap<FieldType, RawComponents>,
}

impl RawOutput {
    pub fn from_json_str(s: &str) -> ReduceResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn load_json(path: &Path) -> ReduceResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_output() {
        let raw = RawOutput::from_json_str(
            r#"{
                "source": "demo_results.odb",
                "steps": [{
                    "name": "Step-1",
                    "frames": [
                        { "time": 0.001, "fields": { "stress": { "S11": [45.2, 67.8, 89.4] } } }
                    ],
                    "history_regions": {
                        "kinetic_energy": { "KE": [[0.0, 0.0], [0.001, 1250.5]] }
                    }
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(raw.source.as_deref(), Some("demo_results.odb"));
        let step = &raw.steps[0];
        assert_eq!(step.name.as_str(), "Step-1");
        assert_eq!(step.frames[0].fields["stress"]["S11"].len(), 3);
        assert_eq!(step.history_regions["kinetic_energy"]["KE"][1], (0.001, 1250.5));
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let raw = RawOutput::from_json_str(r#"{ "steps": [{ "name": "Step-1" }] }"#).unwrap();
        assert!(raw.steps[0].frames.is_empty());
        assert!(raw.steps[0].history_regions.is_empty());
    }
}
