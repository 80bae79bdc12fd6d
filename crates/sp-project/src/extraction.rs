//! Settings for reducing raw solver output.

use serde::{Deserialize, Serialize};
use sp_core::{ChannelName, ComponentName, FieldType, RawChannel};
use std::collections::BTreeMap;

/// What to report for a field component whose sample set is empty.
///
/// `Zero` reports `{max: 0, min: 0, mean: 0}`, which cannot be told apart
/// from a measured zero downstream. `Skip` leaves the component out of the
/// frame instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptySamplePolicy {
    #[default]
    Zero,
    Skip,
}

/// Which field and history outputs to extract from raw simulation output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Field type → components to extract
    pub field_outputs: BTreeMap<FieldType, Vec<ComponentName>>,
    /// Logical channel → raw channel identifier
    pub history_outputs: BTreeMap<ChannelName, RawChannel>,
    pub empty_samples: EmptySamplePolicy,
    pub output_frequency: u32,
    pub coordinate_system: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        let field_outputs = [
            ("stress", &["S11", "S22", "S33", "S12", "S13", "S23"][..]),
            ("strain", &["E11", "E22", "E33", "E12", "E13", "E23"][..]),
            ("displacement", &["U1", "U2", "U3"][..]),
            ("velocity", &["V1", "V2", "V3"][..]),
        ]
        .into_iter()
        .map(|(field, comps)| {
            (
                FieldType::from(field),
                comps.iter().map(|c| ComponentName::from(*c)).collect(),
            )
        })
        .collect();

        let history_outputs = [
            ("reaction_force", "RF"),
            ("kinetic_energy", "KE"),
            ("internal_energy", "IE"),
        ]
        .into_iter()
        .map(|(logical, raw)| (ChannelName::from(logical), RawChannel::from(raw)))
        .collect();

        Self {
            field_outputs,
            history_outputs,
            empty_samples: EmptySamplePolicy::Zero,
            output_frequency: 10,
            coordinate_system: "GLOBAL".to_string(),
        }
    }
}

impl ExtractionConfig {
    /// Components requested for `field`, if the field is requested at all.
    pub fn components(&self, field: &FieldType) -> Option<&[ComponentName]> {
        self.field_outputs.get(field).map(Vec::as_slice)
    }
}
