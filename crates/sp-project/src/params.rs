//! Analysis parameters handed to the simulation oracle for every run.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

use crate::{ProjectError, ProjectResult};

/// Symmetry plane applied as a boundary condition on the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SymmetryPlane {
    X,
    Y,
    Z,
}

impl fmt::Display for SymmetryPlane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => write!(f, "X"),
            Self::Y => write!(f, "Y"),
            Self::Z => write!(f, "Z"),
        }
    }
}

/// Parameters shared by every run of a sweep.
///
/// Keys missing from a caller's overrides keep their defaults. Keys this
/// struct does not know about are kept in `extra` and passed to the oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisParams {
    /// Explicit dynamics step duration (s)
    pub time_period: f64,
    /// Global mesh seed size (m)
    pub element_size: f64,
    /// Tangential friction coefficient at the impact interface
    pub contact_friction: f64,
    pub symmetry_planes: Vec<SymmetryPlane>,
    /// Number of field output frames requested over the step
    pub output_frequency: u32,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            time_period: 0.0003,
            element_size: 0.0005,
            contact_friction: 0.1,
            symmetry_planes: vec![SymmetryPlane::X, SymmetryPlane::Z],
            output_frequency: 100,
            extra: BTreeMap::new(),
        }
    }
}

impl AnalysisParams {
    /// Merge caller-supplied values over the defaults, one top-level key at a time.
    ///
    /// A supplied key replaces the default value wholesale; nested values
    /// (such as `symmetry_planes`) are not merged element-wise.
    pub fn with_overrides(overrides: &Map<String, Value>) -> ProjectResult<Self> {
        let mut merged = match serde_json::to_value(Self::default())? {
            Value::Object(map) => map,
            _ => {
                return Err(ProjectError::Invalid {
                    what: "default analysis parameters are not an object".to_string(),
                });
            }
        };
        for (key, value) in overrides {
            merged.insert(key.clone(), value.clone());
        }
        let params: Self = serde_json::from_value(Value::Object(merged))?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> ProjectResult<()> {
        if !(self.time_period.is_finite() && self.time_period > 0.0) {
            return Err(invalid(format!(
                "time_period must be positive (received {})",
                self.time_period
            )));
        }
        if !(self.element_size.is_finite() && self.element_size > 0.0) {
            return Err(invalid(format!(
                "element_size must be positive (received {})",
                self.element_size
            )));
        }
        if !(self.contact_friction.is_finite() && self.contact_friction >= 0.0) {
            return Err(invalid(format!(
                "contact_friction must be non-negative (received {})",
                self.contact_friction
            )));
        }
        if self.output_frequency == 0 {
            return Err(invalid("output_frequency must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn invalid(what: String) -> ProjectError {
    ProjectError::Invalid { what }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn overrides(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn defaults_match_reference_study() {
        let p = AnalysisParams::default();
        assert_eq!(p.time_period, 0.0003);
        assert_eq!(p.element_size, 0.0005);
        assert_eq!(p.contact_friction, 0.1);
        assert_eq!(p.symmetry_planes, vec![SymmetryPlane::X, SymmetryPlane::Z]);
        assert_eq!(p.output_frequency, 100);
    }

    #[test]
    fn overrides_replace_only_given_keys() {
        let p = AnalysisParams::with_overrides(&overrides(json!({
            "contact_friction": 0.25,
            "symmetry_planes": ["Y"]
        })))
        .unwrap();
        assert_eq!(p.contact_friction, 0.25);
        assert_eq!(p.symmetry_planes, vec![SymmetryPlane::Y]);
        assert_eq!(p.time_period, 0.0003);
        assert_eq!(p.output_frequency, 100);
    }

    #[test]
    fn unknown_keys_are_carried_through() {
        let p = AnalysisParams::with_overrides(&overrides(json!({
            "mass_scaling": 1.5
        })))
        .unwrap();
        assert_eq!(p.extra.get("mass_scaling"), Some(&json!(1.5)));

        let round: AnalysisParams = serde_json::from_value(serde_json::to_value(&p).unwrap()).unwrap();
        assert_eq!(round, p);
    }

    #[test]
    fn rejects_invalid_values() {
        let err = AnalysisParams::with_overrides(&overrides(json!({ "element_size": 0.0 })));
        assert!(err.is_err());
        let err = AnalysisParams::with_overrides(&overrides(json!({ "output_frequency": 0 })));
        assert!(err.is_err());
    }
}
