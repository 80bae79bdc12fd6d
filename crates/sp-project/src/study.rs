//! Study file: the velocities to sweep plus every configuration section.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sp_core::{Velocity, VelocityUnit};
use std::path::PathBuf;

use crate::{AnalysisParams, ExtractionConfig, ProjectError, ProjectResult};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyConfig {
    pub name: Option<String>,
    /// Velocities to sweep, in the order they should run
    pub velocities: Vec<f64>,
    pub velocity_unit: VelocityUnit,
    /// Overrides merged over the default analysis parameters
    pub analysis: Map<String, Value>,
    pub extraction: ExtractionConfig,
    pub output_dir: Option<PathBuf>,
}

impl StudyConfig {
    pub fn validate(&self) -> ProjectResult<()> {
        self.velocities()?;
        self.analysis_params()?;
        Ok(())
    }

    /// Velocities converted to m/s, input order preserved.
    pub fn velocities(&self) -> ProjectResult<Vec<Velocity>> {
        if self.velocities.is_empty() {
            return Err(ProjectError::Invalid {
                what: "study must list at least one velocity".to_string(),
            });
        }
        self.velocities
            .iter()
            .map(|&v| Velocity::from_unit(v, self.velocity_unit).map_err(ProjectError::from))
            .collect()
    }

    pub fn analysis_params(&self) -> ProjectResult<AnalysisParams> {
        AnalysisParams::with_overrides(&self.analysis)
    }
}
