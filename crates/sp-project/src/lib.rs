//! sp-project: study file format, analysis parameters and extraction settings.

pub mod extraction;
pub mod params;
pub mod study;

pub use extraction::{EmptySamplePolicy, ExtractionConfig};
pub use params::{AnalysisParams, SymmetryPlane};
pub use study::StudyConfig;

use std::path::Path;

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Invalid configuration: {what}")]
    Invalid { what: String },

    #[error("Invalid value: {0}")]
    Core(#[from] sp_core::CoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Load a study file. `.yaml`/`.yml` files are read as YAML, anything else as JSON.
pub fn load_study(path: &Path) -> ProjectResult<StudyConfig> {
    let study = read_study(path)?;
    study.validate()?;
    Ok(study)
}

/// Extraction settings of a study file.
///
/// Only the `extraction` section is used, so files without velocities
/// are accepted.
pub fn load_extraction_config(path: &Path) -> ProjectResult<ExtractionConfig> {
    Ok(read_study(path)?.extraction)
}

fn read_study(path: &Path) -> ProjectResult<StudyConfig> {
    let content = std::fs::read_to_string(path)?;
    let study = if is_yaml(path) {
        serde_yaml::from_str(&content)?
    } else {
        serde_json::from_str(&content)?
    };
    Ok(study)
}

pub fn save_study(path: &Path, study: &StudyConfig) -> ProjectResult<()> {
    study.validate()?;
    let content = if is_yaml(path) {
        serde_yaml::to_string(study)?
    } else {
        serde_json::to_string_pretty(study)?
    };
    std::fs::write(path, content)?;
    Ok(())
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}
