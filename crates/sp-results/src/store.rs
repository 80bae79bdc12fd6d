//! Sweep storage API.
//!
//! Layout under the sweep root:
//!
//! ```text
//! sweep.json
//! summary_report.txt
//! velocity_<v>/results.json
//! ```

use serde::Serialize;
use sp_core::Velocity;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::report::{SUMMARY_REPORT_FILE, render_sweep_report};
use crate::types::{RunOutcome, SweepManifest};
use crate::{ResultsError, ResultsResult};

const MANIFEST_FILE: &str = "sweep.json";
const OUTCOME_FILE: &str = "results.json";
const VELOCITY_DIR_PREFIX: &str = "velocity_";

#[derive(Clone, Debug)]
pub struct OutcomeStore {
    root_dir: PathBuf,
}

impl OutcomeStore {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    /// Open an existing sweep directory without creating it.
    pub fn open(root_dir: &Path) -> ResultsResult<Self> {
        if !root_dir.is_dir() {
            return Err(ResultsError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("sweep directory {} does not exist", root_dir.display()),
            )));
        }
        Ok(Self {
            root_dir: root_dir.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root_dir
    }

    pub fn velocity_dir(&self, velocity: Velocity) -> PathBuf {
        self.root_dir.join(velocity.dir_name())
    }

    pub fn save_manifest(&self, manifest: &SweepManifest) -> ResultsResult<()> {
        self.save_json(MANIFEST_FILE, manifest)?;
        Ok(())
    }

    pub fn load_manifest(&self) -> ResultsResult<SweepManifest> {
        let content = fs::read_to_string(self.root_dir.join(MANIFEST_FILE))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write one outcome to `velocity_<v>/results.json`, replacing any earlier record.
    pub fn save_outcome(&self, outcome: &RunOutcome) -> ResultsResult<PathBuf> {
        let dir = self.velocity_dir(outcome.velocity);
        fs::create_dir_all(&dir)?;
        let path = dir.join(OUTCOME_FILE);
        fs::write(&path, serde_json::to_string_pretty(outcome)?)?;
        Ok(path)
    }

    pub fn has_outcome(&self, velocity: Velocity) -> bool {
        self.velocity_dir(velocity).join(OUTCOME_FILE).exists()
    }

    pub fn load_outcome(&self, velocity: Velocity) -> ResultsResult<RunOutcome> {
        let path = self.velocity_dir(velocity).join(OUTCOME_FILE);
        if !path.exists() {
            return Err(ResultsError::OutcomeNotFound {
                velocity: velocity.to_string(),
            });
        }
        read_outcome(&path)
    }

    /// Load every persisted outcome, e.g. after an interrupted sweep.
    ///
    /// When the sweep manifest is present, outcomes follow the manifest's
    /// velocity order; otherwise they are sorted by velocity. Velocities that
    /// never produced a record are absent, and so are velocities whose record
    /// cannot be read (logged as a warning).
    pub fn list_outcomes(&self) -> ResultsResult<Vec<RunOutcome>> {
        if let Ok(manifest) = self.load_manifest() {
            let mut outcomes = Vec::new();
            let mut seen = Vec::new();
            for velocity in manifest.velocities {
                if seen.contains(&velocity) {
                    continue;
                }
                seen.push(velocity);
                if self.has_outcome(velocity) {
                    let path = self.velocity_dir(velocity).join(OUTCOME_FILE);
                    outcomes.extend(read_outcome_or_warn(&path));
                }
            }
            return Ok(outcomes);
        }

        let mut outcomes = Vec::new();
        for entry in fs::read_dir(&self.root_dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            let path = entry.path().join(OUTCOME_FILE);
            if name.starts_with(VELOCITY_DIR_PREFIX) && path.exists() {
                outcomes.extend(read_outcome_or_warn(&path));
            }
        }
        outcomes.sort_by(|a, b| a.velocity.cmp(&b.velocity));
        Ok(outcomes)
    }

    /// Render and write `summary_report.txt` for `outcomes`.
    pub fn write_summary_report(&self, outcomes: &[RunOutcome]) -> ResultsResult<PathBuf> {
        let generated_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        self.write_text(SUMMARY_REPORT_FILE, &render_sweep_report(outcomes, &generated_at))
    }

    pub fn write_text(&self, file_name: &str, content: &str) -> ResultsResult<PathBuf> {
        let path = self.root_dir.join(file_name);
        fs::write(&path, content)?;
        Ok(path)
    }

    pub fn save_json<T: Serialize + ?Sized>(&self, file_name: &str, value: &T) -> ResultsResult<PathBuf> {
        let path = self.root_dir.join(file_name);
        fs::write(&path, serde_json::to_string_pretty(value)?)?;
        Ok(path)
    }
}

fn read_outcome(path: &Path) -> ResultsResult<RunOutcome> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn read_outcome_or_warn(path: &Path) -> Option<RunOutcome> {
    match read_outcome(path) {
        Ok(outcome) => Some(outcome),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "skipping unreadable run outcome");
            None
        }
    }
}
