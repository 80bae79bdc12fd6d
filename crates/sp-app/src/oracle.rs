//! Contract with the external simulation, plus the oracles shipped with the tool.
//!
//! The core never builds or solves a model itself. Each run is described by
//! a self-contained [`RunSession`] handed to the oracle; nothing is shared
//! between runs.

use serde::{Deserialize, Serialize};
use sp_core::Velocity;
use sp_project::AnalysisParams;
use sp_results::RunMetrics;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{AppError, AppResult};

/// Everything one simulation run needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSession {
    /// 0-based position in the sweep
    pub index: usize,
    pub total: usize,
    pub velocity: Velocity,
    pub params: AnalysisParams,
    pub job_name: String,
    /// Directory reserved for this run's artifacts
    pub work_dir: PathBuf,
}

/// A failed simulation or metric extraction for one velocity.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct OracleFailure {
    pub message: String,
}

impl OracleFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub trait SimulationOracle {
    fn name(&self) -> &str;

    /// Checked once before a sweep starts. An `Err` aborts the sweep before any run.
    fn check_available(&self) -> Result<(), String>;

    /// Run one simulation. Blocks until the solver finishes.
    fn run(&self, session: RunSession) -> Result<RunMetrics, OracleFailure>;
}

/// Oracle backed by a closure.
pub struct FnOracle<F> {
    name: String,
    f: F,
}

impl<F> FnOracle<F>
where
    F: Fn(&RunSession) -> Result<RunMetrics, OracleFailure>,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> SimulationOracle for FnOracle<F>
where
    F: Fn(&RunSession) -> Result<RunMetrics, OracleFailure>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn check_available(&self) -> Result<(), String> {
        Ok(())
    }

    fn run(&self, session: RunSession) -> Result<RunMetrics, OracleFailure> {
        (self.f)(&session)
    }
}

/// One tabulated run: either metrics or an error message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableEntry {
    pub velocity: Velocity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<RunMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Replays previously recorded simulation results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableOracle {
    pub entries: Vec<TableEntry>,
}

impl TableOracle {
    pub fn new(entries: Vec<TableEntry>) -> Self {
        Self { entries }
    }

    /// Load a table from YAML (`.yaml`/`.yml`) or JSON.
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AppError::InfrastructureUnavailable {
            what: format!("oracle table {}: {}", path.display(), e),
        })?;
        let yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        let table = if yaml {
            serde_yaml::from_str(&content).map_err(|e| AppError::Oracle(e.to_string()))?
        } else {
            serde_json::from_str(&content).map_err(|e| AppError::Oracle(e.to_string()))?
        };
        Ok(table)
    }
}

impl SimulationOracle for TableOracle {
    fn name(&self) -> &str {
        "table"
    }

    fn check_available(&self) -> Result<(), String> {
        if self.entries.is_empty() {
            return Err("oracle table has no entries".to_string());
        }
        Ok(())
    }

    fn run(&self, session: RunSession) -> Result<RunMetrics, OracleFailure> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.velocity.approx_eq(session.velocity))
            .ok_or_else(|| {
                OracleFailure::new(format!("no tabulated result for {} m/s", session.velocity))
            })?;
        match (&entry.error, entry.metrics) {
            (Some(error), _) => Err(OracleFailure::new(error.clone())),
            (None, Some(metrics)) => Ok(metrics),
            (None, None) => Err(OracleFailure::new(format!(
                "tabulated result for {} m/s has neither metrics nor error",
                session.velocity
            ))),
        }
    }
}

/// Runs an external program once per velocity.
///
/// The program receives the [`RunSession`] as JSON on stdin, runs with the
/// session's work directory as its current directory, and must print
/// [`RunMetrics`] as JSON on stdout. A non-zero exit status is a run failure.
#[derive(Debug, Clone)]
pub struct CommandOracle {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandOracle {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Absolute path of the program.
    ///
    /// Paths with a directory part resolve against the caller's working
    /// directory, bare names against `PATH`. The result stays valid once the
    /// child runs inside the session's work directory.
    fn resolve_program(&self) -> Option<PathBuf> {
        if self.program.components().count() > 1 {
            let program = if self.program.is_absolute() {
                self.program.clone()
            } else {
                std::env::current_dir().ok()?.join(&self.program)
            };
            return program.is_file().then_some(program);
        }
        let path_var = std::env::var_os("PATH")?;
        std::env::split_paths(&path_var)
            .map(|dir| dir.join(&self.program))
            .find(|candidate| candidate.is_file())
    }
}

impl SimulationOracle for CommandOracle {
    fn name(&self) -> &str {
        "command"
    }

    fn check_available(&self) -> Result<(), String> {
        self.resolve_program()
            .map(|_| ())
            .ok_or_else(|| format!("simulation program {} not found", self.program.display()))
    }

    fn run(&self, session: RunSession) -> Result<RunMetrics, OracleFailure> {
        let input = serde_json::to_vec(&session)
            .map_err(|e| OracleFailure::new(format!("failed to encode session: {}", e)))?;
        std::fs::create_dir_all(&session.work_dir)
            .map_err(|e| OracleFailure::new(format!("failed to create work directory: {}", e)))?;

        let program = self.resolve_program().ok_or_else(|| {
            OracleFailure::new(format!("simulation program {} not found", self.program.display()))
        })?;

        let mut child = Command::new(&program)
            .args(&self.args)
            .current_dir(&session.work_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| OracleFailure::new(format!("failed to start {}: {}", self.program.display(), e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(&input) {
                Ok(()) => {}
                // the solver may exit without reading its session
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(OracleFailure::new(format!("failed to send session: {}", e)));
                }
            }
        }

        let output = child
            .wait_with_output()
            .map_err(|e| OracleFailure::new(format!("failed to wait for solver: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr
                .lines()
                .rev()
                .find(|l| !l.trim().is_empty())
                .unwrap_or("no diagnostic output");
            return Err(OracleFailure::new(format!(
                "solver exited with {}: {}",
                output.status, detail
            )));
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| OracleFailure::new(format!("unreadable solver metrics: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(v: f64) -> RunSession {
        let velocity = Velocity::new(v).unwrap();
        RunSession {
            index: 0,
            total: 1,
            velocity,
            params: AnalysisParams::default(),
            job_name: velocity.job_name(),
            work_dir: std::env::temp_dir().join("sp_app_oracle_test"),
        }
    }

    fn metrics() -> RunMetrics {
        RunMetrics {
            max_stress: 100.0,
            max_strain: 0.02,
            fracture_time: 80.0,
            fracture_occurred: false,
        }
    }

    #[test]
    fn table_oracle_replays_entries() {
        let oracle = TableOracle::new(vec![
            TableEntry {
                velocity: Velocity::new(100.0).unwrap(),
                metrics: Some(metrics()),
                error: None,
            },
            TableEntry {
                velocity: Velocity::new(150.0).unwrap(),
                metrics: None,
                error: Some("mesh generation error".to_string()),
            },
        ]);

        assert!(oracle.check_available().is_ok());
        assert_eq!(oracle.run(session(100.0)).unwrap(), metrics());
        assert_eq!(
            oracle.run(session(150.0)).unwrap_err().message,
            "mesh generation error"
        );
        assert!(oracle.run(session(999.0)).is_err());
    }

    #[test]
    fn empty_table_is_unavailable() {
        assert!(TableOracle::default().check_available().is_err());
    }

    #[test]
    fn missing_program_is_unavailable() {
        let oracle = CommandOracle::new("/nonexistent/dir/solver-that-does-not-exist", vec![]);
        assert!(oracle.check_available().is_err());
    }

    #[cfg(unix)]
    fn write_script(path: &Path, body: &str) {
        use std::os::unix::fs::PermissionsExt;
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, body).unwrap();
        let mut perms = std::fs::metadata(path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(path, perms).unwrap();
    }

    const METRICS_SCRIPT: &str = "#!/bin/sh\ncat > /dev/null\necho '{\"max_stress\": 120.5, \"max_strain\": 0.01, \"fracture_time\": 80.0, \"fracture_occurred\": true}'\n";

    #[cfg(unix)]
    #[test]
    fn relative_program_runs_from_session_work_dir() {
        // relative to the test's working directory, not to the session's
        let rel_dir = PathBuf::from("sp_app_relative_solver");
        let _ = std::fs::remove_dir_all(&rel_dir);
        write_script(&rel_dir.join("bin").join("solver.sh"), METRICS_SCRIPT);

        let oracle = CommandOracle::new("./sp_app_relative_solver/bin/solver.sh", vec![]);
        assert!(oracle.check_available().is_ok());

        let mut s = session(250.0);
        s.work_dir = std::env::temp_dir().join("sp_app_relative_solver_work");
        let metrics = oracle.run(s).unwrap();
        assert_eq!(metrics.max_stress, 120.5);
        assert!(metrics.fracture_occurred);

        let _ = std::fs::remove_dir_all(&rel_dir);
    }

    #[cfg(unix)]
    #[test]
    fn solver_ignoring_its_session_still_reports() {
        let dir = std::env::temp_dir().join("sp_app_quiet_solver");
        let _ = std::fs::remove_dir_all(&dir);
        let script = dir.join("solver.sh");
        write_script(
            &script,
            "#!/bin/sh\necho '{\"max_stress\": 99.0, \"max_strain\": 0.02, \"fracture_time\": 70.0, \"fracture_occurred\": false}'\n",
        );

        let oracle = CommandOracle::new(script.clone(), vec![]);
        let mut s = session(100.0);
        s.work_dir = dir.join("work");
        let metrics = oracle.run(s).unwrap();
        assert_eq!(metrics.max_stress, 99.0);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[cfg(unix)]
    #[test]
    fn failing_solver_reports_last_stderr_line() {
        let dir = std::env::temp_dir().join("sp_app_failing_solver");
        let _ = std::fs::remove_dir_all(&dir);
        let script = dir.join("solver.sh");
        write_script(&script, "#!/bin/sh\ncat > /dev/null\necho 'mesh generation error' >&2\nexit 3\n");

        let oracle = CommandOracle::new(script.clone(), vec![]);
        let mut s = session(150.0);
        s.work_dir = dir.join("work");
        let err = oracle.run(s).unwrap_err();
        assert!(err.message.ends_with("mesh generation error"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn session_serializes_for_external_programs() {
        let json = serde_json::to_value(session(250.0)).unwrap();
        assert_eq!(json["velocity"], 250.0);
        assert_eq!(json["job_name"], "SpallJob_v250");
        assert_eq!(json["params"]["time_period"], 0.0003);
    }
}
