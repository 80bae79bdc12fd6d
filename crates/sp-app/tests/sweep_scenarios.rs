//! End-to-end sweep behavior against scripted oracles.

use proptest::prelude::*;
use sp_app::*;
use sp_core::Velocity;
use sp_project::AnalysisParams;
use sp_results::{OutcomeStore, RunMetrics, RunStatus, SUMMARY_REPORT_FILE};
use std::cell::RefCell;
use std::path::PathBuf;

fn v(x: f64) -> Velocity {
    Velocity::new(x).unwrap()
}

fn velocities(xs: &[f64]) -> Vec<Velocity> {
    xs.iter().map(|&x| v(x)).collect()
}

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(name);
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

/// Fractures above 200 m/s; stress grows linearly with velocity.
fn threshold_metrics(session: &RunSession) -> Result<RunMetrics, OracleFailure> {
    let mps = session.velocity.mps();
    Ok(RunMetrics {
        max_stress: mps * 3.0,
        max_strain: mps / 10_000.0,
        fracture_time: 120.0 - mps / 10.0,
        fracture_occurred: mps > 200.0,
    })
}

fn request(xs: &[f64], dir: &PathBuf) -> SweepRequest {
    SweepRequest {
        velocities: velocities(xs),
        params: AnalysisParams::default(),
        output_dir: Some(dir.clone()),
    }
}

#[test]
fn fracture_threshold_sweep() {
    let dir = temp_dir("sp_app_threshold_sweep");
    let oracle = FnOracle::new("scripted", threshold_metrics);
    let result = run_sweep(&request(&[100.0, 150.0, 200.0, 250.0, 300.0], &dir), &oracle).unwrap();

    assert_eq!(result.outcomes().len(), 5);
    assert_eq!(result.completed_count(), 5);

    let summary = analyze(result.outcomes());
    assert_eq!(summary.critical_velocity, Some(v(250.0)));
    assert_eq!(summary.fracture_velocities, velocities(&[250.0, 300.0]));
    assert_eq!(summary.no_fracture_velocities, velocities(&[100.0, 150.0, 200.0]));
    assert_eq!(summary.stress_range.unwrap().min, 300.0);
    assert_eq!(summary.stress_range.unwrap().max, 900.0);

    // every outcome persisted, plus manifest and report
    let store = OutcomeStore::open(&dir).unwrap();
    assert_eq!(store.list_outcomes().unwrap(), result.outcomes().to_vec());
    assert!(dir.join("sweep.json").exists());
    let report = std::fs::read_to_string(dir.join(SUMMARY_REPORT_FILE)).unwrap();
    assert!(report.contains("velocity=250 | status=ok | maxStress=750.0 | fracture=yes"));
    assert!(report.contains("velocity=200 | status=ok | maxStress=600.0 | fracture=no"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn failed_run_is_recorded_and_sweep_continues() {
    let dir = temp_dir("sp_app_failed_run");
    let oracle = FnOracle::new("scripted", |session: &RunSession| {
        if session.velocity == Velocity::new(150.0).unwrap() {
            Err(OracleFailure::new("mesh generation error"))
        } else {
            threshold_metrics(session)
        }
    });
    let result = run_sweep(&request(&[100.0, 150.0, 200.0, 250.0, 300.0], &dir), &oracle).unwrap();

    let failed = &result.outcomes()[1];
    assert_eq!(failed.velocity, v(150.0));
    assert_eq!(failed.status(), RunStatus::Failed);
    assert_eq!(failed.error_message(), Some("mesh generation error"));
    assert_eq!(failed.job_name, "SpallJob_v150");

    let summary = analyze(result.outcomes());
    assert_eq!(summary.failed_count, 1);
    assert_eq!(summary.successful_count, 4);
    assert!(!summary.fracture_velocities.contains(&v(150.0)));
    assert!(!summary.no_fracture_velocities.contains(&v(150.0)));

    let report = std::fs::read_to_string(dir.join(SUMMARY_REPORT_FILE)).unwrap();
    assert!(report.contains("velocity=150 | status=error | mesh generation error"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn all_runs_failing_yields_no_data() {
    let dir = temp_dir("sp_app_all_failed");
    let oracle = FnOracle::new("broken", |_: &RunSession| Err(OracleFailure::new("solver crashed")));
    let result = run_sweep(&request(&[100.0, 200.0], &dir), &oracle).unwrap();

    assert_eq!(result.failed_count(), 2);
    let summary = analyze(result.outcomes());
    assert!(!summary.has_data());
    assert_eq!(summary.critical_velocity, None);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn persistence_failures_keep_outcomes_in_memory() {
    let dir = temp_dir("sp_app_persist_failure");
    std::fs::create_dir_all(&dir).unwrap();
    // a plain file where the 200 m/s record directory would go
    std::fs::write(dir.join("velocity_200"), "occupied").unwrap();
    // a directory where the summary report file would go
    std::fs::create_dir_all(dir.join(SUMMARY_REPORT_FILE)).unwrap();

    let oracle = FnOracle::new("scripted", threshold_metrics);
    let result = run_sweep(&request(&[100.0, 200.0, 300.0], &dir), &oracle).unwrap();

    let swept: Vec<Velocity> = result.outcomes().iter().map(|o| o.velocity).collect();
    assert_eq!(swept, velocities(&[100.0, 200.0, 300.0]));
    assert!(result.outcomes().iter().all(|o| o.is_completed()));
    assert_eq!(result.outcomes()[1].metrics().unwrap().max_stress, 600.0);

    assert!(dir.join("velocity_200").is_file());
    assert!(dir.join(SUMMARY_REPORT_FILE).is_dir());

    let store = OutcomeStore::open(&dir).unwrap();
    let persisted: Vec<Velocity> = store
        .list_outcomes()
        .unwrap()
        .iter()
        .map(|o| o.velocity)
        .collect();
    assert_eq!(persisted, velocities(&[100.0, 300.0]));

    let analysis = analyze(result.outcomes());
    assert_eq!(analysis.critical_velocity, Some(v(300.0)));

    let _ = std::fs::remove_dir_all(&dir);
}

struct OfflineOracle {
    calls: RefCell<usize>,
}

impl SimulationOracle for OfflineOracle {
    fn name(&self) -> &str {
        "offline"
    }

    fn check_available(&self) -> Result<(), String> {
        Err("solver license server unreachable".to_string())
    }

    fn run(&self, _session: RunSession) -> Result<RunMetrics, OracleFailure> {
        *self.calls.borrow_mut() += 1;
        Err(OracleFailure::new("should never run"))
    }
}

#[test]
fn unavailable_oracle_aborts_before_any_run() {
    let dir = temp_dir("sp_app_offline");
    let oracle = OfflineOracle {
        calls: RefCell::new(0),
    };
    let err = run_sweep(&request(&[100.0, 200.0], &dir), &oracle).unwrap_err();

    assert!(matches!(err, AppError::InfrastructureUnavailable { .. }));
    assert_eq!(*oracle.calls.borrow(), 0);
    assert!(!dir.exists());
}

#[test]
fn empty_velocity_list_is_rejected() {
    let dir = temp_dir("sp_app_empty_sweep");
    let oracle = FnOracle::new("scripted", threshold_metrics);
    let err = run_sweep(&request(&[], &dir), &oracle).unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
}

#[test]
fn sessions_carry_sweep_position_and_params() {
    let dir = temp_dir("sp_app_sessions");
    let seen = RefCell::new(Vec::new());
    let oracle = FnOracle::new("recording", |session: &RunSession| {
        seen.borrow_mut().push((
            session.index,
            session.total,
            session.job_name.clone(),
            session.work_dir.clone(),
        ));
        threshold_metrics(session)
    });
    let mut params = AnalysisParams::default();
    params.contact_friction = 0.25;
    let req = SweepRequest {
        velocities: velocities(&[300.0, 120.5]),
        params: params.clone(),
        output_dir: Some(dir.clone()),
    };
    let result = run_sweep(&req, &oracle).unwrap();

    assert_eq!(result.params(), &params);
    let seen = seen.into_inner();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0], (0, 2, "SpallJob_v300".to_string(), dir.join("velocity_300")));
    assert_eq!(seen[1], (1, 2, "SpallJob_v120".to_string(), dir.join("velocity_120.5")));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn progress_events_bracket_each_run() {
    let dir = temp_dir("sp_app_progress");
    let oracle = FnOracle::new("scripted", threshold_metrics);
    let mut events = Vec::new();
    let mut cb = |event: SweepProgress| events.push((event.index, event.stage));
    run_sweep_with_progress(&request(&[100.0, 250.0], &dir), &oracle, Some(&mut cb)).unwrap();

    assert_eq!(
        events,
        vec![
            (0, SweepStage::Starting),
            (0, SweepStage::Finished(RunStatus::Completed)),
            (1, SweepStage::Starting),
            (1, SweepStage::Finished(RunStatus::Completed)),
        ]
    );

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn table_oracle_loads_from_yaml() {
    let dir = temp_dir("sp_app_table_yaml");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("table.yaml");
    std::fs::write(
        &path,
        r#"
entries:
  - velocity: 100
    metrics:
      max_stress: 210.0
      max_strain: 0.01
      fracture_time: 95.0
      fracture_occurred: false
  - velocity: 150
    error: mesh generation error
"#,
    )
    .unwrap();

    let oracle = TableOracle::load(&path).unwrap();
    let out_dir = dir.join("sweep");
    let result = run_sweep(&request(&[100.0, 150.0], &out_dir), &oracle).unwrap();
    assert!(result.outcomes()[0].is_completed());
    assert_eq!(result.outcomes()[1].error_message(), Some("mesh generation error"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn sweep_report_exports_csv() {
    let dir = temp_dir("sp_app_sweep_export");
    let oracle = FnOracle::new("scripted", threshold_metrics);
    let result = run_sweep(&request(&[100.0, 250.0], &dir), &oracle).unwrap();

    let report = SweepReport::new(result.outcomes().to_vec());
    let exports = export_sweep(&default_sweep_exporters(), &report, result.output_dir());
    assert!(exports.iter().all(|e| e.is_ok()));

    let csv = std::fs::read_to_string(dir.join("spall_fracture_results.csv")).unwrap();
    assert_eq!(csv.lines().count(), 3);
    let analysis: AnalysisSummary =
        serde_json::from_str(&std::fs::read_to_string(dir.join("threshold_analysis.json")).unwrap())
            .unwrap();
    assert_eq!(analysis.critical_velocity, Some(v(250.0)));

    let _ = std::fs::remove_dir_all(&dir);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn one_outcome_per_velocity_in_order(
        xs in prop::collection::vec(1.0f64..2000.0, 1..12),
        fail_mask in prop::collection::vec(any::<bool>(), 12),
    ) {
        let dir = temp_dir("sp_app_prop_sweep");
        let requested = velocities(&xs);
        let oracle = FnOracle::new("scripted", |session: &RunSession| {
            if fail_mask[session.index] {
                Err(OracleFailure::new("scripted failure"))
            } else {
                threshold_metrics(session)
            }
        });
        let result = run_sweep(&request(&xs, &dir), &oracle).unwrap();

        prop_assert_eq!(result.outcomes().len(), requested.len());
        for (outcome, velocity) in result.outcomes().iter().zip(&requested) {
            prop_assert_eq!(outcome.velocity, *velocity);
        }

        let summary = analyze(result.outcomes());
        prop_assert_eq!(summary.successful_count + summary.failed_count, requested.len());
        match summary.critical_velocity {
            Some(critical) => {
                prop_assert!(requested.contains(&critical));
                prop_assert_eq!(Some(&critical), summary.fracture_velocities.iter().min());
            }
            None => prop_assert!(summary.fracture_velocities.is_empty()),
        }

        let _ = std::fs::remove_dir_all(&dir);
    }
}
