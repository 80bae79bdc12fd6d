//! Plain-text sweep summary report.

use sp_core::Velocity;

use crate::types::{RunOutcome, RunOutcomeKind};

pub const SUMMARY_REPORT_FILE: &str = "summary_report.txt";

const RULE_WIDTH: usize = 50;

/// Render the sweep summary: header, one line per velocity, aggregate counts.
///
/// Line format per velocity:
/// `velocity=<v> | status=ok | maxStress=<s> | fracture=<yes|no>` or
/// `velocity=<v> | status=error | <message>`.
pub fn render_sweep_report(outcomes: &[RunOutcome], generated_at: &str) -> String {
    let mut out = String::new();
    out.push_str("=== SPALL FRACTURE SWEEP REPORT ===\n\n");
    out.push_str(&format!("Generated: {}\n", generated_at));
    out.push_str(&format!("Velocities: {}\n", outcomes.len()));

    let min = outcomes.iter().map(|o| o.velocity).min();
    let max = outcomes.iter().map(|o| o.velocity).max();
    if let (Some(min), Some(max)) = (min, max) {
        out.push_str(&format!("Velocity range: {} - {} m/s\n", min, max));
    }

    out.push_str("\nRESULTS BY VELOCITY:\n");
    out.push_str(&"-".repeat(RULE_WIDTH));
    out.push('\n');
    for outcome in outcomes {
        out.push_str(&velocity_line(outcome));
        out.push('\n');
    }
    out.push_str(&"-".repeat(RULE_WIDTH));
    out.push('\n');

    let completed = outcomes.iter().filter(|o| o.is_completed()).count();
    let fractured = outcomes
        .iter()
        .filter_map(|o| o.metrics())
        .filter(|m| m.fracture_occurred)
        .count();
    out.push_str(&format!("Completed: {}\n", completed));
    out.push_str(&format!("Failed: {}\n", outcomes.len() - completed));
    out.push_str(&format!("Fracture observed: {}\n", fractured));
    out
}

fn velocity_line(outcome: &RunOutcome) -> String {
    let v: Velocity = outcome.velocity;
    match &outcome.kind {
        RunOutcomeKind::Completed(m) => format!(
            "velocity={} | status=ok | maxStress={:.1} | fracture={}",
            v,
            m.max_stress,
            if m.fracture_occurred { "yes" } else { "no" }
        ),
        RunOutcomeKind::Failed { error } => {
            format!("velocity={} | status=error | {}", v, error)
        }
    }
}
