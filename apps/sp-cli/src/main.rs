use clap::{Args, Parser, Subcommand};
use sp_app::{
    AnalysisSummary, AppError, AppResult, CommandOracle, ExportOutcome, SimulationOracle,
    SweepProgress, SweepReport, SweepRequest, SweepStage, TableOracle, analyze,
    default_extraction_exporters, default_sweep_exporters, export_sweep, process_batch,
    process_output, run_sweep_with_progress,
};
use sp_core::Velocity;
use sp_project::{ExtractionConfig, load_extraction_config, load_study};
use sp_results::{OutcomeStore, RunStatus};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sp-cli")]
#[command(about = "SpallFlow CLI - spall fracture velocity sweeps and result reduction", long_about = None)]
struct Cli {
    /// Log level used when RUST_LOG is not set (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a velocity sweep described by a study file
    Sweep {
        /// Path to the study YAML/JSON file
        study_path: PathBuf,
        #[command(flatten)]
        oracle: OracleArgs,
        /// Output directory (overrides the study's output_dir)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Analyze the persisted outcomes of a (possibly interrupted) sweep
    Analyze {
        /// Sweep output directory
        output_dir: PathBuf,
    },
    /// Reduce one raw output file
    Reduce {
        /// Raw output JSON file
        raw_path: PathBuf,
        /// Study file whose extraction settings are used
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Output directory (defaults to `<raw stem>_extracted` next to the raw file)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Reduce several raw output files
    Batch {
        /// Raw output JSON files
        #[arg(required = true)]
        raw_paths: Vec<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Output directory (defaults to `results/batch_<timestamp>`)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct OracleArgs {
    /// External simulation program, run once per velocity
    #[arg(long, conflicts_with = "table")]
    solver: Option<PathBuf>,
    /// Extra argument for the simulation program (repeatable)
    #[arg(long = "solver-arg", requires = "solver", allow_hyphen_values = true)]
    solver_args: Vec<String>,
    /// Replay results from a YAML/JSON oracle table
    #[arg(long)]
    table: Option<PathBuf>,
}

fn main() -> AppResult<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        Commands::Sweep {
            study_path,
            oracle,
            output,
        } => cmd_sweep(&study_path, &oracle, output),
        Commands::Analyze { output_dir } => cmd_analyze(&output_dir),
        Commands::Reduce {
            raw_path,
            config,
            output,
        } => cmd_reduce(&raw_path, config.as_deref(), output),
        Commands::Batch {
            raw_paths,
            config,
            output,
        } => cmd_batch(&raw_paths, config.as_deref(), output),
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_oracle(args: &OracleArgs) -> AppResult<Box<dyn SimulationOracle>> {
    match (&args.solver, &args.table) {
        (Some(program), _) => Ok(Box::new(CommandOracle::new(program.clone(), args.solver_args.clone()))),
        (None, Some(table)) => Ok(Box::new(TableOracle::load(table)?)),
        (None, None) => Err(AppError::InvalidInput(
            "either --solver or --table is required".to_string(),
        )),
    }
}

fn cmd_sweep(study_path: &Path, oracle_args: &OracleArgs, output: Option<PathBuf>) -> AppResult<()> {
    let study = load_study(study_path)?;
    let request = SweepRequest {
        velocities: study.velocities()?,
        params: study.analysis_params()?,
        output_dir: output.or_else(|| study.output_dir.clone()),
    };
    let oracle = build_oracle(oracle_args)?;

    if let Some(name) = &study.name {
        println!("Study: {}", name);
    }
    println!(
        "Running velocity sweep: {} velocities ({} oracle)",
        request.velocities.len(),
        oracle.name()
    );

    let result = run_sweep_with_progress(
        &request,
        oracle.as_ref(),
        Some(&mut |event| render_sweep_progress(&event)),
    )?;

    println!("✓ Sweep finished in {:.1} s", result.elapsed_wall_s());
    let output_dir = result.output_dir().to_path_buf();
    println!("  Results: {}", output_dir.display());

    let report = SweepReport::new(result.into_outcomes());
    print_analysis(&report.analysis);
    let exports = export_sweep(&default_sweep_exporters(), &report, &output_dir);
    print_exports(&exports);
    Ok(())
}

fn render_sweep_progress(event: &SweepProgress) {
    match &event.stage {
        SweepStage::Starting => println!(
            "[{}/{}] v = {} m/s ...",
            event.index + 1,
            event.total,
            event.velocity
        ),
        SweepStage::Finished(RunStatus::Completed) => println!(
            "[{}/{}] v = {} m/s ✓ ({:.1} s elapsed)",
            event.index + 1,
            event.total,
            event.velocity,
            event.elapsed_wall_s
        ),
        SweepStage::Finished(RunStatus::Failed) => println!(
            "[{}/{}] v = {} m/s ✗ {}",
            event.index + 1,
            event.total,
            event.velocity,
            event.message.as_deref().unwrap_or("run failed")
        ),
    }
}

fn cmd_analyze(output_dir: &Path) -> AppResult<()> {
    let store = OutcomeStore::open(output_dir)?;
    let outcomes = store.list_outcomes()?;
    if outcomes.is_empty() {
        tracing::warn!(dir = %output_dir.display(), "no persisted outcomes found");
    }
    println!(
        "Loaded {} persisted outcomes from {}",
        outcomes.len(),
        output_dir.display()
    );

    let report = SweepReport::new(outcomes);
    print_analysis(&report.analysis);
    let exports = export_sweep(&default_sweep_exporters(), &report, output_dir);
    print_exports(&exports);
    Ok(())
}

fn print_analysis(summary: &AnalysisSummary) {
    println!();
    println!("=== THRESHOLD ANALYSIS ===");
    println!(
        "Velocities: {} ({} completed, {} failed)",
        summary.total_velocities, summary.successful_count, summary.failed_count
    );
    if !summary.has_data() {
        println!("No completed runs; no threshold can be determined");
        return;
    }
    match summary.critical_velocity {
        Some(v) => println!("Critical velocity: {} m/s", v),
        None => println!("Critical velocity: none (no fracture observed)"),
    }
    println!("Fracture at: {}", join_velocities(&summary.fracture_velocities));
    println!("No fracture at: {}", join_velocities(&summary.no_fracture_velocities));
    if let Some(range) = summary.stress_range {
        println!("Stress range: {:.1} - {:.1} MPa", range.min, range.max);
    }
}

fn join_velocities(velocities: &[Velocity]) -> String {
    if velocities.is_empty() {
        return "-".to_string();
    }
    velocities
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_exports(exports: &[ExportOutcome]) {
    for export in exports {
        match &export.result {
            Ok(files) => {
                for file in files {
                    println!("  Wrote {}", file.display());
                }
            }
            Err(e) => println!("  Skipped {}: {}", export.exporter, e),
        }
    }
}

fn extraction_config(config_path: Option<&Path>) -> AppResult<ExtractionConfig> {
    match config_path {
        Some(path) => Ok(load_extraction_config(path)?),
        None => Ok(ExtractionConfig::default()),
    }
}

fn cmd_reduce(raw_path: &Path, config_path: Option<&Path>, output: Option<PathBuf>) -> AppResult<()> {
    let config = extraction_config(config_path)?;
    let output_dir = output.unwrap_or_else(|| {
        let stem = raw_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "raw".to_string());
        raw_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(format!("{}_extracted", stem))
    });

    println!("Reducing raw output: {}", raw_path.display());
    let processed = process_output(raw_path, &config, &output_dir, &default_extraction_exporters())?;
    let stats = &processed.report.stats;
    println!("✓ Reduced in {:.2} s", processed.elapsed_s);
    println!("  Steps: {}", stats.num_steps);
    println!("  Frames: {}", stats.total_frames);
    println!("  Total time: {} s", stats.total_time);
    println!("  Max stress overall: {}", stats.max_stress_overall);
    println!("  Max strain overall: {}", stats.max_strain_overall);
    print_exports(&processed.exports);
    Ok(())
}

fn cmd_batch(raw_paths: &[PathBuf], config_path: Option<&Path>, output: Option<PathBuf>) -> AppResult<()> {
    let config = extraction_config(config_path)?;
    let output_dir = output.unwrap_or_else(|| {
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        PathBuf::from("results").join(format!("batch_{}", stamp))
    });

    println!("Batch reducing {} raw outputs", raw_paths.len());
    let summary = process_batch(raw_paths, &config, &output_dir, &default_extraction_exporters())?;
    for (i, entry) in summary.entries.iter().enumerate() {
        match &entry.result {
            Ok(file) => println!(
                "  [{}] ✓ {} ({} steps, {} frames)",
                i + 1,
                entry.source.display(),
                file.stats.num_steps,
                file.stats.total_frames
            ),
            Err(e) => println!("  [{}] ✗ {}: {}", i + 1, entry.source.display(), e),
        }
    }
    println!(
        "✓ Processed {}/{} files into {}",
        summary.succeeded(),
        summary.entries.len(),
        output_dir.display()
    );
    Ok(())
}
