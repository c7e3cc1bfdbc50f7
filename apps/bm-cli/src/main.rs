use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use bm_project::{ProjectError, compile, load_yaml, run_options};
use bm_sim::{RunProgress, SimError};

mod output;

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Project(#[from] ProjectError),

    #[error(transparent)]
    Sim(#[from] SimError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "bm-cli")]
#[command(about = "boxmodel CLI - compartmental mass-balance simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate scenario file syntax and structure
    Validate {
        /// Path to the scenario YAML file
        scenario_path: PathBuf,
    },
    /// Print the reservoir/flux graph as Graphviz DOT
    Graph {
        /// Path to the scenario YAML file
        scenario_path: PathBuf,
    },
    /// Run a scenario and print the masses table
    Run {
        /// Path to the scenario YAML file
        scenario_path: PathBuf,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Table)]
        format: Format,
        /// Also print per-flux histories
        #[arg(long)]
        fluxes: bool,
        /// Override run.t_start
        #[arg(long)]
        t_start: Option<f64>,
        /// Override run.t_end
        #[arg(long)]
        t_end: Option<f64>,
        /// Override run.t_step
        #[arg(long)]
        t_step: Option<f64>,
        /// Override run.progress_interval (0 disables progress output)
        #[arg(long)]
        progress: Option<usize>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Table,
    Csv,
    Json,
}

fn main() -> CliResult<()> {
    // Logs go to stderr so stdout stays machine readable
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { scenario_path } => cmd_validate(&scenario_path),
        Commands::Graph { scenario_path } => cmd_graph(&scenario_path),
        Commands::Run {
            scenario_path,
            format,
            fluxes,
            t_start,
            t_end,
            t_step,
            progress,
        } => cmd_run(
            &scenario_path,
            format,
            fluxes,
            RunOverrides {
                t_start,
                t_end,
                t_step,
                progress,
            },
        ),
    }
}

fn cmd_validate(scenario_path: &Path) -> CliResult<()> {
    println!("Validating scenario: {}", scenario_path.display());
    let scenario = load_yaml(scenario_path)?;
    println!("✓ Scenario '{}' is valid", scenario.name);
    println!("  Reservoirs: {}", scenario.reservoirs.len());
    println!("  Fluxes: {}", scenario.fluxes.len());
    Ok(())
}

fn cmd_graph(scenario_path: &Path) -> CliResult<()> {
    let scenario = load_yaml(scenario_path)?;
    let model = compile(&scenario)?;
    print!("{}", model.to_dot());
    Ok(())
}

struct RunOverrides {
    t_start: Option<f64>,
    t_end: Option<f64>,
    t_step: Option<f64>,
    progress: Option<usize>,
}

fn cmd_run(
    scenario_path: &Path,
    format: Format,
    fluxes: bool,
    overrides: RunOverrides,
) -> CliResult<()> {
    let scenario = load_yaml(scenario_path)?;
    let mut model = compile(&scenario)?;

    let mut opts = run_options(&scenario.run);
    if let Some(t_start) = overrides.t_start {
        opts.t_start = t_start;
    }
    if let Some(t_end) = overrides.t_end {
        opts.t_end = t_end;
    }
    if let Some(t_step) = overrides.t_step {
        opts.t_step = t_step;
    }
    if let Some(progress) = overrides.progress {
        opts.progress_interval = progress;
    }

    let start = Instant::now();
    let mut report = |p: RunProgress| eprintln!("{} / {} calculated", p.step, p.total);
    model.run_with_progress(&opts, Some(&mut report))?;
    let elapsed = start.elapsed().as_secs_f64();

    let Some(results) = model.results() else {
        return Ok(());
    };
    tracing::info!(rows = results.row_count(), elapsed_s = elapsed, "run complete");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        Format::Table => output::write_table(&mut out, &model, results, fluxes)?,
        Format::Csv => output::write_csv(&mut out, &model, results, fluxes)?,
        Format::Json => output::write_json(&mut out, &model, results, fluxes)?,
    }
    out.flush()?;
    Ok(())
}
