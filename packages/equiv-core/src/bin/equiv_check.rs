/*
 * equiv-check: Regression verification CLI
 *
 * Usage:
 *   equiv-check check --trace trace.json --benchmark Ell/sqrt [--config equiv.yaml] [--db results.db]
 *   equiv-check results artifacts/Ell/sqrt/CEGAR/results.txt --benchmark Ell/sqrt --tool CEGAR
 *
 * `check` replays a recorded exploration trace through the CEGAR loop with
 * z3 as the decision procedure. `results` classifies the iterations of an
 * existing results file.
 */

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use equiv_core::features::classification::{read_iterations, ResultsFile};
use equiv_core::features::refinement::{CegarController, RunRequest, TraceSource};
use equiv_core::features::solver::{FsQueryRecorder, Z3ProcessSolver};
use equiv_core::{EquivConfig, EquivError, EquivalenceOracle, Result};
use equiv_storage::{ResultStore, SqliteResultStore};

#[derive(Parser)]
#[command(name = "equiv-check")]
#[command(about = "Regression verification with abstraction refinement")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the refinement loop on a recorded exploration trace
    Check {
        /// Exploration trace (JSON)
        #[arg(long)]
        trace: PathBuf,

        /// Benchmark name used as record key
        #[arg(long)]
        benchmark: String,

        /// YAML configuration (version 1)
        #[arg(long)]
        config: Option<PathBuf>,

        /// SQLite result database
        #[arg(long, default_value = "results.db")]
        db: PathBuf,

        /// Program under analysis; missing files end the run as BASE_TOOL_MISSING
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Classify the iterations of a results file
    Results {
        /// results.txt written by a previous run or a base tool
        file: PathBuf,

        #[arg(long)]
        benchmark: String,

        #[arg(long, default_value = "CEGAR")]
        tool: String,

        /// Error output of the run, if any
        #[arg(long, default_value = "")]
        errors: String,

        /// The run hit its timeout
        #[arg(long)]
        timed_out: bool,
    },
}

/// How long shutdown waits for cancelled solver processes to exit
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "equiv_core=debug,info"
    } else {
        "equiv_core=info,warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "failed to start the async runtime");
            return ExitCode::FAILURE;
        }
    };

    let outcome = runtime.block_on(async {
        match cli.command {
            Commands::Check {
                trace,
                benchmark,
                config,
                db,
                input,
            } => cmd_check(trace, benchmark, config, db, input).await,
            Commands::Results {
                file,
                benchmark,
                tool,
                errors,
                timed_out,
            } => cmd_results(file, &benchmark, &tool, &errors, timed_out),
        }
    });

    // a partition batch detached by the watchdog must not hold the process
    runtime.shutdown_timeout(SHUTDOWN_GRACE);

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "equiv-check failed");
            ExitCode::FAILURE
        }
    }
}

async fn cmd_check(
    trace: PathBuf,
    benchmark: String,
    config: Option<PathBuf>,
    db: PathBuf,
    input: Option<PathBuf>,
) -> Result<()> {
    let config = match config {
        Some(path) => EquivConfig::from_yaml(&path)?,
        None => EquivConfig::default(),
    };
    let tool = config.tool_label();

    let solver = Z3ProcessSolver::new(config.solver.binary.clone(), config.solver.timeout());
    if !solver.is_available() {
        return Err(EquivError::solver(format!(
            "'{}' is not executable",
            config.solver.binary
        )));
    }
    let recorder = FsQueryRecorder::new(config.run.artifacts_dir.join(&benchmark).join(&tool));
    let oracle = EquivalenceOracle::new(
        Arc::new(solver),
        Arc::new(recorder),
        config.solver.timeout(),
    );

    let store: Arc<dyn ResultStore> = Arc::new(SqliteResultStore::new(&db)?);
    let mut source = TraceSource::from_path(&trace)?;
    let mut instrumentation = source.instrumentation();

    let mut request = RunRequest::new(benchmark);
    request.input_file = input;

    let controller = CegarController::new(config, oracle, store);
    let outcome = controller
        .run(&request, &mut instrumentation, &mut source)
        .await?;

    info!(db = %db.display(), "Records written");
    println!(
        "{} {} {} ({} iterations, {})",
        outcome.run.benchmark,
        outcome.run.tool,
        outcome.classification(),
        outcome.iterations.len(),
        outcome.stop_reason
    );
    Ok(())
}

fn cmd_results(
    file: PathBuf,
    benchmark: &str,
    tool: &str,
    errors: &str,
    timed_out: bool,
) -> Result<()> {
    let file = ResultsFile::new(file);
    // depth status is unknown for external base tools
    let iterations = read_iterations(&file, benchmark, tool, errors, timed_out, |_| None)?;
    for it in &iterations {
        let classification = it
            .result
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("iteration {}: {}", it.iteration, classification);
    }
    Ok(())
}
