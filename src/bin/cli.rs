use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use firmware_matrix::prelude::*;
use firmware_matrix::report::rotating::{RotatingFile, DEFAULT_BACKUPS, DEFAULT_MAX_BYTES};
use firmware_matrix::EngineError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const LOG_FILE_NAME: &str = "firmware-matrix.log";

#[derive(Parser)]
#[command(name = "firmware-matrix")]
#[command(about = "Create a Bastard Keyboards firmware release", long_about = None)]
#[command(version)]
struct Cli {
    /// Don't actually build, just show the commands to be run
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Parallel option to pass to qmk compile
    #[arg(short = 'j', long, default_value_t = 1)]
    parallel: usize,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// The bare QMK repository to work with (default: current directory)
    #[arg(short, long, value_name = "DIR")]
    repository: Option<PathBuf>,

    /// The output directory in which to copy the artifacts (default: current directory)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Build matrix YAML file to use instead of the built-in release
    #[arg(short, long, value_name = "FILE")]
    matrix: Option<PathBuf>,

    /// Only build keyboards whose name starts with this prefix
    #[arg(short = 'F', long, value_name = "PREFIX")]
    filter: Option<String>,

    /// qmk executable
    #[arg(long, value_name = "PROGRAM", default_value = "qmk")]
    qmk: String,

    /// Directory of the Via definition files, relative to the repository
    #[arg(long, value_name = "DIR", default_value = "main/via")]
    assets_dir: PathBuf,

    /// Print the firmwares that would be built and exit
    #[arg(long)]
    list: bool,

    /// Log file (default: ./firmware-matrix.log, rotated at 1 MiB)
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

fn init_tracing(log_file: &Path) -> anyhow::Result<()> {
    let writer = RotatingFile::open(log_file, DEFAULT_MAX_BYTES, DEFAULT_BACKUPS)
        .with_context(|| format!("Cannot open log file {}", log_file.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("firmware_matrix=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(writer)),
        )
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_file = cli
        .log_file
        .clone()
        .unwrap_or_else(|| PathBuf::from(LOG_FILE_NAME));
    if let Err(e) = init_tracing(&log_file) {
        eprintln!("warning: {e:#}");
    }

    let reporter = ConsoleReporter::new(cli.verbose);
    match run(cli, &reporter).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // The engine reports its own fatal conditions.
            if e.downcast_ref::<EngineError>().is_none() {
                reporter.error(&format!("{e:#}"));
            }
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli, reporter: &ConsoleReporter) -> anyhow::Result<()> {
    let matrix = match &cli.matrix {
        Some(path) => MatrixLoader::load_file(path)?,
        None => bastardkb_release(),
    };
    let matrix = match &cli.filter {
        Some(prefix) => matrix.filter_keyboards(prefix),
        None => matrix,
    };

    if cli.list {
        print_matrix(&matrix);
        return Ok(());
    }

    let cwd = std::env::current_dir().context("Cannot determine the working directory")?;
    let repository = cli.repository.unwrap_or_else(|| cwd.clone());
    let output_dir = cli.output_dir.unwrap_or(cwd);

    let stop = StopSignal::new();
    tokio::spawn({
        let stop = stop.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Received interrupt");
                stop.stop();
            }
        }
    });

    let logs = LogDir::create().context("Cannot create the log directory")?;
    reporter.debug(&format!("Saving logs in: {}", logs.root().display()));

    let git = GitWorktrees::open(&repository, logs.clone(), cli.dry_run)
        .context("Failed to initialize QMK repository")?
        .stop_signal(stop.clone());

    std::fs::create_dir_all(&output_dir).with_context(|| {
        format!(
            "Cannot create output directory {}",
            output_dir.display()
        )
    })?;

    if !cli.dry_run && which::which(&cli.qmk).is_err() {
        reporter.warn(&format!(
            "{} not found in PATH, every build will fail",
            cli.qmk
        ));
    }

    let qmk = QmkCompiler::new(
        QmkOptions {
            program: cli.qmk,
            parallel: cli.parallel,
            dry_run: cli.dry_run,
        },
        logs,
    )
    .stop_signal(stop.clone());

    MatrixRunner::new(&git, &qmk, reporter)
        .cancellation(stop)
        .run(&matrix, |artifact| {
            place_artifact(reporter, &output_dir, artifact);
        })
        .await?;

    copy_companion_assets(
        reporter,
        &output_dir,
        git.repository(),
        &AssetOptions {
            source_dir: cli.assets_dir,
            dry_run: cli.dry_run,
            ..Default::default()
        },
    );

    Ok(())
}

fn print_matrix(matrix: &BuildMatrix) {
    for batch in &matrix.batches {
        println!("{} ({} firmwares)", batch.branch, batch.len());
        for firmware in &batch.firmwares {
            if firmware.env.is_empty() {
                println!("  {} -> {}", firmware, firmware.artifact_base_name());
            } else {
                println!(
                    "  {} -> {} [{}]",
                    firmware,
                    firmware.artifact_base_name(),
                    firmware.env.join(" ")
                );
            }
        }
    }
    println!(
        "\n{} firmwares in {} batches",
        matrix.total_firmwares(),
        matrix.batches.len()
    );
}
