//! taflag CLI: analyze bar series and inspect CSV files.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use taflag_runner::{
    generate_synthetic_bars, inspect_csv, load_csv, run_analysis, save_artifacts, summary_table,
    AnalysisConfig, LoadedBars, OutputFormat,
};

#[derive(Parser)]
#[command(name = "taflag", about = "Technical-indicator signal flagging and trade matching")]
struct Cli {
    /// Log filter (overrides RUST_LOG), e.g. "debug" or "taflag_core=trace".
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute indicators, flag signals, and match trades over a bar series
    Analyze {
        /// CSV file with date/open/high/low/close/volume columns
        #[arg(long)]
        input: Option<PathBuf>,

        /// Path to a TOML analysis config
        #[arg(long)]
        config: Option<PathBuf>,

        /// Generate N synthetic bars instead of reading a CSV
        #[arg(long, conflicts_with = "input")]
        synthetic: Option<usize>,

        /// Seed for synthetic bars
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Output directory for artifacts (overrides the config)
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Artifact format: json, csv or both (overrides the config)
        #[arg(long)]
        format: Option<OutputFormat>,

        /// Also print the report JSON to stdout
        #[arg(long)]
        stdout: bool,
    },
    /// Show the first lines, columns, and inferred types of a CSV file
    Inspect {
        /// CSV file to inspect
        #[arg(long)]
        input: PathBuf,

        /// Number of sample rows
        #[arg(long, default_value = "5")]
        rows: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    match cli.command {
        Commands::Analyze {
            input,
            config,
            synthetic,
            seed,
            output_dir,
            format,
            stdout,
        } => run_analyze(input, config, synthetic, seed, output_dir, format, stdout),
        Commands::Inspect { input, rows } => run_inspect(input, rows),
    }
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[allow(clippy::too_many_arguments)]
fn run_analyze(
    input: Option<PathBuf>,
    config_path: Option<PathBuf>,
    synthetic: Option<usize>,
    seed: u64,
    output_dir: Option<PathBuf>,
    format: Option<OutputFormat>,
    stdout: bool,
) -> Result<()> {
    let mut config = match &config_path {
        Some(path) => AnalysisConfig::from_file(path)?,
        None => AnalysisConfig::default(),
    };
    if let Some(path) = input {
        config.data.path = Some(path);
    }
    if let Some(dir) = output_dir {
        config.output.dir = dir;
    }
    if let Some(format) = format {
        config.output.format = format;
    }

    let loaded = match (synthetic, config.data.path.as_deref()) {
        (Some(count), _) => {
            info!(count, seed, "using synthetic bars");
            LoadedBars::from_bars(generate_synthetic_bars(count, seed))
        }
        (None, Some(path)) => {
            load_csv(path).with_context(|| format!("loading {}", path.display()))?
        }
        (None, None) => bail!("one of --input, --synthetic, or [data].path in --config is required"),
    };

    let run = run_analysis(&config, &loaded)?;

    eprintln!("{}", summary_table(&run.summary));

    let run_dir = save_artifacts(&run, &config.output.dir, config.output.format)?;
    eprintln!("Artifacts saved to: {}", run_dir.display());

    if stdout {
        println!("{}", serde_json::to_string_pretty(&run.report)?);
    }

    Ok(())
}

fn run_inspect(input: PathBuf, rows: usize) -> Result<()> {
    let inspection = inspect_csv(&input, rows)?;
    println!("{}", serde_json::to_string_pretty(&inspection)?);
    Ok(())
}
