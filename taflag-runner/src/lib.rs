//! taflag runner: bar loading, configuration, analysis runs, export.
//!
//! This crate builds on `taflag-core` to provide:
//! - CSV ingest with flexible timestamps, cleaning, and a synthetic fallback
//! - TOML configuration with content-addressed run ids
//! - The analysis runner and per-indicator trade summaries
//! - JSON/CSV artifact export and CSV inspection

pub mod config;
pub mod data_loader;
pub mod export;
pub mod metrics;
pub mod runner;

pub use config::{AnalysisConfig, ConfigError, OutputFormat, RunId};
pub use data_loader::{
    generate_synthetic_bars, inspect_csv, load_csv, load_csv_from_reader, CsvInspection,
    LoadError, LoadedBars,
};
pub use export::{save_artifacts, summary_table};
pub use metrics::{RunSummary, TradeSummary};
pub use runner::{run_analysis, run_analysis_from_config, AnalysisRun, RunError, SCHEMA_VERSION};
