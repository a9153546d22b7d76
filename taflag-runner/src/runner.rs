//! Analysis runner: wires together loading, the core pipeline, and metrics.
//!
//! Two entry points:
//! - `run_analysis()`: takes pre-loaded bars. No I/O.
//! - `run_analysis_from_config()`: loads the CSV named in the config, then runs.

use serde::Serialize;
use taflag_core::engine::PipelineError;
use taflag_core::{run_pipeline, AnalysisReport};
use thiserror::Error;
use tracing::info;

use crate::config::{AnalysisConfig, ConfigError, RunId};
use crate::data_loader::{load_csv, LoadError, LoadedBars};
use crate::metrics::RunSummary;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("analysis error: {0}")]
    Pipeline(#[from] PipelineError),
    #[error("no input: set [data].path in the config or pass --input")]
    NoInput,
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of one analysis.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRun {
    pub schema_version: u32,
    pub run_id: RunId,
    pub dataset_hash: String,
    pub bar_count: usize,
    pub rows_dropped: usize,
    pub duplicates_removed: usize,
    pub summary: RunSummary,
    pub report: AnalysisReport,
}

/// Run the analysis over pre-loaded bars.
pub fn run_analysis(config: &AnalysisConfig, loaded: &LoadedBars) -> Result<AnalysisRun, RunError> {
    config.validate()?;
    let run_id = config.run_id();
    info!(run_id = %&run_id[..12], bars = loaded.bars.len(), "running analysis");

    let report = run_pipeline(&loaded.bars, &config.pipeline_config())?;
    let summary = RunSummary::compute(
        &report.trades,
        report.indicator_data.len(),
        report.unresolved_positions.len(),
    );

    info!(
        signals = summary.signal_count,
        trades = summary.overall.trade_count,
        total_profit = summary.overall.total_profit,
        "analysis complete"
    );

    Ok(AnalysisRun {
        schema_version: SCHEMA_VERSION,
        run_id,
        dataset_hash: loaded.dataset_hash.clone(),
        bar_count: loaded.bars.len(),
        rows_dropped: loaded.rows_dropped,
        duplicates_removed: loaded.duplicates_removed,
        summary,
        report,
    })
}

/// Load the CSV named by `[data].path` and run the analysis.
pub fn run_analysis_from_config(config: &AnalysisConfig) -> Result<AnalysisRun, RunError> {
    let path = config.data.path.as_deref().ok_or(RunError::NoInput)?;
    let loaded = load_csv(path)?;
    run_analysis(config, &loaded)
}
