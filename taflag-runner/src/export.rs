//! Artifact export: JSON report, CSV tables, and a plain-text summary.
//!
//! A run directory holds:
//! - `report.json`: the full `AnalysisRun` (JSON formats)
//! - `trades.csv`, `signals.csv`, `bars.csv` (CSV formats)
//!
//! Undefined values are `null` in JSON and an empty cell in CSV.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use taflag_core::domain::{format_timestamp, ClosedTrade, IndicatorName, SignalEvent};
use taflag_core::engine::BarRecord;

use crate::config::OutputFormat;
use crate::metrics::RunSummary;
use crate::runner::AnalysisRun;

fn cell(value: Option<f64>) -> String {
    value.filter(|v| v.is_finite()).map(|v| v.to_string()).unwrap_or_default()
}

fn join_names(names: &[IndicatorName]) -> String {
    names.iter().map(IndicatorName::as_str).collect::<Vec<_>>().join("|")
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String> {
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize an `AnalysisRun` to pretty JSON.
pub fn export_json(run: &AnalysisRun) -> Result<String> {
    serde_json::to_string_pretty(run).context("failed to serialize AnalysisRun to JSON")
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Columns: indicator, entry_date, entry_price, exit_date, exit_price,
/// profit, bars_held, contributing_indicators
pub fn export_trades_csv(trades: &[ClosedTrade]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "indicator",
        "entry_date",
        "entry_price",
        "exit_date",
        "exit_price",
        "profit",
        "bars_held",
        "contributing_indicators",
    ])?;
    for t in trades {
        wtr.write_record([
            t.indicator.as_str().to_string(),
            format_timestamp(&t.entry_timestamp),
            t.entry_price.to_string(),
            format_timestamp(&t.exit_timestamp),
            t.exit_price.to_string(),
            cell(t.profit),
            t.bars_held.to_string(),
            join_names(&t.contributing_indicators),
        ])?;
    }
    finish(wtr)
}

/// Columns: date, indicator, action, price, value
pub fn export_signals_csv(events: &[SignalEvent]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "indicator", "action", "price", "value"])?;
    for e in events {
        wtr.write_record([
            format_timestamp(&e.timestamp),
            e.indicator.as_str().to_string(),
            e.action.as_str().to_string(),
            e.price.to_string(),
            cell(Some(e.value)),
        ])?;
    }
    finish(wtr)
}

const BAR_COLUMNS: [&str; 27] = [
    "date",
    "open",
    "high",
    "low",
    "close",
    "volume",
    "sma_fast",
    "sma_slow",
    "ema",
    "rsi",
    "macd",
    "macd_signal",
    "macd_histogram",
    "bb_lower",
    "bb_middle",
    "bb_upper",
    "stoch_k",
    "stoch_d",
    "ichimoku_conversion",
    "ichimoku_base",
    "ichimoku_span_a",
    "ichimoku_span_b",
    "cci",
    "adx",
    "plus_di",
    "minus_di",
    "williams_r",
];

/// Bars with every indicator column.
pub fn export_bars_csv(records: &[BarRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(BAR_COLUMNS)?;
    for r in records {
        let s = &r.indicators;
        let row = [
            format_timestamp(&r.date),
            r.open.to_string(),
            r.high.to_string(),
            r.low.to_string(),
            r.close.to_string(),
            r.volume.to_string(),
            cell(s.sma_fast),
            cell(s.sma_slow),
            cell(s.ema),
            cell(s.rsi),
            cell(s.macd),
            cell(s.macd_signal),
            cell(s.macd_histogram),
            cell(s.bb_lower),
            cell(s.bb_middle),
            cell(s.bb_upper),
            cell(s.stoch_k),
            cell(s.stoch_d),
            cell(s.ichimoku_conversion),
            cell(s.ichimoku_base),
            cell(s.ichimoku_span_a),
            cell(s.ichimoku_span_b),
            cell(s.cci),
            cell(s.adx),
            cell(s.plus_di),
            cell(s.minus_di),
            cell(s.williams_r),
        ];
        wtr.write_record(&row)?;
    }
    finish(wtr)
}

// ─── Artifact directory ─────────────────────────────────────────────

/// Write the run's artifacts under `output_dir/<run id>_<dataset hash>`.
///
/// Returns the run directory. Same config and data always map to the same
/// directory, so re-running overwrites.
pub fn save_artifacts(run: &AnalysisRun, output_dir: &Path, format: OutputFormat) -> Result<PathBuf> {
    let dirname = format!(
        "{}_{}",
        run.run_id.get(..12).unwrap_or(run.run_id.as_str()),
        run.dataset_hash.get(..12).unwrap_or(run.dataset_hash.as_str())
    );
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let write = |name: &str, content: String| -> Result<()> {
        let path = run_dir.join(name);
        std::fs::write(&path, content).with_context(|| format!("failed to write {}", path.display()))
    };

    if format.writes_json() {
        write("report.json", export_json(run)?)?;
    }
    if format.writes_csv() {
        write("trades.csv", export_trades_csv(&run.report.trades)?)?;
        write("signals.csv", export_signals_csv(&run.report.indicator_data)?)?;
        write("bars.csv", export_bars_csv(&run.report.data)?)?;
    }

    Ok(run_dir)
}

// ─── Text summary ───────────────────────────────────────────────────

/// Fixed-width per-indicator trade table with an overall row.
pub fn summary_table(summary: &RunSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<10} {:>6} {:>5} {:>5} {:>9} {:>12} {:>10}",
        "indicator", "trades", "wins", "loss", "win rate", "total profit", "avg profit"
    );
    let rows = summary
        .by_indicator
        .iter()
        .map(|(name, s)| (name.as_str(), s))
        .chain(std::iter::once(("overall", &summary.overall)));
    for (label, s) in rows {
        let _ = writeln!(
            out,
            "{:<10} {:>6} {:>5} {:>5} {:>8.1}% {:>12.4} {:>10.4}",
            label,
            s.trade_count,
            s.winners,
            s.losers,
            s.win_rate * 100.0,
            s.total_profit,
            s.average_profit
        );
    }
    let _ = writeln!(
        out,
        "signals: {}  unresolved positions: {}",
        summary.signal_count, summary.unresolved_count
    );
    out
}
