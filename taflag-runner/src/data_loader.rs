//! Bar Series Provider: CSV ingest, cleaning, and synthetic series.
//!
//! The loader hands the engine a series it can trust:
//! 1. Header columns are matched case-insensitively (`date` + OHLCV required)
//! 2. Rows whose timestamp matches no known format are dropped and counted
//! 3. A bad numeric value in an otherwise valid row is fatal
//! 4. Rows are sorted by timestamp; duplicate timestamps keep the first row
//! 5. An empty result is an error, never an empty series
//!
//! Synthetic data is a developer-only mode for running without a file.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use taflag_core::domain::Bar;
use thiserror::Error;
use tracing::{info, warn};

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("required column '{0}' is missing from the CSV header")]
    MissingColumn(&'static str),

    #[error("row {row}: invalid {column} value '{value}'")]
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("no rows left after cleaning ({rows_read} read, {rows_dropped} with unparseable dates)")]
    EmptyAfterCleaning { rows_read: usize, rows_dropped: usize },
}

/// A cleaned bar series plus its provenance.
#[derive(Debug, Clone)]
pub struct LoadedBars {
    pub bars: Vec<Bar>,
    /// Data rows in the source, header excluded.
    pub rows_read: usize,
    /// Rows dropped for an unparseable timestamp.
    pub rows_dropped: usize,
    pub duplicates_removed: usize,
    /// BLAKE3 over timestamps and OHLCV, for fingerprinting.
    pub dataset_hash: String,
}

impl LoadedBars {
    /// Wrap an already-clean series (e.g. synthetic bars).
    pub fn from_bars(bars: Vec<Bar>) -> Self {
        let dataset_hash = compute_dataset_hash(&bars);
        Self {
            rows_read: bars.len(),
            rows_dropped: 0,
            duplicates_removed: 0,
            dataset_hash,
            bars,
        }
    }
}

const REQUIRED_COLUMNS: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

const DATETIME_FORMATS: [&str; 7] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%Y%m%d"];

/// Parse a timestamp in any of the accepted formats. Date-only values map to midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Load and clean a CSV file of bars.
pub fn load_csv(path: &Path) -> Result<LoadedBars, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "loading bars");
    load_csv_from_reader(file)
}

/// Load and clean CSV bars from any reader.
pub fn load_csv_from_reader<R: Read>(reader: R) -> Result<LoadedBars, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let mut positions = [0usize; 6];
    for (slot, column) in positions.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(column))
            .ok_or(LoadError::MissingColumn(column))?;
    }
    let [date_col, open_col, high_col, low_col, close_col, volume_col] = positions;

    let mut bars = Vec::new();
    let mut rows_read = 0;
    let mut rows_dropped = 0;

    for (i, record) in csv_reader.records().enumerate() {
        let record = record?;
        let row = i + 1;
        rows_read += 1;

        let Some(timestamp) = record.get(date_col).and_then(parse_timestamp) else {
            rows_dropped += 1;
            continue;
        };

        let number = |col: usize, column: &'static str| -> Result<f64, LoadError> {
            let raw = record.get(col).unwrap_or("");
            raw.parse::<f64>().map_err(|_| LoadError::InvalidValue {
                row,
                column,
                value: raw.to_string(),
            })
        };

        bars.push(Bar {
            timestamp,
            open: number(open_col, "open")?,
            high: number(high_col, "high")?,
            low: number(low_col, "low")?,
            close: number(close_col, "close")?,
            volume: number(volume_col, "volume")?,
        });
    }

    if rows_dropped > 0 {
        info!(rows_dropped, "removed rows with unparseable dates");
    }
    if bars.is_empty() {
        return Err(LoadError::EmptyAfterCleaning {
            rows_read,
            rows_dropped,
        });
    }

    bars.sort_by_key(|b| b.timestamp);
    let before = bars.len();
    bars.dedup_by_key(|b| b.timestamp);
    let duplicates_removed = before - bars.len();
    if duplicates_removed > 0 {
        warn!(duplicates_removed, "duplicate timestamps removed, keeping the first row");
    }

    if let (Some(first), Some(last)) = (bars.first(), bars.last()) {
        info!(
            bars = bars.len(),
            from = %first.timestamp_string(),
            to = %last.timestamp_string(),
            "bars loaded"
        );
    }

    Ok(LoadedBars {
        dataset_hash: compute_dataset_hash(&bars),
        bars,
        rows_read,
        rows_dropped,
        duplicates_removed,
    })
}

/// Compute a deterministic BLAKE3 hash over all bar data.
pub fn compute_dataset_hash(bars: &[Bar]) -> String {
    let mut hasher = blake3::Hasher::new();
    for bar in bars {
        hasher.update(bar.timestamp_string().as_bytes());
        hasher.update(&bar.open.to_le_bytes());
        hasher.update(&bar.high.to_le_bytes());
        hasher.update(&bar.low.to_le_bytes());
        hasher.update(&bar.close.to_le_bytes());
        hasher.update(&bar.volume.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

/// Generate a seeded random walk of hourly bars.
///
/// Same `(count, seed)` always gives the same series.
pub fn generate_synthetic_bars(count: usize, seed: u64) -> Vec<Bar> {
    let mut rng = StdRng::seed_from_u64(seed);
    let start = NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default();

    let mut price = 100.0_f64;
    (0..count)
        .map(|i| {
            let change: f64 = rng.gen_range(-0.01..0.01);
            let open = price;
            let close = price * (1.0 + change);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.004));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.004));
            let volume = rng.gen_range(100..10_000u32) as f64;
            price = close;
            Bar {
                timestamp: start + Duration::hours(i as i64),
                open,
                high,
                low,
                close,
                volume,
            }
        })
        .collect()
}

/// Quick look at a CSV file without loading it as bars.
#[derive(Debug, Clone, Serialize)]
pub struct CsvInspection {
    pub file_path: PathBuf,
    pub file_size: u64,
    /// Raw text of the first lines, header included.
    pub first_lines: Vec<String>,
    pub columns: Vec<String>,
    /// Inferred kind per column over the sampled rows.
    pub column_types: BTreeMap<String, String>,
    pub sample_rows: Vec<BTreeMap<String, String>>,
}

const INSPECT_RAW_LINES: usize = 5;

fn infer_kind<'a>(values: impl Iterator<Item = &'a str>) -> &'static str {
    let values: Vec<&str> = values.filter(|v| !v.is_empty()).collect();
    if values.is_empty() {
        "empty"
    } else if values.iter().all(|v| v.parse::<i64>().is_ok()) {
        "integer"
    } else if values.iter().all(|v| v.parse::<f64>().is_ok()) {
        "float"
    } else if values.iter().all(|v| parse_timestamp(v).is_some()) {
        "datetime"
    } else {
        "text"
    }
}

/// Inspect a CSV file: size, raw head, header, and up to `rows` parsed rows.
pub fn inspect_csv(path: &Path, rows: usize) -> Result<CsvInspection, LoadError> {
    let io_err = |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file_size = std::fs::metadata(path).map_err(io_err)?.len();

    let file = File::open(path).map_err(io_err)?;
    let first_lines = BufReader::new(file)
        .lines()
        .take(INSPECT_RAW_LINES)
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_err)?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;
    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut records = Vec::new();
    for record in reader.records().take(rows) {
        records.push(record?);
    }

    let column_types = columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let kind = infer_kind(records.iter().filter_map(|r| r.get(i)));
            (name.clone(), kind.to_string())
        })
        .collect();

    let sample_rows = records
        .iter()
        .map(|record| {
            columns
                .iter()
                .cloned()
                .zip(record.iter().map(str::to_string))
                .collect()
        })
        .collect();

    Ok(CsvInspection {
        file_path: path.to_path_buf(),
        file_size,
        first_lines,
        columns,
        column_types,
        sample_rows,
    })
}
