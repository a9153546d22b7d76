//! taflag core: indicators, signal rules, trade matching, report assembly.
//!
//! This crate is the pure, I/O-free part of the analysis:
//! - Domain types (bars, signal events, open positions, closed trades)
//! - Indicator battery computed once over the whole series
//! - One literal buy/sell rule per indicator family
//! - Per-indicator open/closed state machine gated by a confirmation threshold
//! - Report assembly merging bars with indicator values

pub mod domain;
pub mod engine;
pub mod indicators;
pub mod signals;

pub use engine::{run_pipeline, AnalysisReport, PipelineConfig, PipelineError};
