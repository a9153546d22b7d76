//! The analysis engine: indicator precompute, trade matching, report assembly.

pub mod matcher;
pub mod pipeline;
pub mod precompute;
pub mod report;

pub use matcher::{match_trades, EndOfSeriesPolicy, MatchOutcome, MatcherConfig, TradeMatcher};
pub use pipeline::{run_pipeline, validate_bars, PipelineConfig, PipelineError};
pub use precompute::{compute_indicator_sets, compute_warmup, IndicatorParams, IndicatorSet};
pub use report::{assemble, AnalysisReport, BarRecord};
