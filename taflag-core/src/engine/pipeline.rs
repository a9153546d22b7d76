//! Pipeline entry point: indicators → signals → matcher → report, in one pass.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::domain::{format_timestamp, Bar};
use crate::signals::{all_rules, extract_signals, Emission, ExitMode};

use super::matcher::{match_trades, MatcherConfig};
use super::precompute::{compute_indicator_sets, IndicatorParams};
use super::report::{assemble, AnalysisReport};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("bar series is empty")]
    EmptySeries,

    #[error("timestamps not strictly increasing at bar {index}: {previous} then {current}")]
    NonIncreasingTimestamp {
        index: usize,
        previous: String,
        current: String,
    },

    #[error("bar {index} ({timestamp}) has a non-finite price")]
    NonFinitePrice { index: usize, timestamp: String },

    #[error("invalid indicator parameter: {0}")]
    InvalidParameter(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub indicators: IndicatorParams,
    pub emission: Emission,
    pub exit_mode: ExitMode,
    pub matcher: MatcherConfig,
}

/// Check the bar-series contract the engine relies on.
pub fn validate_bars(bars: &[Bar]) -> Result<(), PipelineError> {
    if bars.is_empty() {
        return Err(PipelineError::EmptySeries);
    }
    for (index, bar) in bars.iter().enumerate() {
        if bar.is_void() {
            return Err(PipelineError::NonFinitePrice {
                index,
                timestamp: bar.timestamp_string(),
            });
        }
        if index > 0 && bars[index - 1].timestamp >= bar.timestamp {
            return Err(PipelineError::NonIncreasingTimestamp {
                index,
                previous: format_timestamp(&bars[index - 1].timestamp),
                current: bar.timestamp_string(),
            });
        }
    }
    Ok(())
}

/// Run the whole analysis over a validated bar series.
///
/// Either every artifact is produced or an error is returned before any work.
pub fn run_pipeline(bars: &[Bar], config: &PipelineConfig) -> Result<AnalysisReport, PipelineError> {
    validate_bars(bars)?;
    config.indicators.validate()?;

    let sets = compute_indicator_sets(bars, &config.indicators);
    let extraction = extract_signals(bars, &sets, &all_rules(), config.emission, config.exit_mode);
    let outcome = match_trades(&extraction.bars, &config.matcher);

    debug!(
        bars = bars.len(),
        events = extraction.events.len(),
        trades = outcome.trades.len(),
        unresolved = outcome.unresolved.len(),
        "pipeline complete"
    );

    Ok(assemble(bars, sets, extraction, outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;

    #[test]
    fn empty_series_is_rejected() {
        let err = run_pipeline(&[], &PipelineConfig::default()).unwrap_err();
        assert!(matches!(err, PipelineError::EmptySeries));
    }

    #[test]
    fn out_of_order_timestamps_are_rejected() {
        let mut bars = make_bars(&[100.0, 101.0, 102.0]);
        bars.swap(1, 2);
        let err = run_pipeline(&bars, &PipelineConfig::default()).unwrap_err();
        assert!(matches!(err, PipelineError::NonIncreasingTimestamp { index: 1, .. }));
    }

    #[test]
    fn duplicate_timestamps_are_rejected() {
        let mut bars = make_bars(&[100.0, 101.0]);
        bars[1].timestamp = bars[0].timestamp;
        assert!(run_pipeline(&bars, &PipelineConfig::default()).is_err());
    }

    #[test]
    fn non_finite_price_is_rejected() {
        let mut bars = make_bars(&[100.0, 101.0]);
        bars[1].close = f64::NAN;
        let err = run_pipeline(&bars, &PipelineConfig::default()).unwrap_err();
        assert!(err.to_string().contains("bar 1"));
    }

    #[test]
    fn invalid_params_are_rejected() {
        let bars = make_bars(&[100.0, 101.0]);
        let mut config = PipelineConfig::default();
        config.indicators.sma_fast = 60;
        assert!(matches!(
            run_pipeline(&bars, &config),
            Err(PipelineError::InvalidParameter(_))
        ));
    }

    #[test]
    fn single_bar_produces_empty_artifacts() {
        let bars = make_bars(&[100.0]);
        let report = run_pipeline(&bars, &PipelineConfig::default()).unwrap();
        assert_eq!(report.data.len(), 1);
        assert!(report.indicator_data.is_empty());
        assert!(report.trades.is_empty());
    }

    #[test]
    fn config_round_trips_through_json_with_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"emission":"on_change","matcher":{"end_of_series":"report"}}"#)
                .unwrap();
        assert_eq!(config.emission, Emission::OnChange);
        assert_eq!(config.matcher.confirmation_threshold, 5);
        assert_eq!(config.indicators, IndicatorParams::default());
    }
}
