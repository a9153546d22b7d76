//! Output assembly: merge bars with indicator values, bundle the four artifacts.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::{Bar, ClosedTrade, IndicatorName, OpenPosition, SignalEvent};
use crate::signals::SignalExtraction;

use super::matcher::MatchOutcome;
use super::precompute::IndicatorSet;

/// One bar's OHLCV and every indicator field. Undefined fields serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarRecord {
    #[serde(with = "crate::domain::timestamp")]
    pub date: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    #[serde(flatten)]
    pub indicators: IndicatorSet,
}

impl BarRecord {
    pub fn new(bar: &Bar, indicators: IndicatorSet) -> Self {
        Self {
            date: bar.timestamp,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            indicators,
        }
    }
}

/// Everything one analysis produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub data: Vec<BarRecord>,
    /// Flat chronological event stream.
    pub indicator_data: Vec<SignalEvent>,
    /// Events grouped by indicator.
    pub signals: BTreeMap<IndicatorName, Vec<SignalEvent>>,
    pub trades: Vec<ClosedTrade>,
    pub unresolved_positions: Vec<OpenPosition>,
}

pub fn assemble(
    bars: &[Bar],
    sets: Vec<IndicatorSet>,
    extraction: SignalExtraction,
    outcome: MatchOutcome,
) -> AnalysisReport {
    let data = bars
        .iter()
        .zip(sets)
        .map(|(bar, set)| BarRecord::new(bar, set))
        .collect();

    AnalysisReport {
        data,
        indicator_data: extraction.events,
        signals: extraction.by_indicator,
        trades: outcome.trades,
        unresolved_positions: outcome.unresolved,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;

    #[test]
    fn bar_record_flattens_indicators_with_nulls() {
        let bars = make_bars(&[100.0]);
        let mut set = IndicatorSet::empty(bars[0].timestamp);
        set.rsi = Some(55.5);
        let json = serde_json::to_value(BarRecord::new(&bars[0], set)).unwrap();

        assert_eq!(json["date"], "2024-01-02 00:00:00");
        assert_eq!(json["close"], 100.0);
        assert_eq!(json["rsi"], 55.5);
        assert!(json["sma_slow"].is_null());
        assert!(json.get("timestamp").is_none());
        assert!(json.get("indicators").is_none());
    }

    #[test]
    fn report_uses_camel_case_keys() {
        let bars = make_bars(&[100.0, 101.0]);
        let sets = bars.iter().map(|b| IndicatorSet::empty(b.timestamp)).collect();
        let extraction = SignalExtraction {
            events: Vec::new(),
            by_indicator: IndicatorName::ALL.iter().map(|&n| (n, Vec::new())).collect(),
            bars: Vec::new(),
        };
        let report = assemble(&bars, sets, extraction, MatchOutcome::default());
        let json = serde_json::to_value(&report).unwrap();

        for key in ["data", "indicatorData", "signals", "trades", "unresolvedPositions"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert_eq!(json["data"].as_array().unwrap().len(), 2);
        let signals = json["signals"].as_object().unwrap();
        assert_eq!(signals.len(), 10);
        assert!(signals.contains_key("WILLR"));
    }
}
