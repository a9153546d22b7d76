//! Trade matcher: per-indicator open/closed state machine.
//!
//! One forward pass over the per-bar signal sets. Each indicator is either
//! `closed` (no entry in the open map) or `open` (exactly one entry). Per bar:
//! 1. Exits: every open indicator whose exit condition holds is closed at
//!    this bar's close and converted into a `ClosedTrade`.
//! 2. Entries: if strictly more than `confirmation_threshold` indicators fired
//!    buy, every one of them that is closed opens at this bar's close.
//!
//! Running exits first means a position is never opened and closed on the
//! same bar.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{format_timestamp, ClosedTrade, IndicatorName, OpenPosition};
use crate::signals::BarSignals;

/// What happens to positions still open after the last bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndOfSeriesPolicy {
    /// Dropped silently.
    #[default]
    Discard,
    /// Closed at the last bar's close. Positions opened on the last bar are dropped.
    ForceClose,
    /// Returned as unresolved positions.
    Report,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Entries need strictly more simultaneous buys than this.
    pub confirmation_threshold: usize,
    pub end_of_series: EndOfSeriesPolicy,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            confirmation_threshold: 5,
            end_of_series: EndOfSeriesPolicy::Discard,
        }
    }
}

/// Result of a full matching pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchOutcome {
    /// In close order.
    pub trades: Vec<ClosedTrade>,
    /// Non-empty only under `EndOfSeriesPolicy::Report`.
    pub unresolved: Vec<OpenPosition>,
}

pub struct TradeMatcher {
    config: MatcherConfig,
    open: BTreeMap<IndicatorName, OpenPosition>,
    closed: Vec<ClosedTrade>,
    last_bar: Option<(usize, chrono::NaiveDateTime, f64)>,
}

impl TradeMatcher {
    pub fn new(config: MatcherConfig) -> Self {
        Self {
            config,
            open: BTreeMap::new(),
            closed: Vec::new(),
            last_bar: None,
        }
    }

    pub fn is_open(&self, indicator: IndicatorName) -> bool {
        self.open.contains_key(&indicator)
    }

    pub fn open_positions(&self) -> impl Iterator<Item = &OpenPosition> {
        self.open.values()
    }

    pub fn closed_trades(&self) -> &[ClosedTrade] {
        &self.closed
    }

    /// Advance the state machine by one bar.
    pub fn step(&mut self, bar: &BarSignals) {
        for name in &bar.exits {
            if let Some(position) = self.open.remove(name) {
                let trade =
                    ClosedTrade::from_position(position, bar.index, bar.timestamp, bar.close);
                debug!(
                    indicator = %name,
                    entry = %format_timestamp(&trade.entry_timestamp),
                    exit = %format_timestamp(&trade.exit_timestamp),
                    profit = ?trade.profit,
                    "position closed"
                );
                self.closed.push(trade);
            }
        }

        if bar.buys.len() > self.config.confirmation_threshold {
            for &name in &bar.buys {
                if self.open.contains_key(&name) {
                    continue;
                }
                debug!(
                    indicator = %name,
                    at = %format_timestamp(&bar.timestamp),
                    price = bar.close,
                    confirmations = bar.buys.len(),
                    "position opened"
                );
                self.open.insert(
                    name,
                    OpenPosition {
                        indicator: name,
                        entry_index: bar.index,
                        entry_timestamp: bar.timestamp,
                        entry_price: bar.close,
                        contributing_indicators: bar.buys.clone(),
                    },
                );
            }
        }

        self.last_bar = Some((bar.index, bar.timestamp, bar.close));
    }

    /// Apply the end-of-series policy and return everything produced.
    pub fn finish(mut self) -> MatchOutcome {
        let remaining = std::mem::take(&mut self.open);
        let mut unresolved = Vec::new();

        match self.config.end_of_series {
            EndOfSeriesPolicy::Discard => {
                if !remaining.is_empty() {
                    debug!(count = remaining.len(), "discarding open positions at end of series");
                }
            }
            EndOfSeriesPolicy::ForceClose => {
                if let Some((index, timestamp, close)) = self.last_bar {
                    for position in remaining.into_values() {
                        if position.entry_index >= index {
                            continue;
                        }
                        debug!(indicator = %position.indicator, "force-closing at end of series");
                        self.closed
                            .push(ClosedTrade::from_position(position, index, timestamp, close));
                    }
                }
            }
            EndOfSeriesPolicy::Report => unresolved.extend(remaining.into_values()),
        }

        MatchOutcome {
            trades: self.closed,
            unresolved,
        }
    }
}

/// Run the matcher over a whole series of per-bar signals.
pub fn match_trades(bars: &[BarSignals], config: &MatcherConfig) -> MatchOutcome {
    let mut matcher = TradeMatcher::new(config.clone());
    for bar in bars {
        matcher.step(bar);
    }
    matcher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, NaiveDateTime};
    use IndicatorName::*;

    const SIX: [IndicatorName; 6] = [Sma, Ema, Rsi, Macd, Bollinger, Stochastic];

    fn ts(index: usize) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::hours(index as i64)
    }

    fn bar(index: usize, close: f64, buys: &[IndicatorName], exits: &[IndicatorName]) -> BarSignals {
        BarSignals {
            index,
            timestamp: ts(index),
            close,
            buys: buys.to_vec(),
            exits: exits.to_vec(),
        }
    }

    #[test]
    fn six_buys_open_six_positions() {
        let outcome = {
            let mut m = TradeMatcher::new(MatcherConfig::default());
            m.step(&bar(0, 100.0, &SIX, &[]));
            let open: Vec<_> = m.open_positions().cloned().collect();
            assert_eq!(open.len(), 6);
            for position in &open {
                assert_eq!(position.contributing_indicators, SIX.to_vec());
                assert_eq!(position.entry_price, 100.0);
                assert_eq!(position.entry_timestamp, ts(0));
            }
            m.finish()
        };
        assert!(outcome.trades.is_empty());
        assert!(outcome.unresolved.is_empty());
    }

    #[test]
    fn five_buys_open_nothing() {
        let mut m = TradeMatcher::new(MatcherConfig::default());
        m.step(&bar(0, 100.0, &SIX[..5], &[]));
        assert_eq!(m.open_positions().count(), 0);
    }

    #[test]
    fn threshold_is_configurable() {
        let config = MatcherConfig {
            confirmation_threshold: 1,
            ..MatcherConfig::default()
        };
        let mut m = TradeMatcher::new(config);
        m.step(&bar(0, 100.0, &[Sma, Ema], &[]));
        assert!(m.is_open(Sma));
        assert!(m.is_open(Ema));
    }

    #[test]
    fn rsi_exit_five_bars_later_books_profit() {
        let mut bars = vec![bar(0, 100.0, &SIX, &[])];
        for i in 1..5 {
            bars.push(bar(i, 100.0 + i as f64, &[], &[]));
        }
        bars.push(bar(5, 108.0, &[], &[Rsi]));
        let outcome = match_trades(&bars, &MatcherConfig::default());

        assert_eq!(outcome.trades.len(), 1);
        let trade = &outcome.trades[0];
        assert_eq!(trade.indicator, Rsi);
        assert_eq!(trade.entry_timestamp, ts(0));
        assert_eq!(trade.entry_price, 100.0);
        assert_eq!(trade.exit_timestamp, ts(5));
        assert_eq!(trade.exit_price, 108.0);
        assert_eq!(trade.profit, Some(8.0));
        assert_eq!(trade.bars_held, 5);
        assert_eq!(trade.contributing_indicators, SIX.to_vec());
    }

    #[test]
    fn open_position_is_not_reentered_or_averaged() {
        let bars = vec![bar(0, 100.0, &SIX, &[]), bar(1, 120.0, &SIX, &[])];
        let mut m = TradeMatcher::new(MatcherConfig::default());
        for b in &bars {
            m.step(b);
        }
        assert_eq!(m.open_positions().count(), 6);
        assert!(m.open_positions().all(|p| p.entry_price == 100.0));
    }

    #[test]
    fn exit_and_entry_on_same_bar_never_close_new_position() {
        // Sma exits and buys again on bar 1: the old position closes, a new one opens.
        let bars = vec![bar(0, 100.0, &SIX, &[]), bar(1, 90.0, &SIX, &[Sma, Ema])];
        let mut m = TradeMatcher::new(MatcherConfig::default());
        for b in &bars {
            m.step(b);
        }
        assert_eq!(m.closed_trades().len(), 2);
        assert!(m.closed_trades().iter().all(|t| t.exit_timestamp > t.entry_timestamp));
        let sma = m.open_positions().find(|p| p.indicator == Sma).unwrap();
        assert_eq!(sma.entry_index, 1);
    }

    #[test]
    fn exit_on_entry_bar_does_not_close() {
        let bars = vec![bar(0, 100.0, &SIX, &[Sma])];
        let outcome = match_trades(
            &bars,
            &MatcherConfig {
                end_of_series: EndOfSeriesPolicy::Report,
                ..MatcherConfig::default()
            },
        );
        assert!(outcome.trades.is_empty());
        assert_eq!(outcome.unresolved.len(), 6);
    }

    #[test]
    fn exits_ignore_threshold() {
        let bars = vec![bar(0, 100.0, &SIX, &[]), bar(1, 95.0, &[], &[Macd])];
        let outcome = match_trades(&bars, &MatcherConfig::default());
        assert_eq!(outcome.trades.len(), 1);
        assert_eq!(outcome.trades[0].profit, Some(-5.0));
        assert!(!outcome.trades[0].is_winner());
    }

    #[test]
    fn exit_for_closed_indicator_is_ignored() {
        let bars = vec![bar(0, 100.0, &[], &[Sma, Rsi])];
        let outcome = match_trades(&bars, &MatcherConfig::default());
        assert!(outcome.trades.is_empty());
    }

    #[test]
    fn end_of_series_discard_drops_open_positions() {
        let bars = vec![bar(0, 100.0, &SIX, &[]), bar(1, 101.0, &[], &[])];
        let outcome = match_trades(&bars, &MatcherConfig::default());
        assert!(outcome.trades.is_empty());
        assert!(outcome.unresolved.is_empty());
    }

    #[test]
    fn end_of_series_force_close_uses_last_bar() {
        let bars = vec![
            bar(0, 100.0, &SIX, &[]),
            bar(1, 101.0, &[], &[]),
            bar(2, 104.0, &[], &[]),
        ];
        let config = MatcherConfig {
            end_of_series: EndOfSeriesPolicy::ForceClose,
            ..MatcherConfig::default()
        };
        let outcome = match_trades(&bars, &config);
        assert_eq!(outcome.trades.len(), 6);
        for trade in &outcome.trades {
            assert_eq!(trade.exit_timestamp, ts(2));
            assert_eq!(trade.profit, Some(4.0));
        }
        assert!(outcome.unresolved.is_empty());
    }

    #[test]
    fn force_close_drops_positions_opened_on_last_bar() {
        let bars = vec![bar(0, 100.0, &[], &[]), bar(1, 101.0, &SIX, &[])];
        let config = MatcherConfig {
            end_of_series: EndOfSeriesPolicy::ForceClose,
            ..MatcherConfig::default()
        };
        let outcome = match_trades(&bars, &config);
        assert!(outcome.trades.is_empty());
    }

    #[test]
    fn end_of_series_report_returns_unresolved() {
        let bars = vec![bar(0, 100.0, &SIX, &[]), bar(1, 101.0, &[], &[Rsi])];
        let config = MatcherConfig {
            end_of_series: EndOfSeriesPolicy::Report,
            ..MatcherConfig::default()
        };
        let outcome = match_trades(&bars, &config);
        assert_eq!(outcome.trades.len(), 1);
        assert_eq!(outcome.unresolved.len(), 5);
        assert!(outcome.unresolved.iter().all(|p| p.indicator != Rsi));
    }

    #[test]
    fn undefined_price_yields_undefined_profit() {
        let bars = vec![bar(0, 100.0, &SIX, &[]), bar(1, f64::NAN, &[], &[Ema])];
        let outcome = match_trades(&bars, &MatcherConfig::default());
        assert_eq!(outcome.trades.len(), 1);
        assert_eq!(outcome.trades[0].profit, None);
    }
}
