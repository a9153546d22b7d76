//! Trade summary metrics: pure functions over closed trades.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use taflag_core::domain::{ClosedTrade, IndicatorName};

/// Aggregate statistics for a set of closed trades.
///
/// Trades with undefined profit count toward `trade_count` but are excluded
/// from every profit statistic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeSummary {
    pub trade_count: usize,
    pub winners: usize,
    pub losers: usize,
    pub total_profit: f64,
    pub average_profit: f64,
    pub win_rate: f64,
    pub best_trade: Option<f64>,
    pub worst_trade: Option<f64>,
    pub average_bars_held: f64,
}

impl TradeSummary {
    pub fn compute<'a>(trades: impl IntoIterator<Item = &'a ClosedTrade>) -> Self {
        let trades: Vec<&ClosedTrade> = trades.into_iter().collect();
        let profits: Vec<f64> = trades.iter().filter_map(|t| t.profit).collect();

        let winners = profits.iter().filter(|&&p| p > 0.0).count();
        let losers = profits.iter().filter(|&&p| p < 0.0).count();
        let total_profit: f64 = profits.iter().sum();

        Self {
            trade_count: trades.len(),
            winners,
            losers,
            total_profit,
            average_profit: mean(total_profit, profits.len()),
            win_rate: mean(winners as f64, profits.len()),
            best_trade: profits.iter().copied().reduce(f64::max),
            worst_trade: profits.iter().copied().reduce(f64::min),
            average_bars_held: mean(
                trades.iter().map(|t| t.bars_held as f64).sum(),
                trades.len(),
            ),
        }
    }
}

fn mean(total: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

/// Overall and per-indicator summaries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub overall: TradeSummary,
    /// Every indicator has an entry, possibly with zero trades.
    pub by_indicator: BTreeMap<IndicatorName, TradeSummary>,
    pub signal_count: usize,
    pub unresolved_count: usize,
}

impl RunSummary {
    pub fn compute(trades: &[ClosedTrade], signal_count: usize, unresolved_count: usize) -> Self {
        let by_indicator = IndicatorName::ALL
            .iter()
            .map(|&name| {
                let summary = TradeSummary::compute(trades.iter().filter(|t| t.indicator == name));
                (name, summary)
            })
            .collect();

        Self {
            overall: TradeSummary::compute(trades),
            by_indicator,
            signal_count,
            unresolved_count,
        }
    }
}
