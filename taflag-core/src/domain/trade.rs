//! Hypothetical positions opened and closed by the trade matcher.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::signal::IndicatorName;

/// A position held on behalf of one indicator.
///
/// At most one exists per indicator at any point of the scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenPosition {
    pub indicator: IndicatorName,
    pub entry_index: usize,
    #[serde(with = "crate::domain::timestamp")]
    pub entry_timestamp: NaiveDateTime,
    pub entry_price: f64,
    /// Every indicator that signalled buy on the entry bar, this one included.
    pub contributing_indicators: Vec<IndicatorName>,
}

/// A resolved (entry, exit) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedTrade {
    pub indicator: IndicatorName,
    #[serde(with = "crate::domain::timestamp")]
    pub entry_timestamp: NaiveDateTime,
    pub entry_price: f64,
    #[serde(with = "crate::domain::timestamp")]
    pub exit_timestamp: NaiveDateTime,
    pub exit_price: f64,
    /// `exit_price - entry_price`; `None` when either price is not finite.
    pub profit: Option<f64>,
    pub bars_held: usize,
    pub contributing_indicators: Vec<IndicatorName>,
}

impl ClosedTrade {
    /// Convert an open position into its closed form at the given exit bar.
    pub fn from_position(
        position: OpenPosition,
        exit_index: usize,
        exit_timestamp: NaiveDateTime,
        exit_price: f64,
    ) -> Self {
        Self {
            indicator: position.indicator,
            entry_timestamp: position.entry_timestamp,
            entry_price: position.entry_price,
            exit_timestamp,
            exit_price,
            profit: realized_profit(position.entry_price, exit_price),
            bars_held: exit_index.saturating_sub(position.entry_index),
            contributing_indicators: position.contributing_indicators,
        }
    }

    pub fn is_winner(&self) -> bool {
        self.profit.is_some_and(|p| p > 0.0)
    }
}

/// Profit of a one-unit long position.
pub fn realized_profit(entry_price: f64, exit_price: f64) -> Option<f64> {
    if entry_price.is_finite() && exit_price.is_finite() {
        Some(exit_price - entry_price)
    } else {
        None
    }
}
