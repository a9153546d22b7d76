//! Signal vocabulary: which rule fired, in which direction, at which bar.
//!
//! Signal events are immutable once emitted. They describe what an indicator
//! said about a bar, never what the matcher decided to do with it.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The ten rule families evaluated on every bar.
///
/// Declaration order is the canonical output order (grouped signals, summary
/// tables, contributing-indicator lists).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IndicatorName {
    #[serde(rename = "SMA")]
    Sma,
    #[serde(rename = "EMA")]
    Ema,
    #[serde(rename = "RSI")]
    Rsi,
    #[serde(rename = "MACD")]
    Macd,
    #[serde(rename = "BB")]
    Bollinger,
    #[serde(rename = "Stoch")]
    Stochastic,
    #[serde(rename = "Ichimoku")]
    Ichimoku,
    #[serde(rename = "CCI")]
    Cci,
    #[serde(rename = "ADX")]
    Adx,
    #[serde(rename = "WILLR")]
    WilliamsR,
}

impl IndicatorName {
    pub const ALL: [IndicatorName; 10] = [
        IndicatorName::Sma,
        IndicatorName::Ema,
        IndicatorName::Rsi,
        IndicatorName::Macd,
        IndicatorName::Bollinger,
        IndicatorName::Stochastic,
        IndicatorName::Ichimoku,
        IndicatorName::Cci,
        IndicatorName::Adx,
        IndicatorName::WilliamsR,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorName::Sma => "SMA",
            IndicatorName::Ema => "EMA",
            IndicatorName::Rsi => "RSI",
            IndicatorName::Macd => "MACD",
            IndicatorName::Bollinger => "BB",
            IndicatorName::Stochastic => "Stoch",
            IndicatorName::Ichimoku => "Ichimoku",
            IndicatorName::Cci => "CCI",
            IndicatorName::Adx => "ADX",
            IndicatorName::WilliamsR => "WILLR",
        }
    }
}

impl fmt::Display for IndicatorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalAction {
    Buy,
    Sell,
}

impl SignalAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalAction::Buy => "buy",
            SignalAction::Sell => "sell",
        }
    }
}

impl fmt::Display for SignalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One buy or sell assertion from one indicator at one bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    #[serde(with = "crate::domain::timestamp")]
    pub timestamp: NaiveDateTime,
    pub indicator: IndicatorName,
    /// Close of the bar the signal fired on.
    pub price: f64,
    /// The indicator reading the rule compared (e.g. the RSI value, or the
    /// Bollinger band that was crossed).
    pub value: f64,
    pub action: SignalAction,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn indicator_names_serialize_as_short_keys() {
        let json = serde_json::to_string(&IndicatorName::ALL).unwrap();
        assert_eq!(
            json,
            r#"["SMA","EMA","RSI","MACD","BB","Stoch","Ichimoku","CCI","ADX","WILLR"]"#
        );
        for name in IndicatorName::ALL {
            assert_eq!(serde_json::to_string(&name).unwrap(), format!("\"{name}\""));
        }
    }

    #[test]
    fn canonical_order_is_declaration_order() {
        let mut shuffled = vec![
            IndicatorName::WilliamsR,
            IndicatorName::Sma,
            IndicatorName::Cci,
            IndicatorName::Rsi,
        ];
        shuffled.sort();
        assert_eq!(
            shuffled,
            vec![
                IndicatorName::Sma,
                IndicatorName::Rsi,
                IndicatorName::Cci,
                IndicatorName::WilliamsR
            ]
        );
    }

    #[test]
    fn signal_event_json_shape() {
        let event = SignalEvent {
            timestamp: NaiveDate::from_ymd_opt(2024, 3, 15)
                .unwrap()
                .and_hms_opt(14, 0, 0)
                .unwrap(),
            indicator: IndicatorName::Rsi,
            price: 101.5,
            value: 27.25,
            action: SignalAction::Buy,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["timestamp"], "2024-03-15 14:00:00");
        assert_eq!(json["indicator"], "RSI");
        assert_eq!(json["action"], "buy");

        let back: SignalEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
