//! Signal extraction: run every rule over every bar, once, left to right.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::{Bar, IndicatorName, SignalAction, SignalEvent};
use crate::engine::precompute::IndicatorSet;

use super::{RuleContext, SignalRule};

/// Which rule outcomes become `SignalEvent`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emission {
    /// An event for every bar where a rule holds.
    #[default]
    EveryBar,
    /// An event only when an indicator's action differs from the previous bar.
    OnChange,
}

/// Which condition closes an open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitMode {
    /// The indicator's sell rule.
    #[default]
    Signal,
    /// The indicator's looser level condition.
    Level,
}

/// Per-bar rule outcomes consumed by the trade matcher.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSignals {
    pub index: usize,
    #[serde(with = "crate::domain::timestamp")]
    pub timestamp: NaiveDateTime,
    pub close: f64,
    /// Indicators whose buy rule fired at this bar, in rule order.
    pub buys: Vec<IndicatorName>,
    /// Indicators whose exit condition holds at this bar.
    pub exits: Vec<IndicatorName>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalExtraction {
    /// Chronological; rule order within a bar.
    pub events: Vec<SignalEvent>,
    /// Same events grouped by indicator. Every indicator has an entry.
    pub by_indicator: BTreeMap<IndicatorName, Vec<SignalEvent>>,
    pub bars: Vec<BarSignals>,
}

/// Evaluate `rules` over the series.
///
/// `sets` must be index-aligned with `bars`.
pub fn extract_signals(
    bars: &[Bar],
    sets: &[IndicatorSet],
    rules: &[Box<dyn SignalRule>],
    emission: Emission,
    exit_mode: ExitMode,
) -> SignalExtraction {
    debug_assert_eq!(bars.len(), sets.len());

    let mut events = Vec::new();
    let mut by_indicator: BTreeMap<IndicatorName, Vec<SignalEvent>> = IndicatorName::ALL
        .iter()
        .map(|&name| (name, Vec::new()))
        .collect();
    let mut last_action: BTreeMap<IndicatorName, Option<SignalAction>> = BTreeMap::new();
    let mut per_bar = Vec::with_capacity(bars.len());

    for (index, (bar, current)) in bars.iter().zip(sets).enumerate() {
        let ctx = RuleContext {
            bar,
            current,
            previous: index.checked_sub(1).and_then(|p| sets.get(p)),
        };
        let mut buys = Vec::new();
        let mut exits = Vec::new();

        for rule in rules {
            let name = rule.indicator();
            let action = rule.evaluate(&ctx);

            let exit = match exit_mode {
                ExitMode::Signal => action == Some(SignalAction::Sell),
                ExitMode::Level => rule.level_exit(&ctx),
            };
            if exit {
                exits.push(name);
            }

            let previous = last_action.insert(name, action).flatten();
            let Some(action) = action else { continue };
            if action == SignalAction::Buy {
                buys.push(name);
            }
            if emission == Emission::OnChange && previous == Some(action) {
                continue;
            }

            // A rule only fires when its inputs are defined, reference reading included.
            let value = rule.reference_value(&ctx, action);
            debug_assert!(value.is_some(), "{name} fired without a reference reading");

            let event = SignalEvent {
                timestamp: bar.timestamp,
                indicator: name,
                price: bar.close,
                value: value.unwrap_or(f64::NAN),
                action,
            };
            by_indicator.entry(name).or_default().push(event.clone());
            events.push(event);
        }

        per_bar.push(BarSignals {
            index,
            timestamp: bar.timestamp,
            close: bar.close,
            buys,
            exits,
        });
    }

    SignalExtraction {
        events,
        by_indicator,
        bars: per_bar,
    }
}
