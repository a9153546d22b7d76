//! Signal rules: one literal buy/sell rule per indicator family.
//!
//! Rules only read the current bar's `IndicatorSet` (and, for crossover
//! rules, the previous bar's). They never see positions or trades, so the
//! same extraction feeds both the event stream and the trade matcher.

pub mod band;
pub mod extractor;
pub mod oscillator;
pub mod trend;

pub use band::BollingerRule;
pub use extractor::{extract_signals, BarSignals, Emission, ExitMode, SignalExtraction};
pub use oscillator::{CciRule, RsiRule, StochasticRule, WilliamsRRule};
pub use trend::{AdxRule, EmaRule, IchimokuRule, MacdRule, SmaRule};

use crate::domain::{Bar, IndicatorName, SignalAction};
use crate::engine::precompute::IndicatorSet;

/// Everything a rule may look at for one bar.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub bar: &'a Bar,
    pub current: &'a IndicatorSet,
    /// `None` on the first bar of the series.
    pub previous: Option<&'a IndicatorSet>,
}

/// A per-indicator signal rule.
///
/// # Invariants
/// - `evaluate()` returns `None` whenever a field it needs is undefined
/// - buy and sell are mutually exclusive; equality fires neither
pub trait SignalRule: Send + Sync {
    fn indicator(&self) -> IndicatorName;

    /// The buy/sell table rule for this bar.
    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<SignalAction>;

    /// The indicator reading reported alongside an event.
    fn reference_value(&self, ctx: &RuleContext<'_>, action: SignalAction) -> Option<f64>;

    /// Looser exit condition used when positions close in level mode.
    fn level_exit(&self, ctx: &RuleContext<'_>) -> bool;
}

/// Map a (buy, sell) pair of conditions onto an action.
pub(crate) fn decide(buy: bool, sell: bool) -> Option<SignalAction> {
    match (buy, sell) {
        (true, false) => Some(SignalAction::Buy),
        (false, true) => Some(SignalAction::Sell),
        _ => None,
    }
}

/// The full rule battery in `IndicatorName::ALL` order.
pub fn all_rules() -> Vec<Box<dyn SignalRule>> {
    vec![
        Box::new(SmaRule),
        Box::new(EmaRule),
        Box::new(RsiRule::default()),
        Box::new(MacdRule),
        Box::new(BollingerRule),
        Box::new(StochasticRule::default()),
        Box::new(IchimokuRule),
        Box::new(CciRule::default()),
        Box::new(AdxRule::default()),
        Box::new(WilliamsRRule::default()),
    ]
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use chrono::NaiveDate;

    pub fn bar(close: f64) -> Bar {
        Bar {
            timestamp: NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 10.0,
        }
    }

    pub fn blank() -> IndicatorSet {
        IndicatorSet::empty(bar(0.0).timestamp)
    }

    pub fn ctx<'a>(
        bar: &'a Bar,
        current: &'a IndicatorSet,
        previous: Option<&'a IndicatorSet>,
    ) -> RuleContext<'a> {
        RuleContext {
            bar,
            current,
            previous,
        }
    }
}
