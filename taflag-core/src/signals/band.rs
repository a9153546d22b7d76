//! Bollinger band rule: close outside the bands.

use crate::domain::{IndicatorName, SignalAction};

use super::{decide, RuleContext, SignalRule};

/// Buy below the lower band, sell above the upper band.
#[derive(Debug, Clone, Copy, Default)]
pub struct BollingerRule;

impl SignalRule for BollingerRule {
    fn indicator(&self) -> IndicatorName {
        IndicatorName::Bollinger
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<SignalAction> {
        let lower = ctx.current.bb_lower?;
        let upper = ctx.current.bb_upper?;
        let close = ctx.bar.close;
        decide(close < lower, close > upper)
    }

    /// The band that was crossed.
    fn reference_value(&self, ctx: &RuleContext<'_>, action: SignalAction) -> Option<f64> {
        match action {
            SignalAction::Buy => ctx.current.bb_lower,
            SignalAction::Sell => ctx.current.bb_upper,
        }
    }

    fn level_exit(&self, ctx: &RuleContext<'_>) -> bool {
        ctx.current.bb_upper.is_some_and(|upper| ctx.bar.close > upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::test_support::{bar, blank, ctx};

    fn banded() -> crate::engine::precompute::IndicatorSet {
        let mut set = blank();
        set.bb_lower = Some(95.0);
        set.bb_middle = Some(100.0);
        set.bb_upper = Some(105.0);
        set
    }

    #[test]
    fn close_below_lower_buys() {
        let set = banded();
        let b = bar(94.0);
        let c = ctx(&b, &set, None);
        assert_eq!(BollingerRule.evaluate(&c), Some(SignalAction::Buy));
        assert_eq!(BollingerRule.reference_value(&c, SignalAction::Buy), Some(95.0));
    }

    #[test]
    fn close_above_upper_sells() {
        let set = banded();
        let b = bar(106.0);
        let c = ctx(&b, &set, None);
        assert_eq!(BollingerRule.evaluate(&c), Some(SignalAction::Sell));
        assert_eq!(BollingerRule.reference_value(&c, SignalAction::Sell), Some(105.0));
        assert!(BollingerRule.level_exit(&c));
    }

    #[test]
    fn inside_or_on_band_is_quiet() {
        let set = banded();
        for close in [95.0, 100.0, 105.0] {
            let b = bar(close);
            assert_eq!(BollingerRule.evaluate(&ctx(&b, &set, None)), None);
        }
    }
}
