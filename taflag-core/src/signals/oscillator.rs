//! Bounded-oscillator rules: buy when oversold, sell when overbought.

use crate::domain::{IndicatorName, SignalAction};

use super::{decide, RuleContext, SignalRule};

fn threshold_action(value: f64, oversold: f64, overbought: f64) -> Option<SignalAction> {
    decide(value < oversold, value > overbought)
}

/// RSI below 30 / above 70.
#[derive(Debug, Clone, Copy)]
pub struct RsiRule {
    pub oversold: f64,
    pub overbought: f64,
}

impl Default for RsiRule {
    fn default() -> Self {
        Self {
            oversold: 30.0,
            overbought: 70.0,
        }
    }
}

impl SignalRule for RsiRule {
    fn indicator(&self) -> IndicatorName {
        IndicatorName::Rsi
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<SignalAction> {
        threshold_action(ctx.current.rsi?, self.oversold, self.overbought)
    }

    fn reference_value(&self, ctx: &RuleContext<'_>, _action: SignalAction) -> Option<f64> {
        ctx.current.rsi
    }

    fn level_exit(&self, ctx: &RuleContext<'_>) -> bool {
        ctx.current.rsi.is_some_and(|rsi| rsi > self.overbought)
    }
}

/// %K in an extreme zone and turning against %D.
#[derive(Debug, Clone, Copy)]
pub struct StochasticRule {
    pub oversold: f64,
    pub overbought: f64,
}

impl Default for StochasticRule {
    fn default() -> Self {
        Self {
            oversold: 20.0,
            overbought: 80.0,
        }
    }
}

impl SignalRule for StochasticRule {
    fn indicator(&self) -> IndicatorName {
        IndicatorName::Stochastic
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<SignalAction> {
        let k = ctx.current.stoch_k?;
        let d = ctx.current.stoch_d?;
        decide(
            k < self.oversold && k > d,
            k > self.overbought && k < d,
        )
    }

    fn reference_value(&self, ctx: &RuleContext<'_>, _action: SignalAction) -> Option<f64> {
        ctx.current.stoch_k
    }

    fn level_exit(&self, ctx: &RuleContext<'_>) -> bool {
        ctx.current.stoch_k.is_some_and(|k| k > self.overbought)
    }
}

/// CCI beyond ±100.
#[derive(Debug, Clone, Copy)]
pub struct CciRule {
    pub oversold: f64,
    pub overbought: f64,
}

impl Default for CciRule {
    fn default() -> Self {
        Self {
            oversold: -100.0,
            overbought: 100.0,
        }
    }
}

impl SignalRule for CciRule {
    fn indicator(&self) -> IndicatorName {
        IndicatorName::Cci
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<SignalAction> {
        threshold_action(ctx.current.cci?, self.oversold, self.overbought)
    }

    fn reference_value(&self, ctx: &RuleContext<'_>, _action: SignalAction) -> Option<f64> {
        ctx.current.cci
    }

    fn level_exit(&self, ctx: &RuleContext<'_>) -> bool {
        ctx.current.cci.is_some_and(|cci| cci > self.overbought)
    }
}

/// Williams %R below -80 / above -20.
#[derive(Debug, Clone, Copy)]
pub struct WilliamsRRule {
    pub oversold: f64,
    pub overbought: f64,
}

impl Default for WilliamsRRule {
    fn default() -> Self {
        Self {
            oversold: -80.0,
            overbought: -20.0,
        }
    }
}

impl SignalRule for WilliamsRRule {
    fn indicator(&self) -> IndicatorName {
        IndicatorName::WilliamsR
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<SignalAction> {
        threshold_action(ctx.current.williams_r?, self.oversold, self.overbought)
    }

    fn reference_value(&self, ctx: &RuleContext<'_>, _action: SignalAction) -> Option<f64> {
        ctx.current.williams_r
    }

    fn level_exit(&self, ctx: &RuleContext<'_>) -> bool {
        ctx.current
            .williams_r
            .is_some_and(|wr| wr > self.overbought)
    }
}
