//! Trend-following rules: moving averages, MACD, Ichimoku cloud, ADX.

use crate::domain::{IndicatorName, SignalAction};

use super::{decide, RuleContext, SignalRule};

/// Fast SMA above/below slow SMA.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmaRule;

impl SignalRule for SmaRule {
    fn indicator(&self) -> IndicatorName {
        IndicatorName::Sma
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<SignalAction> {
        let fast = ctx.current.sma_fast?;
        let slow = ctx.current.sma_slow?;
        decide(fast > slow, fast < slow)
    }

    fn reference_value(&self, ctx: &RuleContext<'_>, _action: SignalAction) -> Option<f64> {
        ctx.current.sma_fast
    }

    fn level_exit(&self, ctx: &RuleContext<'_>) -> bool {
        matches!(
            (ctx.current.sma_fast, ctx.current.sma_slow),
            (Some(fast), Some(slow)) if fast < slow
        )
    }
}

/// Close above/below the EMA.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmaRule;

impl SignalRule for EmaRule {
    fn indicator(&self) -> IndicatorName {
        IndicatorName::Ema
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<SignalAction> {
        let ema = ctx.current.ema?;
        let close = ctx.bar.close;
        decide(close > ema, close < ema)
    }

    fn reference_value(&self, ctx: &RuleContext<'_>, _action: SignalAction) -> Option<f64> {
        ctx.current.ema
    }

    fn level_exit(&self, ctx: &RuleContext<'_>) -> bool {
        ctx.current.ema.is_some_and(|ema| ctx.bar.close < ema)
    }
}

/// MACD line crossing its signal line.
#[derive(Debug, Clone, Copy, Default)]
pub struct MacdRule;

impl SignalRule for MacdRule {
    fn indicator(&self) -> IndicatorName {
        IndicatorName::Macd
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<SignalAction> {
        let prev = ctx.previous?;
        let (macd, signal) = (ctx.current.macd?, ctx.current.macd_signal?);
        let (prev_macd, prev_signal) = (prev.macd?, prev.macd_signal?);
        decide(
            macd > signal && prev_macd <= prev_signal,
            macd < signal && prev_macd >= prev_signal,
        )
    }

    fn reference_value(&self, ctx: &RuleContext<'_>, _action: SignalAction) -> Option<f64> {
        ctx.current.macd
    }

    // Level mode drops the crossover requirement.
    fn level_exit(&self, ctx: &RuleContext<'_>) -> bool {
        matches!(
            (ctx.current.macd, ctx.current.macd_signal),
            (Some(macd), Some(signal)) if macd < signal
        )
    }
}

/// Close outside the cloud with conversion/base agreement.
#[derive(Debug, Clone, Copy, Default)]
pub struct IchimokuRule;

impl SignalRule for IchimokuRule {
    fn indicator(&self) -> IndicatorName {
        IndicatorName::Ichimoku
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<SignalAction> {
        let set = ctx.current;
        let (span_a, span_b) = (set.ichimoku_span_a?, set.ichimoku_span_b?);
        let (conversion, base) = (set.ichimoku_conversion?, set.ichimoku_base?);
        let close = ctx.bar.close;
        decide(
            close > span_a && close > span_b && conversion > base,
            close < span_a && close < span_b && conversion < base,
        )
    }

    fn reference_value(&self, ctx: &RuleContext<'_>, _action: SignalAction) -> Option<f64> {
        ctx.current.ichimoku_span_a
    }

    fn level_exit(&self, ctx: &RuleContext<'_>) -> bool {
        ctx.current
            .ichimoku_span_a
            .is_some_and(|span_a| ctx.bar.close < span_a)
    }
}

/// Directional movement gated by trend strength.
///
/// Like MACD, it needs a fully defined previous bar.
#[derive(Debug, Clone, Copy)]
pub struct AdxRule {
    pub strength: f64,
}

impl Default for AdxRule {
    fn default() -> Self {
        Self { strength: 25.0 }
    }
}

impl SignalRule for AdxRule {
    fn indicator(&self) -> IndicatorName {
        IndicatorName::Adx
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<SignalAction> {
        let prev = ctx.previous?;
        prev.adx?;
        prev.plus_di?;
        prev.minus_di?;
        let set = ctx.current;
        let (adx, plus, minus) = (set.adx?, set.plus_di?, set.minus_di?);
        let trending = adx > self.strength;
        decide(trending && plus > minus, trending && plus < minus)
    }

    fn reference_value(&self, ctx: &RuleContext<'_>, _action: SignalAction) -> Option<f64> {
        ctx.current.adx
    }

    fn level_exit(&self, ctx: &RuleContext<'_>) -> bool {
        matches!(
            (ctx.current.plus_di, ctx.current.minus_di),
            (Some(plus), Some(minus)) if plus < minus
        )
    }
}
