//! Ichimoku cloud.
//!
//! - Conversion (tenkan): midpoint of the highest high and lowest low over `conversion`
//! - Base (kijun): same midpoint over `base`
//! - Leading span A: (conversion + base) / 2, displaced `displacement` bars forward
//! - Leading span B: midpoint over `span_b`, displaced `displacement` bars forward
//!
//! The lagging span is not produced: it plots today's close on a past bar and
//! cannot be read at decision time.

use super::window::{rolling_max, rolling_min, shift_forward};
use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IchimokuLine {
    Conversion,
    Base,
    SpanA,
    SpanB,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IchimokuPeriods {
    pub conversion: usize,
    pub base: usize,
    pub span_b: usize,
    pub displacement: usize,
}

impl Default for IchimokuPeriods {
    fn default() -> Self {
        Self {
            conversion: 9,
            base: 26,
            span_b: 52,
            displacement: 26,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Ichimoku {
    periods: IchimokuPeriods,
    line: IchimokuLine,
    name: String,
}

impl Ichimoku {
    pub fn new(periods: IchimokuPeriods, line: IchimokuLine) -> Self {
        assert!(
            periods.conversion >= 1 && periods.base >= 1 && periods.span_b >= 1,
            "Ichimoku periods must be >= 1"
        );
        let prefix = match line {
            IchimokuLine::Conversion => "ichimoku_conversion",
            IchimokuLine::Base => "ichimoku_base",
            IchimokuLine::SpanA => "ichimoku_span_a",
            IchimokuLine::SpanB => "ichimoku_span_b",
        };
        Self {
            periods,
            line,
            name: format!(
                "{prefix}_{}_{}_{}",
                periods.conversion, periods.base, periods.span_b
            ),
        }
    }
}

fn midpoint(bars: &[Bar], period: usize) -> Vec<f64> {
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
    rolling_max(&highs, period)
        .iter()
        .zip(rolling_min(&lows, period))
        .map(|(hh, ll)| (hh + ll) / 2.0)
        .collect()
}

/// Compute (conversion, base, span A, span B).
pub fn ichimoku_lines(bars: &[Bar], periods: IchimokuPeriods) -> [Vec<f64>; 4] {
    let conversion = midpoint(bars, periods.conversion);
    let base = midpoint(bars, periods.base);
    let span_a_raw: Vec<f64> = conversion
        .iter()
        .zip(&base)
        .map(|(c, b)| (c + b) / 2.0)
        .collect();
    let span_a = shift_forward(&span_a_raw, periods.displacement);
    let span_b = shift_forward(&midpoint(bars, periods.span_b), periods.displacement);
    [conversion, base, span_a, span_b]
}

impl Indicator for Ichimoku {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        let p = self.periods;
        match self.line {
            IchimokuLine::Conversion => p.conversion - 1,
            IchimokuLine::Base => p.base - 1,
            IchimokuLine::SpanA => p.conversion.max(p.base) - 1 + p.displacement,
            IchimokuLine::SpanB => p.span_b - 1 + p.displacement,
        }
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let [conversion, base, span_a, span_b] = ichimoku_lines(bars, self.periods);
        match self.line {
            IchimokuLine::Conversion => conversion,
            IchimokuLine::Base => base,
            IchimokuLine::SpanA => span_a,
            IchimokuLine::SpanB => span_b,
        }
    }
}
