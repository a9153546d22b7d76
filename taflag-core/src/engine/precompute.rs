//! Indicator precomputation.
//!
//! All indicators are computed once over the whole series before signal
//! extraction begins, then re-shaped into one strongly-typed `IndicatorSet`
//! per bar. Warm-up NaNs become `None` at this boundary.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::Bar;
use crate::indicators::adx::directional_lines;
use crate::indicators::bollinger::Bollinger;
use crate::indicators::ichimoku::ichimoku_lines;
use crate::indicators::macd::macd_lines;
use crate::indicators::stochastic::stochastic_lines;
use crate::indicators::{
    Adx, AdxLine, Cci, Ema, Ichimoku, IchimokuLine, IchimokuPeriods, Indicator, Macd, MacdLine,
    Rsi, Sma, Stochastic, StochasticLine, WilliamsR,
};

use super::PipelineError;

/// Window lengths for the indicator battery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorParams {
    pub sma_fast: usize,
    pub sma_slow: usize,
    pub ema: usize,
    pub rsi: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bollinger_period: usize,
    pub bollinger_std: f64,
    pub stoch_k: usize,
    pub stoch_d: usize,
    pub stoch_smooth: usize,
    pub ichimoku_conversion: usize,
    pub ichimoku_base: usize,
    pub ichimoku_span_b: usize,
    pub ichimoku_displacement: usize,
    pub cci: usize,
    pub cci_constant: f64,
    pub adx: usize,
    pub williams_r: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            sma_fast: 20,
            sma_slow: 50,
            ema: 20,
            rsi: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bollinger_period: 20,
            bollinger_std: 2.0,
            stoch_k: 14,
            stoch_d: 3,
            stoch_smooth: 3,
            ichimoku_conversion: 9,
            ichimoku_base: 26,
            ichimoku_span_b: 52,
            ichimoku_displacement: 26,
            cci: 14,
            cci_constant: crate::indicators::cci::DEFAULT_CCI_CONSTANT,
            adx: 14,
            williams_r: 14,
        }
    }
}

impl IndicatorParams {
    /// Reject parameter sets the indicator constructors would refuse.
    pub fn validate(&self) -> Result<(), PipelineError> {
        let periods = [
            ("sma_fast", self.sma_fast),
            ("sma_slow", self.sma_slow),
            ("ema", self.ema),
            ("rsi", self.rsi),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("bollinger_period", self.bollinger_period),
            ("stoch_k", self.stoch_k),
            ("stoch_d", self.stoch_d),
            ("stoch_smooth", self.stoch_smooth),
            ("ichimoku_conversion", self.ichimoku_conversion),
            ("ichimoku_base", self.ichimoku_base),
            ("ichimoku_span_b", self.ichimoku_span_b),
            ("cci", self.cci),
            ("adx", self.adx),
            ("williams_r", self.williams_r),
        ];
        if let Some((name, _)) = periods.iter().find(|(_, p)| *p == 0) {
            return Err(PipelineError::InvalidParameter(format!(
                "{name} must be >= 1"
            )));
        }
        if self.sma_fast >= self.sma_slow {
            return Err(PipelineError::InvalidParameter(format!(
                "sma_fast ({}) must be shorter than sma_slow ({})",
                self.sma_fast, self.sma_slow
            )));
        }
        if self.macd_fast >= self.macd_slow {
            return Err(PipelineError::InvalidParameter(format!(
                "macd_fast ({}) must be shorter than macd_slow ({})",
                self.macd_fast, self.macd_slow
            )));
        }
        if !(self.bollinger_std.is_finite() && self.bollinger_std > 0.0) {
            return Err(PipelineError::InvalidParameter(
                "bollinger_std must be a positive number".into(),
            ));
        }
        if !(self.cci_constant.is_finite() && self.cci_constant > 0.0) {
            return Err(PipelineError::InvalidParameter(
                "cci_constant must be a positive number".into(),
            ));
        }
        Ok(())
    }

    pub fn ichimoku_periods(&self) -> IchimokuPeriods {
        IchimokuPeriods {
            conversion: self.ichimoku_conversion,
            base: self.ichimoku_base,
            span_b: self.ichimoku_span_b,
            displacement: self.ichimoku_displacement,
        }
    }

    /// The full battery as individual `Indicator` instances, one per line.
    pub fn battery(&self) -> Vec<Box<dyn Indicator>> {
        let ichimoku = self.ichimoku_periods();
        let (k, d, s) = (self.stoch_k, self.stoch_d, self.stoch_smooth);
        let (mf, ms, sig) = (self.macd_fast, self.macd_slow, self.macd_signal);
        vec![
            Box::new(Sma::new(self.sma_fast)),
            Box::new(Sma::new(self.sma_slow)),
            Box::new(Ema::new(self.ema)),
            Box::new(Rsi::new(self.rsi)),
            Box::new(Macd::new(mf, ms, sig, MacdLine::Line)),
            Box::new(Macd::new(mf, ms, sig, MacdLine::Signal)),
            Box::new(Macd::new(mf, ms, sig, MacdLine::Histogram)),
            Box::new(Bollinger::lower(self.bollinger_period, self.bollinger_std)),
            Box::new(Bollinger::middle(self.bollinger_period, self.bollinger_std)),
            Box::new(Bollinger::upper(self.bollinger_period, self.bollinger_std)),
            Box::new(Stochastic::new(k, d, s, StochasticLine::K)),
            Box::new(Stochastic::new(k, d, s, StochasticLine::D)),
            Box::new(Ichimoku::new(ichimoku, IchimokuLine::Conversion)),
            Box::new(Ichimoku::new(ichimoku, IchimokuLine::Base)),
            Box::new(Ichimoku::new(ichimoku, IchimokuLine::SpanA)),
            Box::new(Ichimoku::new(ichimoku, IchimokuLine::SpanB)),
            Box::new(Cci::new(self.cci, self.cci_constant)),
            Box::new(Adx::new(self.adx, AdxLine::Adx)),
            Box::new(Adx::new(self.adx, AdxLine::PlusDi)),
            Box::new(Adx::new(self.adx, AdxLine::MinusDi)),
            Box::new(WilliamsR::new(self.williams_r)),
        ]
    }
}

/// Every indicator reading for one bar. `None` means not enough history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSet {
    #[serde(skip)]
    pub timestamp: NaiveDateTime,
    pub sma_fast: Option<f64>,
    pub sma_slow: Option<f64>,
    pub ema: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,
    pub bb_lower: Option<f64>,
    pub bb_middle: Option<f64>,
    pub bb_upper: Option<f64>,
    pub stoch_k: Option<f64>,
    pub stoch_d: Option<f64>,
    pub ichimoku_conversion: Option<f64>,
    pub ichimoku_base: Option<f64>,
    pub ichimoku_span_a: Option<f64>,
    pub ichimoku_span_b: Option<f64>,
    pub cci: Option<f64>,
    pub adx: Option<f64>,
    pub plus_di: Option<f64>,
    pub minus_di: Option<f64>,
    pub williams_r: Option<f64>,
}

impl IndicatorSet {
    /// A set with every field undefined.
    pub fn empty(timestamp: NaiveDateTime) -> Self {
        Self {
            timestamp,
            sma_fast: None,
            sma_slow: None,
            ema: None,
            rsi: None,
            macd: None,
            macd_signal: None,
            macd_histogram: None,
            bb_lower: None,
            bb_middle: None,
            bb_upper: None,
            stoch_k: None,
            stoch_d: None,
            ichimoku_conversion: None,
            ichimoku_base: None,
            ichimoku_span_a: None,
            ichimoku_span_b: None,
            cci: None,
            adx: None,
            plus_di: None,
            minus_di: None,
            williams_r: None,
        }
    }
}

fn defined(series: &[f64], i: usize) -> Option<f64> {
    series.get(i).copied().filter(|v| v.is_finite())
}

/// Compute the indicator set for every bar of the series.
///
/// Parameters must already be validated; see `IndicatorParams::validate`.
pub fn compute_indicator_sets(bars: &[Bar], params: &IndicatorParams) -> Vec<IndicatorSet> {
    let sma_fast = Sma::new(params.sma_fast).compute(bars);
    let sma_slow = Sma::new(params.sma_slow).compute(bars);
    let ema = Ema::new(params.ema).compute(bars);
    let rsi = Rsi::new(params.rsi).compute(bars);
    let [macd, macd_signal, macd_histogram] =
        macd_lines(bars, params.macd_fast, params.macd_slow, params.macd_signal);
    let bb_lower = Bollinger::lower(params.bollinger_period, params.bollinger_std).compute(bars);
    let bb_middle = Bollinger::middle(params.bollinger_period, params.bollinger_std).compute(bars);
    let bb_upper = Bollinger::upper(params.bollinger_period, params.bollinger_std).compute(bars);
    let [stoch_k, stoch_d] =
        stochastic_lines(bars, params.stoch_k, params.stoch_d, params.stoch_smooth);
    let [conversion, base, span_a, span_b] = ichimoku_lines(bars, params.ichimoku_periods());
    let cci = Cci::new(params.cci, params.cci_constant).compute(bars);
    let [adx, plus_di, minus_di] = directional_lines(bars, params.adx);
    let williams_r = WilliamsR::new(params.williams_r).compute(bars);

    bars.iter()
        .enumerate()
        .map(|(i, bar)| IndicatorSet {
            timestamp: bar.timestamp,
            sma_fast: defined(&sma_fast, i),
            sma_slow: defined(&sma_slow, i),
            ema: defined(&ema, i),
            rsi: defined(&rsi, i),
            macd: defined(&macd, i),
            macd_signal: defined(&macd_signal, i),
            macd_histogram: defined(&macd_histogram, i),
            bb_lower: defined(&bb_lower, i),
            bb_middle: defined(&bb_middle, i),
            bb_upper: defined(&bb_upper, i),
            stoch_k: defined(&stoch_k, i),
            stoch_d: defined(&stoch_d, i),
            ichimoku_conversion: defined(&conversion, i),
            ichimoku_base: defined(&base, i),
            ichimoku_span_a: defined(&span_a, i),
            ichimoku_span_b: defined(&span_b, i),
            cci: defined(&cci, i),
            adx: defined(&adx, i),
            plus_di: defined(&plus_di, i),
            minus_di: defined(&minus_di, i),
            williams_r: defined(&williams_r, i),
        })
        .collect()
}

/// Compute the warmup length: the longest lookback across the battery.
///
/// From this bar on, every indicator can be defined.
pub fn compute_warmup(params: &IndicatorParams) -> usize {
    params
        .battery()
        .iter()
        .map(|i| i.lookback())
        .max()
        .unwrap_or(0)
}
