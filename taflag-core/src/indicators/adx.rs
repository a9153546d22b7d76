//! ADX: Average Directional Index (Wilder), with the two directional lines.
//!
//! Steps:
//! 1. Compute +DM and -DM from consecutive bars
//! 2. Smooth +DM, -DM, and TR using Wilder smoothing (alpha = 1/period)
//! 3. +DI = 100 * smoothed(+DM) / smoothed(TR)
//! 4. -DI = 100 * smoothed(-DM) / smoothed(TR)
//! 5. DX = 100 * |+DI - -DI| / (+DI + -DI)
//! 6. ADX = Wilder-smoothed DX
//!
//! Lookback: period for the DI lines, 2 * period - 1 for ADX.

use super::smoothing::wilder_smooth;
use super::Indicator;
use crate::domain::Bar;

/// Which directional output to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdxLine {
    Adx,
    PlusDi,
    MinusDi,
}

#[derive(Debug, Clone)]
pub struct Adx {
    period: usize,
    line: AdxLine,
    name: String,
}

impl Adx {
    pub fn new(period: usize, line: AdxLine) -> Self {
        assert!(period >= 1, "ADX period must be >= 1");
        let prefix = match line {
            AdxLine::Adx => "adx",
            AdxLine::PlusDi => "plus_di",
            AdxLine::MinusDi => "minus_di",
        };
        Self {
            period,
            line,
            name: format!("{prefix}_{period}"),
        }
    }
}

/// True Range. TR[0] is NaN: without a previous close it is not a true range.
/// TR[t] = max(high[t]-low[t], |high[t]-close[t-1]|, |low[t]-close[t-1]|).
pub fn true_range(bars: &[Bar]) -> Vec<f64> {
    let n = bars.len();
    let mut tr = vec![f64::NAN; n];

    for i in 1..n {
        let h = bars[i].high;
        let l = bars[i].low;
        let pc = bars[i - 1].close;
        if h.is_nan() || l.is_nan() || pc.is_nan() {
            continue;
        }
        tr[i] = (h - l).max((h - pc).abs()).max((l - pc).abs());
    }

    tr
}

/// Compute (ADX, +DI, -DI).
pub fn directional_lines(bars: &[Bar], period: usize) -> [Vec<f64>; 3] {
    let n = bars.len();
    let mut plus_dm = vec![f64::NAN; n];
    let mut minus_dm = vec![f64::NAN; n];

    for i in 1..n {
        let up_move = bars[i].high - bars[i - 1].high;
        let down_move = bars[i - 1].low - bars[i].low;
        if up_move.is_nan() || down_move.is_nan() {
            continue;
        }
        plus_dm[i] = if up_move > down_move && up_move > 0.0 {
            up_move
        } else {
            0.0
        };
        minus_dm[i] = if down_move > up_move && down_move > 0.0 {
            down_move
        } else {
            0.0
        };
    }

    let smooth_tr = wilder_smooth(&true_range(bars), period);
    let smooth_plus = wilder_smooth(&plus_dm, period);
    let smooth_minus = wilder_smooth(&minus_dm, period);

    let mut plus_di = vec![f64::NAN; n];
    let mut minus_di = vec![f64::NAN; n];
    let mut dx = vec![f64::NAN; n];

    for i in 0..n {
        let tr = smooth_tr[i];
        if tr.is_nan() || smooth_plus[i].is_nan() || smooth_minus[i].is_nan() || tr == 0.0 {
            continue;
        }
        plus_di[i] = 100.0 * smooth_plus[i] / tr;
        minus_di[i] = 100.0 * smooth_minus[i] / tr;
        let di_sum = plus_di[i] + minus_di[i];
        dx[i] = if di_sum == 0.0 {
            0.0
        } else {
            100.0 * (plus_di[i] - minus_di[i]).abs() / di_sum
        };
    }

    let adx = wilder_smooth(&dx, period);
    [adx, plus_di, minus_di]
}

impl Indicator for Adx {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        match self.line {
            AdxLine::Adx => 2 * self.period - 1,
            AdxLine::PlusDi | AdxLine::MinusDi => self.period,
        }
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let [adx, plus_di, minus_di] = directional_lines(bars, self.period);
        match self.line {
            AdxLine::Adx => adx,
            AdxLine::PlusDi => plus_di,
            AdxLine::MinusDi => minus_di,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_ohlc_bars, DEFAULT_EPSILON};

    #[test]
    fn true_range_basic() {
        let bars = make_ohlc_bars(&[
            (100.0, 105.0, 95.0, 102.0),
            (102.0, 108.0, 100.0, 106.0), // max(8, |108-102|, |100-102|) = 8
            (106.0, 107.0, 98.0, 99.0),   // max(9, |107-106|, |98-106|) = 9
        ]);
        let tr = true_range(&bars);
        assert!(tr[0].is_nan());
        assert_approx(tr[1], 8.0, DEFAULT_EPSILON);
        assert_approx(tr[2], 9.0, DEFAULT_EPSILON);
    }

    #[test]
    fn adx_bounds() {
        let bars = make_ohlc_bars(&[
            (100.0, 105.0, 95.0, 102.0),
            (102.0, 108.0, 100.0, 106.0),
            (106.0, 107.0, 98.0, 99.0),
            (99.0, 103.0, 97.0, 101.0),
            (101.0, 106.0, 100.0, 105.0),
            (105.0, 110.0, 103.0, 108.0),
            (108.0, 112.0, 106.0, 110.0),
            (110.0, 111.0, 104.0, 105.0),
            (105.0, 109.0, 103.0, 107.0),
            (107.0, 113.0, 105.0, 112.0),
        ]);
        let [adx, plus_di, minus_di] = directional_lines(&bars, 3);
        for v in adx.iter().chain(&plus_di).chain(&minus_di).filter(|v| !v.is_nan()) {
            assert!((0.0..=100.0).contains(v), "out of bounds: {v}");
        }
    }

    #[test]
    fn strong_uptrend_has_plus_di_dominant() {
        let data: Vec<_> = (0..40)
            .map(|i| {
                let base = 100.0 + i as f64 * 5.0;
                (base - 1.0, base + 3.0, base - 3.0, base + 2.0)
            })
            .collect();
        let bars = make_ohlc_bars(&data);
        let [adx, plus_di, minus_di] = directional_lines(&bars, 14);
        assert!(plus_di[39] > minus_di[39]);
        assert!(adx[39] > 25.0, "ADX should be elevated in a strong trend, got {}", adx[39]);
    }

    #[test]
    fn warmup_matches_lookback() {
        let data: Vec<_> = (0..60)
            .map(|i| {
                let base = 100.0 + (i as f64 * 0.4).sin() * 6.0;
                (base, base + 2.0, base - 2.0, base + 0.5)
            })
            .collect();
        let bars = make_ohlc_bars(&data);
        for line in [AdxLine::Adx, AdxLine::PlusDi, AdxLine::MinusDi] {
            let ind = Adx::new(14, line);
            let out = ind.compute(&bars);
            let first = out.iter().position(|v| !v.is_nan()).unwrap();
            assert_eq!(first, ind.lookback(), "{}", ind.name());
        }
    }

    #[test]
    fn too_few_bars() {
        let bars = make_ohlc_bars(&[(100.0, 105.0, 95.0, 102.0)]);
        let [adx, plus_di, _] = directional_lines(&bars, 3);
        assert!(adx.iter().all(|v| v.is_nan()));
        assert!(plus_di.iter().all(|v| v.is_nan()));
    }
}
