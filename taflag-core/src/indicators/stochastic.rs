//! Stochastic oscillator (slow form).
//!
//! raw = 100 * (close - lowest_low) / (highest_high - lowest_low) over `k_period`
//! %K  = SMA(raw, smooth)
//! %D  = SMA(%K, d_period)
//!
//! A flat range (highest == lowest) leaves raw undefined.
//! Lookback: k_period + smooth - 2 for %K, plus d_period - 1 for %D.

use super::window::{rolling_max, rolling_mean, rolling_min};
use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StochasticLine {
    K,
    D,
}

#[derive(Debug, Clone)]
pub struct Stochastic {
    k_period: usize,
    d_period: usize,
    smooth: usize,
    line: StochasticLine,
    name: String,
}

impl Stochastic {
    pub fn new(k_period: usize, d_period: usize, smooth: usize, line: StochasticLine) -> Self {
        assert!(
            k_period >= 1 && d_period >= 1 && smooth >= 1,
            "Stochastic periods must be >= 1"
        );
        let prefix = match line {
            StochasticLine::K => "stoch_k",
            StochasticLine::D => "stoch_d",
        };
        Self {
            k_period,
            d_period,
            smooth,
            line,
            name: format!("{prefix}_{k_period}_{d_period}_{smooth}"),
        }
    }
}

/// Compute (%K, %D).
pub fn stochastic_lines(
    bars: &[Bar],
    k_period: usize,
    d_period: usize,
    smooth: usize,
) -> [Vec<f64>; 2] {
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
    let highest = rolling_max(&highs, k_period);
    let lowest = rolling_min(&lows, k_period);

    let raw: Vec<f64> = bars
        .iter()
        .zip(highest.iter().zip(&lowest))
        .map(|(bar, (&hh, &ll))| {
            let range = hh - ll;
            if range.is_nan() || range == 0.0 {
                f64::NAN
            } else {
                100.0 * (bar.close - ll) / range
            }
        })
        .collect();

    let k = rolling_mean(&raw, smooth);
    let d = rolling_mean(&k, d_period);
    [k, d]
}

impl Indicator for Stochastic {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        let k = self.k_period + self.smooth - 2;
        match self.line {
            StochasticLine::K => k,
            StochasticLine::D => k + self.d_period - 1,
        }
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let [k, d] = stochastic_lines(bars, self.k_period, self.d_period, self.smooth);
        match self.line {
            StochasticLine::K => k,
            StochasticLine::D => d,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn stochastic_warmup_matches_lookback() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + (i as f64 * 0.7).sin() * 4.0).collect();
        let bars = make_bars(&closes);
        for line in [StochasticLine::K, StochasticLine::D] {
            let ind = Stochastic::new(14, 3, 3, line);
            let out = ind.compute(&bars);
            let first = out.iter().position(|v| !v.is_nan()).unwrap();
            assert_eq!(first, ind.lookback());
        }
        assert_eq!(Stochastic::new(14, 3, 3, StochasticLine::K).lookback(), 15);
        assert_eq!(Stochastic::new(14, 3, 3, StochasticLine::D).lookback(), 17);
    }

    #[test]
    fn close_in_upper_part_of_range() {
        // make_bars: high = max(open, close) + 1, so a steady climb keeps
        // the close one point below the top of the window.
        let closes: Vec<f64> = (0..10).map(|i| 10.0 + i as f64).collect();
        let [k, _] = stochastic_lines(&make_bars(&closes), 3, 1, 1);
        // window of bars 7..=9: lows 15,16,17 → LL 15; highs 18,19,20 → HH 20
        assert_approx(k[9], 100.0 * (19.0 - 15.0) / 5.0, DEFAULT_EPSILON);
    }

    #[test]
    fn oscillator_bounded() {
        let closes: Vec<f64> = (0..40).map(|i| 50.0 + (i as f64).cos() * 10.0).collect();
        let [k, d] = stochastic_lines(&make_bars(&closes), 14, 3, 3);
        for v in k.iter().chain(&d).filter(|v| !v.is_nan()) {
            assert!((0.0..=100.0).contains(v));
        }
    }
}
