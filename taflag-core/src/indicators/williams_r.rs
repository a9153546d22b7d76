//! Williams %R.
//!
//! %R = -100 * (highest_high - close) / (highest_high - lowest_low)
//! Range: [-100, 0]. A flat range leaves the value undefined.
//! Lookback: period - 1.

use super::window::{rolling_max, rolling_min};
use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct WilliamsR {
    period: usize,
    name: String,
}

impl WilliamsR {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "Williams %R period must be >= 1");
        Self {
            period,
            name: format!("williams_r_{period}"),
        }
    }
}

impl Indicator for WilliamsR {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
        let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
        let highest = rolling_max(&highs, self.period);
        let lowest = rolling_min(&lows, self.period);

        bars.iter()
            .zip(highest.iter().zip(&lowest))
            .map(|(bar, (&hh, &ll))| {
                let range = hh - ll;
                if range.is_nan() || range == 0.0 {
                    f64::NAN
                } else {
                    -100.0 * (hh - bar.close) / range
                }
            })
            .collect()
    }
}
