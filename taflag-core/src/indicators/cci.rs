//! Commodity Channel Index (CCI).
//!
//! TP  = (high + low + close) / 3
//! CCI = (TP - SMA(TP)) / (constant * mean_abs_dev(TP))
//!
//! Zero mean deviation leaves the value undefined.
//! Lookback: period - 1.

use super::window::{rolling_mean, rolling_mean_abs_dev};
use super::Indicator;
use crate::domain::Bar;

pub const DEFAULT_CCI_CONSTANT: f64 = 0.015;

#[derive(Debug, Clone)]
pub struct Cci {
    period: usize,
    constant: f64,
    name: String,
}

impl Cci {
    pub fn new(period: usize, constant: f64) -> Self {
        assert!(period >= 1, "CCI period must be >= 1");
        Self {
            period,
            constant,
            name: format!("cci_{period}"),
        }
    }
}

impl Indicator for Cci {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let typical: Vec<f64> = bars
            .iter()
            .map(|b| (b.high + b.low + b.close) / 3.0)
            .collect();
        let mean = rolling_mean(&typical, self.period);
        let mad = rolling_mean_abs_dev(&typical, self.period);

        typical
            .iter()
            .zip(mean.iter().zip(&mad))
            .map(|(&tp, (&m, &d))| {
                if d.is_nan() || d == 0.0 {
                    f64::NAN
                } else {
                    (tp - m) / (self.constant * d)
                }
            })
            .collect()
    }
}
