//! Rolling-window helpers shared by the band, channel and oscillator indicators.
//!
//! Every helper returns a series of the same length as its input. A window
//! that is not yet full, or that contains a NaN, yields NaN.

/// Apply `f` to every full, NaN-free window of `period` values.
pub fn rolling<F>(values: &[f64], period: usize, f: F) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 || n < period {
        return result;
    }

    for i in (period - 1)..n {
        let window = &values[i + 1 - period..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        result[i] = f(window);
    }

    result
}

pub fn rolling_mean(values: &[f64], period: usize) -> Vec<f64> {
    rolling(values, period, |w| w.iter().sum::<f64>() / period as f64)
}

pub fn rolling_max(values: &[f64], period: usize) -> Vec<f64> {
    rolling(values, period, |w| {
        w.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    })
}

pub fn rolling_min(values: &[f64], period: usize) -> Vec<f64> {
    rolling(values, period, |w| w.iter().copied().fold(f64::INFINITY, f64::min))
}

/// Mean absolute deviation around the window mean.
pub fn rolling_mean_abs_dev(values: &[f64], period: usize) -> Vec<f64> {
    rolling(values, period, |w| {
        let mean = w.iter().sum::<f64>() / period as f64;
        w.iter().map(|v| (v - mean).abs()).sum::<f64>() / period as f64
    })
}

/// Displace a series `offset` bars forward: `out[i] = values[i - offset]`.
///
/// The value computed at bar t is plotted at bar t + offset, so only past
/// data ever lands on a bar.
pub fn shift_forward(values: &[f64], offset: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    for i in offset..n {
        result[i] = values[i - offset];
    }
    result
}
