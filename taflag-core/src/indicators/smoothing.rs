//! Recursive smoothers: exponential (alpha = 2/(n+1)) and Wilder (alpha = 1/n).
//!
//! Both skip the leading warm-up NaNs of their input, seed with the simple mean
//! of the first `period` valid values, and taint everything after a later NaN.

/// Index of the first run of `period` consecutive non-NaN values.
fn seed_start(values: &[f64], period: usize) -> Option<usize> {
    let mut run = 0;
    for (i, v) in values.iter().enumerate() {
        if v.is_nan() {
            run = 0;
            continue;
        }
        run += 1;
        if run == period {
            return Some(i + 1 - period);
        }
    }
    None
}

fn recursive_smooth(values: &[f64], period: usize, alpha: f64) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 || n < period {
        return result;
    }

    let Some(start) = seed_start(values, period) else {
        return result;
    };
    let seed_end = start + period;

    let seed = values[start..seed_end].iter().sum::<f64>() / period as f64;
    result[seed_end - 1] = seed;

    let mut prev = seed;
    for i in seed_end..n {
        if values[i].is_nan() {
            // NaN propagates: once seen, subsequent values are tainted
            for val in result.iter_mut().skip(i) {
                *val = f64::NAN;
            }
            return result;
        }
        let smoothed = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = smoothed;
        prev = smoothed;
    }

    result
}

/// EMA of an arbitrary series. Used by MACD for both lines.
pub fn ema_of_series(values: &[f64], period: usize) -> Vec<f64> {
    recursive_smooth(values, period, 2.0 / (period as f64 + 1.0))
}

/// Wilder smoothing. Used by ADX for TR, +DM, -DM and DX.
pub fn wilder_smooth(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 {
        return vec![f64::NAN; values.len()];
    }
    recursive_smooth(values, period, 1.0 / period as f64)
}
