use crate::error::{GaitError, Result};

/// Mean of a slice, NaN when empty
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Evenly spaced values over `[start, stop]`, endpoints included
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { stop } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Piecewise-linear interpolation of `(xp, fp)` at `x`
///
/// `xp` must be ascending. Values outside the sampled range clamp to the
/// first or last sample.
pub fn interp(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    debug_assert_eq!(xp.len(), fp.len());
    let n = xp.len();
    if n == 0 {
        return f64::NAN;
    }
    if x <= xp[0] {
        return fp[0];
    }
    if x >= xp[n - 1] {
        return fp[n - 1];
    }

    // First index with xp[j] > x; bounds above guarantee 1 <= j < n
    let j = xp.partition_point(|&v| v <= x);
    let (x0, x1) = (xp[j - 1], xp[j]);
    let (y0, y1) = (fp[j - 1], fp[j]);
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

/// Round half to even, the convention used for fractional sample indices
pub fn round_index(x: f64) -> f64 {
    x.round_ties_even()
}

/// Last element of an ascending sequence lying strictly inside `(lower, upper)`
///
/// Both toe-off and heel-strike matching inside a gait cycle use this
/// search, so the "most recent candidate wins" rule lives in one place.
pub fn find_last_between(sorted: &[usize], lower: usize, upper: usize) -> Option<usize> {
    let below_upper = sorted.partition_point(|&v| v < upper);
    if below_upper == 0 {
        return None;
    }
    let candidate = sorted[below_upper - 1];
    (candidate > lower).then_some(candidate)
}

/// Mean sampling interval of a time vector
///
/// # Errors
/// Returns `GaitError::InvalidTimeBase` for fewer than two samples or a time
/// vector that is not strictly increasing
pub fn mean_sample_interval(time: &[f64]) -> Result<f64> {
    if time.len() < 2 {
        return Err(GaitError::InvalidTimeBase(format!(
            "need at least 2 samples, have {}",
            time.len()
        )));
    }
    if let Some(i) = time.windows(2).position(|w| !(w[1] > w[0])) {
        return Err(GaitError::InvalidTimeBase(format!(
            "time not strictly increasing at sample {}",
            i + 1
        )));
    }
    Ok((time[time.len() - 1] - time[0]) / (time.len() - 1) as f64)
}
