//! Numerically careful reductions over slices.
//!
//! These are the reference (two-pass) versions of the statistics that
//! [`RunningMoments`](crate::RunningMoments) computes incrementally.

/// Compensated (Neumaier) summation.
///
/// Returns 0.0 for empty input. NaN propagates.
pub fn compensated_sum(values: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut compensation = 0.0;
    for &v in values {
        let t = sum + v;
        if sum.abs() >= v.abs() {
            compensation += (sum - t) + v;
        } else {
            compensation += (v - t) + sum;
        }
        sum = t;
    }
    sum + compensation
}

/// Arithmetic mean.
///
/// Returns NAN for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    compensated_sum(values) / values.len() as f64
}

/// Population variance (divides by `len`, not `len - 1`).
///
/// Two-pass: the mean is computed first, then the squared deviations are
/// summed. A single value has variance exactly 0. Returns NAN for empty input.
pub fn population_variance(values: &[f64]) -> f64 {
    match values.len() {
        0 => f64::NAN,
        1 => {
            if values[0].is_nan() {
                f64::NAN
            } else {
                0.0
            }
        }
        len => {
            let m = mean(values);
            let mut acc = 0.0;
            for &v in values {
                let d = v - m;
                acc += d * d;
            }
            acc / len as f64
        }
    }
}

/// Population standard deviation, `sqrt(population_variance)`.
pub fn population_std(values: &[f64]) -> f64 {
    population_variance(values).sqrt()
}

/// Drop NaN and infinite values.
pub fn finite_only(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| v.is_finite()).collect()
}
