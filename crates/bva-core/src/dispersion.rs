//! Per-burst dispersion (the burst's BVA value).

use bva_math::population_std;

/// Population standard deviation of a burst's window ratios.
///
/// Zero for a single window (and for no windows).
pub fn burst_dispersion(ratios: &[f64]) -> f64 {
    if ratios.len() <= 1 {
        return 0.0;
    }
    population_std(ratios)
}
