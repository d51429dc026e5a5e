//! Whole-burst ("raw") transfer efficiency.

use crate::stream::Burst;
use bva_common::StreamLabel;

/// Fraction of `acceptor` photons in a label sequence, or None when empty.
pub fn acceptor_fraction(labels: &[StreamLabel], acceptor: StreamLabel) -> Option<f64> {
    if labels.is_empty() {
        return None;
    }
    let na = labels.iter().filter(|&&l| l == acceptor).count();
    Some(na as f64 / labels.len() as f64)
}

/// Raw efficiency `E = N_acceptor / burst_size`, in `[0, 1]`.
///
/// A [`Burst`] always has at least one photon, so this is total.
pub fn raw_efficiency(burst: &Burst, acceptor: StreamLabel) -> f64 {
    burst.count(acceptor) as f64 / burst.len() as f64
}
