//! Sub-burst segmentation.
//!
//! A burst's photons are cut into consecutive, non-overlapping windows of
//! `n` photons. Each window yields `acceptor_count / n`. The trailing window
//! may hold fewer than `n` photons; it is kept and still divided by `n`.

use bva_common::{Error, Result, StreamLabel};
use std::slice::Chunks;

/// Iterator over the window ratios of one burst.
#[derive(Debug, Clone)]
pub struct SubBursts<'a> {
    chunks: Chunks<'a, StreamLabel>,
    acceptor: StreamLabel,
    denominator: f64,
}

impl<'a> SubBursts<'a> {
    /// Window the label sequence. `window_size` must be at least 1.
    pub fn new(labels: &'a [StreamLabel], window_size: usize, acceptor: StreamLabel) -> Result<Self> {
        if window_size == 0 {
            return Err(Error::InvalidWindowSize(window_size));
        }
        Ok(SubBursts {
            chunks: labels.chunks(window_size),
            acceptor,
            denominator: window_size as f64,
        })
    }
}

impl Iterator for SubBursts<'_> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        let chunk = self.chunks.next()?;
        let acceptor = chunk.iter().filter(|&&l| l == self.acceptor).count();
        Some(acceptor as f64 / self.denominator)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

impl ExactSizeIterator for SubBursts<'_> {}

/// Window ratios of one burst, in order.
pub fn sub_burst_ratios(
    labels: &[StreamLabel],
    window_size: usize,
    acceptor: StreamLabel,
) -> Result<Vec<f64>> {
    Ok(SubBursts::new(labels, window_size, acceptor)?.collect())
}

/// Number of windows for a burst of `burst_size` photons: `ceil(size / n)`.
pub fn window_count(burst_size: usize, window_size: usize) -> usize {
    if window_size == 0 {
        return 0;
    }
    burst_size.div_ceil(window_size)
}
