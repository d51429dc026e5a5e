//! Photon stream model: photons grouped by burst.
//!
//! Built in one pass from photon records. Each burst owns its ordered label
//! sequence; bursts are immutable once the stream is built.

use bva_common::{BurstId, Error, PhotonRecord, Result, StreamLabel};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// One burst: an id and the labels of its photons in arrival order.
///
/// Always holds at least one photon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Burst {
    id: BurstId,
    labels: Vec<StreamLabel>,
}

impl Burst {
    /// Create a burst, rejecting an empty photon sequence.
    pub fn new(id: BurstId, labels: Vec<StreamLabel>) -> Result<Self> {
        if labels.is_empty() {
            return Err(Error::MalformedBurst {
                burst: id,
                reason: "burst has no photons".to_string(),
            });
        }
        Ok(Burst { id, labels })
    }

    pub fn id(&self) -> BurstId {
        self.id
    }

    pub fn labels(&self) -> &[StreamLabel] {
        &self.labels
    }

    /// Number of photons (burst size).
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Number of photons carrying `label`.
    pub fn count(&self, label: StreamLabel) -> usize {
        self.labels.iter().filter(|&&l| l == label).count()
    }
}

/// Read-only view of a burst-segmented photon stream.
///
/// Bursts are iterated in ascending id order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotonStream {
    bursts: BTreeMap<BurstId, Burst>,
    num_photons: usize,
}

impl PhotonStream {
    /// Group photon records by burst.
    ///
    /// Records of different bursts may interleave, but within a burst the
    /// `ph` positions must arrive as 0, 1, 2, ... with no gaps or repeats.
    pub fn from_records<I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = PhotonRecord>,
    {
        let mut grouped: BTreeMap<BurstId, Vec<StreamLabel>> = BTreeMap::new();
        let mut num_photons = 0usize;

        for record in records {
            let labels = grouped.entry(record.burst).or_default();
            if record.ph as usize != labels.len() {
                return Err(Error::MalformedBurst {
                    burst: record.burst,
                    reason: format!("expected photon {}, found {}", labels.len(), record.ph),
                });
            }
            labels.push(record.stream);
            num_photons += 1;
        }

        let bursts = grouped
            .into_iter()
            .map(|(id, labels)| Burst { id, labels })
            .map(|b| (b.id, b))
            .collect();

        Ok(PhotonStream {
            bursts,
            num_photons,
        })
    }

    /// Build a stream from already grouped bursts.
    pub fn from_bursts<I>(bursts: I) -> Result<Self>
    where
        I: IntoIterator<Item = (BurstId, Vec<StreamLabel>)>,
    {
        let mut map = BTreeMap::new();
        let mut num_photons = 0usize;

        for (id, labels) in bursts {
            let burst = Burst::new(id, labels)?;
            num_photons += burst.len();
            match map.entry(id) {
                Entry::Vacant(slot) => {
                    slot.insert(burst);
                }
                Entry::Occupied(_) => {
                    return Err(Error::MalformedBurst {
                        burst: id,
                        reason: "duplicate burst id".to_string(),
                    });
                }
            }
        }

        Ok(PhotonStream {
            bursts: map,
            num_photons,
        })
    }

    /// Distinct burst ids, ascending.
    pub fn burst_ids(&self) -> impl Iterator<Item = BurstId> + '_ {
        self.bursts.keys().copied()
    }

    pub fn get(&self, id: BurstId) -> Option<&Burst> {
        self.bursts.get(&id)
    }

    /// Ordered labels of one burst.
    pub fn labels(&self, id: BurstId) -> Option<&[StreamLabel]> {
        self.bursts.get(&id).map(Burst::labels)
    }

    /// Photon count of one burst.
    pub fn burst_len(&self, id: BurstId) -> Option<usize> {
        self.bursts.get(&id).map(Burst::len)
    }

    pub fn num_bursts(&self) -> usize {
        self.bursts.len()
    }

    pub fn num_photons(&self) -> usize {
        self.num_photons
    }

    pub fn is_empty(&self) -> bool {
        self.bursts.is_empty()
    }

    /// Bursts in ascending id order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Burst> + '_ {
        self.bursts.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bva_common::StreamLabel::{DexAem as A, DexDem as D};

    fn rec(burst: u64, ph: u32, stream: StreamLabel) -> PhotonRecord {
        PhotonRecord::new(burst, ph, stream)
    }

    #[test]
    fn groups_records_by_burst() {
        let stream = PhotonStream::from_records(vec![
            rec(0, 0, A),
            rec(0, 1, D),
            rec(1, 0, D),
            rec(0, 2, A),
        ])
        .unwrap();

        assert_eq!(stream.num_bursts(), 2);
        assert_eq!(stream.num_photons(), 4);
        assert_eq!(stream.labels(BurstId(0)), Some(&[A, D, A][..]));
        assert_eq!(stream.burst_len(BurstId(1)), Some(1));
        assert_eq!(stream.burst_ids().collect::<Vec<_>>(), vec![BurstId(0), BurstId(1)]);
    }

    #[test]
    fn burst_ids_are_sorted() {
        let stream =
            PhotonStream::from_records(vec![rec(7, 0, A), rec(2, 0, D), rec(5, 0, A)]).unwrap();
        let ids: Vec<u64> = stream.burst_ids().map(|b| b.0).collect();
        assert_eq!(ids, vec![2, 5, 7]);
    }

    #[test]
    fn gap_in_positions_is_rejected() {
        let err = PhotonStream::from_records(vec![rec(3, 0, A), rec(3, 2, D)]).unwrap_err();
        match err {
            Error::MalformedBurst { burst, reason } => {
                assert_eq!(burst, BurstId(3));
                assert!(reason.contains("expected photon 1, found 2"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn burst_not_starting_at_zero_is_rejected() {
        let err = PhotonStream::from_records(vec![rec(1, 1, A)]).unwrap_err();
        assert_eq!(err.code(), 11);
    }

    #[test]
    fn repeated_position_is_rejected() {
        assert!(PhotonStream::from_records(vec![rec(0, 0, A), rec(0, 0, A)]).is_err());
    }

    #[test]
    fn empty_burst_rejected_in_from_bursts() {
        let err = PhotonStream::from_bursts(vec![(BurstId(4), vec![])]).unwrap_err();
        assert!(matches!(err, Error::MalformedBurst { burst: BurstId(4), .. }));
    }

    #[test]
    fn duplicate_burst_rejected_in_from_bursts() {
        let err = PhotonStream::from_bursts(vec![(BurstId(1), vec![A]), (BurstId(1), vec![D])])
            .unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn empty_input_gives_empty_stream() {
        let stream = PhotonStream::from_records(Vec::new()).unwrap();
        assert!(stream.is_empty());
        assert_eq!(stream.num_photons(), 0);
    }

    #[test]
    fn burst_counts_labels() {
        let burst = Burst::new(BurstId(0), vec![A, A, D]).unwrap();
        assert_eq!(burst.count(A), 2);
        assert_eq!(burst.count(D), 1);
        assert_eq!(burst.len(), 3);
    }
}
