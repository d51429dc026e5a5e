//! Burst identity and photon stream labels.
//!
//! A photon belongs to exactly one burst and was recorded on one of the four
//! alternating-excitation detection channels. Labels are a closed enum so a
//! misspelled channel is rejected at parse time instead of silently counting
//! as "not acceptor".

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Burst identifier assigned by the upstream burst search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BurstId(pub u64);

impl fmt::Display for BurstId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for BurstId {
    fn from(id: u64) -> Self {
        BurstId(id)
    }
}

/// Detection stream (excitation laser / emission channel) of a photon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StreamLabel {
    /// Donor excitation, donor emission.
    DexDem,
    /// Donor excitation, acceptor emission (the FRET-sensitized channel).
    #[default]
    DexAem,
    /// Acceptor excitation, donor emission.
    AexDem,
    /// Acceptor excitation, acceptor emission.
    AexAem,
}

impl StreamLabel {
    /// All labels in canonical order.
    pub const ALL: &'static [StreamLabel] = &[
        StreamLabel::DexDem,
        StreamLabel::DexAem,
        StreamLabel::AexDem,
        StreamLabel::AexAem,
    ];

    /// Canonical label name as written by FRETBursts.
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamLabel::DexDem => "DexDem",
            StreamLabel::DexAem => "DexAem",
            StreamLabel::AexDem => "AexDem",
            StreamLabel::AexAem => "AexAem",
        }
    }

    /// Parse a label, ignoring ASCII case and surrounding whitespace.
    pub fn parse(s: &str) -> Option<StreamLabel> {
        let s = s.trim();
        StreamLabel::ALL
            .iter()
            .copied()
            .find(|label| label.as_str().eq_ignore_ascii_case(s))
    }

    /// True for photons recorded during donor excitation.
    pub fn is_donor_excitation(&self) -> bool {
        matches!(self, StreamLabel::DexDem | StreamLabel::DexAem)
    }
}

impl fmt::Display for StreamLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StreamLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StreamLabel::parse(s).ok_or_else(|| format!("unknown stream label: {}", s))
    }
}

/// One detected photon, already attributed to a burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotonRecord {
    /// Burst the photon belongs to.
    pub burst: BurstId,
    /// 0-based position of the photon within its burst.
    pub ph: u32,
    /// Detection stream.
    pub stream: StreamLabel,
}

impl PhotonRecord {
    pub fn new(burst: impl Into<BurstId>, ph: u32, stream: StreamLabel) -> Self {
        PhotonRecord {
            burst: burst.into(),
            ph,
            stream,
        }
    }
}
