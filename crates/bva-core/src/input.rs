//! Photon-table readers.
//!
//! Two formats carry the same three fields per photon (`burst`, `ph`,
//! `stream`):
//! - CSV with a header row, as exported from a burst search. Extra columns
//!   (e.g. `timestamp`) are ignored and `#` lines are comments.
//! - JSON Lines, one object per photon. Blank lines are skipped.
//!
//! Rows are numbered from 1 in error messages.

use crate::stream::PhotonStream;
use bva_common::{BurstId, Error, PhotonRecord, Result, StreamLabel};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::{BufRead, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Photon-table file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    Csv,
    Jsonl,
}

impl InputFormat {
    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<InputFormat> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" | "txt" => Some(InputFormat::Csv),
            "jsonl" | "ndjson" => Some(InputFormat::Jsonl),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InputFormat::Csv => "csv",
            InputFormat::Jsonl => "jsonl",
        }
    }
}

impl std::fmt::Display for InputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row as written in the file, before validation.
#[derive(Debug, Default, Deserialize)]
struct PhotonRow {
    #[serde(default)]
    burst: Option<u64>,
    #[serde(default)]
    ph: Option<u32>,
    #[serde(default)]
    stream: Option<String>,
}

impl PhotonRow {
    fn into_record(self, row: usize) -> Result<PhotonRecord> {
        let missing = |field: &str| Error::MissingField {
            field: field.to_string(),
            row,
        };
        let burst = self.burst.ok_or_else(|| missing("burst"))?;
        let ph = self.ph.ok_or_else(|| missing("ph"))?;
        let value = self.stream.ok_or_else(|| missing("stream"))?;
        if value.trim().is_empty() {
            return Err(missing("stream"));
        }
        let stream = StreamLabel::parse(&value).ok_or(Error::UnknownStream { value, row })?;
        Ok(PhotonRecord::new(BurstId(burst), ph, stream))
    }
}

/// Parse a CSV photon table.
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<PhotonRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (i, row) in reader.deserialize::<PhotonRow>().enumerate() {
        let row = row.map_err(|e| Error::Csv(e.to_string()))?;
        records.push(row.into_record(i + 1)?);
    }
    Ok(records)
}

/// Parse a JSON Lines photon table.
pub fn parse_jsonl<R: BufRead>(reader: R) -> Result<Vec<PhotonRecord>> {
    let mut records = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let row: PhotonRow = serde_json::from_str(line).map_err(|e| Error::InvalidRow {
            row: i + 1,
            reason: e.to_string(),
        })?;
        records.push(row.into_record(i + 1)?);
    }
    Ok(records)
}

/// Parse an in-memory photon table.
pub fn parse_bytes(bytes: &[u8], format: InputFormat) -> Result<Vec<PhotonRecord>> {
    match format {
        InputFormat::Csv => parse_csv(bytes),
        InputFormat::Jsonl => parse_jsonl(bytes),
    }
}

/// A photon table read from disk, with provenance.
#[derive(Debug, Clone)]
pub struct PhotonTable {
    pub path: PathBuf,
    pub format: InputFormat,
    /// Hex SHA-256 of the raw file bytes.
    pub sha256: String,
    pub records: Vec<PhotonRecord>,
}

impl PhotonTable {
    pub fn num_rows(&self) -> usize {
        self.records.len()
    }

    /// Group the records into bursts.
    pub fn into_stream(self) -> Result<PhotonStream> {
        PhotonStream::from_records(self.records)
    }
}

/// Read a photon table, taking the format from `format` or the extension.
pub fn read_photon_table(path: &Path, format: Option<InputFormat>) -> Result<PhotonTable> {
    let format = format.or_else(|| InputFormat::from_path(path)).ok_or_else(|| {
        Error::Config(format!(
            "cannot infer input format of {}; pass --input-format csv|jsonl",
            path.display()
        ))
    })?;

    let bytes = std::fs::read(path)?;
    let sha256 = hex::encode(Sha256::digest(&bytes));
    let records = parse_bytes(&bytes, format)?;
    debug!(
        path = %path.display(),
        format = %format,
        rows = records.len(),
        sha256 = %sha256,
        "photon table loaded"
    );

    Ok(PhotonTable {
        path: path.to_path_buf(),
        format,
        sha256,
        records,
    })
}
