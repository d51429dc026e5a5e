//! Fuzz target for the JSON Lines photon-table reader.

#![no_main]

use bva_core::input::{parse_bytes, InputFormat};
use bva_core::stream::PhotonStream;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(records) = parse_bytes(data, InputFormat::Jsonl) {
        let _ = PhotonStream::from_records(records);
    }
});
