//! Fuzz target for the CSV photon-table reader.
//!
//! Anything that parses must also group into bursts and analyze without
//! panicking.

#![no_main]

use bva_core::analysis::{analyze, AnalysisParams};
use bva_core::binning::BinEdges;
use bva_core::input::{parse_bytes, InputFormat};
use bva_core::stream::PhotonStream;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(records) = parse_bytes(data, InputFormat::Csv) else {
        return;
    };
    let Ok(stream) = PhotonStream::from_records(records) else {
        return;
    };
    let edges = BinEdges::new(vec![0.0, 0.25, 0.5, 0.75, 1.0]).expect("static edges");
    let params = AnalysisParams::new(3, edges, 0).expect("static params");
    let _ = analyze(&stream, &params);
});
