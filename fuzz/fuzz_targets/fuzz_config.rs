//! Fuzz target for analysis config parsing and validation.
//!
//! Bin ranges come straight from the input, so this also exercises edge
//! generation with extreme start/stop/step values.

#![no_main]

use bva_config::{validate_config, AnalysisConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(config) = AnalysisConfig::from_json_str(s) {
            let _ = validate_config(&config);
        }
    }
});
