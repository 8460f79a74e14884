#![no_main]
use brainvoyager::sdm::{DesignMatrix, ReaderOptions};
use brainvoyager::Document;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(sdm) = DesignMatrix::from_text(text) {
            let _ = sdm.data();
            let _ = sdm.data_array();
            let _ = sdm.to_text();
        }
        let _ = ReaderOptions::new().column_width(12).read_text(text);
    }
});
