#![no_main]
use brainvoyager::mdm::DesignMatrix;
use brainvoyager::Document;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(mdm) = DesignMatrix::from_text(text) {
            let _ = mdm.transformation();
            let _ = mdm.to_text();
        }
    }
});
