#![no_main]
use brainvoyager::{Document, VoisDefinition};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(voi) = VoisDefinition::from_text(text) {
            let _ = voi.colours();
            let _ = voi.to_text();
        }
    }
});
