#![no_main]
use brainvoyager::{ContrastsDefinition, Document};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(ctr) = ContrastsDefinition::from_text(text) {
            let _ = ctr.data();
            let _ = ctr.to_text();
        }
    }
});
