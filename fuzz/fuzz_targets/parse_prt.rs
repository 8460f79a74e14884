#![no_main]
use brainvoyager::{Document, StimulationProtocol};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(mut prt) = StimulationProtocol::from_text(text) {
            let _ = prt.event_list();
            let _ = prt.condition_durations();
            let _ = prt.to_text();
            prt.convert_to_msec(2000.);
        }
    }
});
