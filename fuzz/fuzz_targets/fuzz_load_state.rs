//! Fuzz target for persisted print-out state.
//!
//! Arbitrary bytes must either load or be rejected as corrupt, never panic.
//! Anything that loads must survive a save and a second load unchanged.

#![no_main]

use libfuzzer_sys::fuzz_target;
use printtape::{load, save};

fuzz_target!(|data: &[u8]| {
    let Ok(log) = load(data) else {
        return;
    };

    let transcript = log.text_transcript();
    let _ = log.read_as_image();

    let mut bytes = Vec::new();
    save(&log, &mut bytes).expect("save to Vec cannot fail");
    let reloaded = load(bytes.as_slice()).expect("saved state must load");
    assert_eq!(reloaded.text_transcript(), transcript);
});
