//! Fuzz target for print events.
//!
//! Patches with arbitrary geometry and short bitmaps must not panic, and the
//! rings must stay within their budgets.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use printtape::paper::MAX_HEIGHT;
use printtape::{ClipRect, Patch, PrintLog};

#[derive(Arbitrary, Debug)]
struct Event {
    bits: Vec<u8>,
    bytes_per_row: u8,
    x: u8,
    y: u8,
    width: u8,
    height: u8,
    transcript: Option<Vec<u8>>,
}

fuzz_target!(|events: Vec<Event>| {
    let mut log = PrintLog::new();
    for event in events.iter().take(512) {
        let patch = Patch::new(
            &event.bits,
            usize::from(event.bytes_per_row),
            usize::from(event.x) + usize::from(event.width),
            usize::from(event.y) + usize::from(event.height),
        )
        .region(
            usize::from(event.x),
            usize::from(event.y),
            usize::from(event.width),
            usize::from(event.height),
        );
        log.append(&patch, event.transcript.as_deref());

        assert!(log.row_count() <= MAX_HEIGHT);
        assert!(log.pixel_height() <= MAX_HEIGHT);
    }

    let _ = log.text_transcript();
    let _ = log.render_clip(ClipRect::new(0, 0, 179, 64));
});
