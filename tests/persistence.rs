//! File-based persistence tests: atomic save, restore, and corrupt-state
//! fallback.

use printtape::paper::{LCD_ROW_BYTES, LCD_WIDTH, PRINT_WIDTH, ROW_BYTES, TEXT_LINE_HEIGHT};
use printtape::{LogLevel, Patch, PrintLog, load, load_or_empty, save, save_to_path};
use proptest::prelude::*;
use std::fs;
use std::sync::{Arc, Mutex};

fn print_line(log: &mut PrintLog, text: &str, fill: u8) {
    let bits = [fill; ROW_BYTES * TEXT_LINE_HEIGHT];
    let patch = Patch::new(&bits, ROW_BYTES, PRINT_WIDTH, TEXT_LINE_HEIGHT);
    log.append(&patch, Some(text.as_bytes()));
}

fn print_graphics(log: &mut PrintLog, fill: u8) {
    print_graphics_rows(log, 16, fill);
}

/// A graphics event whose patch may be shorter than the 16 rows it is credited.
fn print_graphics_rows(log: &mut PrintLog, rows: usize, fill: u8) {
    let bits = vec![fill; LCD_ROW_BYTES * rows];
    log.append(&Patch::new(&bits, LCD_ROW_BYTES, LCD_WIDTH, rows), None);
}

#[derive(Clone, Debug)]
enum Event {
    Line(u8),
    Graphics(usize, u8),
    Clear,
}

fn event() -> impl Strategy<Value = Event> {
    prop_oneof![
        200 => any::<u8>().prop_map(Event::Line),
        150 => (1..=16usize, any::<u8>()).prop_map(|(rows, fill)| Event::Graphics(rows, fill)),
        1 => Just(Event::Clear),
    ]
}

fn round_trip(log: &PrintLog) -> PrintLog {
    let mut bytes = Vec::new();
    save(log, &mut bytes).unwrap();
    load(bytes.as_slice()).unwrap()
}

#[test]
fn test_save_to_path_and_load_or_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("print.state");

    let mut log = PrintLog::new();
    print_line(&mut log, "   12.5000 ENTER", 0x11);
    print_graphics(&mut log, 0x81);
    print_line(&mut log, "   3.0000 *", 0x22);
    save_to_path(&log, &path).unwrap();

    assert!(!dir.path().join("print.state.tmp").exists());
    let restored = load_or_empty(&path);
    assert_eq!(restored.row_count(), log.row_count());
    assert_eq!(restored.pixel_height(), log.pixel_height());
    assert_eq!(restored.text_transcript(), log.text_transcript());
    assert_eq!(restored.read_as_image(), log.read_as_image());
}

#[test]
fn test_save_replaces_previous_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("print.state");

    let mut log = PrintLog::new();
    print_line(&mut log, "first", 0);
    save_to_path(&log, &path).unwrap();
    log.clear();
    save_to_path(&log, &path).unwrap();

    assert_eq!(fs::read(&path).unwrap(), vec![0; 12]);
    assert!(load_or_empty(&path).is_empty());
}

#[test]
fn test_short_graphics_after_clear_round_trips() {
    let mut log = PrintLog::new();
    // Wrap the bitmap ring so every slot has held inked rows.
    for _ in 0..1000 {
        print_line(&mut log, "", 0xFF);
    }
    log.clear();
    print_graphics_rows(&mut log, 1, 0);

    let restored = round_trip(&log);
    assert!(restored.transcript().eq(log.transcript()));
    assert_eq!(restored.text_transcript(), log.text_transcript());
    assert!(!log.text_transcript().contains('\u{2588}'));
}

#[test]
fn test_missing_file_is_empty_without_warning() {
    let dir = tempfile::tempdir().unwrap();
    let log = load_or_empty(dir.path().join("never-written"));
    assert!(log.is_empty());
    assert_eq!(log.text_transcript(), "");
}

#[test]
fn test_corrupt_file_falls_back_to_empty_and_warns() {
    let warnings = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&warnings);
    printtape::set_log_callback(move |level, msg| {
        if level == LogLevel::Warn {
            sink.lock().unwrap().push(msg.to_string());
        }
    });

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("print.state");
    // Claims 36 bitmap bytes and then ends.
    fs::write(&path, 36i32.to_be_bytes()).unwrap();

    let log = load_or_empty(&path);
    assert!(log.is_empty());
    let warnings = warnings.lock().unwrap();
    assert!(
        warnings
            .iter()
            .any(|w| w.contains("print.state") && w.contains("corrupt")),
        "{warnings:?}"
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn save_load_preserves_both_projections(
        events in prop::collection::vec(event(), 0..1200),
    ) {
        let mut log = PrintLog::new();
        for (i, event) in events.iter().enumerate() {
            match *event {
                Event::Line(fill) => print_line(&mut log, &format!("{i:>8} {fill}"), fill),
                Event::Graphics(rows, fill) => print_graphics_rows(&mut log, rows, fill),
                Event::Clear => log.clear(),
            }
        }

        let restored = round_trip(&log);

        prop_assert!(restored.transcript().eq(log.transcript()));
        prop_assert_eq!(restored.text_transcript(), log.text_transcript());
        prop_assert_eq!(restored.read_as_image(), log.read_as_image());
        prop_assert_eq!(restored.pixel_height(), log.pixel_height());
        prop_assert_eq!(restored.row_count(), log.row_count());
    }

    #[test]
    fn arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = load(bytes.as_slice());
    }
}
