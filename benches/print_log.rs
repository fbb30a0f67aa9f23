//! Print log performance benchmarks.

#![allow(clippy::semicolon_if_nothing_returned)]

use criterion::{Criterion, criterion_group, criterion_main};
use printtape::paper::{LCD_ROW_BYTES, LCD_WIDTH, PRINT_WIDTH, ROW_BYTES, TEXT_LINE_HEIGHT};
use printtape::{ClipRect, Patch, PrintLog, load, save};
use std::hint::black_box;

fn full_log() -> PrintLog {
    let mut log = PrintLog::new();
    let bits = [0x5A; ROW_BYTES * TEXT_LINE_HEIGHT];
    let lcd = [0xC3; LCD_ROW_BYTES * 16];
    for i in 0..1200 {
        if i % 4 == 0 {
            log.append(&Patch::new(&lcd, LCD_ROW_BYTES, LCD_WIDTH, 16), None);
        } else {
            let text = format!("{i:>12} ENTER");
            log.append(
                &Patch::new(&bits, ROW_BYTES, PRINT_WIDTH, TEXT_LINE_HEIGHT),
                Some(text.as_bytes()),
            );
        }
    }
    log
}

fn append(c: &mut Criterion) {
    let bits = [0x5A; ROW_BYTES * TEXT_LINE_HEIGHT];
    let patch = Patch::new(&bits, ROW_BYTES, PRINT_WIDTH, TEXT_LINE_HEIGHT);

    c.bench_function("append_text_line_full_ring", |b| {
        let mut log = full_log();
        b.iter(|| log.append(black_box(&patch), Some(black_box(b"   1.0000 ENTER"))));
    });

    let lcd = [0xC3; LCD_ROW_BYTES * 16];
    let graphics = Patch::new(&lcd, LCD_ROW_BYTES, LCD_WIDTH, 16);
    c.bench_function("append_graphics_full_ring", |b| {
        let mut log = full_log();
        b.iter(|| log.append(black_box(&graphics), None));
    });
}

fn read(c: &mut Criterion) {
    let log = full_log();

    c.bench_function("text_transcript_full_ring", |b| {
        b.iter(|| black_box(log.text_transcript()))
    });

    c.bench_function("render_clip_screen", |b| {
        let clip = ClipRect::new(0, 4000, 179, 480);
        b.iter(|| black_box(log.render_clip(black_box(clip))))
    });
}

fn persist(c: &mut Criterion) {
    let log = full_log();
    let mut bytes = Vec::new();
    save(&log, &mut bytes).unwrap();

    c.bench_function("save_full_ring", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(bytes.len());
            save(black_box(&log), &mut out).unwrap();
            out
        })
    });

    c.bench_function("load_full_ring", |b| {
        b.iter(|| load(black_box(bytes.as_slice())).unwrap())
    });
}

criterion_group!(benches, append, read, persist);
criterion_main!(benches);
