//! Plain-text export.
//!
//! Transcript lines are written as-is. Bitmaps are drawn with Unicode
//! quadrant blocks, one character per 2x2 dots, so a 16-row display snapshot
//! becomes eight lines of text.

use super::PrintSink;
use crate::paper::Patch;
use std::io::{self, Write};

/// Unicode block characters for 2x2 quadrant rendering.
///
/// Index bits: `0b0001` top-left, `0b0010` top-right, `0b0100` bottom-left,
/// `0b1000` bottom-right.
const QUADRANT_CHARS: [char; 16] = [
    ' ', '▘', '▝', '▀', '▖', '▌', '▞', '▛', '▗', '▚', '▐', '▜', '▄', '▙', '▟', '█',
];

/// Writes the text projection to any [`Write`].
#[derive(Debug)]
pub struct TextSink<W: Write> {
    out: W,
}

impl<W: Write> TextSink<W> {
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

impl<W: Write> PrintSink for TextSink<W> {
    fn spool_text(&mut self, text: &[u8]) -> io::Result<()> {
        self.out.write_all(text)?;
        self.out.write_all(b"\n")
    }

    fn spool_bitmap_as_text(&mut self, patch: &Patch<'_>) -> io::Result<()> {
        for line in bitmap_lines(patch) {
            self.out.write_all(line.as_bytes())?;
            self.out.write_all(b"\n")?;
        }
        Ok(())
    }
}

/// Render a patch region as quadrant-block lines, trailing blanks trimmed.
#[must_use]
pub fn bitmap_lines(patch: &Patch<'_>) -> Vec<String> {
    let rows = patch.rows();
    let cols = patch.columns();
    let lit = |x: usize, y: usize| cols.contains(&x) && rows.contains(&y) && patch.pixel(x, y);

    rows.clone()
        .step_by(2)
        .map(|y| {
            let line: String = cols
                .clone()
                .step_by(2)
                .map(|x| {
                    let mut mask = 0usize;
                    if lit(x, y) {
                        mask |= 0b0001;
                    }
                    if lit(x + 1, y) {
                        mask |= 0b0010;
                    }
                    if lit(x, y + 1) {
                        mask |= 0b0100;
                    }
                    if lit(x + 1, y + 1) {
                        mask |= 0b1000;
                    }
                    QUADRANT_CHARS[mask]
                })
                .collect();
            line.trim_end().to_string()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadrant_chars() {
        assert_eq!(QUADRANT_CHARS[0b0000], ' ');
        assert_eq!(QUADRANT_CHARS[0b1111], '█');
        assert_eq!(QUADRANT_CHARS[0b0011], '▀');
        assert_eq!(QUADRANT_CHARS[0b1100], '▄');
    }

    #[test]
    fn test_text_line() {
        let mut sink = TextSink::new(Vec::new());
        sink.spool_text(b"  1.0000 ***").unwrap();
        assert_eq!(sink.into_inner(), b"  1.0000 ***\n");
    }

    #[test]
    fn test_bitmap_two_rows_per_line() {
        // 4x4: top-left 2x2 solid, bottom-right dot only.
        let bits = [0b0011, 0b0011, 0b0000, 0b1000];
        let patch = Patch::new(&bits, 1, 4, 4);
        assert_eq!(bitmap_lines(&patch), vec!["█".to_string(), " ▗".to_string()]);
    }

    #[test]
    fn test_bitmap_odd_height_and_region() {
        // Region starts at column 1, so column 0 must not leak in.
        let bits = [0b0000_0011];
        let patch = Patch::new(&bits, 1, 8, 1).region(1, 0, 3, 1);
        assert_eq!(bitmap_lines(&patch), vec!["▘".to_string()]);
    }

    #[test]
    fn test_sink_writes_bitmap_lines() {
        let bits = [0xFF; 4];
        let patch = Patch::new(&bits, 1, 4, 4);
        let mut sink = TextSink::new(Vec::new());
        sink.spool_bitmap_as_text(&patch).unwrap();
        assert_eq!(String::from_utf8(sink.into_inner()).unwrap(), "██\n██\n");
    }
}
