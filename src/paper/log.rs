//! The append-only, size-bounded print log.

use super::{
    BitmapRing, GRAPHICS_HEIGHT, LCD_ROW_BYTES, LCD_WIDTH, PAPER_MARGIN, PAPER_WIDTH, PRINT_WIDTH,
    Patch, PixelRow, ROW_BYTES, TEXT_LINE_HEIGHT, TextRecord, TextRing,
};
use crate::color::Rgba;
use crate::raster::{ClipRect, PixelBuffer};
use crate::redraw::{Redraw, RedrawCoalescer};
use crate::spool::{PrintSink, TextSink};
use std::io;

/// Bytes in the bitmap block standing in for one graphics marker.
const BLOCK_BYTES: usize = GRAPHICS_HEIGHT * LCD_ROW_BYTES;

/// One item of the text projection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TranscriptItem {
    /// A transcript line, verbatim.
    Text(Vec<u8>),
    /// The 16 pixel rows a graphics marker refers to, `LCD_ROW_BYTES` per row.
    Bitmap(Vec<u8>),
}

impl TranscriptItem {
    /// View a bitmap item as a patch for export.
    #[must_use]
    pub fn as_patch(&self) -> Option<Patch<'_>> {
        match self {
            Self::Bitmap(bits) => Some(Patch::new(bits, LCD_ROW_BYTES, LCD_WIDTH, GRAPHICS_HEIGHT)),
            Self::Text(_) => None,
        }
    }
}

/// Bounded log of print events, kept as pixels and as transcripts.
///
/// The log is an owned value: build it with [`PrintLog::new`] or
/// [`persist::load`](super::persist::load), hand it to whatever drives the
/// printer, and save it again at shutdown. All mutation goes through
/// `&mut self`, so calls are serialized by construction.
pub struct PrintLog {
    bitmap: BitmapRing,
    text: TextRing,
    redraw: Option<RedrawCoalescer>,
}

impl PrintLog {
    /// Create an empty log with no redraw target.
    #[must_use]
    pub fn new() -> Self {
        Self::from_rings(BitmapRing::new(), TextRing::new())
    }

    pub(crate) fn from_rings(bitmap: BitmapRing, text: TextRing) -> Self {
        Self {
            bitmap,
            text,
            redraw: None,
        }
    }

    /// Send redraw requests for every later mutation to `coalescer`.
    pub fn attach_redraw(&mut self, coalescer: RedrawCoalescer) {
        self.redraw = Some(coalescer);
    }

    /// Stop sending redraw requests.
    pub fn detach_redraw(&mut self) -> Option<RedrawCoalescer> {
        self.redraw.take()
    }

    /// Record one print event.
    ///
    /// Every row of the patch region is widened to a full [`PixelRow`] and
    /// pushed into the bitmap ring. Exactly one text record is pushed: the
    /// transcript if there is one, a graphics marker otherwise. Returns the
    /// redraw pass the change needs, which is also forwarded to the attached
    /// coalescer.
    pub fn append(&mut self, patch: &Patch<'_>, transcript: Option<&[u8]>) -> Redraw {
        let old_rows = self.bitmap.row_count();
        for y in patch.rows() {
            self.bitmap.push_row(&PixelRow::from_patch(patch, y));
        }

        let record = transcript.map_or(TextRecord::Graphics, |text| TextRecord::Line(text.to_vec()));
        self.text.push_record(&record);
        self.text.evict_if_over_capacity();

        let redraw = if self.bitmap.row_count() == old_rows {
            Redraw::Paint
        } else {
            Redraw::Layout
        };
        self.notify(redraw);
        redraw
    }

    /// Feed one blank text line, as the printer's paper-advance key does.
    pub fn advance(&mut self) -> Redraw {
        let blank = [0u8; ROW_BYTES * TEXT_LINE_HEIGHT];
        let patch = Patch::new(&blank, ROW_BYTES, PRINT_WIDTH, TEXT_LINE_HEIGHT);
        self.append(&patch, Some(&[]))
    }

    /// Drop everything and request a layout pass.
    pub fn clear(&mut self) {
        self.bitmap.clear();
        self.text.clear();
        self.notify(Redraw::Layout);
    }

    /// Walk the text ring from oldest to newest.
    ///
    /// Text records yield their payload. Graphics markers yield the 16 pixel
    /// rows found in the bitmap ring at the marker's cumulative pixel
    /// position, counted up from the newest bitmap row. Rows outside the live
    /// bitmap read as blank. The walk borrows the log and can be repeated.
    pub fn transcript(&self) -> impl Iterator<Item = TranscriptItem> + '_ {
        // Records can reach above the oldest bitmap row once the rings have
        // evicted independently, or after a clear. Those rows read as blank.
        let base = self.bitmap.row_count();
        let height = self.text.pixel_height();
        let mut offset = 0;
        self.text.records().map(move |record| {
            let at = base + offset;
            offset += record.height();
            match record {
                TextRecord::Line(payload) => TranscriptItem::Text(payload),
                TextRecord::Graphics => {
                    let mut block = Vec::with_capacity(BLOCK_BYTES);
                    for v in 0..GRAPHICS_HEIGHT {
                        let row = (at + v)
                            .checked_sub(height)
                            .and_then(|i| self.bitmap.read_row(i))
                            .unwrap_or_default();
                        block.extend_from_slice(&row.as_bytes()[..LCD_ROW_BYTES]);
                    }
                    TranscriptItem::Bitmap(block)
                }
            }
        })
    }

    /// Hand the text projection to an export sink.
    ///
    /// Lines go to [`PrintSink::spool_text`]. Each graphics block goes to
    /// [`PrintSink::spool_bitmap_as_text`] as eight 2-row slices.
    pub fn read_as_text(&self, sink: &mut dyn PrintSink) -> io::Result<()> {
        for item in self.transcript() {
            match &item {
                TranscriptItem::Text(payload) => sink.spool_text(payload)?,
                TranscriptItem::Bitmap(_) => {
                    let Some(block) = item.as_patch() else {
                        continue;
                    };
                    for v in (0..GRAPHICS_HEIGHT).step_by(2) {
                        sink.spool_bitmap_as_text(&block.region(0, v, LCD_WIDTH, 2))?;
                    }
                }
            }
        }
        Ok(())
    }

    /// The text projection as a string, for the clipboard.
    #[must_use]
    pub fn text_transcript(&self) -> String {
        let mut sink = TextSink::new(Vec::new());
        // Writing into a Vec cannot fail.
        let _ = self.read_as_text(&mut sink);
        String::from_utf8_lossy(&sink.into_inner()).replace('\r', "")
    }

    /// The whole bitmap ring as an image, each dot drawn as a 2x2 block.
    ///
    /// The image is `2 * PAPER_WIDTH` wide with the margins left white.
    #[must_use]
    pub fn read_as_image(&self) -> PixelBuffer {
        let height = self.bitmap.row_count() as u32 * 2;
        let mut image = PixelBuffer::filled(PAPER_WIDTH as u32 * 2, height, Rgba::WHITE);
        for (y, row) in self.bitmap.iter().enumerate() {
            for x in 0..PRINT_WIDTH {
                if row.get(x) {
                    image.set_scaled((x + PAPER_MARGIN) as u32, y as u32, 2, Rgba::BLACK);
                }
            }
        }
        image
    }

    /// Render part of the paper at 1x for on-screen painting.
    ///
    /// Rows below the last printed row are drawn in the view background.
    #[must_use]
    pub fn render_clip(&self, clip: ClipRect) -> PixelBuffer {
        let mut image = PixelBuffer::filled(clip.width, clip.height, Rgba::PAPER_BACKGROUND);
        for dy in 0..clip.height {
            let Some(row) = self.bitmap.read_row(clip.y.saturating_add(dy) as usize) else {
                break;
            };
            for dx in 0..clip.width {
                let set = (clip.x.saturating_add(dx) as usize)
                    .checked_sub(PAPER_MARGIN)
                    .is_some_and(|x| x < PRINT_WIDTH && row.get(x));
                image.set(dx, dy, Rgba::ink(set));
            }
        }
        image
    }

    /// Rows currently held by the bitmap ring.
    #[must_use]
    pub const fn row_count(&self) -> usize {
        self.bitmap.row_count()
    }

    /// Height of the paper view in pixels; the same as [`row_count`](Self::row_count).
    #[must_use]
    pub const fn print_height(&self) -> usize {
        self.bitmap.row_count()
    }

    /// Pixel height credited to the live text records.
    #[must_use]
    pub const fn pixel_height(&self) -> usize {
        self.text.pixel_height()
    }

    /// `true` when nothing has been printed since the last clear.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bitmap.is_empty()
    }

    #[must_use]
    pub const fn bitmap(&self) -> &BitmapRing {
        &self.bitmap
    }

    #[must_use]
    pub const fn text(&self) -> &TextRing {
        &self.text
    }

    fn notify(&self, redraw: Redraw) {
        if let Some(coalescer) = &self.redraw {
            coalescer.request(redraw);
        }
    }
}

impl Default for PrintLog {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PrintLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrintLog")
            .field("bitmap", &self.bitmap)
            .field("text", &self.text)
            .field("redraw", &self.redraw.is_some())
            .finish()
    }
}
