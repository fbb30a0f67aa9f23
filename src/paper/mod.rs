//! Bounded paper-tape storage.
//!
//! A print-out is kept twice: as monochrome pixel rows in a [`BitmapRing`] and
//! as one record per print event in a [`TextRing`]. [`PrintLog`] appends to
//! both from the same event stream and lets each ring evict on its own terms:
//! the bitmap ring by row count, the text ring by credited pixel height.
//!
//! # Geometry
//!
//! ```text
//! |<- 18 ->|<------------- 143 printable px ------------->|<- 18 ->|
//! | margin |  row = 18 bytes, bit (x & 7) of byte (x >> 3) | margin |
//! ```
//!
//! Text records are credited 9 px and graphics markers 16 px, which matches
//! how tall the corresponding rows are on paper. Both rings are therefore
//! bounded to roughly the same scroll window.

mod bitmap_ring;
mod log;
mod patch;
pub mod persist;
mod row;
mod text_ring;

pub use bitmap_ring::BitmapRing;
pub use log::{PrintLog, TranscriptItem};
pub use patch::Patch;
pub use row::PixelRow;
pub use text_ring::{TextRecord, TextRecords, TextRing};

/// Bytes per stored pixel row.
pub const ROW_BYTES: usize = 18;

/// Printable pixels per row.
pub const PRINT_WIDTH: usize = 143;

/// Row slots in the bitmap ring. One slot stays free so that a full ring
/// can be told apart from an empty one.
pub const ROWS_MAX: usize = 8192;

/// Largest transcript a text record can hold.
pub const MAX_TEXT_LEN: usize = 24;

/// Text ring size: enough 25-byte records to cover `ROWS_MAX` pixels of
/// 9 px lines, plus slack for the record that is being evicted.
pub const TEXT_BYTES: usize = ((ROWS_MAX + 27) / 9) * (MAX_TEXT_LEN + 1) + 1;

/// Pixel height credited to a text record.
pub const TEXT_LINE_HEIGHT: usize = 9;

/// Pixel height credited to a graphics marker.
pub const GRAPHICS_HEIGHT: usize = 16;

/// Header byte of a graphics marker.
pub const GRAPHICS_MARKER: u8 = 255;

/// Blank pixels on either side of the printable area.
pub const PAPER_MARGIN: usize = 18;

/// Paper width in pixels.
pub const PAPER_WIDTH: usize = PAPER_MARGIN + PRINT_WIDTH + PAPER_MARGIN;

/// Width of the display snapshot a graphics marker stands for.
pub const LCD_WIDTH: usize = 131;

/// Bytes per row of a graphics block handed to text export.
pub const LCD_ROW_BYTES: usize = 17;

/// Largest pixel height either ring keeps.
pub const MAX_HEIGHT: usize = ROWS_MAX - 1;
