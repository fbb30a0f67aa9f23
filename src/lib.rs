//! `printtape` - paper-tape print buffer for calculator emulators
//!
//! Keeps the recent print-out of an emulated thermal printer in two bounded
//! rings: a bitmap of 1-bit pixel rows for display, and a record of text
//! lines and graphics markers for text export. Older output is evicted as new
//! output arrives. The whole state can be compacted to a file and restored,
//! and on-screen redraws are coalesced so a fast producer cannot flood the UI.

// Crate-level lint configuration
#![warn(unsafe_code)]
#![allow(clippy::cast_possible_truncation)] // Pixel coordinates fit in u32
#![allow(clippy::cast_sign_loss)] // Intentional coordinate conversions
#![allow(clippy::cast_precision_loss)] // Intentional for color math
#![allow(clippy::cast_possible_wrap)] // Persisted lengths are bounded well below i32::MAX
#![allow(clippy::module_name_repetitions)] // Allow paper::PaperX etc
#![allow(clippy::missing_errors_doc)] // Docs WIP
#![allow(clippy::missing_panics_doc)] // Docs WIP
#![allow(clippy::missing_const_for_fn)] // Many functions could be const, not critical
#![allow(clippy::doc_markdown)] // Allow technical names without backticks
#![allow(clippy::use_self)] // Allow explicit type names in impl blocks
#![allow(clippy::needless_pass_by_value)] // Allow pass by value for small Copy types
#![allow(clippy::collapsible_if)] // Sometimes nested ifs are clearer
#![allow(clippy::cast_lossless)] // as casts are fine for primitive widening
#![allow(clippy::items_after_statements)] // Common pattern in tests
#![allow(clippy::redundant_clone)] // Clones in tests for clarity are fine
#![allow(clippy::semicolon_if_nothing_returned)] // Style preference

pub mod color;
pub mod error;
pub mod event;
pub mod paper;
pub mod raster;
pub mod redraw;
pub mod spool;

// Re-export core types at crate root
pub use color::Rgba;
pub use error::{Error, Result, SinkKind};
pub use event::{LogLevel, emit_log, emit_notice, set_log_callback, set_notice_callback};
pub use paper::persist::{load, load_or_empty, save, save_to_path};
pub use paper::{BitmapRing, Patch, PixelRow, PrintLog, TextRecord, TextRing, TranscriptItem};
pub use raster::{ClipRect, PixelBuffer};
pub use redraw::{Passes, Redraw, RedrawCoalescer, RedrawTarget, UiExecutor, UiTask, UiThread};
pub use spool::{PngSink, PrintSink, SpoolOptions, Spooler, TextSink};
