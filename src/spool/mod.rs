//! Export of print events to files.
//!
//! A [`Spooler`] owns the [`PrintLog`] and up to two sinks: a text file
//! that receives transcripts (or quadrant-block art for bitmaps without one)
//! and a numbered PNG series. A sink that fails to write is switched off and
//! the user is told once through [`emit_notice`]; printing to the log goes
//! on regardless.

mod image;
mod text;

pub use image::PngSink;
pub use text::{TextSink, bitmap_lines};

use crate::error::{Error, SinkKind};
use crate::event::{LogLevel, emit_log, emit_notice};
use crate::paper::{PRINT_WIDTH, Patch, PrintLog, ROW_BYTES, TEXT_LINE_HEIGHT};
use crate::redraw::Redraw;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter};
use std::path::PathBuf;

/// Destination for the two projections of a print-out.
///
/// Every method defaults to doing nothing, so a sink only implements the
/// projections it stores.
pub trait PrintSink {
    /// One transcript line, without a line terminator.
    fn spool_text(&mut self, text: &[u8]) -> io::Result<()> {
        let _ = text;
        Ok(())
    }

    /// A bitmap with no transcript, to be rendered as text.
    fn spool_bitmap_as_text(&mut self, patch: &Patch<'_>) -> io::Result<()> {
        let _ = patch;
        Ok(())
    }

    /// A bitmap to be rendered as an image.
    fn spool_bitmap_as_image(&mut self, patch: &Patch<'_>) -> io::Result<()> {
        let _ = patch;
        Ok(())
    }
}

/// Which sinks a [`Spooler`] writes to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpoolOptions {
    /// Append every print event to `text_path`.
    pub print_to_text: bool,
    pub text_path: PathBuf,
    /// Draw every bitmap into the PNG series named by `image_path`.
    pub print_to_image: bool,
    pub image_path: PathBuf,
    /// Unscaled rows per PNG file before a new one is started.
    pub max_image_height: usize,
}

impl Default for SpoolOptions {
    fn default() -> Self {
        Self {
            print_to_text: false,
            text_path: PathBuf::from("printout.txt"),
            print_to_image: false,
            image_path: PathBuf::from("printout.png"),
            max_image_height: 256,
        }
    }
}

/// The print log plus its file exports.
pub struct Spooler {
    log: PrintLog,
    options: SpoolOptions,
    text: Option<TextSink<BufWriter<File>>>,
    image: Option<PngSink>,
    last_error: Option<Error>,
}

impl Spooler {
    /// Sinks are opened lazily on the first event they receive.
    pub fn new(log: PrintLog, options: SpoolOptions) -> Self {
        Self {
            log,
            options,
            text: None,
            image: None,
            last_error: None,
        }
    }

    /// Record a print event and forward it to the enabled sinks.
    pub fn print(&mut self, patch: &Patch<'_>, transcript: Option<&[u8]>) -> Redraw {
        let redraw = self.log.append(patch, transcript);

        if self.options.print_to_text {
            if let Err(e) = self.spool_to_text(patch, transcript) {
                self.disable(SinkKind::Text, e);
            }
        }
        if self.options.print_to_image {
            if let Err(e) = self.spool_to_image(patch) {
                self.disable(SinkKind::Image, e);
            }
        }
        redraw
    }

    /// Feed the paper by one blank text line.
    pub fn advance(&mut self) -> Redraw {
        let blank = [0u8; ROW_BYTES * TEXT_LINE_HEIGHT];
        let patch = Patch::new(&blank, ROW_BYTES, PRINT_WIDTH, TEXT_LINE_HEIGHT);
        self.print(&patch, Some(&[]))
    }

    /// Switch to new options.
    ///
    /// A sink that is turned off or pointed at another file is closed first;
    /// the image series restarts its numbering.
    pub fn reconfigure(&mut self, options: SpoolOptions) -> crate::Result<()> {
        let text_changed = !options.print_to_text || options.text_path != self.options.text_path;
        let image_changed = !options.print_to_image
            || options.image_path != self.options.image_path
            || options.max_image_height != self.options.max_image_height;
        self.options = options;

        let mut result = Ok(());
        if text_changed {
            if let Some(mut sink) = self.text.take() {
                result = result.and(sink.flush().map_err(Error::Io));
            }
        }
        if image_changed {
            if let Some(mut sink) = self.image.take() {
                result = result.and(sink.finish().map(drop).map_err(Error::Io));
            }
        }
        result
    }

    /// Flush the text file and encode the open image page.
    pub fn close(&mut self) -> crate::Result<()> {
        let mut result = Ok(());
        if let Some(mut sink) = self.text.take() {
            result = result.and(sink.flush().map_err(Error::Io));
        }
        if let Some(mut sink) = self.image.take() {
            result = result.and(sink.finish().map(drop).map_err(Error::Io));
        }
        result
    }

    #[must_use]
    pub const fn options(&self) -> &SpoolOptions {
        &self.options
    }

    #[must_use]
    pub const fn log(&self) -> &PrintLog {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut PrintLog {
        &mut self.log
    }

    /// Close the sinks and hand back the log.
    pub fn into_log(mut self) -> PrintLog {
        if let Err(e) = self.close() {
            emit_log(LogLevel::Error, &format!("closing print sinks: {e}"));
        }
        std::mem::take(&mut self.log)
    }

    /// The most recent sink failure, cleared on read.
    pub fn take_error(&mut self) -> Option<Error> {
        self.last_error.take()
    }

    fn spool_to_text(&mut self, patch: &Patch<'_>, transcript: Option<&[u8]>) -> io::Result<()> {
        let sink = match self.text.take() {
            Some(sink) => sink,
            None => open_text(&self.options.text_path)?,
        };
        let sink = self.text.insert(sink);
        match transcript {
            Some(text) => sink.spool_text(text)?,
            None => sink.spool_bitmap_as_text(patch)?,
        }
        sink.flush()
    }

    fn spool_to_image(&mut self, patch: &Patch<'_>) -> io::Result<()> {
        let sink = self.image.get_or_insert_with(|| {
            PngSink::new(&self.options.image_path, self.options.max_image_height)
        });
        sink.spool_bitmap_as_image(patch)
    }

    fn disable(&mut self, kind: SinkKind, source: io::Error) {
        let path = match kind {
            SinkKind::Text => {
                self.text = None;
                self.options.print_to_text = false;
                self.options.text_path.clone()
            }
            SinkKind::Image => {
                if let Some(sink) = self.image.take() {
                    sink.discard();
                }
                self.options.print_to_image = false;
                self.options.image_path.clone()
            }
        };
        emit_notice(&format!(
            "An error occurred while printing to {}: {source}\nPrinting to {kind} disabled.",
            path.display()
        ));
        let err = Error::Export { sink: kind, source };
        emit_log(LogLevel::Error, &err.to_string());
        self.last_error = Some(err);
    }
}

impl Drop for Spooler {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            emit_log(LogLevel::Error, &format!("closing print sinks: {e}"));
        }
    }
}

impl std::fmt::Debug for Spooler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Spooler")
            .field("log", &self.log)
            .field("options", &self.options)
            .field("image", &self.image)
            .finish_non_exhaustive()
    }
}

fn open_text(path: &std::path::Path) -> io::Result<TextSink<BufWriter<File>>> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(TextSink::new(BufWriter::new(file)))
}
