//! Numbered PNG export.
//!
//! Bitmaps are drawn at 2x on a white page with the paper margins, the same
//! way [`PrintLog::read_as_image`](crate::paper::PrintLog::read_as_image)
//! draws the whole ring. A page is closed once it holds `max_height` source
//! rows and the next bitmap goes to the next free `name.NNNN.png`.

use super::PrintSink;
use crate::color::Rgba;
use crate::event::{LogLevel, emit_log};
use crate::paper::{PAPER_MARGIN, PAPER_WIDTH, Patch};
use crate::raster::PixelBuffer;
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Sequence numbers wrap after `.9999.png`.
const SEQUENCE_LIMIT: u32 = 10_000;

const SCALE: u32 = 2;

struct Page {
    path: PathBuf,
    file: File,
    image: PixelBuffer,
    rows: usize,
}

/// Spools bitmaps into a series of PNG files.
pub struct PngSink {
    base: PathBuf,
    max_height: usize,
    seq: u32,
    page: Option<Page>,
}

impl PngSink {
    /// `path` names the series; a `.png` extension and an existing sequence
    /// number are stripped before numbering.
    pub fn new(path: impl AsRef<Path>, max_height: usize) -> Self {
        Self {
            base: sequence_base(path.as_ref()),
            max_height,
            seq: 0,
            page: None,
        }
    }

    /// File the next bitmap will be appended to, if a page is open.
    #[must_use]
    pub fn current_path(&self) -> Option<&Path> {
        self.page.as_ref().map(|page| page.path.as_path())
    }

    /// Rows on the open page, in unscaled pixels.
    #[must_use]
    pub fn current_rows(&self) -> usize {
        self.page.as_ref().map_or(0, |page| page.rows)
    }

    /// Encode the open page, if any, and return its path.
    pub fn finish(&mut self) -> io::Result<Option<PathBuf>> {
        let Some(page) = self.page.take() else {
            return Ok(None);
        };
        let mut out = BufWriter::new(page.file);
        page.image.write_png(&mut out)?;
        out.flush()?;
        Ok(Some(page.path))
    }

    /// Drop the open page without encoding it and remove its file.
    pub(crate) fn discard(mut self) {
        if let Some(page) = self.page.take() {
            drop(page.file);
            if let Err(e) = std::fs::remove_file(&page.path) {
                emit_log(
                    LogLevel::Warn,
                    &format!("failed to remove {}: {e}", page.path.display()),
                );
            }
        }
    }

    fn open_page(&mut self) -> io::Result<Page> {
        for _ in 0..SEQUENCE_LIMIT {
            self.seq = (self.seq + 1) % SEQUENCE_LIMIT;
            let path = numbered(&self.base, self.seq);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => {
                    return Ok(Page {
                        path,
                        file,
                        image: PixelBuffer::filled(PAPER_WIDTH as u32 * SCALE, 0, Rgba::WHITE),
                        rows: 0,
                    });
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
                Err(e) => return Err(e),
            }
        }
        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("no free sequence number for {}", self.base.display()),
        ))
    }
}

impl PrintSink for PngSink {
    fn spool_bitmap_as_image(&mut self, patch: &Patch<'_>) -> io::Result<()> {
        let height = patch.rows().len();
        if height == 0 {
            return Ok(());
        }
        if self
            .page
            .as_ref()
            .is_some_and(|page| page.rows + height > self.max_height)
        {
            self.finish()?;
        }
        let page = match self.page.take() {
            Some(page) => page,
            None => self.open_page()?,
        };
        let page = self.page.insert(page);

        let mut block = PixelBuffer::filled(page.image.width, height as u32 * SCALE, Rgba::WHITE);
        for (dy, y) in patch.rows().enumerate() {
            for (dx, x) in patch.columns().enumerate() {
                if patch.pixel(x, y) {
                    let px = (dx + PAPER_MARGIN) as u32;
                    block.set_scaled(px, dy as u32, SCALE, Rgba::BLACK);
                }
            }
        }
        page.image.append_rows(&block);
        page.rows += height;
        Ok(())
    }
}

impl Drop for PngSink {
    fn drop(&mut self) {
        if let Err(e) = self.finish() {
            emit_log(LogLevel::Error, &format!("failed to finish image: {e}"));
        }
    }
}

impl std::fmt::Debug for PngSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PngSink")
            .field("base", &self.base)
            .field("max_height", &self.max_height)
            .field("seq", &self.seq)
            .field("current_path", &self.current_path())
            .finish()
    }
}

/// Strip `.png`, then trailing digits and one `.`, from `path`'s file name.
fn sequence_base(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut stem = name.as_str();
    if let Some(split) = stem.len().checked_sub(4) {
        if stem.get(split..).is_some_and(|ext| ext.eq_ignore_ascii_case(".png")) {
            stem = &stem[..split];
        }
    }
    stem = stem.trim_end_matches(|c: char| c.is_ascii_digit());
    stem = stem.strip_suffix('.').unwrap_or(stem);
    if stem.is_empty() {
        stem = "printout";
    }
    path.with_file_name(stem)
}

fn numbered(base: &Path, seq: u32) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(format!(".{seq:04}.png"));
    PathBuf::from(name)
}
