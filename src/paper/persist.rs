//! Compacted on-disk form of a [`PrintLog`].
//!
//! Both rings are written linearized, oldest byte first, so the file does not
//! depend on where the rings happened to wrap:
//!
//! ```text
//! i32 BE  bitmap_len          occupied bitmap bytes, a multiple of ROW_BYTES
//! [u8]    bitmap bytes        top..bottom
//! i32 BE  text_len            occupied text bytes
//! i32 BE  text_pixel_height   sum of live record heights
//! [u8]    text bytes          text_top..text_bottom
//! ```
//!
//! Loading places both rings at offset 0. A truncated file or a length out
//! of range is [`Error::CorruptState`]; [`load_or_empty`] turns that into an
//! empty print-out.

use super::{BitmapRing, MAX_HEIGHT, PrintLog, ROW_BYTES, TEXT_BYTES, TextRing};
use crate::error::{Error, Result};
use crate::event::{LogLevel, emit_log};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Write `log` in the compacted layout.
pub fn save<W: Write>(log: &PrintLog, mut out: W) -> io::Result<()> {
    let bitmap = log.bitmap();
    write_len(&mut out, bitmap.byte_len())?;
    let (head, tail) = bitmap.as_slices();
    out.write_all(head)?;
    out.write_all(tail)?;

    let text = log.text();
    write_len(&mut out, text.byte_len())?;
    write_len(&mut out, text.pixel_height())?;
    let (head, tail) = text.as_slices();
    out.write_all(head)?;
    out.write_all(tail)?;
    out.flush()
}

/// Read a log written by [`save`].
///
/// The returned log has no redraw target attached.
pub fn load<R: Read>(mut input: R) -> Result<PrintLog> {
    let bitmap_len = read_i32(&mut input, "bitmap length")?;
    let bitmap_len = usize::try_from(bitmap_len)
        .ok()
        .filter(|&n| n <= MAX_HEIGHT * ROW_BYTES && n % ROW_BYTES == 0)
        .ok_or_else(|| Error::corrupt(format!("bitmap length {bitmap_len}")))?;
    let mut bitmap = vec![0; bitmap_len];
    read_exact(&mut input, &mut bitmap, "bitmap")?;

    let text_len = read_i32(&mut input, "text length")?;
    let text_len = usize::try_from(text_len)
        .ok()
        .filter(|&n| n < TEXT_BYTES)
        .ok_or_else(|| Error::corrupt(format!("text length {text_len}")))?;
    let pixel_height = read_i32(&mut input, "text pixel height")?;
    let pixel_height = usize::try_from(pixel_height)
        .map_err(|_| Error::corrupt(format!("text pixel height {pixel_height}")))?;
    let mut text = vec![0; text_len];
    read_exact(&mut input, &mut text, "text")?;

    let text = TextRing::from_linear(&text, pixel_height).map_err(Error::CorruptState)?;
    Ok(PrintLog::from_rings(BitmapRing::from_linear(&bitmap), text))
}

/// Save to `path`, replacing it atomically.
///
/// The state is written to a sibling `.tmp` file first and renamed over
/// `path`, so a crash mid-write leaves the previous file intact.
pub fn save_to_path(log: &PrintLog, path: impl AsRef<Path>) -> io::Result<()> {
    let path = path.as_ref();
    let mut temp = path.as_os_str().to_owned();
    temp.push(".tmp");

    let file = File::create(&temp)?;
    let mut out = BufWriter::new(file);
    save(log, &mut out)?;
    out.into_inner().map_err(io::IntoInnerError::into_error)?.sync_all()?;
    fs::rename(&temp, path)
}

/// Load from `path`, falling back to an empty log.
///
/// A missing file is the normal first-run case. Anything else that stops
/// the state from loading is logged and the print-out starts empty.
#[must_use]
pub fn load_or_empty(path: impl AsRef<Path>) -> PrintLog {
    let path = path.as_ref();
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return PrintLog::new(),
        Err(e) => {
            emit_log(
                LogLevel::Warn,
                &format!("cannot open print-out state {}: {e}", path.display()),
            );
            return PrintLog::new();
        }
    };

    match load(BufReader::new(file)) {
        Ok(log) => log,
        Err(e) => {
            emit_log(
                LogLevel::Warn,
                &format!("discarding print-out state {}: {e}", path.display()),
            );
            PrintLog::new()
        }
    }
}

fn write_len<W: Write>(out: &mut W, n: usize) -> io::Result<()> {
    let n = i32::try_from(n)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "length exceeds i32"))?;
    out.write_all(&n.to_be_bytes())
}

fn read_i32<R: Read>(input: &mut R, what: &str) -> Result<i32> {
    let mut buf = [0u8; 4];
    read_exact(input, &mut buf, what)?;
    Ok(i32::from_be_bytes(buf))
}

fn read_exact<R: Read>(input: &mut R, buf: &mut [u8], what: &str) -> Result<()> {
    input.read_exact(buf).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            Error::corrupt(format!("{what} truncated"))
        } else {
            Error::Io(e)
        }
    })
}
