//! Fixed-capacity circular store of transcript records.

use super::{
    GRAPHICS_HEIGHT, GRAPHICS_MARKER, MAX_HEIGHT, MAX_TEXT_LEN, TEXT_BYTES, TEXT_LINE_HEIGHT,
};

/// One print event as seen by the text ring.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextRecord {
    /// A transcript line, at most [`MAX_TEXT_LEN`] bytes.
    Line(Vec<u8>),
    /// A bitmap-only event; the pixels live in the bitmap ring.
    Graphics,
}

impl TextRecord {
    /// Pixel height credited to the record.
    #[must_use]
    pub const fn height(&self) -> usize {
        match self {
            Self::Line(_) => TEXT_LINE_HEIGHT,
            Self::Graphics => GRAPHICS_HEIGHT,
        }
    }

    /// Bytes the record occupies in the ring, header included.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        match self {
            Self::Line(payload) => 1 + payload.len().min(MAX_TEXT_LEN),
            Self::Graphics => 1,
        }
    }
}

/// Circular sequence of length-prefixed records bounded by pixel height.
///
/// Each record is a header byte followed by its payload. A header of
/// [`GRAPHICS_MARKER`] has no payload; any other header is the payload
/// length. Payloads may straddle the end of the array.
#[derive(Clone)]
pub struct TextRing {
    buf: Box<[u8]>,
    text_top: usize,
    text_bottom: usize,
    pixel_height: usize,
}

impl TextRing {
    /// Create an empty ring.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: vec![0; TEXT_BYTES].into_boxed_slice(),
            text_top: 0,
            text_bottom: 0,
            pixel_height: 0,
        }
    }

    /// Rebuild a ring from compacted records starting at offset 0.
    ///
    /// The records are walked once to check that they are well formed and
    /// that their heights add up to `pixel_height`.
    pub(crate) fn from_linear(bytes: &[u8], pixel_height: usize) -> Result<Self, String> {
        if bytes.len() >= TEXT_BYTES {
            return Err(format!("text length {} exceeds ring", bytes.len()));
        }
        if pixel_height > MAX_HEIGHT {
            return Err(format!("text pixel height {pixel_height} exceeds {MAX_HEIGHT}"));
        }

        let mut pos = 0;
        let mut height = 0;
        while pos < bytes.len() {
            let header = bytes[pos];
            if header == GRAPHICS_MARKER {
                height += GRAPHICS_HEIGHT;
                pos += 1;
                continue;
            }
            let len = usize::from(header);
            if len > MAX_TEXT_LEN {
                return Err(format!("text record of {len} bytes at offset {pos}"));
            }
            if pos + 1 + len > bytes.len() {
                return Err(format!("text record at offset {pos} runs past the end"));
            }
            height += TEXT_LINE_HEIGHT;
            pos += 1 + len;
        }
        if height != pixel_height {
            return Err(format!(
                "text pixel height {pixel_height} does not match records ({height})"
            ));
        }

        let mut ring = Self::new();
        ring.buf[..bytes.len()].copy_from_slice(bytes);
        ring.text_bottom = bytes.len();
        ring.pixel_height = pixel_height;
        Ok(ring)
    }

    /// Append a record at `text_bottom` and return the height it added.
    ///
    /// Line payloads longer than [`MAX_TEXT_LEN`] are truncated. Call
    /// [`evict_if_over_capacity`](Self::evict_if_over_capacity) afterwards.
    pub fn push_record(&mut self, record: &TextRecord) -> usize {
        match record {
            TextRecord::Graphics => self.put(&[GRAPHICS_MARKER]),
            TextRecord::Line(payload) => {
                let payload = &payload[..payload.len().min(MAX_TEXT_LEN)];
                self.put(&[payload.len() as u8]);
                self.put(payload);
            }
        }
        let height = record.height();
        self.pixel_height += height;
        height
    }

    /// Evict whole records from `text_top` until the height fits the budget.
    ///
    /// Returns the number of records evicted.
    pub fn evict_if_over_capacity(&mut self) -> usize {
        let mut evicted = 0;
        while self.pixel_height > MAX_HEIGHT {
            let header = self.buf[self.text_top];
            let (height, len) = if header == GRAPHICS_MARKER {
                (GRAPHICS_HEIGHT, 1)
            } else {
                (TEXT_LINE_HEIGHT, 1 + usize::from(header))
            };
            self.pixel_height -= height;
            self.text_top = (self.text_top + len) % TEXT_BYTES;
            evicted += 1;
        }
        evicted
    }

    /// Drop every record.
    pub fn clear(&mut self) {
        self.text_top = 0;
        self.text_bottom = 0;
        self.pixel_height = 0;
    }

    /// Sum of the heights of live records.
    #[must_use]
    pub const fn pixel_height(&self) -> usize {
        self.pixel_height
    }

    /// Occupied bytes between `text_top` and `text_bottom`.
    #[must_use]
    pub const fn byte_len(&self) -> usize {
        if self.text_bottom >= self.text_top {
            self.text_bottom - self.text_top
        } else {
            self.text_bottom + TEXT_BYTES - self.text_top
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.text_top == self.text_bottom
    }

    /// Walk live records from oldest to newest. Walking does not consume.
    #[must_use]
    pub fn records(&self) -> TextRecords<'_> {
        TextRecords {
            ring: self,
            pos: self.text_top,
            remaining: self.byte_len(),
        }
    }

    /// Live bytes as at most two slices, oldest first.
    #[must_use]
    pub fn as_slices(&self) -> (&[u8], &[u8]) {
        if self.text_top <= self.text_bottom {
            (&self.buf[self.text_top..self.text_bottom], &[])
        } else {
            (&self.buf[self.text_top..], &self.buf[..self.text_bottom])
        }
    }

    /// Live bytes copied out in order, discarding the wrap position.
    #[must_use]
    pub fn linearize(&self) -> Vec<u8> {
        let (head, tail) = self.as_slices();
        [head, tail].concat()
    }

    fn put(&mut self, bytes: &[u8]) {
        let first = bytes.len().min(TEXT_BYTES - self.text_bottom);
        self.buf[self.text_bottom..self.text_bottom + first].copy_from_slice(&bytes[..first]);
        let rest = &bytes[first..];
        self.buf[..rest.len()].copy_from_slice(rest);
        self.text_bottom = (self.text_bottom + bytes.len()) % TEXT_BYTES;
    }

    fn copy_out(&self, start: usize, len: usize) -> Vec<u8> {
        let first = len.min(TEXT_BYTES - start);
        let mut out = Vec::with_capacity(len);
        out.extend_from_slice(&self.buf[start..start + first]);
        out.extend_from_slice(&self.buf[..len - first]);
        out
    }
}

impl Default for TextRing {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TextRing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextRing")
            .field("text_top", &self.text_top)
            .field("text_bottom", &self.text_bottom)
            .field("pixel_height", &self.pixel_height)
            .finish_non_exhaustive()
    }
}

/// Iterator over the live records of a [`TextRing`].
#[derive(Clone, Debug)]
pub struct TextRecords<'a> {
    ring: &'a TextRing,
    pos: usize,
    remaining: usize,
}

impl Iterator for TextRecords<'_> {
    type Item = TextRecord;

    fn next(&mut self) -> Option<TextRecord> {
        if self.remaining == 0 {
            return None;
        }
        let header = self.ring.buf[self.pos];
        self.pos = (self.pos + 1) % TEXT_BYTES;
        self.remaining -= 1;
        if header == GRAPHICS_MARKER {
            return Some(TextRecord::Graphics);
        }
        let len = usize::from(header).min(self.remaining);
        let payload = self.ring.copy_out(self.pos, len);
        self.pos = (self.pos + len) % TEXT_BYTES;
        self.remaining -= len;
        Some(TextRecord::Line(payload))
    }
}
