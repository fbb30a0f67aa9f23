//! Fixed-capacity circular store of pixel rows.

use super::{PixelRow, ROW_BYTES, ROWS_MAX};

const CAPACITY: usize = ROWS_MAX * ROW_BYTES;

/// Circular byte area holding up to `ROWS_MAX - 1` pixel rows.
///
/// `top` is the byte offset of the oldest row and `bottom` the offset one
/// past the newest. The ring never reports full: pushing into the last free
/// slot overwrites the oldest row instead.
#[derive(Clone)]
pub struct BitmapRing {
    buf: Box<[u8]>,
    top: usize,
    bottom: usize,
    row_count: usize,
}

impl BitmapRing {
    /// Create an empty ring.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: vec![0; CAPACITY].into_boxed_slice(),
            top: 0,
            bottom: 0,
            row_count: 0,
        }
    }

    /// Rebuild a ring from compacted rows starting at offset 0.
    ///
    /// `bytes` must be a whole number of rows and at most `ROWS_MAX - 1` rows.
    pub(crate) fn from_linear(bytes: &[u8]) -> Self {
        debug_assert!(bytes.len() % ROW_BYTES == 0);
        debug_assert!(bytes.len() < CAPACITY);
        let mut ring = Self::new();
        ring.buf[..bytes.len()].copy_from_slice(bytes);
        ring.bottom = bytes.len();
        ring.row_count = bytes.len() / ROW_BYTES;
        ring
    }

    /// Append a row at `bottom`.
    ///
    /// Returns `true` when the oldest row had to be evicted to make room.
    pub fn push_row(&mut self, row: &PixelRow) -> bool {
        self.buf[self.bottom..self.bottom + ROW_BYTES].copy_from_slice(row.as_bytes());
        self.bottom = (self.bottom + ROW_BYTES) % CAPACITY;
        self.row_count += 1;
        if self.bottom == self.top {
            self.top = (self.top + ROW_BYTES) % CAPACITY;
            self.row_count -= 1;
            return true;
        }
        false
    }

    /// Read the `i`th live row, 0 being the oldest.
    #[must_use]
    pub fn read_row(&self, i: usize) -> Option<PixelRow> {
        (i < self.row_count).then(|| self.slot(self.top_row() + i))
    }

    /// Slot by index, wrapping modulo `ROWS_MAX`. Liveness is not checked.
    fn slot(&self, index: usize) -> PixelRow {
        let start = (index % ROWS_MAX) * ROW_BYTES;
        PixelRow::from_bytes(&self.buf[start..start + ROW_BYTES])
    }

    /// Iterate over live rows, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = PixelRow> + '_ {
        let top = self.top_row();
        (0..self.row_count).map(move |i| self.slot(top + i))
    }

    /// Drop every row and zero the storage.
    pub fn clear(&mut self) {
        self.buf.fill(0);
        self.top = 0;
        self.bottom = 0;
        self.row_count = 0;
    }

    #[must_use]
    pub const fn row_count(&self) -> usize {
        self.row_count
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Slot index of the oldest row.
    #[must_use]
    pub const fn top_row(&self) -> usize {
        self.top / ROW_BYTES
    }

    /// Slot index one past the newest row.
    #[must_use]
    pub const fn bottom_row(&self) -> usize {
        self.bottom / ROW_BYTES
    }

    /// Occupied bytes between `top` and `bottom`.
    #[must_use]
    pub const fn byte_len(&self) -> usize {
        self.row_count * ROW_BYTES
    }

    /// Live bytes as at most two slices, oldest first.
    #[must_use]
    pub fn as_slices(&self) -> (&[u8], &[u8]) {
        if self.top <= self.bottom {
            (&self.buf[self.top..self.bottom], &[])
        } else {
            (&self.buf[self.top..], &self.buf[..self.bottom])
        }
    }

    /// Live bytes copied out in order, discarding the wrap position.
    #[must_use]
    pub fn linearize(&self) -> Vec<u8> {
        let (head, tail) = self.as_slices();
        let mut out = Vec::with_capacity(head.len() + tail.len());
        out.extend_from_slice(head);
        out.extend_from_slice(tail);
        out
    }
}

impl Default for BitmapRing {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BitmapRing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitmapRing")
            .field("top", &self.top)
            .field("bottom", &self.bottom)
            .field("row_count", &self.row_count)
            .finish_non_exhaustive()
    }
}
