//! Rectangular bitmap patch as emitted by the calculator engine.

/// A borrowed monochrome bitmap with a region of interest.
///
/// `bits` holds rows of `bytes_per_row` bytes; pixel `(x, y)` is bit `x & 7`
/// of byte `y * bytes_per_row + (x >> 3)`. Only the rectangle
/// `x..x + width`, `y..y + height` is meant to be printed.
#[derive(Clone, Copy, Debug)]
pub struct Patch<'a> {
    pub bits: &'a [u8],
    pub bytes_per_row: usize,
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl<'a> Patch<'a> {
    /// Patch covering the whole of `bits`, `width` pixels wide.
    #[must_use]
    pub fn new(bits: &'a [u8], bytes_per_row: usize, width: usize, height: usize) -> Self {
        Self {
            bits,
            bytes_per_row,
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    /// Restrict the patch to a sub-rectangle of `bits`.
    #[must_use]
    pub const fn region(mut self, x: usize, y: usize, width: usize, height: usize) -> Self {
        self.x = x;
        self.y = y;
        self.width = width;
        self.height = height;
        self
    }

    /// Read pixel `(x, y)` in bitmap coordinates.
    ///
    /// Bytes past the end of `bits` read as unset, so a short buffer from the
    /// producer prints blank instead of panicking.
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        y.checked_mul(self.bytes_per_row)
            .and_then(|row| row.checked_add(x >> 3))
            .and_then(|idx| self.bits.get(idx))
            .is_some_and(|byte| byte & (1 << (x & 7)) != 0)
    }

    /// Rows covered by the region, in bitmap coordinates.
    pub fn rows(&self) -> std::ops::Range<usize> {
        self.y..self.y.saturating_add(self.height)
    }

    /// Columns covered by the region, in bitmap coordinates.
    pub fn columns(&self) -> std::ops::Range<usize> {
        self.x..self.x.saturating_add(self.width)
    }
}
