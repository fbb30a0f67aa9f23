//! Packed monochrome pixel row.

use super::{Patch, ROW_BYTES};

/// One row of printed dots, `ROW_BYTES` bytes, least significant bit first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PixelRow([u8; ROW_BYTES]);

impl PixelRow {
    /// Number of addressable dots in a row.
    pub const WIDTH: usize = ROW_BYTES * 8;

    /// A row with no dots set.
    #[must_use]
    pub const fn blank() -> Self {
        Self([0; ROW_BYTES])
    }

    /// Build a row from raw bytes. Missing bytes are blank, extra bytes ignored.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut row = Self::blank();
        let n = bytes.len().min(ROW_BYTES);
        row.0[..n].copy_from_slice(&bytes[..n]);
        row
    }

    /// Merge row `y` of a patch into a fresh row.
    ///
    /// Columns outside the patch region are zero. Columns past [`Self::WIDTH`]
    /// are dropped.
    #[must_use]
    pub fn from_patch(patch: &Patch<'_>, y: usize) -> Self {
        let mut row = Self::blank();
        for x in patch.columns().take_while(|&x| x < Self::WIDTH) {
            if patch.pixel(x, y) {
                row.0[x >> 3] |= 1 << (x & 7);
            }
        }
        row
    }

    #[must_use]
    pub fn get(&self, x: usize) -> bool {
        x < Self::WIDTH && self.0[x >> 3] & (1 << (x & 7)) != 0
    }

    pub fn set(&mut self, x: usize, on: bool) {
        if x >= Self::WIDTH {
            return;
        }
        let mask = 1 << (x & 7);
        if on {
            self.0[x >> 3] |= mask;
        } else {
            self.0[x >> 3] &= !mask;
        }
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; ROW_BYTES] {
        &self.0
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get() {
        let mut row = PixelRow::blank();
        row.set(0, true);
        row.set(9, true);
        row.set(143, true);
        assert!(row.get(0));
        assert!(row.get(9));
        assert!(row.get(143));
        assert!(!row.get(1));
        assert_eq!(row.as_bytes()[1], 0b10);

        row.set(9, false);
        assert!(!row.get(9));
    }

    #[test]
    fn test_out_of_range_ignored() {
        let mut row = PixelRow::blank();
        row.set(PixelRow::WIDTH, true);
        assert!(row.is_blank());
        assert!(!row.get(PixelRow::WIDTH + 10));
    }

    #[test]
    fn test_from_patch_zero_fills_outside_region() {
        // Every bit set in the source; only columns 4..12 should survive.
        let bits = [0xFF; 4];
        let patch = Patch::new(&bits, 2, 16, 2).region(4, 0, 8, 2);
        let row = PixelRow::from_patch(&patch, 1);
        for x in 0..PixelRow::WIDTH {
            assert_eq!(row.get(x), (4..12).contains(&x), "column {x}");
        }
    }

    #[test]
    fn test_from_patch_wide_source() {
        // 32-byte source rows are clipped to the row width.
        let bits = [0xFF; 32];
        let patch = Patch::new(&bits, 32, 256, 1);
        let row = PixelRow::from_patch(&patch, 0);
        assert!(row.as_bytes().iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_from_bytes() {
        let row = PixelRow::from_bytes(&[1, 2, 3]);
        assert_eq!(&row.as_bytes()[..4], &[1, 2, 3, 0]);
    }
}
