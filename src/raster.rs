//! RGBA rasters produced from the print-out.
//!
//! [`PixelBuffer`] is what the image projections return: the full paper as an
//! export image, or a clip rectangle of it for on-screen painting. It can be
//! encoded as PNG for the image export sink.

use crate::color::Rgba;
use std::io::{self, Write};

/// A clipping rectangle in paper pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClipRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl ClipRect {
    /// Create a new clipping rectangle.
    #[must_use]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// A 2D pixel buffer in row-major order.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelBuffer {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel data in row-major order (RGBA).
    pub pixels: Vec<Rgba>,
}

impl PixelBuffer {
    /// Create a new pixel buffer filled with `color`.
    #[must_use]
    pub fn filled(width: u32, height: u32, color: Rgba) -> Self {
        let size = (width as usize).saturating_mul(height as usize);
        Self {
            width,
            height,
            pixels: vec![color; size],
        }
    }

    #[inline]
    fn pixel_index(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize)
            .checked_mul(self.width as usize)?
            .checked_add(x as usize)?;
        (idx < self.pixels.len()).then_some(idx)
    }

    /// Get pixel at (x, y).
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<Rgba> {
        self.pixel_index(x, y).map(|idx| self.pixels[idx])
    }

    /// Set pixel at (x, y). Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: u32, y: u32, color: Rgba) {
        if let Some(idx) = self.pixel_index(x, y) {
            self.pixels[idx] = color;
        }
    }

    /// Fill a `scale` x `scale` block whose top-left corner is
    /// `(x * scale, y * scale)`.
    pub fn set_scaled(&mut self, x: u32, y: u32, scale: u32, color: Rgba) {
        for dy in 0..scale {
            for dx in 0..scale {
                self.set(x * scale + dx, y * scale + dy, color);
            }
        }
    }

    /// Append the rows of `other` below this buffer. Widths must match.
    pub fn append_rows(&mut self, other: &Self) {
        debug_assert_eq!(self.width, other.width);
        self.pixels.extend_from_slice(&other.pixels);
        self.height += other.height;
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Pixel data as packed 8-bit RGBA.
    #[must_use]
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for &px in &self.pixels {
            let (r, g, b, a) = px.to_rgba_u8();
            out.extend_from_slice(&[r, g, b, a]);
        }
        out
    }

    /// Encode as an 8-bit RGBA PNG.
    pub fn write_png<W: Write>(&self, out: W) -> io::Result<()> {
        if self.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "cannot encode an empty image",
            ));
        }
        let mut encoder = png::Encoder::new(out, self.width, self.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|e| io::Error::other(e.to_string()))?;
        writer
            .write_image_data(&self.to_rgba8())
            .map_err(|e| io::Error::other(e.to_string()))?;
        writer.finish().map_err(|e| io::Error::other(e.to_string()))
    }
}
