//! RGBA color type used by the image projections.
//!
//! Printed paper only ever needs three colors: ink, paper, and the darker
//! background drawn where there is no paper yet. [`Rgba`] keeps the float
//! representation so rasters can be handed to compositing code unchanged.

/// RGBA color with f32 components in range [0.0, 1.0].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    /// Opaque black, the ink color.
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);

    /// Opaque white, the paper color.
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);

    /// Light gray shown where the view has no printed rows.
    pub const PAPER_BACKGROUND: Self = Self::rgb(0.8, 0.8, 0.8);

    /// Create an opaque color from f32 RGB components.
    #[must_use]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Pick ink or paper for a single printed dot.
    #[must_use]
    pub const fn ink(set: bool) -> Self {
        if set { Self::BLACK } else { Self::WHITE }
    }

    /// Convert to u8 RGB tuple, clamping values to [0, 255].
    #[must_use]
    pub fn to_rgb_u8(self) -> (u8, u8, u8) {
        let to_u8 = |value: f32| (value * 255.0).round().clamp(0.0, 255.0) as u8;
        (to_u8(self.r), to_u8(self.g), to_u8(self.b))
    }

    /// Convert to u8 RGBA tuple, clamping values to [0, 255].
    #[must_use]
    pub fn to_rgba_u8(self) -> (u8, u8, u8, u8) {
        let (r, g, b) = self.to_rgb_u8();
        let a = (self.a * 255.0).round().clamp(0.0, 255.0) as u8;
        (r, g, b, a)
    }
}
