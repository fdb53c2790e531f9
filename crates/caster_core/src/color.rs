//! 8-bit RGB color used by scenes, lights, and the output raster.

/// An 8-bit-per-channel RGB color.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    pub const WHITE: Color = Color {
        r: 255,
        g: 255,
        b: 255,
    };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Red channel as a float in [0, 1].
    #[inline]
    pub fn red_f(&self) -> f32 {
        self.r as f32 / 255.0
    }

    /// Green channel as a float in [0, 1].
    #[inline]
    pub fn green_f(&self) -> f32 {
        self.g as f32 / 255.0
    }

    /// Blue channel as a float in [0, 1].
    #[inline]
    pub fn blue_f(&self) -> f32 {
        self.b as f32 / 255.0
    }

    /// Pack into a 0x00RRGGBB integer.
    pub fn to_rgb_u32(&self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }
}
