//! Accumulated per-channel light intensity.

use caster_core::Color;

/// Unclamped per-channel light intensity accumulated during tracing.
///
/// Values may exceed 1.0; gamma correction and clamping happen once
/// per pixel when the intensity is packed into an output color.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Intensity {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Intensity {
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Intensity of an 8-bit color, channels scaled to [0, 1].
    pub fn from_color(color: Color) -> Self {
        Self {
            r: color.red_f(),
            g: color.green_f(),
            b: color.blue_f(),
        }
    }

    /// Gamma-correct (`channel^(1/gamma)`) and pack to an 8-bit color,
    /// clamping each channel to [0, 255].
    pub fn gamma_corrected(&self, gamma: f32) -> Color {
        let inv = 1.0 / gamma;
        let convert = |channel: f32| (channel.max(0.0).powf(inv) * 255.0).clamp(0.0, 255.0) as u8;
        Color::new(convert(self.r), convert(self.g), convert(self.b))
    }
}

impl std::ops::Add for Intensity {
    type Output = Intensity;

    fn add(self, other: Intensity) -> Intensity {
        Intensity::new(self.r + other.r, self.g + other.g, self.b + other.b)
    }
}

impl std::ops::AddAssign for Intensity {
    fn add_assign(&mut self, other: Intensity) {
        *self = *self + other;
    }
}

impl std::ops::Div<f32> for Intensity {
    type Output = Intensity;

    fn div(self, divisor: f32) -> Intensity {
        Intensity::new(self.r / divisor, self.g / divisor, self.b / divisor)
    }
}
