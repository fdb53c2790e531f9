//! Material description attached to every primitive.

use caster_math::Vec3;

/// Per-primitive material parameters for the Phong shading model.
///
/// Each component of `diffusion` and `specularity` is a per-channel
/// (R/G/B) weight in [0, 1]. `specularity_power` is the Phong
/// shininess exponent (> 0).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Optics {
    /// Diffuse reflection weights per color channel.
    pub diffusion: Vec3,
    /// Specular reflection weights per color channel.
    pub specularity: Vec3,
    /// Phong shininess exponent.
    pub specularity_power: f32,
}

impl Optics {
    pub fn new(diffusion: Vec3, specularity: Vec3, specularity_power: f32) -> Self {
        Self {
            diffusion,
            specularity,
            specularity_power,
        }
    }
}
