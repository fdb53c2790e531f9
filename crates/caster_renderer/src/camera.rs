//! Pixel-to-ray mapping for the virtual screen plane.

use caster_core::Render;
use caster_math::{Ray, Vec3};

/// Camera basis derived from a [`Render`] snapshot and the pixel
/// dimensions of the output raster.
///
/// The virtual screen plane sits at the near distance along the view
/// direction; pixels map onto it from the upper-left corner, stepping
/// right and down in world units.
#[derive(Debug, Clone)]
pub struct ScreenCamera {
    position: Vec3,
    upper_left: Vec3,
    right: Vec3,
    down: Vec3,
    dx: f32,
    dy: f32,
}

impl ScreenCamera {
    pub fn new(render: &Render, width: u32, height: u32) -> Self {
        let view = render.view_direction();
        let up = render.up.normalize();
        let right = view.cross(up).normalize();
        let screen_center = render.camera_position + view * render.z_near;
        let upper_left =
            screen_center + up * (render.screen_height / 2.0) - right * (render.screen_width / 2.0);

        Self {
            position: render.camera_position,
            upper_left,
            right,
            down: -up,
            dx: render.screen_width / width as f32,
            dy: render.screen_height / height as f32,
        }
    }

    /// The camera position rays start from.
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Primary ray through the screen point of pixel (x, y).
    pub fn ray_at(&self, x: u32, y: u32) -> Ray {
        self.ray_at_offset(x, y, 0.0, 0.0)
    }

    /// Ray through pixel (x, y) shifted by a sub-pixel offset in
    /// [0, 1) per axis.
    pub fn ray_at_offset(&self, x: u32, y: u32, ox: f32, oy: f32) -> Ray {
        let on_screen = self.upper_left
            + self.down * ((y as f32 + oy) * self.dy)
            + self.right * ((x as f32 + ox) * self.dx);
        Ray::new(self.position, on_screen - self.position)
    }
}
