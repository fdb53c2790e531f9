//! Scene and render descriptions.
//!
//! A `Scene` owns its lights and primitives; everything that queries
//! primitives (acceleration structures, renderers) borrows from it.
//! A `Render` is an immutable snapshot of the camera pose and output
//! parameters, consumed when a render starts.

use caster_math::Vec3;

use crate::{Color, Primitive};

/// A point light with no falloff radius; intensity decays with the
/// inverse-linear attenuation `1 / (1 + d)`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LightSource {
    pub position: Vec3,
    pub color: Color,
}

impl LightSource {
    pub fn new(position: Vec3, color: Color) -> Self {
        Self { position, color }
    }
}

/// A renderable scene: ambient diffusion color, point lights, and the
/// primitive collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub diffusion_color: Color,
    pub light_sources: Vec<LightSource>,
    pub primitives: Vec<Primitive>,
}

/// Sampling density for a render.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum RenderQuality {
    /// One ray through each pixel center.
    #[default]
    Normal,
    /// Four jittered sub-rays per pixel, averaged.
    Fine,
    /// One ray per 2×2 pixel block, replicated to all four pixels.
    Rough,
}

impl RenderQuality {
    /// Canonical uppercase name, as written in `.render` files.
    pub fn name(&self) -> &'static str {
        match self {
            RenderQuality::Normal => "NORMAL",
            RenderQuality::Fine => "FINE",
            RenderQuality::Rough => "ROUGH",
        }
    }
}

/// Camera pose and output parameters for one render.
///
/// Screen width and height are in world units; the pixel dimensions of
/// the output raster are supplied separately by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Render {
    pub background_color: Color,
    pub gamma: f32,
    pub render_depth: u32,
    pub quality: RenderQuality,
    pub camera_position: Vec3,
    pub observation_position: Vec3,
    pub up: Vec3,
    pub z_near: f32,
    pub z_far: f32,
    pub screen_width: f32,
    pub screen_height: f32,
}

impl Render {
    /// Unit view direction from the camera toward the observed point.
    pub fn view_direction(&self) -> Vec3 {
        (self.observation_position - self.camera_position).normalize()
    }

    /// Camera placement that frames the whole scene, looking along +x
    /// at the bounding-box center. Used when a scene is loaded without
    /// an accompanying render description.
    pub fn fitted_to(scene: &Scene) -> Option<Render> {
        let (min, max) = bounding_box(&scene.primitives)?;
        let center = (min + max) / 2.0;
        let min = center + (min - center) * 1.05;
        let max = center + (max - center) * 1.05;

        let delta = (max.z - min.z) / (2.0 * (std::f32::consts::PI / 12.0).tan());
        Some(Render {
            background_color: Color::BLACK,
            gamma: 1.0,
            render_depth: 4,
            quality: RenderQuality::Normal,
            camera_position: Vec3::new(min.x - delta, center.y, center.z),
            observation_position: center,
            up: Vec3::Z,
            z_near: delta / 2.0,
            z_far: (max.x - center.x) + (max.x - min.x) / 2.0,
            screen_width: 5.0,
            screen_height: max.z - min.z,
        })
    }
}

/// Axis-aligned bounds of a primitive collection, derived from the
/// wireframe polylines. `None` for an empty collection.
pub fn bounding_box(primitives: &[Primitive]) -> Option<(Vec3, Vec3)> {
    let mut min = Vec3::MAX;
    let mut max = Vec3::MIN;
    let mut any = false;
    for primitive in primitives {
        for line in primitive.wireframe() {
            for point in line {
                min = min.min(point);
                max = max.max(point);
                any = true;
            }
        }
    }
    any.then_some((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Optics, Sphere};

    fn sphere_at(center: Vec3, radius: f32) -> Primitive {
        Primitive::Sphere(Sphere::new(
            center,
            radius,
            Optics::new(Vec3::splat(0.5), Vec3::splat(0.5), 10.0),
        ))
    }

    #[test]
    fn bounding_box_covers_all_primitives() {
        let primitives = vec![
            sphere_at(Vec3::ZERO, 1.0),
            sphere_at(Vec3::new(5.0, 5.0, 5.0), 2.0),
        ];
        let (min, max) = bounding_box(&primitives).unwrap();
        assert!((min - Vec3::splat(-1.0)).length() < 1e-4);
        assert!((max - Vec3::splat(7.0)).length() < 1e-4);
    }

    #[test]
    fn bounding_box_empty() {
        assert!(bounding_box(&[]).is_none());
    }

    #[test]
    fn fitted_render_looks_at_scene_center() {
        let scene = Scene {
            diffusion_color: Color::BLACK,
            light_sources: vec![],
            primitives: vec![sphere_at(Vec3::new(2.0, 2.0, 2.0), 1.0)],
        };
        let render = Render::fitted_to(&scene).unwrap();
        assert!((render.observation_position - Vec3::new(2.0, 2.0, 2.0)).length() < 1e-4);
        assert!(render.camera_position.x < 1.0);
        assert!(render.z_near > 0.0);
    }
}
