//! Global illumination: follows the mirror-reflection chain up to a
//! fixed depth and composites the shading back toward the eye.

use caster_core::{Intersection, Render, Scene};
use caster_math::{Ray, Vec3};

use crate::intensity::Intensity;
use crate::local::LocalIllumination;
use crate::structure::TracingStructure;
use crate::Tracer;

pub struct GlobalIllumination<'a> {
    local: LocalIllumination<'a>,
    structure: &'a dyn TracingStructure,
    camera_position: Vec3,
    depth: u32,
}

impl<'a> GlobalIllumination<'a> {
    pub fn new(structure: &'a dyn TracingStructure, scene: &Scene, render: &Render) -> Self {
        Self {
            local: LocalIllumination::new(structure, scene, render),
            structure,
            camera_position: render.camera_position,
            depth: render.render_depth,
        }
    }

    /// Collects intersections along the mirror bounce chain, eye hit
    /// first. The chain ends at the configured depth or at the first
    /// bounce that escapes the scene.
    fn find_reflections(&self, ray: &Ray) -> Vec<Intersection<'_>> {
        let mut chain = Vec::new();
        let mut current = *ray;
        for _ in 0..self.depth {
            let Some(mut intersection) = self.structure.find_closest_intersection(&current) else {
                break;
            };
            current = intersection.reflect(&current);
            chain.push(intersection);
        }
        chain
    }
}

impl Tracer for GlobalIllumination<'_> {
    fn trace(&self, ray: &Ray) -> Intensity {
        let mut chain = self.find_reflections(ray);
        if chain.is_empty() {
            return self.local.background();
        }

        // Fold from the deepest bounce back to the eye hit. Each step
        // shades the surface locally and carries the deeper result
        // through the mirror term, attenuated by the bounce distance.
        let mut carried = Intensity::default();
        for i in (0..chain.len()).rev() {
            let observer = if i == 0 {
                self.camera_position
            } else {
                chain[i - 1].point
            };
            let point = chain[i].point;
            let v = (observer - point).normalize();

            let optics = chain[i].optics;
            let mut acc = self.local.ambient(optics) + self.local.source_intensities(v, &mut chain[i]);
            if i + 1 < chain.len() {
                let attenuation = 1.0 / (1.0 + point.distance(chain[i + 1].point));
                acc += Intensity {
                    r: optics.specularity.x * attenuation * carried.r,
                    g: optics.specularity.y * attenuation * carried.g,
                    b: optics.specularity.z * attenuation * carried.b,
                };
            }
            carried = acc;
        }
        carried
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::PrimitivesList;
    use caster_core::{Color, LightSource, Optics, Primitive, RenderQuality, Sphere};

    fn test_render(depth: u32) -> Render {
        Render {
            background_color: Color { r: 10, g: 20, b: 30 },
            gamma: 1.0,
            render_depth: depth,
            quality: RenderQuality::Normal,
            camera_position: Vec3::new(-10.0, 0.0, 0.0),
            observation_position: Vec3::ZERO,
            up: Vec3::Z,
            z_near: 5.0,
            z_far: 100.0,
            screen_width: 4.0,
            screen_height: 4.0,
        }
    }

    fn mirror_pair() -> (Vec<Primitive>, Scene) {
        let mirror = Optics::new(Vec3::splat(0.3), Vec3::splat(0.9), 20.0);
        let primitives = vec![
            Primitive::Sphere(Sphere::new(Vec3::ZERO, 1.0, mirror)),
            Primitive::Sphere(Sphere::new(Vec3::new(0.0, 0.0, 6.0), 1.0, mirror)),
        ];
        let scene = Scene {
            diffusion_color: Color { r: 51, g: 51, b: 51 },
            light_sources: vec![LightSource {
                position: Vec3::new(-8.0, 0.0, 8.0),
                color: Color::WHITE,
            }],
            primitives: Vec::new(),
        };
        (primitives, scene)
    }

    #[test]
    fn empty_chain_returns_background() {
        let (primitives, scene) = mirror_pair();
        let list = PrimitivesList::new(&primitives);
        let tracer = GlobalIllumination::new(&list, &scene, &test_render(3));

        let ray = Ray::new(Vec3::new(-10.0, 8.0, 0.0), Vec3::X);
        assert_eq!(
            tracer.trace(&ray),
            Intensity::from_color(Color { r: 10, g: 20, b: 30 })
        );
    }

    #[test]
    fn zero_depth_sees_only_background() {
        let (primitives, scene) = mirror_pair();
        let list = PrimitivesList::new(&primitives);
        let tracer = GlobalIllumination::new(&list, &scene, &test_render(0));

        let ray = Ray::new(Vec3::new(-10.0, 0.0, 0.0), Vec3::X);
        assert_eq!(
            tracer.trace(&ray),
            Intensity::from_color(Color { r: 10, g: 20, b: 30 })
        );
    }

    #[test]
    fn depth_one_matches_local_shading() {
        let (primitives, scene) = mirror_pair();
        let list = PrimitivesList::new(&primitives);
        let render = test_render(1);
        let global = GlobalIllumination::new(&list, &scene, &render);
        let local = LocalIllumination::new(&list, &scene, &render);

        let ray = Ray::new(render.camera_position, Vec3::X);
        let g = global.trace(&ray);
        let l = local.trace(&ray);
        assert!((g.r - l.r).abs() < 1e-5);
        assert!((g.g - l.g).abs() < 1e-5);
        assert!((g.b - l.b).abs() < 1e-5);
    }

    #[test]
    fn deeper_bounces_change_specular_surfaces() {
        let mirror = Optics::new(Vec3::splat(0.3), Vec3::splat(0.9), 20.0);
        // A 45 degree mirror in the plane x = z bounces the eye ray
        // straight up into the sphere overhead.
        let primitives = vec![
            Primitive::Triangle(caster_core::Triangle::new(
                Vec3::new(-5.0, -6.0, -5.0),
                Vec3::new(-5.0, 6.0, -5.0),
                Vec3::new(7.0, 0.0, 7.0),
                mirror,
            )),
            Primitive::Sphere(Sphere::new(Vec3::new(0.0, 0.0, 5.0), 1.0, mirror)),
        ];
        let scene = Scene {
            diffusion_color: Color { r: 51, g: 51, b: 51 },
            light_sources: Vec::new(),
            primitives: Vec::new(),
        };
        let list = PrimitivesList::new(&primitives);
        let shallow = GlobalIllumination::new(&list, &scene, &test_render(1));
        let deep = GlobalIllumination::new(&list, &scene, &test_render(4));

        let ray = Ray::new(Vec3::new(-10.0, 0.0, 0.0), Vec3::X);
        let a = shallow.trace(&ray);
        let b = deep.trace(&ray);
        assert!(b.r > a.r && b.g > a.g && b.b > a.b);
    }
}
