//! Local illumination: ambient plus per-light Phong shading, with
//! hard shadows from occlusion queries against the tracing structure.

use caster_core::{Color, LightSource, Render, Scene};
use caster_math::{Ray, Vec3};

use crate::intensity::Intensity;
use crate::structure::TracingStructure;
use crate::Tracer;

pub struct LocalIllumination<'a> {
    structure: &'a dyn TracingStructure,
    lights: Vec<LightSource>,
    diffusion_color: Color,
    background_color: Color,
    camera_position: Vec3,
}

impl<'a> LocalIllumination<'a> {
    pub fn new(structure: &'a dyn TracingStructure, scene: &Scene, render: &Render) -> Self {
        Self {
            structure,
            lights: scene.light_sources.clone(),
            diffusion_color: scene.diffusion_color,
            background_color: render.background_color,
            camera_position: render.camera_position,
        }
    }

    /// Sum of per-light Phong terms at the intersection, as seen along
    /// the unit vector `v` toward the observer. Occluded lights
    /// contribute nothing.
    pub(crate) fn source_intensities(
        &self,
        v: Vec3,
        intersection: &mut caster_core::Intersection<'_>,
    ) -> Intensity {
        let mut acc = Intensity::default();
        for light in &self.lights {
            let to_light = light.position - intersection.point;
            let shadow_ray = Ray::new(intersection.point, to_light);
            if self.structure.has_intersection(&shadow_ray) {
                continue;
            }

            let light_ray = Ray::new(light.position, intersection.point - light.position);
            let reflected = intersection.reflect(&light_ray);
            let diffuse = intersection.normal.dot(shadow_ray.direction).max(0.0);
            let specular = reflected.direction.dot(v).max(0.0);

            let optics = intersection.optics;
            let attenuation = 1.0 / (1.0 + to_light.length());
            let phong = |channel: f32, kd: f32, ks: f32| {
                attenuation * channel * (kd * diffuse + ks * specular.powf(optics.specularity_power))
            };
            acc += Intensity {
                r: phong(light.color.red_f(), optics.diffusion.x, optics.specularity.x),
                g: phong(light.color.green_f(), optics.diffusion.y, optics.specularity.y),
                b: phong(light.color.blue_f(), optics.diffusion.z, optics.specularity.z),
            };
        }
        acc
    }

    pub(crate) fn ambient(&self, optics: &caster_core::Optics) -> Intensity {
        Intensity {
            r: self.diffusion_color.red_f() * optics.diffusion.x,
            g: self.diffusion_color.green_f() * optics.diffusion.y,
            b: self.diffusion_color.blue_f() * optics.diffusion.z,
        }
    }

    pub(crate) fn background(&self) -> Intensity {
        Intensity::from_color(self.background_color)
    }
}

impl Tracer for LocalIllumination<'_> {
    fn trace(&self, ray: &Ray) -> Intensity {
        let Some(mut intersection) = self.structure.find_closest_intersection(ray) else {
            return self.background();
        };

        let v = (self.camera_position - intersection.point).normalize();
        self.ambient(intersection.optics) + self.source_intensities(v, &mut intersection)
    }
}
