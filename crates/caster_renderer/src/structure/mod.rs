//! Acceleration structures for ray/scene intersection queries.
//!
//! Both implementations are built once from a scene's primitive slice
//! and are read-only afterwards, so they can be shared freely across
//! rendering threads.

mod octree;

pub use octree::{OcTree, DEFAULT_TREE_DEPTH};

use caster_core::{Intersection, Primitive};
use caster_math::Ray;

/// Ray query contract shared by all acceleration structures.
pub trait TracingStructure: Send + Sync {
    /// Every intersection of `ray` with the scene, in no particular
    /// order.
    fn find_all_intersections(&self, ray: &Ray) -> Vec<Intersection<'_>>;

    /// Whether `ray` hits anything at all. Used for shadow rays;
    /// implementations early-exit on the first hit.
    fn has_intersection(&self, ray: &Ray) -> bool;

    /// The intersection nearest to the ray origin (squared distance;
    /// the first encountered wins ties).
    fn find_closest_intersection(&self, ray: &Ray) -> Option<Intersection<'_>> {
        let mut min_distance = f32::MAX;
        let mut result = None;
        for intersection in self.find_all_intersections(ray) {
            let sd = intersection.point.distance_squared(ray.origin);
            if sd < min_distance {
                min_distance = sd;
                result = Some(intersection);
            }
        }
        result
    }
}

/// Brute-force linear scan over every primitive. O(n) per query; the
/// correctness baseline for the octree.
pub struct PrimitivesList<'a> {
    primitives: &'a [Primitive],
}

impl<'a> PrimitivesList<'a> {
    pub fn new(primitives: &'a [Primitive]) -> Self {
        Self { primitives }
    }
}

impl TracingStructure for PrimitivesList<'_> {
    fn find_all_intersections(&self, ray: &Ray) -> Vec<Intersection<'_>> {
        let mut intersections = Vec::new();
        for primitive in self.primitives {
            intersections.extend(primitive.intersections(ray));
        }
        intersections
    }

    fn has_intersection(&self, ray: &Ray) -> bool {
        self.primitives.iter().any(|p| p.intersects(ray))
    }
}
