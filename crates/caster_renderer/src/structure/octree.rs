//! Octree over the scene's bounding cube.
//!
//! The scene bounding box is expanded to a cube using its longest axis
//! and subdivided recursively into eight octants down to a fixed
//! maximum depth. A primitive is assigned to every child whose cube it
//! overlaps, so it may be replicated across children; duplicate hits
//! are harmless because nearest-hit selection filters them.
//!
//! The primitive/cube overlap tests are heuristic approximations, not
//! exact overlap predicates: triangles use a vertex-in-cube check plus
//! a separating-axis test, boxes use mutual corner containment, and
//! spheres probe the single surface point facing the cube center. A
//! primitive overlapping a cube only near an edge can be missed, which
//! silently drops intersections close to cube boundaries.

use caster_core::{bounding_box, Intersection, Primitive, Quadrangle, Sphere, Triangle};
use caster_math::{Ray, Vec3};

use super::TracingStructure;

/// Subdivision depth used by scene builds.
pub const DEFAULT_TREE_DEPTH: u32 = 5;

/// An axis-aligned cube, stored as its lower corner and edge length.
#[derive(Debug, Copy, Clone, PartialEq)]
struct BoundingCube {
    origin: Vec3,
    length: f32,
}

impl BoundingCube {
    /// Smallest cube (by longest axis) covering all primitives.
    fn of(primitives: &[Primitive]) -> Option<BoundingCube> {
        let (min, max) = bounding_box(primitives)?;
        let extent = max - min;
        Some(BoundingCube {
            origin: min,
            length: extent.x.max(extent.y).max(extent.z),
        })
    }

    fn upper(&self) -> Vec3 {
        self.origin + Vec3::splat(self.length)
    }

    fn center(&self) -> Vec3 {
        self.origin + Vec3::splat(self.length / 2.0)
    }

    /// The eight corner points.
    fn corners(&self) -> [Vec3; 8] {
        let mut corners = [Vec3::ZERO; 8];
        let mut index = 0;
        for x in 0..2 {
            for y in 0..2 {
                for z in 0..2 {
                    corners[index] = self.origin
                        + Vec3::new(x as f32, y as f32, z as f32) * self.length;
                    index += 1;
                }
            }
        }
        corners
    }

    /// Split into the eight octant cubes.
    fn split(&self) -> [BoundingCube; 8] {
        let delta = self.length / 2.0;
        let mut cubes = [*self; 8];
        let mut index = 0;
        for x in 0..2 {
            for y in 0..2 {
                for z in 0..2 {
                    cubes[index] = BoundingCube {
                        origin: self.origin + Vec3::new(x as f32, y as f32, z as f32) * delta,
                        length: delta,
                    };
                    index += 1;
                }
            }
        }
        cubes
    }

    fn contains_point(&self, p: Vec3) -> bool {
        let upper = self.upper();
        p.x >= self.origin.x
            && p.x <= upper.x
            && p.y >= self.origin.y
            && p.y <= upper.y
            && p.z >= self.origin.z
            && p.z <= upper.z
    }

    /// Slab method: intersect the per-axis parametric intervals. An
    /// axis-parallel ray starting outside that axis slab rejects
    /// immediately.
    fn intersects_ray(&self, ray: &Ray) -> bool {
        let mut t_near = f32::MIN;
        let mut t_far = f32::MAX;

        let lower = self.origin;
        let upper = self.upper();
        for axis in 0..3 {
            let origin = ray.origin[axis];
            let direction = ray.direction[axis];
            let low = lower[axis];
            let high = upper[axis];

            if direction == 0.0 && (origin < low || origin > high) {
                return false;
            }
            let mut t1 = (low - origin) / direction;
            let mut t2 = (high - origin) / direction;
            if t2 < t1 {
                std::mem::swap(&mut t1, &mut t2);
            }
            t_near = t_near.max(t1);
            t_far = t_far.min(t2);
            if t_near > t_far || t_far < 0.0 {
                return false;
            }
        }
        true
    }

    fn intersects_primitive(&self, primitive: &Primitive) -> bool {
        match primitive {
            Primitive::Sphere(s) => self.intersects_sphere(s),
            Primitive::Box(b) => {
                // Mutual corner containment; misses crossing overlaps
                // where neither corner lies inside the other volume.
                b.contains_point(self.origin)
                    || b.contains_point(self.upper())
                    || self.contains_point(b.min)
                    || self.contains_point(b.max)
            }
            Primitive::Triangle(t) => self.intersects_triangle(t),
            Primitive::Quadrangle(q) => self.intersects_quadrangle(q),
        }
    }

    /// Probe the sphere surface point facing the cube center.
    fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        let from_sphere = (self.center() - sphere.center).normalize_or_zero();
        self.contains_point(sphere.center + from_sphere * sphere.radius)
    }

    fn intersects_quadrangle(&self, quadrangle: &Quadrangle) -> bool {
        quadrangle.triangles().iter().any(|t| self.intersects_triangle(t))
    }

    /// Vertex-in-cube check followed by a separating-axis test over
    /// the cube axes, the triangle normal, and the edge cross
    /// products.
    fn intersects_triangle(&self, triangle: &Triangle) -> bool {
        if self.contains_point(triangle.a)
            || self.contains_point(triangle.b)
            || self.contains_point(triangle.c)
        {
            return true;
        }

        let mut axes = vec![Vec3::X, Vec3::Y, Vec3::Z, triangle.normal()];
        let triangle_edges = [
            triangle.b - triangle.a,
            triangle.c - triangle.b,
            triangle.a - triangle.c,
        ];
        for cube_edge in [Vec3::X, Vec3::Y, Vec3::Z] {
            for triangle_edge in triangle_edges {
                axes.push(cube_edge.cross(triangle_edge));
            }
        }

        let corners = self.corners();
        !axes
            .into_iter()
            .any(|axis| is_separating_axis(axis, triangle, &corners))
    }
}

fn is_separating_axis(axis: Vec3, triangle: &Triangle, corners: &[Vec3; 8]) -> bool {
    let projections = [
        triangle.a.dot(axis),
        triangle.b.dot(axis),
        triangle.c.dot(axis),
    ];
    let min_triangle = projections.iter().copied().fold(f32::MAX, f32::min);
    let max_triangle = projections.iter().copied().fold(f32::MIN, f32::max);

    let mut min_cube = f32::MAX;
    let mut max_cube = f32::MIN;
    for corner in corners {
        let projection = corner.dot(axis);
        min_cube = min_cube.min(projection);
        max_cube = max_cube.max(projection);
    }

    max_triangle < min_cube || min_triangle > max_cube
}

enum Node {
    Branch {
        cube: BoundingCube,
        children: Box<[Node; 8]>,
    },
    Leaf {
        cube: BoundingCube,
        members: Vec<u32>,
    },
}

/// Recursive cube-subdivision acceleration structure.
///
/// Nodes store indices into the scene's primitive slice; the tree is
/// rebuilt whenever the scene changes and read-only during renders.
pub struct OcTree<'a> {
    primitives: &'a [Primitive],
    root: Node,
}

impl<'a> OcTree<'a> {
    /// Build a tree over `primitives`, subdividing `max_depth` times.
    pub fn build(primitives: &'a [Primitive], max_depth: u32) -> Self {
        let root = match BoundingCube::of(primitives) {
            Some(bounds) => {
                let members: Vec<u32> = (0..primitives.len() as u32).collect();
                build_node(primitives, bounds, members, max_depth)
            }
            None => Node::Leaf {
                cube: BoundingCube {
                    origin: Vec3::ZERO,
                    length: 0.0,
                },
                members: Vec::new(),
            },
        };
        log::debug!(
            "octree built over {} primitive(s), max depth {}",
            primitives.len(),
            max_depth
        );
        Self { primitives, root }
    }

    fn collect_intersections<'s>(
        &'s self,
        node: &'s Node,
        ray: &Ray,
        intersections: &mut Vec<Intersection<'s>>,
    ) {
        match node {
            Node::Leaf { members, .. } => {
                for &index in members {
                    intersections.extend(self.primitives[index as usize].intersections(ray));
                }
            }
            Node::Branch { children, .. } => {
                for child in children.iter() {
                    if child_cube(child).intersects_ray(ray) {
                        self.collect_intersections(child, ray, intersections);
                    }
                }
            }
        }
    }

    fn any_intersection(&self, node: &Node, ray: &Ray) -> bool {
        match node {
            Node::Leaf { members, .. } => members
                .iter()
                .any(|&index| self.primitives[index as usize].intersects(ray)),
            Node::Branch { children, .. } => children
                .iter()
                .any(|child| child_cube(child).intersects_ray(ray) && self.any_intersection(child, ray)),
        }
    }
}

fn child_cube(node: &Node) -> &BoundingCube {
    match node {
        Node::Branch { cube, .. } => cube,
        Node::Leaf { cube, .. } => cube,
    }
}

fn build_node(
    primitives: &[Primitive],
    cube: BoundingCube,
    members: Vec<u32>,
    depth: u32,
) -> Node {
    if depth == 0 || members.is_empty() {
        return Node::Leaf { cube, members };
    }
    let children = cube.split().map(|child| {
        let overlapping: Vec<u32> = members
            .iter()
            .copied()
            .filter(|&index| child.intersects_primitive(&primitives[index as usize]))
            .collect();
        build_node(primitives, child, overlapping, depth - 1)
    });
    Node::Branch {
        cube,
        children: Box::new(children),
    }
}

impl TracingStructure for OcTree<'_> {
    fn find_all_intersections(&self, ray: &Ray) -> Vec<Intersection<'_>> {
        let mut intersections = Vec::new();
        self.collect_intersections(&self.root, ray, &mut intersections);
        intersections
    }

    fn has_intersection(&self, ray: &Ray) -> bool {
        self.any_intersection(&self.root, ray)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::PrimitivesList;
    use caster_core::{Box3, Optics};

    fn optics() -> Optics {
        Optics::new(Vec3::splat(0.7), Vec3::splat(0.2), 30.0)
    }

    /// Primitives spread across distinct octants of a roughly
    /// [0, 10]^3 region, each well inside its cell.
    fn sample_scene() -> Vec<Primitive> {
        vec![
            Primitive::Sphere(Sphere::new(Vec3::new(2.0, 2.0, 2.0), 1.0, optics())),
            Primitive::Sphere(Sphere::new(Vec3::new(8.0, 8.0, 8.0), 1.0, optics())),
            Primitive::Box(Box3::new(
                Vec3::new(7.6, 1.0, 1.0),
                Vec3::new(9.2, 3.0, 3.0),
                optics(),
            )),
            Primitive::Triangle(Triangle::new(
                Vec3::new(1.5, 7.5, 1.5),
                Vec3::new(3.0, 8.5, 1.5),
                Vec3::new(2.0, 8.0, 3.5),
                optics(),
            )),
            Primitive::Quadrangle(Quadrangle::new(
                Vec3::new(1.0, 1.0, 8.0),
                Vec3::new(3.0, 1.0, 8.0),
                Vec3::new(3.0, 3.0, 8.0),
                Vec3::new(1.0, 3.0, 8.0),
                optics(),
            )),
            Primitive::Sphere(Sphere::new(Vec3::new(0.5, 0.5, 0.5), 0.4, optics())),
            Primitive::Sphere(Sphere::new(Vec3::new(9.5, 9.5, 0.5), 0.4, optics())),
        ]
    }

    /// Rays aimed at each primitive plus a few that miss everything.
    fn sample_rays() -> Vec<Ray> {
        let eye = Vec3::new(-5.0, -5.0, -5.0);
        let mut rays: Vec<Ray> = sample_scene()
            .iter()
            .flat_map(|p| {
                let (min, max) = bounding_box(std::slice::from_ref(p)).unwrap();
                let center = (min + max) / 2.0;
                [
                    Ray::new(eye, center - eye),
                    Ray::new(Vec3::new(center.x, center.y, -5.0), Vec3::Z),
                ]
            })
            .collect();
        rays.push(Ray::new(eye, -Vec3::X));
        rays.push(Ray::new(Vec3::new(50.0, 50.0, 50.0), Vec3::Z));
        rays
    }

    #[test]
    fn matches_brute_force_closest_hit() {
        let primitives = sample_scene();
        let tree = OcTree::build(&primitives, DEFAULT_TREE_DEPTH);
        let list = PrimitivesList::new(&primitives);

        for ray in sample_rays() {
            let from_list = list.find_closest_intersection(&ray);
            let from_tree = tree.find_closest_intersection(&ray);
            match (from_list, from_tree) {
                (Some(a), Some(b)) => {
                    assert!(
                        (a.point - b.point).length() < 1e-3,
                        "closest hits diverge for {ray:?}: {:?} vs {:?}",
                        a.point,
                        b.point
                    );
                }
                (None, None) => {}
                (a, b) => panic!(
                    "hit disagreement for {ray:?}: list={:?} tree={:?}",
                    a.map(|i| i.point),
                    b.map(|i| i.point)
                ),
            }
        }
    }

    #[test]
    fn build_is_idempotent() {
        let primitives = sample_scene();
        let first = OcTree::build(&primitives, DEFAULT_TREE_DEPTH);
        let second = OcTree::build(&primitives, DEFAULT_TREE_DEPTH);

        for ray in sample_rays() {
            let a = first.find_closest_intersection(&ray).map(|i| i.point);
            let b = second.find_closest_intersection(&ray).map(|i| i.point);
            match (a, b) {
                (Some(a), Some(b)) => assert!((a - b).length() < 1e-6),
                (None, None) => {}
                _ => panic!("builds disagree for {ray:?}"),
            }
        }
    }

    #[test]
    fn shadow_query_agrees_with_list() {
        let primitives = sample_scene();
        let tree = OcTree::build(&primitives, DEFAULT_TREE_DEPTH);
        let list = PrimitivesList::new(&primitives);

        for ray in sample_rays() {
            assert_eq!(
                list.has_intersection(&ray),
                tree.has_intersection(&ray),
                "visibility disagreement for {ray:?}"
            );
        }
    }

    #[test]
    fn empty_scene() {
        let primitives: Vec<Primitive> = Vec::new();
        let tree = OcTree::build(&primitives, DEFAULT_TREE_DEPTH);
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        assert!(tree.find_all_intersections(&ray).is_empty());
        assert!(!tree.has_intersection(&ray));
    }

    #[test]
    fn slab_test_accepts_and_rejects() {
        let cube = BoundingCube {
            origin: Vec3::ZERO,
            length: 2.0,
        };

        assert!(cube.intersects_ray(&Ray::new(Vec3::new(-1.0, 1.0, 1.0), Vec3::X)));
        assert!(!cube.intersects_ray(&Ray::new(Vec3::new(-1.0, 1.0, 1.0), -Vec3::X)));
        assert!(!cube.intersects_ray(&Ray::new(Vec3::new(-1.0, 5.0, 1.0), Vec3::X)));
        // Axis-parallel ray outside the y slab rejects immediately.
        assert!(!cube.intersects_ray(&Ray::new(Vec3::new(1.0, 5.0, 1.0), Vec3::Z)));
        // Ray starting inside the cube.
        assert!(cube.intersects_ray(&Ray::new(Vec3::ONE, Vec3::Y)));
    }

    #[test]
    fn triangle_containment_heuristic() {
        let cube = BoundingCube {
            origin: Vec3::ZERO,
            length: 4.0,
        };

        // Vertex inside.
        let inside = Triangle::new(
            Vec3::ONE,
            Vec3::new(8.0, 1.0, 1.0),
            Vec3::new(1.0, 8.0, 1.0),
            optics(),
        );
        assert!(cube.intersects_triangle(&inside));

        // All vertices outside, plane slicing through the cube:
        // caught by the separating-axis test.
        let slicing = Triangle::new(
            Vec3::new(-1.0, 2.0, 2.0),
            Vec3::new(5.0, 2.0, 2.0),
            Vec3::new(2.0, 5.0, 2.0),
            optics(),
        );
        assert!(cube.intersects_triangle(&slicing));

        // Far away: separated along x.
        let far = Triangle::new(
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(12.0, 0.0, 0.0),
            Vec3::new(11.0, 2.0, 0.0),
            optics(),
        );
        assert!(!cube.intersects_triangle(&far));
    }
}
