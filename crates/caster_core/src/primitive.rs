//! The closed set of geometric primitives and their ray queries.
//!
//! Every primitive answers two questions about a ray: a cheap boolean
//! visibility test (`intersects`, used for shadow rays) and the full
//! intersection set (`intersections`). Compound shapes are decomposed
//! at construction time: a quadrangle into two triangles sharing one
//! diagonal, a box into six quadrangle faces.
//!
//! Degenerate geometry (zero-radius sphere, non-planar quadrangle, ray
//! parallel to a triangle plane) is not validated; it simply produces
//! fewer or no hits.

use caster_math::{Ray, Vec3, EPS};

use crate::Optics;

/// Record of a single ray/primitive intersection.
///
/// Holds the hit point, the surface normal at the hit, and a reference
/// to the material of the primitive that was hit. The normal may be
/// flipped in place by [`Intersection::reflect`] so that it faces the
/// incoming ray.
#[derive(Debug, Clone)]
pub struct Intersection<'a> {
    pub point: Vec3,
    pub normal: Vec3,
    pub optics: &'a Optics,
}

impl<'a> Intersection<'a> {
    /// Mirror `ray` off the surface at this intersection.
    ///
    /// If the stored normal points away from the incoming ray it is
    /// flipped first, so subsequent shading reads a viewer-facing
    /// normal. The returned ray starts at the hit point.
    pub fn reflect(&mut self, ray: &Ray) -> Ray {
        if ray.direction.dot(self.normal) > 0.0 {
            self.normal = -self.normal;
        }
        let direction = ray.direction - self.normal * 2.0 * ray.direction.dot(self.normal);
        Ray::from_unit(self.point, direction)
    }
}

/// A sphere defined by center and radius.
#[derive(Debug, Clone, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
    pub optics: Optics,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32, optics: Optics) -> Self {
        Self {
            center,
            radius,
            optics,
        }
    }

    /// Closed-form quadratic roots of the ray/sphere equation,
    /// smallest first. `None` when the discriminant is negative; a
    /// tangent ray yields a single root.
    fn roots(&self, ray: &Ray) -> Option<(f32, Option<f32>)> {
        let oc = ray.origin - self.center;
        let a = ray.direction.length_squared();
        let b = 2.0 * ray.direction.dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return None;
        }
        let sqrtd = discriminant.sqrt();
        let t1 = (-b - sqrtd) / (2.0 * a);
        if discriminant > 0.0 {
            Some((t1, Some((-b + sqrtd) / (2.0 * a))))
        } else {
            Some((t1, None))
        }
    }

    fn intersects(&self, ray: &Ray) -> bool {
        match self.roots(ray) {
            Some((t1, t2)) => t1 > EPS || t2.is_some_and(|t| t > EPS),
            None => false,
        }
    }

    fn intersections(&self, ray: &Ray) -> Vec<Intersection<'_>> {
        let mut result = Vec::new();
        if let Some((t1, t2)) = self.roots(ray) {
            for t in std::iter::once(t1).chain(t2) {
                if t > EPS {
                    let point = ray.at(t);
                    result.push(Intersection {
                        point,
                        normal: (point - self.center).normalize(),
                        optics: &self.optics,
                    });
                }
            }
        }
        result
    }

    fn wireframe(&self) -> Vec<Vec<Vec3>> {
        const SEGMENTS: usize = 16;
        const MERIDIANS: usize = 8;
        const PARALLELS: usize = 7;

        let mut lines = Vec::new();
        // Meridians run pole to pole; the step keeps the equator and
        // both poles on the polyline so the wireframe spans the full
        // extent of the sphere on every axis.
        for m in 0..MERIDIANS {
            let phi = std::f32::consts::PI * m as f32 / MERIDIANS as f32;
            let mut line = Vec::with_capacity(SEGMENTS + 1);
            for s in 0..=SEGMENTS {
                let theta = 2.0 * std::f32::consts::PI * s as f32 / SEGMENTS as f32;
                line.push(
                    self.center
                        + Vec3::new(
                            theta.sin() * phi.cos(),
                            theta.sin() * phi.sin(),
                            theta.cos(),
                        ) * self.radius,
                );
            }
            lines.push(line);
        }
        for p in 1..=PARALLELS {
            let theta = std::f32::consts::PI * p as f32 / (PARALLELS + 1) as f32;
            let mut line = Vec::with_capacity(SEGMENTS + 1);
            for s in 0..=SEGMENTS {
                let phi = 2.0 * std::f32::consts::PI * s as f32 / SEGMENTS as f32;
                line.push(
                    self.center
                        + Vec3::new(
                            theta.sin() * phi.cos(),
                            theta.sin() * phi.sin(),
                            theta.cos(),
                        ) * self.radius,
                );
            }
            lines.push(line);
        }
        lines
    }
}

/// A triangle defined by three vertices.
///
/// The plane normal is computed once from the edge vectors and shared
/// by both ray queries.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
    pub optics: Optics,
    normal: Vec3,
}

impl Triangle {
    pub fn new(a: Vec3, b: Vec3, c: Vec3, optics: Optics) -> Self {
        let normal = (b - a).cross(c - a).normalize();
        Self {
            a,
            b,
            c,
            optics,
            normal,
        }
    }

    /// Precomputed plane normal (unit length, orientation follows
    /// vertex winding).
    #[inline]
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// Möller–Trumbore: distance along the ray to the hit, if any.
    fn hit_distance(&self, ray: &Ray) -> Option<f32> {
        let edge1 = self.b - self.a;
        let edge2 = self.c - self.a;

        let h = ray.direction.cross(edge2);
        let denominator = edge1.dot(h);
        // Ray parallel to the triangle plane.
        if denominator.abs() < EPS {
            return None;
        }

        let f = 1.0 / denominator;
        let s = ray.origin - self.a;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * ray.direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(q);
        (t > EPS).then_some(t)
    }

    fn intersects(&self, ray: &Ray) -> bool {
        self.hit_distance(ray).is_some()
    }

    fn intersections(&self, ray: &Ray) -> Vec<Intersection<'_>> {
        match self.hit_distance(ray) {
            Some(t) => vec![Intersection {
                point: ray.at(t),
                normal: self.normal,
                optics: &self.optics,
            }],
            None => Vec::new(),
        }
    }

    fn wireframe(&self) -> Vec<Vec<Vec3>> {
        vec![vec![self.a, self.b, self.c, self.a]]
    }
}

/// A planar convex quadrangle, stored as two triangles sharing the
/// a–c diagonal. Non-planar or non-convex input is accepted but the
/// query results are unspecified.
#[derive(Debug, Clone, PartialEq)]
pub struct Quadrangle {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
    pub d: Vec3,
    pub optics: Optics,
    triangles: [Triangle; 2],
}

impl Quadrangle {
    pub fn new(a: Vec3, b: Vec3, c: Vec3, d: Vec3, optics: Optics) -> Self {
        Self {
            a,
            b,
            c,
            d,
            optics,
            triangles: [
                Triangle::new(a, b, c, optics),
                Triangle::new(a, c, d, optics),
            ],
        }
    }

    /// The two triangles of the diagonal split.
    #[inline]
    pub fn triangles(&self) -> &[Triangle; 2] {
        &self.triangles
    }

    fn intersects(&self, ray: &Ray) -> bool {
        self.triangles.iter().any(|t| t.intersects(ray))
    }

    fn intersections(&self, ray: &Ray) -> Vec<Intersection<'_>> {
        // The diagonal split keeps the triangle interiors disjoint for
        // a planar quad, so this union holds at most one hit.
        let mut result = Vec::new();
        for triangle in &self.triangles {
            result.extend(triangle.intersections(ray));
        }
        result
    }

    fn wireframe(&self) -> Vec<Vec<Vec3>> {
        vec![vec![self.a, self.b, self.c, self.d, self.a]]
    }
}

/// An axis-aligned box, stored as six quadrangle faces.
#[derive(Debug, Clone, PartialEq)]
pub struct Box3 {
    pub min: Vec3,
    pub max: Vec3,
    pub optics: Optics,
    faces: Box<[Quadrangle; 6]>,
}

impl Box3 {
    pub fn new(min: Vec3, max: Vec3, optics: Optics) -> Self {
        let [x0, y0, z0] = min.to_array();
        let [x1, y1, z1] = max.to_array();
        let p = |x: f32, y: f32, z: f32| Vec3::new(x, y, z);

        let faces = Box::new([
            // z = min / z = max
            Quadrangle::new(p(x0, y0, z0), p(x1, y0, z0), p(x1, y1, z0), p(x0, y1, z0), optics),
            Quadrangle::new(p(x0, y0, z1), p(x1, y0, z1), p(x1, y1, z1), p(x0, y1, z1), optics),
            // y = min / y = max
            Quadrangle::new(p(x0, y0, z0), p(x1, y0, z0), p(x1, y0, z1), p(x0, y0, z1), optics),
            Quadrangle::new(p(x0, y1, z0), p(x1, y1, z0), p(x1, y1, z1), p(x0, y1, z1), optics),
            // x = min / x = max
            Quadrangle::new(p(x0, y0, z0), p(x0, y1, z0), p(x0, y1, z1), p(x0, y0, z1), optics),
            Quadrangle::new(p(x1, y0, z0), p(x1, y1, z0), p(x1, y1, z1), p(x1, y0, z1), optics),
        ]);

        Self { min, max, optics, faces }
    }

    /// Whether a point lies inside the box (boundary inclusive).
    pub fn contains_point(&self, p: Vec3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    fn intersects(&self, ray: &Ray) -> bool {
        self.faces.iter().any(|f| f.intersects(ray))
    }

    fn intersections(&self, ray: &Ray) -> Vec<Intersection<'_>> {
        let mut result = Vec::new();
        for face in self.faces.iter() {
            result.extend(face.intersections(ray));
        }
        result
    }

    fn wireframe(&self) -> Vec<Vec<Vec3>> {
        self.faces.iter().flat_map(|f| f.wireframe()).collect()
    }
}

/// The closed polymorphic primitive set.
///
/// New shapes are not expected at runtime, so dispatch is a plain
/// `match` instead of trait objects.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Sphere(Sphere),
    Box(Box3),
    Triangle(Triangle),
    Quadrangle(Quadrangle),
}

impl Primitive {
    /// Cheapest possible yes/no visibility test, early-exiting on the
    /// first valid hit. Used for shadow rays.
    pub fn intersects(&self, ray: &Ray) -> bool {
        match self {
            Primitive::Sphere(s) => s.intersects(ray),
            Primitive::Box(b) => b.intersects(ray),
            Primitive::Triangle(t) => t.intersects(ray),
            Primitive::Quadrangle(q) => q.intersects(ray),
        }
    }

    /// All intersections of `ray` with this primitive: zero, one, or
    /// two for spheres, zero or one for planar shapes.
    pub fn intersections(&self, ray: &Ray) -> Vec<Intersection<'_>> {
        match self {
            Primitive::Sphere(s) => s.intersections(ray),
            Primitive::Box(b) => b.intersections(ray),
            Primitive::Triangle(t) => t.intersections(ray),
            Primitive::Quadrangle(q) => q.intersections(ray),
        }
    }

    /// Ordered polylines tracing the shape, for wireframe display and
    /// scene bounds computation.
    pub fn wireframe(&self) -> Vec<Vec<Vec3>> {
        match self {
            Primitive::Sphere(s) => s.wireframe(),
            Primitive::Box(b) => b.wireframe(),
            Primitive::Triangle(t) => t.wireframe(),
            Primitive::Quadrangle(q) => q.wireframe(),
        }
    }

    /// The material of this primitive.
    pub fn optics(&self) -> &Optics {
        match self {
            Primitive::Sphere(s) => &s.optics,
            Primitive::Box(b) => &b.optics,
            Primitive::Triangle(t) => &t.optics,
            Primitive::Quadrangle(q) => &q.optics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_optics() -> Optics {
        Optics::new(Vec3::new(0.9, 0.9, 0.9), Vec3::ZERO, 2000.0)
    }

    fn assert_vec_eq(a: Vec3, b: Vec3) {
        assert!((a - b).length() < 1e-4, "{a:?} != {b:?}");
    }

    #[test]
    fn triangle_intersection() {
        let triangle = Triangle::new(
            Vec3::new(0.0, 2.0, 0.0),
            Vec3::new(2.0, -1.0, 0.0),
            Vec3::new(-2.0, -1.0, 0.0),
            test_optics(),
        );

        let ray = Ray::new(Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 0.0, -1.0));
        let hits = triangle.intersections(&ray);
        assert_eq!(hits.len(), 1);
        assert_vec_eq(hits[0].point, Vec3::ZERO);

        // Behind the plane, pointing away.
        let behind = Ray::new(Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(triangle.intersections(&behind).is_empty());

        // Outside the triangle's projection.
        let outside = Ray::new(Vec3::new(10.0, 0.0, 1.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(triangle.intersections(&outside).is_empty());

        let inside = Ray::new(Vec3::new(1.0, 0.0, 1.0), Vec3::new(0.0, 0.0, -1.0));
        let hits = triangle.intersections(&inside);
        assert_eq!(hits.len(), 1);
        assert_vec_eq(hits[0].point, Vec3::new(1.0, 0.0, 0.0));

        // Just past the top vertex.
        let above = Ray::new(Vec3::new(0.0, 2.01, 1.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(above_is_miss(&triangle, &above));
    }

    fn above_is_miss(triangle: &Triangle, ray: &Ray) -> bool {
        triangle.intersections(ray).is_empty() && !triangle.intersects(ray)
    }

    #[test]
    fn triangle_parallel_ray() {
        let triangle = Triangle::new(
            Vec3::new(0.0, 2.0, 0.0),
            Vec3::new(2.0, -1.0, 0.0),
            Vec3::new(-2.0, -1.0, 0.0),
            test_optics(),
        );
        let parallel = Ray::new(Vec3::new(0.0, 0.0, 1.0), Vec3::X);
        assert!(triangle.intersections(&parallel).is_empty());
    }

    #[test]
    fn quadrangle_intersection() {
        let quadrangle = Quadrangle::new(
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(-1.0, 1.0, 0.0),
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            test_optics(),
        );

        let ray = Ray::new(Vec3::new(0.1, 0.0, 1.0), Vec3::new(0.0, 0.0, -1.0));
        let hits = quadrangle.intersections(&ray);
        assert_eq!(hits.len(), 1);
        assert_vec_eq(hits[0].point, Vec3::new(0.1, 0.0, 0.0));

        let miss = Ray::new(Vec3::new(1.5, 0.0, 1.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(quadrangle.intersections(&miss).is_empty());
    }

    #[test]
    fn sphere_intersection() {
        let sphere = Sphere::new(Vec3::ZERO, 1.0, test_optics());

        let ray = Ray::new(Vec3::new(2.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0));
        let points: Vec<Vec3> = sphere.intersections(&ray).iter().map(|i| i.point).collect();
        assert_eq!(points.len(), 2);
        assert_vec_eq(points[0], Vec3::new(1.0, 0.0, 0.0));
        assert_vec_eq(points[1], Vec3::new(-1.0, 0.0, 0.0));

        // Tangent ray touches in exactly one point.
        let tangent = Ray::new(Vec3::new(2.0, 0.0, 1.0), Vec3::new(-1.0, 0.0, 0.0));
        let points: Vec<Vec3> = sphere
            .intersections(&tangent)
            .iter()
            .map(|i| i.point)
            .collect();
        assert_eq!(points.len(), 1);
        assert_vec_eq(points[0], Vec3::new(0.0, 0.0, 1.0));

        let miss = Ray::new(Vec3::new(10.0, 0.0, 1.1), Vec3::new(-1.0, 0.0, 0.0));
        assert!(sphere.intersections(&miss).is_empty());
        assert!(!sphere.intersects(&miss));
    }

    #[test]
    fn sphere_normal_points_outward() {
        let sphere = Sphere::new(Vec3::ZERO, 1.0, test_optics());
        let ray = Ray::new(Vec3::new(2.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0));
        let hits = sphere.intersections(&ray);
        assert_vec_eq(hits[0].normal, Vec3::X);
        assert_vec_eq(hits[1].normal, -Vec3::X);
    }

    #[test]
    fn box_intersection() {
        let cube = Box3::new(Vec3::ZERO, Vec3::ONE, test_optics());
        let ray = Ray::new(Vec3::new(0.25, 0.5, 2.0), Vec3::new(0.0, 0.0, -1.0));
        let hits = cube.intersections(&ray);
        // Enters through the top face, leaves through the bottom.
        assert_eq!(hits.len(), 2);
        assert!(cube.intersects(&ray));

        let miss = Ray::new(Vec3::new(2.0, 0.5, 2.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(cube.intersections(&miss).is_empty());
    }

    #[test]
    fn reflection_mirrors_incidence_angle() {
        let triangle = Triangle::new(
            Vec3::new(0.0, 2.0, 0.0),
            Vec3::new(-2.0, -1.0, 0.0),
            Vec3::new(2.0, -1.0, 0.0),
            test_optics(),
        );
        let ray = Ray::new(Vec3::new(-2.0, 0.0, 2.0), Vec3::new(2.0, 0.0, -2.0));
        let mut intersection = triangle.intersections(&ray).remove(0);
        let reflected = intersection.reflect(&ray);

        assert_vec_eq(reflected.origin, intersection.point);
        // The flipped normal faces the incoming ray.
        assert!(intersection.normal.dot(ray.direction) < 0.0);
        // Equal angles on both sides of the normal.
        let cos_in = (-ray.direction).dot(intersection.normal);
        let cos_out = reflected.direction.dot(intersection.normal);
        assert!((cos_in - cos_out).abs() < 1e-5);
        // Reflection preserves unit length.
        assert!((reflected.direction.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn reflected_ray_leaves_surface() {
        let sphere = Sphere::new(Vec3::new(1.0, 0.0, 0.0), 1.0, test_optics());
        let ray = Ray::new(Vec3::new(-2.0, 0.0, 2.0), Vec3::new(2.0, 0.0, -2.0));
        let hits = sphere.intersections(&ray);
        assert!(!hits.is_empty());
        let mut intersection = hits.into_iter().next().unwrap();
        let reflected = intersection.reflect(&ray);
        // A reflected ray from the surface must not immediately re-hit
        // the same point.
        let own_hits = sphere.intersections(&reflected);
        for hit in own_hits {
            assert!((hit.point - reflected.origin).length() > 1e-3);
        }
    }

    #[test]
    fn wireframe_spans_extents() {
        let sphere = Sphere::new(Vec3::new(1.0, 2.0, 3.0), 2.0, test_optics());
        let points: Vec<Vec3> = sphere.wireframe().into_iter().flatten().collect();
        let min = points.iter().copied().fold(Vec3::MAX, Vec3::min);
        let max = points.iter().copied().fold(Vec3::MIN, Vec3::max);
        assert_vec_eq(min, Vec3::new(-1.0, 0.0, 1.0));
        assert_vec_eq(max, Vec3::new(3.0, 4.0, 5.0));
    }
}
