// Re-export glam for convenience
pub use glam::*;

mod ray;
pub use ray::Ray;

/// Tolerance used by intersection tests to reject hits at the origin of
/// reflected rays (self-intersection guard).
pub const EPS: f32 = 1e-4;
