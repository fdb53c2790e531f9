//! CPU ray casting renderer.
//!
//! Renders a [`caster_core::Scene`] under point lights into a raster
//! image. Two illumination models are provided behind the [`Tracer`]
//! trait: single-bounce Phong ([`LocalIllumination`]) and recursive
//! mirror reflection ([`GlobalIllumination`]). Intersection queries go
//! through a [`TracingStructure`], either a brute-force list or an
//! octree. The [`Executor`] runs the tracer over the raster in
//! parallel batches with progress reporting and cooperative
//! cancellation.

mod camera;
mod executor;
mod global;
mod image_buffer;
mod intensity;
mod local;

pub mod structure;

pub use camera::ScreenCamera;
pub use executor::{find_batches, Batch, Executor, RenderControl, RenderError};
pub use global::GlobalIllumination;
pub use image_buffer::ImageBuffer;
pub use intensity::Intensity;
pub use local::LocalIllumination;
pub use structure::{OcTree, PrimitivesList, TracingStructure, DEFAULT_TREE_DEPTH};

use caster_math::Ray;

/// Per-ray shading: maps a primary ray to an accumulated color
/// intensity. Implementations are shared read-only across worker
/// threads.
pub trait Tracer: Send + Sync {
    fn trace(&self, ray: &Ray) -> Intensity;
}
