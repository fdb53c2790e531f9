//! Core scene model for the caster renderer.
//!
//! This crate defines the renderer-agnostic data model: colors,
//! materials, the closed primitive set with its intersection queries,
//! scene and render descriptions, the persisted text format, and the
//! wireframe projection used by preview displays.

mod color;
mod optics;
mod primitive;
mod scene;

pub mod format;
pub mod projection;

pub use color::Color;
pub use optics::Optics;
pub use primitive::{Box3, Intersection, Primitive, Quadrangle, Sphere, Triangle};
pub use scene::{bounding_box, LightSource, Render, RenderQuality, Scene};
