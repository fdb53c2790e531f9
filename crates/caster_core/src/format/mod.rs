//! Persisted text formats for scenes and render settings.
//!
//! Both formats are streams of whitespace/newline-delimited tokens;
//! `//` starts a line comment that is stripped before tokenizing.
//!
//! `.render` token order: background color (3 ints 0–255), gamma,
//! depth, quality name, camera position, observation position, up
//! vector, zNear, zFar, screen width, screen height.
//!
//! `.scene` token order: background color, light-source count followed
//! by that many position/color pairs, then primitive records, each a
//! type keyword (SPHERE | BOX | TRIANGLE | QUADRANGLE), its geometry
//! floats, and a trailing optics block.

mod render;
mod scene;
mod tokens;

pub use render::{parse_render, write_render};
pub use scene::{parse_scene, write_scene};

use thiserror::Error;

/// Errors produced when a `.scene` or `.render` file cannot be parsed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("{what}: unexpected end of input")]
    UnexpectedEnd { what: String },

    #[error("{what}: bad token '{token}'")]
    BadToken { what: String, token: String },

    #[error("{what}: channel out of range 0-255")]
    ColorRange { what: String },

    #[error("invalid primitive type: {0}")]
    UnknownPrimitive(String),

    #[error("invalid render quality: {0}")]
    UnknownQuality(String),
}

/// Result type for format parsing.
pub type ParseResult<T> = Result<T, ParseError>;
