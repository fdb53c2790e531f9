//! `.scene` file parsing and writing.

use caster_math::Vec3;

use crate::{Box3, LightSource, Optics, Primitive, Quadrangle, Scene, Sphere, Triangle};

use super::tokens::{strip_comments, Tokens};
use super::{ParseError, ParseResult};

/// Parse a `.scene` description.
pub fn parse_scene(input: &str) -> ParseResult<Scene> {
    let cleaned = strip_comments(input);
    let mut tokens = Tokens::new(&cleaned);

    let diffusion_color = tokens.next_color("invalid background color")?;
    let n_sources = tokens.next_i32("invalid amount of light sources")?;

    let mut light_sources = Vec::new();
    for i in 1..=n_sources {
        let position = tokens.next_vec3(&format!("invalid source[{i}] coordinates"))?;
        let color = tokens.next_color(&format!("invalid source[{i}] color"))?;
        light_sources.push(LightSource::new(position, color));
    }

    let mut primitives = Vec::new();
    while !tokens.is_empty() {
        primitives.push(parse_primitive(&mut tokens)?);
    }

    log::debug!(
        "parsed scene: {} light source(s), {} primitive(s)",
        light_sources.len(),
        primitives.len()
    );

    Ok(Scene {
        diffusion_color,
        light_sources,
        primitives,
    })
}

fn parse_primitive(tokens: &mut Tokens) -> ParseResult<Primitive> {
    let keyword = tokens.next_raw("missing primitive type")?;
    match keyword.to_ascii_uppercase().as_str() {
        "SPHERE" => Ok(Primitive::Sphere(Sphere::new(
            tokens.next_vec3("invalid sphere position")?,
            tokens.next_f32("invalid radius")?,
            tokens.next_optics("invalid sphere optics")?,
        ))),
        "BOX" => Ok(Primitive::Box(Box3::new(
            tokens.next_vec3("invalid box min coordinates")?,
            tokens.next_vec3("invalid box max coordinates")?,
            tokens.next_optics("invalid box optics")?,
        ))),
        "TRIANGLE" => Ok(Primitive::Triangle(Triangle::new(
            tokens.next_vec3("invalid triangle first vertex")?,
            tokens.next_vec3("invalid triangle second vertex")?,
            tokens.next_vec3("invalid triangle third vertex")?,
            tokens.next_optics("invalid triangle optics")?,
        ))),
        "QUADRANGLE" => Ok(Primitive::Quadrangle(Quadrangle::new(
            tokens.next_vec3("invalid quadrangle first vertex")?,
            tokens.next_vec3("invalid quadrangle second vertex")?,
            tokens.next_vec3("invalid quadrangle third vertex")?,
            tokens.next_vec3("invalid quadrangle fourth vertex")?,
            tokens.next_optics("invalid quadrangle optics")?,
        ))),
        _ => Err(ParseError::UnknownPrimitive(keyword.to_string())),
    }
}

/// Serialize a scene in the `.scene` token order.
pub fn write_scene(scene: &Scene) -> String {
    let mut out = String::new();
    let c = scene.diffusion_color;
    out.push_str(&format!("{} {} {}\n", c.r, c.g, c.b));
    out.push_str(&format!("{}\n", scene.light_sources.len()));
    for source in &scene.light_sources {
        push_vec3(&mut out, source.position);
        out.push_str(&format!(" {} {} {}\n", source.color.r, source.color.g, source.color.b));
    }
    for primitive in &scene.primitives {
        match primitive {
            Primitive::Sphere(s) => {
                out.push_str("SPHERE\n");
                push_vec3(&mut out, s.center);
                out.push_str(&format!(" {}\n", s.radius));
                push_optics(&mut out, &s.optics);
            }
            Primitive::Box(b) => {
                out.push_str("BOX\n");
                push_vec3(&mut out, b.min);
                out.push(' ');
                push_vec3(&mut out, b.max);
                out.push('\n');
                push_optics(&mut out, &b.optics);
            }
            Primitive::Triangle(t) => {
                out.push_str("TRIANGLE\n");
                for v in [t.a, t.b, t.c] {
                    push_vec3(&mut out, v);
                    out.push('\n');
                }
                push_optics(&mut out, &t.optics);
            }
            Primitive::Quadrangle(q) => {
                out.push_str("QUADRANGLE\n");
                for v in [q.a, q.b, q.c, q.d] {
                    push_vec3(&mut out, v);
                    out.push('\n');
                }
                push_optics(&mut out, &q.optics);
            }
        }
    }
    out
}

fn push_vec3(out: &mut String, v: Vec3) {
    out.push_str(&format!("{} {} {}", v.x, v.y, v.z));
}

fn push_optics(out: &mut String, optics: &Optics) {
    push_vec3(out, optics.diffusion);
    out.push(' ');
    push_vec3(out, optics.specularity);
    out.push_str(&format!(" {}\n", optics.specularity_power));
}
