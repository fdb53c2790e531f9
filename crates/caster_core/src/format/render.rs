//! `.render` file parsing and writing.

use caster_math::Vec3;

use crate::{Render, RenderQuality};

use super::tokens::{strip_comments, Tokens};
use super::{ParseError, ParseResult};

/// Parse a `.render` description.
///
/// The up vector is canonized on load: it is re-orthogonalized against
/// the view direction so that camera basis construction never sees a
/// skewed frame.
pub fn parse_render(input: &str) -> ParseResult<Render> {
    let cleaned = strip_comments(input);
    let mut tokens = Tokens::new(&cleaned);

    let render = Render {
        background_color: tokens.next_color("invalid background color")?,
        gamma: tokens.next_f32("invalid gamma value")?,
        render_depth: tokens.next_i32("invalid depth value")?.max(0) as u32,
        quality: parse_quality(&mut tokens)?,
        camera_position: tokens.next_vec3("invalid camera position")?,
        observation_position: tokens.next_vec3("invalid observation position")?,
        up: tokens.next_vec3("invalid up vector")?,
        z_near: tokens.next_f32("invalid near clipping plane distance")?,
        z_far: tokens.next_f32("invalid far clipping plane distance")?,
        screen_width: tokens.next_f32("invalid screen width")?,
        screen_height: tokens.next_f32("invalid screen height")?,
    };

    let up = canonize_up(
        render.observation_position,
        render.camera_position,
        render.up,
    );
    Ok(Render { up, ..render })
}

fn parse_quality(tokens: &mut Tokens) -> ParseResult<RenderQuality> {
    let token = tokens.next_raw("invalid render quality")?;
    match token.to_ascii_uppercase().as_str() {
        "NORMAL" => Ok(RenderQuality::Normal),
        "FINE" => Ok(RenderQuality::Fine),
        "ROUGH" => Ok(RenderQuality::Rough),
        _ => Err(ParseError::UnknownQuality(token.to_string())),
    }
}

/// Project the up vector back onto the plane orthogonal to the view
/// direction: `up' = normalize((z × up) × z)` where `z` points from
/// the camera to the observed point.
fn canonize_up(observation: Vec3, camera: Vec3, up: Vec3) -> Vec3 {
    let z = observation - camera;
    z.cross(up).cross(z).normalize()
}

/// Serialize a render description in the `.render` token order.
pub fn write_render(render: &Render) -> String {
    let c = render.background_color;
    let mut out = String::new();
    out.push_str(&format!("{} {} {}\n", c.r, c.g, c.b));
    out.push_str(&format!("{}\n", render.gamma));
    out.push_str(&format!("{}\n", render.render_depth));
    out.push_str(&format!("{}\n", render.quality.name()));
    for v in [
        render.camera_position,
        render.observation_position,
        render.up,
    ] {
        out.push_str(&format!("{} {} {}\n", v.x, v.y, v.z));
    }
    out.push_str(&format!("{} {}\n", render.z_near, render.z_far));
    out.push_str(&format!("{} {}\n", render.screen_width, render.screen_height));
    out
}
