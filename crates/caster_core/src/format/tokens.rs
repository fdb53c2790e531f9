//! Whitespace token stream with `//` comment stripping.

use caster_math::Vec3;

use crate::{Color, Optics};

use super::{ParseError, ParseResult};

/// Remove `//` line comments, keeping everything before the marker.
pub fn strip_comments(input: &str) -> String {
    let mut cleaned = String::with_capacity(input.len());
    for line in input.lines() {
        let line = match line.find("//") {
            Some(0) => continue,
            Some(idx) => &line[..idx],
            None => line,
        };
        cleaned.push_str(line);
        cleaned.push('\n');
    }
    cleaned
}

/// Iterator over whitespace-delimited tokens with typed readers.
///
/// Every reader takes a `what` description that becomes the error
/// message when the token is missing or malformed.
pub struct Tokens<'a> {
    inner: std::str::SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    pub fn new(cleaned: &'a str) -> Self {
        Self {
            inner: cleaned.split_whitespace(),
        }
    }

    pub fn is_empty(&mut self) -> bool {
        self.peek().is_none()
    }

    pub fn peek(&mut self) -> Option<&'a str> {
        self.inner.clone().next()
    }

    pub fn next_raw(&mut self, what: &str) -> ParseResult<&'a str> {
        self.inner.next().ok_or_else(|| ParseError::UnexpectedEnd {
            what: what.to_string(),
        })
    }

    pub fn next_f32(&mut self, what: &str) -> ParseResult<f32> {
        let token = self.next_raw(what)?;
        token.parse().map_err(|_| ParseError::BadToken {
            what: what.to_string(),
            token: token.to_string(),
        })
    }

    pub fn next_i32(&mut self, what: &str) -> ParseResult<i32> {
        let token = self.next_raw(what)?;
        token.parse().map_err(|_| ParseError::BadToken {
            what: what.to_string(),
            token: token.to_string(),
        })
    }

    pub fn next_vec3(&mut self, what: &str) -> ParseResult<Vec3> {
        Ok(Vec3::new(
            self.next_f32(what)?,
            self.next_f32(what)?,
            self.next_f32(what)?,
        ))
    }

    pub fn next_color(&mut self, what: &str) -> ParseResult<Color> {
        let r = self.next_i32(what)?;
        let g = self.next_i32(what)?;
        let b = self.next_i32(what)?;
        let range = 0..=255;
        if !range.contains(&r) || !range.contains(&g) || !range.contains(&b) {
            return Err(ParseError::ColorRange {
                what: what.to_string(),
            });
        }
        Ok(Color::new(r as u8, g as u8, b as u8))
    }

    pub fn next_optics(&mut self, what: &str) -> ParseResult<Optics> {
        Ok(Optics::new(
            self.next_vec3(what)?,
            self.next_vec3(what)?,
            self.next_f32(what)?,
        ))
    }
}
