//! WKT to GeoJSON.
//!
//! A small recursive-descent reader. Keywords are matched case-insensitively,
//! whitespace between tokens is ignored, and an optional `SRID=<code>;` prefix
//! is turned into an `EPSG:<code>` projection on the result.

use log::{debug, trace};

use crate::error::{Result, WktError};
use crate::geometry::{Geometry, GeometryType, Position, Value};
use crate::number;

/// Deepest nesting of parenthesized lists accepted, matching serde_json's
/// recursion limit.
const MAX_DEPTH: usize = 128;

/// Settings for [`parse_with`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Reject coordinate tokens that are not entirely numeric, and tuples
    /// that do not hold exactly two ordinates. When unset, the numeric
    /// prefix of each token is used (NaN if it has none), a missing `y`
    /// reads as NaN and ordinates past the second are dropped.
    pub strict: bool,
}

impl ParseOptions {
    pub fn strict() -> Self {
        ParseOptions { strict: true }
    }
}

/// Parses a WKT string, optionally prefixed with `SRID=<code>;`.
///
/// ```
/// use wktjson::{to_geojson, Value};
///
/// let geometry = to_geojson("SRID=3857;POINT(30 10)").unwrap();
/// assert_eq!(geometry.value, Value::Point([30.0, 10.0]));
/// assert_eq!(geometry.projection.as_deref(), Some("EPSG:3857"));
/// ```
pub fn to_geojson(wkt: &str) -> Result<Geometry> {
    parse_with(wkt, ParseOptions::default())
}

pub fn parse_with(wkt: &str, options: ParseOptions) -> Result<Geometry> {
    let mut reader = Reader {
        input: wkt,
        pos: 0,
        depth: 0,
        options,
    };
    reader.skip_whitespace();
    let projection = reader.read_srid().map(|code| format!("EPSG:{}", code));
    if let Some(projection) = &projection {
        debug!("found SRID prefix, projection {}", projection);
    }

    let value = reader.read_geometry()?;
    reader.skip_whitespace();
    if reader.pos < wkt.len() {
        return Err(reader.syntax_error("unexpected text after geometry"));
    }
    Ok(Geometry { value, projection })
}

struct Reader<'a> {
    input: &'a str,
    pos: usize,
    depth: usize,
    options: ParseOptions,
}

impl<'a> Reader<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn syntax_error(&self, message: &str) -> WktError {
        WktError::Syntax {
            offset: self.pos,
            message: message.to_string(),
        }
    }

    /// Consumes `byte` after optional whitespace, returning whether it was there.
    fn eat(&mut self, byte: u8) -> bool {
        self.skip_whitespace();
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, byte: u8) -> Result<()> {
        if self.eat(byte) {
            Ok(())
        } else {
            Err(self.syntax_error(&format!("expected '{}'", byte as char)))
        }
    }

    /// Consumes `SRID=<digits>;` and returns the digits.
    fn read_srid(&mut self) -> Option<&'a str> {
        let rest = self.rest();
        let prefix = rest.get(..5)?;
        if !prefix.eq_ignore_ascii_case("SRID=") {
            return None;
        }
        let digits = rest[5..].bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 || rest.as_bytes().get(5 + digits) != Some(&b';') {
            return None;
        }
        self.pos += 5 + digits + 1;
        Some(&rest[5..5 + digits])
    }

    /// Reads the keyword in front of the next `(`.
    fn read_type(&mut self) -> Result<GeometryType> {
        let rest = self.rest();
        let end = rest
            .find(|c: char| matches!(c, '(' | ')' | ','))
            .unwrap_or(rest.len());
        let kind = rest[..end].parse::<GeometryType>()?;
        self.pos += end;
        Ok(kind)
    }

    fn read_geometry(&mut self) -> Result<Value> {
        let kind = self.read_type()?;
        trace!("reading {} at offset {}", kind, self.pos);
        let value = match kind {
            GeometryType::Point => {
                self.expect(b'(')?;
                let position = self.read_position()?;
                self.expect(b')')?;
                Value::Point(position)
            }
            GeometryType::LineString => Value::LineString(self.read_list(Self::read_position)?),
            GeometryType::Polygon => Value::Polygon(self.read_list(Self::read_positions)?),
            GeometryType::MultiPoint => {
                Value::MultiPoint(self.read_list(Self::read_multi_point_member)?)
            }
            GeometryType::MultiLineString => {
                Value::MultiLineString(self.read_list(Self::read_positions)?)
            }
            GeometryType::MultiPolygon => {
                Value::MultiPolygon(self.read_list(|reader| reader.read_list(Self::read_positions))?)
            }
            GeometryType::GeometryCollection => Value::GeometryCollection(
                self.read_list(|reader| reader.read_geometry().map(Geometry::new))?,
            ),
        };
        Ok(value)
    }

    /// Reads `( item, item, ... )`. The list may be empty.
    fn read_list<T>(&mut self, mut item: impl FnMut(&mut Self) -> Result<T>) -> Result<Vec<T>> {
        self.expect(b'(')?;
        if self.depth == MAX_DEPTH {
            return Err(self.syntax_error("geometry nested too deeply"));
        }
        self.depth += 1;

        let mut items = Vec::new();
        if !self.eat(b')') {
            loop {
                items.push(item(self)?);
                if !self.eat(b',') {
                    break;
                }
            }
            self.expect(b')')?;
        }

        self.depth -= 1;
        Ok(items)
    }

    fn read_positions(&mut self) -> Result<Vec<Position>> {
        self.read_list(Self::read_position)
    }

    /// MultiPoint members may or may not be wrapped in their own parentheses.
    fn read_multi_point_member(&mut self) -> Result<Position> {
        if self.eat(b'(') {
            let position = self.read_position()?;
            self.expect(b')')?;
            Ok(position)
        } else {
            self.read_position()
        }
    }

    /// Reads whitespace-separated ordinates up to the next `,` or `)`.
    fn read_position(&mut self) -> Result<Position> {
        self.skip_whitespace();
        let start = self.pos;
        let mut position = [f64::NAN; 2];
        let mut count = 0;
        loop {
            self.skip_whitespace();
            let token_start = self.pos;
            let token = self.read_token();
            if token.is_empty() {
                break;
            }
            let value = if self.options.strict {
                number::parse_strict(token).ok_or_else(|| WktError::MalformedCoordinate {
                    token: token.to_string(),
                    offset: token_start,
                })?
            } else {
                number::parse_lenient(token)
            };
            if let Some(slot) = position.get_mut(count) {
                *slot = value;
            }
            count += 1;
        }

        if count == 0 {
            return Err(self.syntax_error("expected coordinate"));
        }
        if self.options.strict && count != 2 {
            return Err(WktError::MalformedCoordinate {
                token: self.input[start..self.pos].trim_end().to_string(),
                offset: start,
            });
        }
        Ok(position)
    }

    fn read_token(&mut self) -> &'a str {
        let rest = self.rest();
        let len = rest
            .find(|c: char| c.is_whitespace() || matches!(c, '(' | ')' | ','))
            .unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }
}
