//! GeoJSON to WKT.
//!
//! Output is canonical: one space between ordinates, `", "` between tuples,
//! no space between a keyword and its `(`. MultiPoint members are never
//! parenthesized. `to_wkt` never writes an SRID prefix, even for a geometry
//! that carries a projection; use [`to_ewkt`] for that.

use log::debug;
use serde::Deserialize;

use crate::error::Result;
use crate::geometry::{epsg_code, Geometry, GeometryType, Position, Value};
use crate::number::format_number;

/// Writes a geometry as WKT.
///
/// ```
/// use wktjson::{to_wkt, Geometry, Value};
///
/// let line = Geometry::new(Value::LineString(vec![[30.0, 10.0], [10.0, 30.0]]));
/// assert_eq!(to_wkt(&line), "LINESTRING(30 10, 10 30)");
/// ```
pub fn to_wkt(geometry: &Geometry) -> String {
    let mut out = String::new();
    write_value(&mut out, &geometry.value);
    out
}

/// Writes a geometry as WKT, prefixed with `SRID=<code>;` when its
/// projection is an `EPSG:<code>` identifier.
pub fn to_ewkt(geometry: &Geometry) -> String {
    match geometry.epsg_code() {
        Some(code) => format!("SRID={};{}", code, to_wkt(geometry)),
        None => to_wkt(geometry),
    }
}

/// Writes an untyped GeoJSON geometry as WKT.
///
/// A missing or unrecognized `type` yields an empty string rather than an
/// error. A recognized type whose body does not match it is an error.
///
/// Collection members get the same treatment, so an unrecognized member is
/// written as an empty string inside `GEOMETRYCOLLECTION(...)`.
pub fn to_wkt_value(json: &serde_json::Value) -> Result<String> {
    let type_name = json.get("type").and_then(serde_json::Value::as_str);
    match type_name.and_then(GeometryType::from_name) {
        None => {
            debug!("cannot write geometry type {:?}, returning empty WKT", type_name);
            Ok(String::new())
        }
        Some(GeometryType::GeometryCollection) => {
            let collection = UntypedCollection::deserialize(json)?;
            let members = collection
                .geometries
                .iter()
                .map(to_wkt_value)
                .collect::<Result<Vec<_>>>()?;
            let mut out = String::from(GeometryType::GeometryCollection.keyword());
            write_list(&mut out, &members, |out, member| out.push_str(member));
            Ok(out)
        }
        Some(_) => Ok(to_wkt(&Geometry::deserialize(json)?)),
    }
}

/// Like [`to_wkt_value`], prefixed with `SRID=<code>;` as [`to_ewkt`] does.
pub fn to_ewkt_value(json: &serde_json::Value) -> Result<String> {
    let wkt = to_wkt_value(json)?;
    let code = json
        .get("projection")
        .and_then(serde_json::Value::as_str)
        .and_then(epsg_code);
    match code {
        Some(code) if !wkt.is_empty() => Ok(format!("SRID={};{}", code, wkt)),
        _ => Ok(wkt),
    }
}

#[derive(Deserialize)]
struct UntypedCollection {
    geometries: Vec<serde_json::Value>,
}

fn write_value(out: &mut String, value: &Value) {
    out.push_str(value.keyword());
    match value {
        Value::Point(position) => {
            out.push('(');
            write_position(out, position);
            out.push(')');
        }
        Value::LineString(positions) | Value::MultiPoint(positions) => {
            write_positions(out, positions)
        }
        Value::Polygon(rings) | Value::MultiLineString(rings) => {
            write_list(out, rings, |out, ring| write_positions(out, ring))
        }
        Value::MultiPolygon(polygons) => write_list(out, polygons, |out, rings| {
            write_list(out, rings, |out, ring| write_positions(out, ring))
        }),
        Value::GeometryCollection(geometries) => {
            write_list(out, geometries, |out, geometry| {
                write_value(out, &geometry.value)
            })
        }
    }
}

fn write_position(out: &mut String, [x, y]: &Position) {
    out.push_str(&format_number(*x));
    out.push(' ');
    out.push_str(&format_number(*y));
}

fn write_positions(out: &mut String, positions: &[Position]) {
    write_list(out, positions, write_position)
}

/// Writes `(item, item, ...)`.
fn write_list<T>(out: &mut String, items: &[T], mut write_item: impl FnMut(&mut String, &T)) {
    out.push('(');
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_item(out, item);
    }
    out.push(')');
}
