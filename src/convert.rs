//! Conversions to and from the `geojson` and `geo-types` crates.
//!
//! The projection travels as a `projection` foreign member on
//! `geojson::Geometry`. `geo-types` has no place for it, so it is dropped
//! going that way.

use std::iter;

use geo_types::{Coord, LineString, Polygon};

use crate::error::{Result, WktError};
use crate::geometry::{Geometry, Position, Value};

const PROJECTION_MEMBER: &str = "projection";

impl From<&Value> for geojson::Value {
    fn from(value: &Value) -> Self {
        fn to_positions(positions: &[Position]) -> Vec<geojson::Position> {
            positions.iter().map(|position| position.to_vec()).collect()
        }
        fn to_rings(rings: &[Vec<Position>]) -> Vec<Vec<geojson::Position>> {
            rings.iter().map(|ring| to_positions(ring)).collect()
        }

        match value {
            Value::Point(position) => geojson::Value::Point(position.to_vec()),
            Value::LineString(line) => geojson::Value::LineString(to_positions(line)),
            Value::Polygon(polygon) => geojson::Value::Polygon(to_rings(polygon)),
            Value::MultiPoint(points) => geojson::Value::MultiPoint(to_positions(points)),
            Value::MultiLineString(lines) => geojson::Value::MultiLineString(to_rings(lines)),
            Value::MultiPolygon(polygons) => geojson::Value::MultiPolygon(
                polygons.iter().map(|polygon| to_rings(polygon)).collect(),
            ),
            Value::GeometryCollection(geometries) => geojson::Value::GeometryCollection(
                geometries.iter().map(geojson::Geometry::from).collect(),
            ),
        }
    }
}

impl From<&Geometry> for geojson::Geometry {
    fn from(geometry: &Geometry) -> Self {
        let mut out = geojson::Geometry::new(geojson::Value::from(&geometry.value));
        if let Some(projection) = &geometry.projection {
            let mut members = geojson::JsonObject::new();
            members.insert(
                PROJECTION_MEMBER.to_string(),
                geojson::JsonValue::from(projection.as_str()),
            );
            out.foreign_members = Some(members);
        }
        out
    }
}

fn position(position: &[f64]) -> Result<Position> {
    match position {
        [x, y, ..] => Ok([*x, *y]),
        _ => Err(WktError::InvalidPosition(position.len())),
    }
}

fn positions(positions: &[geojson::Position]) -> Result<Vec<Position>> {
    positions.iter().map(|p| position(p)).collect()
}

fn rings(rings: &[Vec<geojson::Position>]) -> Result<Vec<Vec<Position>>> {
    rings.iter().map(|ring| positions(ring)).collect()
}

impl TryFrom<&geojson::Value> for Value {
    type Error = WktError;

    fn try_from(value: &geojson::Value) -> Result<Self> {
        let value = match value {
            geojson::Value::Point(point) => Value::Point(position(point)?),
            geojson::Value::LineString(line) => Value::LineString(positions(line)?),
            geojson::Value::Polygon(polygon) => Value::Polygon(rings(polygon)?),
            geojson::Value::MultiPoint(points) => Value::MultiPoint(positions(points)?),
            geojson::Value::MultiLineString(lines) => Value::MultiLineString(rings(lines)?),
            geojson::Value::MultiPolygon(polygons) => Value::MultiPolygon(
                polygons
                    .iter()
                    .map(|polygon| rings(polygon))
                    .collect::<Result<_>>()?,
            ),
            geojson::Value::GeometryCollection(geometries) => Value::GeometryCollection(
                geometries
                    .iter()
                    .map(Geometry::try_from)
                    .collect::<Result<_>>()?,
            ),
        };
        Ok(value)
    }
}

impl TryFrom<&geojson::Geometry> for Geometry {
    type Error = WktError;

    fn try_from(geometry: &geojson::Geometry) -> Result<Self> {
        let projection = geometry
            .foreign_members
            .as_ref()
            .and_then(|members| members.get(PROJECTION_MEMBER))
            .and_then(geojson::JsonValue::as_str)
            .map(str::to_string);
        Ok(Geometry {
            value: Value::try_from(&geometry.value)?,
            projection,
        })
    }
}

impl TryFrom<geojson::Geometry> for Geometry {
    type Error = WktError;

    fn try_from(geometry: geojson::Geometry) -> Result<Self> {
        Geometry::try_from(&geometry)
    }
}

impl TryFrom<&Geometry> for geo_types::Geometry<f64> {
    type Error = WktError;

    fn try_from(geometry: &Geometry) -> Result<Self> {
        let value = geojson::Value::from(&geometry.value);
        Ok(geo_types::Geometry::<f64>::try_from(value)?)
    }
}

fn coords(line: &LineString<f64>) -> Vec<Position> {
    line.coords().map(|c| [c.x, c.y]).collect()
}

fn polygon_rings(polygon: &Polygon<f64>) -> Vec<Vec<Position>> {
    iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(coords)
        .collect()
}

fn coord(c: Coord<f64>) -> Position {
    [c.x, c.y]
}

impl From<&geo_types::Geometry<f64>> for Geometry {
    fn from(geometry: &geo_types::Geometry<f64>) -> Self {
        use geo_types::Geometry as Geo;

        let value = match geometry {
            Geo::Point(point) => Value::Point(coord(point.0)),
            Geo::Line(line) => Value::LineString(vec![coord(line.start), coord(line.end)]),
            Geo::LineString(line) => Value::LineString(coords(line)),
            Geo::Polygon(polygon) => Value::Polygon(polygon_rings(polygon)),
            Geo::MultiPoint(points) => {
                Value::MultiPoint(points.0.iter().map(|point| coord(point.0)).collect())
            }
            Geo::MultiLineString(lines) => Value::MultiLineString(lines.0.iter().map(coords).collect()),
            Geo::MultiPolygon(polygons) => {
                Value::MultiPolygon(polygons.0.iter().map(polygon_rings).collect())
            }
            Geo::GeometryCollection(collection) => {
                Value::GeometryCollection(collection.0.iter().map(Geometry::from).collect())
            }
            Geo::Rect(rect) => Value::Polygon(polygon_rings(&rect.to_polygon())),
            Geo::Triangle(triangle) => Value::Polygon(polygon_rings(&triangle.to_polygon())),
        };
        Geometry::new(value)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parser::to_geojson;
    use approx::assert_relative_eq;
    use geo_types::{line_string, point, polygon, Rect};

    #[test]
    fn to_geojson_crate_keeps_projection() {
        let geometry = to_geojson("SRID=4326;LINESTRING(30 10, 10 30)").unwrap();
        let converted = geojson::Geometry::from(&geometry);
        assert_eq!(
            converted.value,
            geojson::Value::LineString(vec![vec![30.0, 10.0], vec![10.0, 30.0]])
        );
        let members = converted.foreign_members.clone().unwrap();
        assert_eq!(members["projection"], "EPSG:4326");

        assert_eq!(Geometry::try_from(converted).unwrap(), geometry);
    }

    #[test]
    fn geojson_crate_3d_positions_are_flattened() {
        let value = geojson::Value::Point(vec![1.0, 2.0, 3.0]);
        assert_eq!(Value::try_from(&value).unwrap(), Value::Point([1.0, 2.0]));

        let value = geojson::Value::LineString(vec![vec![1.0]]);
        assert!(matches!(
            Value::try_from(&value),
            Err(WktError::InvalidPosition(1))
        ));
    }

    #[test]
    fn parsed_geojson_text_converts() {
        let geometry: geojson::Geometry =
            r#"{"type": "MultiPoint", "coordinates": [[10, 40], [40, 30]]}"#
                .parse::<geojson::GeoJson>()
                .unwrap()
                .try_into()
                .unwrap();
        assert_eq!(
            Geometry::try_from(&geometry).unwrap().value,
            Value::MultiPoint(vec![[10.0, 40.0], [40.0, 30.0]])
        );
    }

    #[test]
    fn to_geo_types() {
        let geometry = to_geojson("POLYGON((0 0, 4 0, 4 4, 0 0), (1 1, 2 1, 2 2, 1 1))").unwrap();
        match geo_types::Geometry::try_from(&geometry).unwrap() {
            geo_types::Geometry::Polygon(polygon) => {
                assert_eq!(polygon.exterior().0.len(), 4);
                assert_eq!(polygon.interiors().len(), 1);
                assert_relative_eq!(polygon.interiors()[0].0[1].x, 2.0);
            }
            other => panic!("unexpected geometry {:?}", other),
        }
    }

    #[test]
    fn from_geo_types() {
        let line: geo_types::Geometry<f64> = line_string![(x: 1.0, y: 2.0), (x: 3.0, y: 4.0)].into();
        assert_eq!(
            Geometry::from(&line).value,
            Value::LineString(vec![[1.0, 2.0], [3.0, 4.0]])
        );

        let point: geo_types::Geometry<f64> = point!(x: -71.06, y: 42.35).into();
        assert_eq!(Geometry::from(&point).value, Value::Point([-71.06, 42.35]));

        let square: geo_types::Geometry<f64> =
            polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)].into();
        assert_eq!(
            Geometry::from(&square).value,
            Value::Polygon(vec![vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]])
        );

        let rect: geo_types::Geometry<f64> =
            Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 2.0, y: 1.0 }).into();
        match Geometry::from(&rect).value {
            Value::Polygon(rings) => assert_eq!(rings[0].len(), 5),
            other => panic!("unexpected value {:?}", other),
        }
    }
}
