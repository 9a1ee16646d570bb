use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::WktError;

/// A 2D coordinate pair, `[x, y]`.
pub type Position = [f64; 2];

/// The seven geometry kinds understood by the codec.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GeometryType {
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    GeometryCollection,
}

impl GeometryType {
    pub const ALL: [GeometryType; 7] = [
        GeometryType::Point,
        GeometryType::LineString,
        GeometryType::Polygon,
        GeometryType::MultiPoint,
        GeometryType::MultiLineString,
        GeometryType::MultiPolygon,
        GeometryType::GeometryCollection,
    ];

    /// Upper-case WKT keyword, e.g. `MULTIPOLYGON`.
    pub fn keyword(self) -> &'static str {
        match self {
            GeometryType::Point => "POINT",
            GeometryType::LineString => "LINESTRING",
            GeometryType::Polygon => "POLYGON",
            GeometryType::MultiPoint => "MULTIPOINT",
            GeometryType::MultiLineString => "MULTILINESTRING",
            GeometryType::MultiPolygon => "MULTIPOLYGON",
            GeometryType::GeometryCollection => "GEOMETRYCOLLECTION",
        }
    }

    /// GeoJSON `type` member, e.g. `MultiPolygon`.
    pub fn name(self) -> &'static str {
        match self {
            GeometryType::Point => "Point",
            GeometryType::LineString => "LineString",
            GeometryType::Polygon => "Polygon",
            GeometryType::MultiPoint => "MultiPoint",
            GeometryType::MultiLineString => "MultiLineString",
            GeometryType::MultiPolygon => "MultiPolygon",
            GeometryType::GeometryCollection => "GeometryCollection",
        }
    }

    /// Looks up a GeoJSON type name. The match is exact: `point` is not `Point`.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }
}

impl FromStr for GeometryType {
    type Err = WktError;

    /// Parses a WKT keyword, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let keyword = s.trim().to_ascii_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.keyword() == keyword)
            .ok_or(WktError::UnsupportedGeometry(keyword))
    }
}

impl fmt::Display for GeometryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Coordinates of a geometry, nested to the depth its type requires.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Point(Position),
    LineString(Vec<Position>),
    /// Exterior ring first, then holes.
    Polygon(Vec<Vec<Position>>),
    MultiPoint(Vec<Position>),
    MultiLineString(Vec<Vec<Position>>),
    MultiPolygon(Vec<Vec<Vec<Position>>>),
    GeometryCollection(Vec<Geometry>),
}

impl Value {
    pub fn geometry_type(&self) -> GeometryType {
        match self {
            Value::Point(_) => GeometryType::Point,
            Value::LineString(_) => GeometryType::LineString,
            Value::Polygon(_) => GeometryType::Polygon,
            Value::MultiPoint(_) => GeometryType::MultiPoint,
            Value::MultiLineString(_) => GeometryType::MultiLineString,
            Value::MultiPolygon(_) => GeometryType::MultiPolygon,
            Value::GeometryCollection(_) => GeometryType::GeometryCollection,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.geometry_type().name()
    }

    pub fn keyword(&self) -> &'static str {
        self.geometry_type().keyword()
    }
}

/// A GeoJSON geometry object.
///
/// `projection` is set to `EPSG:<code>` when the geometry was read from WKT
/// carrying an `SRID=<code>;` prefix.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(from = "GeometryRepr")]
pub struct Geometry {
    pub value: Value,
    pub projection: Option<String>,
}

impl Geometry {
    pub fn new(value: Value) -> Self {
        Geometry {
            value,
            projection: None,
        }
    }

    pub fn with_projection(value: Value, projection: impl Into<String>) -> Self {
        Geometry {
            value,
            projection: Some(projection.into()),
        }
    }

    pub fn geometry_type(&self) -> GeometryType {
        self.value.geometry_type()
    }

    /// EPSG code of the projection, if it has the `EPSG:<code>` form.
    pub fn epsg_code(&self) -> Option<&str> {
        self.projection.as_deref().and_then(epsg_code)
    }
}

/// Code part of an `EPSG:<digits>` projection string.
pub(crate) fn epsg_code(projection: &str) -> Option<&str> {
    let code = projection.get(5..)?;
    if projection[..5].eq_ignore_ascii_case("EPSG:")
        && !code.is_empty()
        && code.bytes().all(|b| b.is_ascii_digit())
    {
        Some(code)
    } else {
        None
    }
}

impl From<Value> for Geometry {
    fn from(value: Value) -> Self {
        Geometry::new(value)
    }
}

impl Serialize for Geometry {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", self.value.type_name())?;
        match &self.value {
            Value::Point(position) => map.serialize_entry("coordinates", position)?,
            Value::LineString(positions) | Value::MultiPoint(positions) => {
                map.serialize_entry("coordinates", positions)?
            }
            Value::Polygon(rings) | Value::MultiLineString(rings) => {
                map.serialize_entry("coordinates", rings)?
            }
            Value::MultiPolygon(polygons) => map.serialize_entry("coordinates", polygons)?,
            Value::GeometryCollection(geometries) => {
                map.serialize_entry("geometries", geometries)?
            }
        }
        if let Some(projection) = &self.projection {
            map.serialize_entry("projection", projection)?;
        }
        map.end()
    }
}

#[derive(Deserialize)]
struct GeometryRepr {
    #[serde(flatten)]
    value: TaggedValue,
    #[serde(default)]
    projection: Option<String>,
}

/// A JSON position: at least two ordinates, of which the first two are
/// kept. `null` reads as NaN, which is how NaN is written.
struct JsonPosition(Position);

impl<'de> Deserialize<'de> for JsonPosition {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ordinates = Vec::<Option<f64>>::deserialize(deserializer)?;
        match ordinates.as_slice() {
            [x, y, ..] => Ok(JsonPosition([
                x.unwrap_or(f64::NAN),
                y.unwrap_or(f64::NAN),
            ])),
            _ => Err(D::Error::invalid_length(
                ordinates.len(),
                &"at least 2 ordinates",
            )),
        }
    }
}

fn positions(positions: Vec<JsonPosition>) -> Vec<Position> {
    positions.into_iter().map(|JsonPosition(position)| position).collect()
}

fn rings(rings: Vec<Vec<JsonPosition>>) -> Vec<Vec<Position>> {
    rings.into_iter().map(positions).collect()
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum TaggedValue {
    Point { coordinates: JsonPosition },
    LineString { coordinates: Vec<JsonPosition> },
    Polygon { coordinates: Vec<Vec<JsonPosition>> },
    MultiPoint { coordinates: Vec<JsonPosition> },
    MultiLineString { coordinates: Vec<Vec<JsonPosition>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<JsonPosition>>> },
    GeometryCollection { geometries: Vec<Geometry> },
}

impl From<GeometryRepr> for Geometry {
    fn from(repr: GeometryRepr) -> Self {
        let value = match repr.value {
            TaggedValue::Point { coordinates } => Value::Point(coordinates.0),
            TaggedValue::LineString { coordinates } => Value::LineString(positions(coordinates)),
            TaggedValue::Polygon { coordinates } => Value::Polygon(rings(coordinates)),
            TaggedValue::MultiPoint { coordinates } => Value::MultiPoint(positions(coordinates)),
            TaggedValue::MultiLineString { coordinates } => {
                Value::MultiLineString(rings(coordinates))
            }
            TaggedValue::MultiPolygon { coordinates } => {
                Value::MultiPolygon(coordinates.into_iter().map(rings).collect())
            }
            TaggedValue::GeometryCollection { geometries } => {
                Value::GeometryCollection(geometries)
            }
        };
        Geometry {
            value,
            projection: repr.projection,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn keyword_parse_ignores_case() {
        assert_eq!(
            "multipoint".parse::<GeometryType>().unwrap(),
            GeometryType::MultiPoint
        );
        assert_eq!(
            " GeometryCollection ".parse::<GeometryType>().unwrap(),
            GeometryType::GeometryCollection
        );
        match "circularstring".parse::<GeometryType>() {
            Err(WktError::UnsupportedGeometry(keyword)) => assert_eq!(keyword, "CIRCULARSTRING"),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn names_are_exact() {
        assert_eq!(
            GeometryType::from_name("LineString"),
            Some(GeometryType::LineString)
        );
        assert_eq!(GeometryType::from_name("linestring"), None);
        assert_eq!(GeometryType::from_name("CircularString"), None);
    }

    #[test]
    fn serialize_point_with_projection() {
        let point = Geometry::with_projection(Value::Point([30.0, 10.0]), "EPSG:3857");
        assert_eq!(
            serde_json::to_value(&point).unwrap(),
            json!({"type": "Point", "coordinates": [30.0, 10.0], "projection": "EPSG:3857"})
        );
    }

    #[test]
    fn serialize_collection_uses_geometries() {
        let collection = Geometry::new(Value::GeometryCollection(vec![
            Value::Point([4.0, 6.0]).into(),
            Value::LineString(vec![[4.0, 6.0], [7.0, 10.0]]).into(),
        ]));
        assert_eq!(
            serde_json::to_value(&collection).unwrap(),
            json!({
                "type": "GeometryCollection",
                "geometries": [
                    {"type": "Point", "coordinates": [4.0, 6.0]},
                    {"type": "LineString", "coordinates": [[4.0, 6.0], [7.0, 10.0]]}
                ]
            })
        );
    }

    #[test]
    fn deserialize_polygon() {
        let polygon: Geometry = serde_json::from_value(json!({
            "type": "Polygon",
            "coordinates": [[[30, 10], [40, 40], [20, 40], [10, 20], [30, 10]]],
            "projection": "EPSG:4326"
        }))
        .unwrap();
        assert_eq!(
            polygon.value,
            Value::Polygon(vec![vec![
                [30.0, 10.0],
                [40.0, 40.0],
                [20.0, 40.0],
                [10.0, 20.0],
                [30.0, 10.0]
            ]])
        );
        assert_eq!(polygon.projection.as_deref(), Some("EPSG:4326"));
    }

    #[test]
    fn deserialize_rejects_unknown_type() {
        let result: serde_json::Result<Geometry> =
            serde_json::from_value(json!({"type": "CircularString", "coordinates": []}));
        assert!(result.is_err());
    }

    #[test]
    fn deserialize_drops_altitude() {
        let line: Geometry = serde_json::from_value(json!({
            "type": "LineString",
            "coordinates": [[30, 10, 120.5], [10, 30, 98], [40, 40]]
        }))
        .unwrap();
        assert_eq!(
            line.value,
            Value::LineString(vec![[30.0, 10.0], [10.0, 30.0], [40.0, 40.0]])
        );

        let short: serde_json::Result<Geometry> =
            serde_json::from_value(json!({"type": "Point", "coordinates": [1]}));
        assert!(short.is_err());
    }

    #[test]
    fn nan_survives_json() {
        let point = Geometry::new(Value::Point([f64::NAN, 1.0]));
        let json = serde_json::to_value(&point).unwrap();
        assert_eq!(json, json!({"type": "Point", "coordinates": [null, 1.0]}));

        let read: Geometry = serde_json::from_value(json).unwrap();
        match read.value {
            Value::Point([x, y]) => {
                assert!(x.is_nan());
                assert_eq!(y, 1.0);
            }
            other => panic!("unexpected value {:?}", other),
        }
    }

    #[test]
    fn epsg_code() {
        let geometry = Geometry::with_projection(Value::Point([1.0, 2.0]), "EPSG:4326");
        assert_eq!(geometry.epsg_code(), Some("4326"));

        let geometry = Geometry::with_projection(Value::Point([1.0, 2.0]), "urn:ogc:def:crs");
        assert_eq!(geometry.epsg_code(), None);

        assert_eq!(Geometry::new(Value::Point([1.0, 2.0])).epsg_code(), None);
    }
}
