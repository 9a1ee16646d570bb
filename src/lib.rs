//! Conversion between WKT text and GeoJSON geometry objects.
//!
//! ```
//! use wktjson::{to_geojson, to_wkt};
//!
//! let polygon = to_geojson("POLYGON((30 10, 40 40, 20 40, 10 20, 30 10))").unwrap();
//! assert_eq!(to_wkt(&polygon), "POLYGON((30 10, 40 40, 20 40, 10 20, 30 10))");
//! ```
//!
//! Reading accepts an optional `SRID=<code>;` prefix and records it as an
//! `EPSG:<code>` projection. Writing never emits the prefix; [`to_ewkt`]
//! does.

pub mod convert;
pub mod error;
pub mod geometry;
mod number;
pub mod parser;
pub mod writer;

pub use error::{Result, WktError};
pub use geometry::{Geometry, GeometryType, Position, Value};
pub use parser::{parse_with, to_geojson, ParseOptions};
pub use writer::{to_ewkt, to_ewkt_value, to_wkt, to_wkt_value};
