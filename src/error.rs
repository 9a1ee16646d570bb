use thiserror::Error;

/// Errors raised while reading or converting geometries.
#[derive(Error, Debug)]
pub enum WktError {
    /// The WKT keyword is not one of the seven recognized geometry types.
    #[error("unsupported geometry type: {0}")]
    UnsupportedGeometry(String),
    #[error("syntax error at offset {offset}: {message}")]
    Syntax { offset: usize, message: String },
    /// Only raised when parsing with `ParseOptions { strict: true }`.
    #[error("malformed coordinate {token:?} at offset {offset}")]
    MalformedCoordinate { token: String, offset: usize },
    #[error("invalid position: expected at least 2 ordinates, found {0}")]
    InvalidPosition(usize),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    GeoJson(#[from] geojson::Error),
}

pub type Result<T> = std::result::Result<T, WktError>;
