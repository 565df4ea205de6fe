//! Errors reported by the interpolation core.
//!
//! File and format handling (meshes, data files, writers, configuration) reports
//! [`eyre::Report`]s instead; every [`Error`] converts into one through `?`.
use fenics_ice_geometry::delaunay::DelaunayError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The source points do not admit a triangulation.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    /// A field was requested for which there is neither data nor a default value.
    #[error("no data found for field `{name}` and no default value was given")]
    MissingField { name: String },
    #[error(
        "target point {index} at ({x}, {y}) lies outside the data domain \
         [{x_min}, {x_max}] x [{y_min}, {y_max}]"
    )]
    OutOfDomain {
        index: usize,
        x: f64,
        y: f64,
        x_min: f64,
        x_max: f64,
        y_min: f64,
        y_max: f64,
    },
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),
    #[error("invalid grid: {0}")]
    InvalidGrid(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<DelaunayError> for Error {
    fn from(err: DelaunayError) -> Self {
        Error::InvalidGeometry(err.to_string())
    }
}
