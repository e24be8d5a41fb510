//! Error types for mesh refinement and intersection

use math_convex_hull::ConvexHullError;
use math_geometry::GeometryError;
use math_voronoi::VoronoiError;
use thiserror::Error;

/// Errors raised by the refinement pipeline
#[derive(Debug, Error)]
pub enum RefineError {
    /// A configuration value is out of range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The input triangles do not share one point arena
    #[error("triangles reference more than one point arena")]
    MixedPointArenas,

    /// Geometry helper failure
    #[error("geometry error: {0}")]
    Geometry(GeometryError),

    /// Convex hull construction failed
    #[error("hull error: {0}")]
    Hull(#[from] ConvexHullError),

    /// Voronoi construction failed
    #[error("Voronoi error: {0}")]
    Voronoi(#[from] VoronoiError),

    /// Configuration JSON could not be parsed or written
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An invariant of a refinement step was broken
    #[error("internal refinement error: {0}")]
    Internal(String),
}

/// Result type for refinement operations
pub type Result<T> = std::result::Result<T, RefineError>;

impl From<GeometryError> for RefineError {
    fn from(err: GeometryError) -> Self {
        match err {
            GeometryError::MixedPointArenas => RefineError::MixedPointArenas,
            other => RefineError::Geometry(other),
        }
    }
}

impl RefineError {
    /// Returns `true` if the caller passed bad input or configuration
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            RefineError::InvalidConfig(_) | RefineError::MixedPointArenas | RefineError::Json(_)
        )
    }

    /// Returns `true` if the error signals a bug rather than bad input
    pub fn is_internal_error(&self) -> bool {
        match self {
            RefineError::Internal(_) => true,
            RefineError::Geometry(e) => e.is_internal_error(),
            RefineError::Hull(e) => e.is_internal_error(),
            RefineError::Voronoi(e) => e.is_internal_error(),
            _ => false,
        }
    }
}
