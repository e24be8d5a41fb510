//! Error types for Delaunay and Voronoi construction

use math_geometry::GeometryError;
use thiserror::Error;

/// Errors raised while tetrahedralizing a point cloud or building its dual
#[derive(Debug, Error)]
pub enum VoronoiError {
    /// Fewer than four control points
    #[error("need at least 4 points for a tetrahedralization, got {0}")]
    InsufficientPoints(usize),

    /// The control points do not span three dimensions
    #[error("points are coplanar, collinear or coincident")]
    DegenerateConfiguration,

    /// A control point has a NaN or infinite coordinate
    #[error("point {0} has a non-finite coordinate")]
    InvalidPoint(usize),

    /// Geometry helper failure
    #[error("geometry error: {0}")]
    Geometry(#[from] GeometryError),

    /// An invariant of the construction was broken
    #[error("internal Voronoi error: {0}")]
    Internal(String),
}

/// Result type for Delaunay and Voronoi operations
pub type Result<T> = std::result::Result<T, VoronoiError>;

impl VoronoiError {
    /// Returns `true` if the input cloud cannot be tetrahedralized
    pub fn is_degenerate_input(&self) -> bool {
        matches!(
            self,
            VoronoiError::InsufficientPoints(_)
                | VoronoiError::DegenerateConfiguration
                | VoronoiError::InvalidPoint(_)
        )
    }

    /// Returns `true` if the error signals a bug rather than bad input
    pub fn is_internal_error(&self) -> bool {
        matches!(self, VoronoiError::Internal(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            VoronoiError::InsufficientPoints(3).to_string(),
            "need at least 4 points for a tetrahedralization, got 3"
        );
        assert_eq!(
            VoronoiError::InvalidPoint(7).to_string(),
            "point 7 has a non-finite coordinate"
        );
    }

    #[test]
    fn test_error_categories() {
        assert!(VoronoiError::DegenerateConfiguration.is_degenerate_input());
        assert!(!VoronoiError::DegenerateConfiguration.is_internal_error());
        assert!(VoronoiError::Internal("walk".into()).is_internal_error());
    }
}
