//! 3D convex hulls by incremental QuickHull
//!
//! The hull is built over the caller's points: every output triangle is an
//! [`IndexedTriangle`] into one shared arena holding the input cloud, with
//! its normal pointing away from the hull interior.
//!
//! Based on:
//! - Barber, C.B., Dobkin, D.P., and Huhdanpaa, H.T., "The Quickhull algorithm
//!   for convex hulls," ACM Trans. on Mathematical Software, 22(4):469-483, 1996.
//!
//! # Example
//! ```
//! use math_convex_hull::get_convex_hull;
//! use math_geometry::Point3D;
//!
//! let points = vec![
//!     Point3D::new(0.0, 0.0, 0.0),
//!     Point3D::new(1.0, 0.0, 0.0),
//!     Point3D::new(0.0, 1.0, 0.0),
//!     Point3D::new(0.0, 0.0, 1.0),
//! ];
//!
//! let hull = get_convex_hull(&points).unwrap().unwrap();
//! assert_eq!(hull.num_faces(), 4);
//! ```
//!
//! [`IndexedTriangle`]: math_geometry::IndexedTriangle

mod export;
mod quickhull;
mod types;

// Make testdata publicly available for tests and benches
pub mod testdata;

pub use export::{export_obj, export_triangles_obj};
pub use quickhull::{MAX_ITERATIONS, get_convex_hull};
pub use types::{ConvexHull3D, HullMesh};

use math_geometry::GeometryError;

/// Error types for convex hull operations
#[derive(Debug, thiserror::Error)]
pub enum ConvexHullError {
    #[error("Not enough vertices to form a hull (minimum 4 required, got {0})")]
    InsufficientVertices(usize),

    #[error("Vertices are coplanar or collinear")]
    DegenerateConfiguration,

    #[error("Maximum iterations exceeded")]
    MaxIterationsExceeded,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid face: {0}")]
    InvalidFace(String),

    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Internal hull error: {0}")]
    Internal(String),
}

impl ConvexHullError {
    /// Returns `true` if the input cloud cannot form a 3D hull
    pub fn is_degenerate_input(&self) -> bool {
        matches!(
            self,
            ConvexHullError::InsufficientVertices(_) | ConvexHullError::DegenerateConfiguration
        )
    }

    /// Returns `true` if the error signals a bug rather than bad input
    pub fn is_internal_error(&self) -> bool {
        matches!(
            self,
            ConvexHullError::Internal(_) | ConvexHullError::MaxIterationsExceeded
        )
    }
}

pub type Result<T> = std::result::Result<T, ConvexHullError>;
