//! Geometry primitives shared by the hull, Voronoi and mesh refinement crates
//!
//! This crate is the numeric bedrock of the workspace:
//!
//! - **Types**: [`Point3D`], [`Vector3D`], [`Point2D`], plane-as-triangle ([`Triangle`])
//! - **Indexed triangles**: [`IndexedTriangle`] over a shared, immutable point arena
//! - **Topology**: [`TriangleTopology`], an index-based neighbor side table
//! - **Intersections**: closest-point and intersection routines between lines,
//!   planes, circles, cylinders, spheres and triangles (see [`intersect`])
//! - **Linear algebra**: 3×3 Gauss-Jordan and tetrahedron circumspheres
//! - **Polygons**: 2D convex hull, point-in-polygon, plane projection and clipping
//! - **Welding**: [`PointWelder`] merges near-coincident points through a grid hash
//!
//! Degenerate configurations (parallel lines, coincident points, zero-length
//! directions) are reported through `Option`, `bool` or empty collections.
//! Only broken preconditions surface as [`GeometryError`].
//!
//! # Example
//! ```
//! use math_geometry::{Point3D, Triangle, Vector3D, intersect};
//!
//! let plane = Triangle::new(
//!     Point3D::new(0.0, 0.0, 0.0),
//!     Point3D::new(1.0, 0.0, 0.0),
//!     Point3D::new(0.0, 1.0, 0.0),
//! );
//! let down = Vector3D::new(0.0, 0.0, -1.0);
//! let hit = intersect::plane_line(&plane, Point3D::new(0.2, 0.3, 5.0), down);
//! assert!(hit.is_some());
//! ```

mod error;
mod indexed;
mod linalg;
mod math;
mod polygon;
mod rotation;
mod token;
mod topology;
mod triangle;
mod types;
mod weld;

pub mod intersect;
pub mod parallel;

pub use error::{GeometryError, Result};
pub use indexed::{IndexedTriangle, PointArena, same_arena};
pub use linalg::{
    Circumsphere, PlaneFit, best_fit_plane, gauss_jordan, tetrahedron_circumsphere,
    weighted_centroid,
};
pub use math::{
    EPSILON, is_nearly_equal, is_nearly_equal_point, is_nearly_equal_vector, is_nearly_zero,
    relative_epsilon,
};
pub use polygon::{
    PlaneBasis, clip_convex_polygon_2d, clip_polygon_by_plane, convex_hull_2d, is_point_in_polygon,
    polygon_area_2d,
};
pub use rotation::Quaternion;
pub use token::next_token;
pub use topology::{EdgeKey, TriangleTopology};
pub use triangle::Triangle;
pub use types::{Point2D, Point3D, Vector3D};
pub use weld::PointWelder;
