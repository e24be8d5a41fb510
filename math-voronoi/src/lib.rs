//! Delaunay tetrahedralization and 3D Voronoi diagrams
//!
//! [`get_delaunay`] tetrahedralizes a point cloud by Bowyer-Watson insertion.
//! [`get_voronoi`] builds the dual diagram on top of it:
//!
//! - **Edge points**: one circumcenter per Delaunay tetrahedron
//! - **Edges**: a [`EdgeKind::Segment`] across every shared tetrahedron face,
//!   a [`EdgeKind::Ray`] out of every convex-hull face
//! - **Faces** (optional): one polygon per Delaunay edge, closed for interior
//!   edges and open (bounded by two rays) for hull edges
//!
//! All tetrahedra index into one arena holding the control points; all edges
//! and faces index into one arena holding the edge points.
//!
//! # Example
//! ```
//! use math_geometry::Point3D;
//! use math_voronoi::get_voronoi;
//!
//! let points = vec![
//!     Point3D::new(0.0, 0.0, 0.0),
//!     Point3D::new(1.0, 0.0, 0.0),
//!     Point3D::new(0.0, 1.0, 0.0),
//!     Point3D::new(0.0, 0.0, 1.0),
//!     Point3D::new(0.25, 0.25, 0.25),
//! ];
//!
//! let diagram = get_voronoi(&points, true).unwrap();
//! assert!(diagram.is_cell_bounded(4));
//! ```

mod delaunay;
mod edge;
mod error;
mod face;
mod tetrahedron;
mod voronoi;

pub use delaunay::get_delaunay;
pub use edge::{Edge3D, EdgeKind};
pub use error::{Result, VoronoiError};
pub use face::Face;
pub use tetrahedron::{FACE_VERTICES, Tetrahedron, link_tetrahedra, orientation};
pub use voronoi::{VoronoiAnomaly, VoronoiResult, get_voronoi};
