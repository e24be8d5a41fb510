//! Triangle mesh refinement and hull intersections
//!
//! - **Slicing**: [`slice_large_triangles`] subdivides triangles with
//!   over-long edges at edge midpoints; [`slice_large_triangles_smooth`]
//!   places the new points on curved edges instead
//! - **Sliver removal**: [`remove_thin_triangles`] drops the apex of
//!   near-degenerate triangles and re-fills the hole
//! - **Cross-sections**: [`intersect_hull_plane`] and
//!   [`intersect_hull_triangle`] for convex hulls, [`intersect_mesh_plane`]
//!   for arbitrary meshes with holes
//! - **Voronoi split**: [`intersect_hull_voronoi`] cuts a hull into one
//!   piece per Voronoi cell
//!
//! Every operation takes triangles sharing one point arena and returns
//! triangles over one (possibly new) arena. [`refine_mesh`] chains slicing
//! and sliver removal as described by a [`RefineConfig`].
//!
//! # Example
//! ```
//! use math_geometry::{IndexedTriangle, Point3D};
//! use math_mesh_refine::{RefineConfig, refine_mesh, total_area};
//!
//! let square = IndexedTriangle::batch(
//!     vec![
//!         Point3D::new(0.0, 0.0, 0.0),
//!         Point3D::new(4.0, 0.0, 0.0),
//!         Point3D::new(4.0, 4.0, 0.0),
//!         Point3D::new(0.0, 4.0, 0.0),
//!     ],
//!     &[[0, 1, 2], [0, 2, 3]],
//! );
//! let config = RefineConfig::from_json_str(r#"{"slice": {"max_edge_length": 1.5}}"#).unwrap();
//! let refined = refine_mesh(&square, &config).unwrap();
//! assert!(refined.len() > square.len());
//! assert!((total_area(&refined) - 16.0).abs() < 1e-9);
//! ```

mod config;
mod contour;
mod error;
mod hull_plane;
mod hull_voronoi;
mod mesh;
mod slice;
mod smooth;
mod thin;

pub use config::{RefineConfig, SliceConfig, ThinTriangleConfig};
pub use contour::{ContourPolygon, intersect_mesh_plane};
pub use error::{RefineError, Result};
pub use hull_plane::{intersect_hull_plane, intersect_hull_triangle};
pub use hull_voronoi::{HullVoronoiPiece, intersect_hull_voronoi};
pub use mesh::total_area;
pub use slice::{slice_large_triangles, slice_large_triangles_smooth};
pub use thin::remove_thin_triangles;

use log::debug;
use math_geometry::IndexedTriangle;

/// Slice, then optionally remove slivers, as configured
pub fn refine_mesh(
    triangles: &[IndexedTriangle],
    config: &RefineConfig,
) -> Result<Vec<IndexedTriangle>> {
    config.validate()?;
    let slice = &config.slice;
    let sliced = if slice.smooth {
        slice_large_triangles_smooth(triangles, slice.max_edge_length, slice.max_passes)?
    } else {
        slice_large_triangles(triangles, slice.max_edge_length, slice.max_passes)?
    };
    if !config.remove_thin {
        return Ok(sliced);
    }
    let refined = remove_thin_triangles(&sliced, config.thin.ratio, config.thin.max_iterations)?;
    debug!(
        "refine: {} -> {} -> {} triangles",
        triangles.len(),
        sliced.len(),
        refined.len()
    );
    Ok(refined)
}
