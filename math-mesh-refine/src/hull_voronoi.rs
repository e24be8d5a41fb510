//! Splitting a convex hull into Voronoi cells

use log::debug;
use math_convex_hull::{ConvexHull3D, ConvexHullError, get_convex_hull};
use math_geometry::parallel::parallel_map_indexed;
use math_geometry::{Point3D, PointWelder, Vector3D, clip_polygon_by_plane, relative_epsilon};
use math_voronoi::VoronoiResult;

use crate::Result;

/// The part of a hull inside one Voronoi cell
#[derive(Debug, Clone)]
pub struct HullVoronoiPiece {
    pub control_point: usize,
    pub hull: ConvexHull3D,
}

/// Bisector half-space of `control` against one neighbor
struct Bisector {
    point: Point3D,
    normal: Vector3D,
}

impl Bisector {
    fn keeps(&self, p: &Point3D, eps: f64) -> bool {
        (*p - self.point).dot(&self.normal) <= eps * self.normal.length().max(1.0)
    }
}

/// Piece of `hull` inside the cell of `control`, `None` if it has no volume
fn cell_piece(
    hull: &ConvexHull3D,
    voronoi: &VoronoiResult,
    control: usize,
    eps: f64,
) -> Result<Option<ConvexHull3D>> {
    let sites = voronoi.control_points();
    let site = sites[control];
    let bisectors: Vec<Bisector> = voronoi
        .neighbors(control)
        .into_iter()
        .map(|n| Bisector {
            point: site.midpoint(&sites[n]),
            normal: sites[n] - site,
        })
        .collect();

    let mut welder = PointWelder::new(eps * 100.0);
    for tri in hull.triangles() {
        let corners = [tri.point0(), tri.point1(), tri.point2()];
        // Whole triangle inside the cell: its corners are the polygon
        if corners.iter().all(|p| bisectors.iter().all(|b| b.keeps(p, eps))) {
            for p in corners {
                welder.insert(p);
            }
            continue;
        }
        let mut polygon = corners.to_vec();
        for b in &bisectors {
            polygon = clip_polygon_by_plane(&polygon, &b.point, &b.normal);
            if polygon.is_empty() {
                break;
            }
        }
        for p in polygon {
            welder.insert(p);
        }
    }

    // Voronoi vertices of the cell that lie inside the hull
    let edge_points = voronoi.edge_points();
    for e in voronoi.cell_edge_points(control) {
        let p = edge_points[e];
        if hull.contains_point(&p) {
            welder.insert(p);
        }
    }

    let points = welder.into_points();
    if points.len() < 4 {
        return Ok(None);
    }
    match get_convex_hull(&points) {
        Ok(piece) => Ok(piece),
        Err(e) if e.is_degenerate_input() => Ok(None),
        Err(ConvexHullError::InvalidFace(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Split a convex hull along the cells of a Voronoi diagram
///
/// Each hull triangle is clipped by the bisector planes between a control
/// point and its Delaunay neighbors; triangles whose corners all lie in the
/// cell are kept whole. The surviving points, together with the cell's
/// Voronoi vertices inside the hull, are re-hulled into the piece. Control
/// points whose cell misses the hull, or only touches it, get no piece.
/// Pieces come back ordered by control point.
pub fn intersect_hull_voronoi(
    hull: &ConvexHull3D,
    voronoi: &VoronoiResult,
) -> Result<Vec<HullVoronoiPiece>> {
    let eps = relative_epsilon(hull.points()).max(relative_epsilon(voronoi.control_points()));
    let results = parallel_map_indexed(voronoi.control_points().len(), |c| {
        cell_piece(hull, voronoi, c, eps)
    });

    let mut pieces = Vec::new();
    for (control_point, result) in results.into_iter().enumerate() {
        if let Some(hull) = result? {
            pieces.push(HullVoronoiPiece {
                control_point,
                hull,
            });
        }
    }
    debug!(
        "hull/Voronoi: {} pieces from {} control points",
        pieces.len(),
        voronoi.control_points().len()
    );
    Ok(pieces)
}
