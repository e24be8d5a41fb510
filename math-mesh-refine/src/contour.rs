//! Cross-sections of arbitrary (non-convex) meshes

use log::warn;
use serde::{Deserialize, Serialize};

use math_geometry::{
    IndexedTriangle, PlaneBasis, Point2D, Point3D, Triangle, is_point_in_polygon, polygon_area_2d,
};

use crate::mesh::{SegmentGraph, intersection_segments, polygon_area_3d};

/// A closed cross-section loop with the loops cut out of it
///
/// `outer` runs counter-clockwise and every hole clockwise, seen from the
/// side the cutting plane's normal points to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContourPolygon {
    pub outer: Vec<Point3D>,
    pub holes: Vec<Vec<Point3D>>,
}

impl ContourPolygon {
    /// Area of the outer loop minus its holes
    pub fn area(&self) -> f64 {
        polygon_area_3d(&self.outer) - self.holes.iter().map(|h| polygon_area_3d(h)).sum::<f64>()
    }
}

struct Loop {
    points: Vec<Point3D>,
    flat: Vec<Point2D>,
    depth: usize,
}

/// Cross-section of a triangle mesh by a plane
///
/// Intersection segments are welded and walked into closed loops; chains
/// that do not close (the mesh has a border inside the plane) are dropped
/// with a warning. Loop nesting decides the role of each loop: loops at an
/// even depth are outer boundaries, loops at an odd depth are holes of the
/// loop directly around them.
pub fn intersect_mesh_plane(
    triangles: &[IndexedTriangle],
    plane: &Triangle,
) -> Vec<ContourPolygon> {
    let Some(basis) = PlaneBasis::from_triangle(plane) else {
        return Vec::new();
    };
    let segments = intersection_segments(triangles, plane);
    let graph = SegmentGraph::new(&segments);

    let mut loops: Vec<Loop> = Vec::new();
    let mut open = 0;
    for chain in graph.chains() {
        if !chain.closed || chain.points.len() < 3 {
            open += 1;
            continue;
        }
        let flat: Vec<Point2D> = chain.points.iter().map(|p| basis.to_2d(p)).collect();
        loops.push(Loop {
            points: chain.points,
            flat,
            depth: 0,
        });
    }
    if open > 0 {
        warn!("mesh/plane: {} chains did not close and were dropped", open);
    }

    // Nesting depth: how many other loops contain a point of this one
    let depths: Vec<usize> = (0..loops.len())
        .map(|i| {
            (0..loops.len())
                .filter(|&j| j != i && is_point_in_polygon(&loops[i].flat[0], &loops[j].flat))
                .count()
        })
        .collect();
    for (l, depth) in loops.iter_mut().zip(depths) {
        l.depth = depth;
        let ccw = polygon_area_2d(&l.flat) > 0.0;
        let want_ccw = depth % 2 == 0;
        if ccw != want_ccw {
            l.points.reverse();
            l.flat.reverse();
        }
    }

    let mut polygons: Vec<(usize, ContourPolygon)> = loops
        .iter()
        .enumerate()
        .filter(|(_, l)| l.depth % 2 == 0)
        .map(|(i, l)| {
            (
                i,
                ContourPolygon {
                    outer: l.points.clone(),
                    holes: Vec::new(),
                },
            )
        })
        .collect();

    for hole in loops.iter().filter(|l| l.depth % 2 == 1) {
        let parent = polygons.iter_mut().find(|(i, _)| {
            loops[*i].depth + 1 == hole.depth && is_point_in_polygon(&hole.flat[0], &loops[*i].flat)
        });
        match parent {
            Some((_, polygon)) => polygon.holes.push(hole.points.clone()),
            None => warn!("mesh/plane: hole without an enclosing loop"),
        }
    }

    polygons.into_iter().map(|(_, p)| p).collect()
}
