//! Cutting a convex hull with a plane or a triangle

use log::warn;
use math_geometry::{
    IndexedTriangle, PlaneBasis, Point2D, Point3D, Triangle, clip_convex_polygon_2d,
    convex_hull_2d, polygon_area_2d,
};

use crate::mesh::{SegmentGraph, intersection_segments};

/// The cross-section in plane coordinates, counter-clockwise
fn section_2d(
    triangles: &[IndexedTriangle],
    basis: &PlaneBasis,
    plane: &Triangle,
) -> Option<Vec<Point2D>> {
    let segments = intersection_segments(triangles, plane);
    if segments.is_empty() {
        return None;
    }
    let graph = SegmentGraph::new(&segments);

    let stitched = if graph.is_two_regular() {
        match graph.chains().as_slice() {
            [chain] if chain.closed && chain.points.len() >= 3 => Some(chain.points.clone()),
            _ => None,
        }
    } else {
        None
    };

    let mut polygon: Vec<Point2D> = match stitched {
        Some(loop_points) => loop_points.iter().map(|p| basis.to_2d(p)).collect(),
        None => {
            warn!(
                "hull/plane: {} segments do not form one loop, using their 2D hull",
                graph.edge_count()
            );
            let flat: Vec<Point2D> = graph.points().iter().map(|p| basis.to_2d(p)).collect();
            convex_hull_2d(&flat).into_iter().map(|i| flat[i]).collect()
        }
    };
    if polygon.len() < 3 {
        return None;
    }
    if polygon_area_2d(&polygon) < 0.0 {
        polygon.reverse();
    }
    Some(polygon)
}

/// Cross-section of a convex hull by a plane
///
/// The hull faces crossing the plane are cut into segments, which are
/// stitched head to tail into one closed loop. If they do not close into a
/// single loop, the 2D convex hull of all segment endpoints is returned
/// instead. The polygon runs counter-clockwise seen from the side the
/// plane's normal points to. `None` if the plane misses the hull, only
/// touches it, or is itself degenerate.
pub fn intersect_hull_plane(
    triangles: &[IndexedTriangle],
    plane: &Triangle,
) -> Option<Vec<Point3D>> {
    let basis = PlaneBasis::from_triangle(plane)?;
    let polygon = section_2d(triangles, &basis, plane)?;
    Some(polygon.iter().map(|p| basis.to_3d(p)).collect())
}

/// Part of a triangle lying inside a convex hull
///
/// The hull's cross-section by the triangle's plane, clipped to the
/// triangle. Vertices are ordered like the triangle's own winding. `None`
/// if the triangle is degenerate or does not overlap the hull.
pub fn intersect_hull_triangle(
    triangles: &[IndexedTriangle],
    triangle: &Triangle,
) -> Option<Vec<Point3D>> {
    let basis = PlaneBasis::from_triangle(triangle)?;
    let section = section_2d(triangles, &basis, triangle)?;
    let clip: Vec<Point2D> = triangle.points().iter().map(|p| basis.to_2d(p)).collect();
    let clipped = clip_convex_polygon_2d(&section, &clip);
    if clipped.len() < 3 || polygon_area_2d(&clipped) <= 0.0 {
        return None;
    }
    Some(clipped.iter().map(|p| basis.to_3d(p)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::polygon_area_3d;
    use approx::assert_relative_eq;
    use math_convex_hull::{ConvexHull3D, testdata};
    use math_geometry::Vector3D;

    fn cube(size: f64) -> ConvexHull3D {
        ConvexHull3D::build(&testdata::cube_vertices(size)).unwrap()
    }

    fn horizontal(z: f64) -> Triangle {
        Triangle::from_point_normal(Point3D::new(0.0, 0.0, z), Vector3D::unit_z()).unwrap()
    }

    #[test]
    fn test_cube_mid_section_is_square() {
        let hull = cube(2.0);
        let section = intersect_hull_plane(hull.triangles(), &horizontal(0.3)).unwrap();
        assert_relative_eq!(polygon_area_3d(&section), 4.0, epsilon = 1e-9);
        for p in &section {
            assert_relative_eq!(p.z, 0.3, epsilon = 1e-12);
            assert_relative_eq!(p.x.abs().max(p.y.abs()), 1.0, epsilon = 1e-9);
        }

        // Counter-clockwise about +z
        let mut turn = Vector3D::zero();
        for i in 0..section.len() {
            let a = section[i] - section[0];
            let b = section[(i + 1) % section.len()] - section[0];
            turn += a.cross(&b);
        }
        assert!(turn.z > 0.0);
    }

    #[test]
    fn test_diagonal_section_of_cube() {
        let hull = cube(2.0);
        // Plane x + y + z = 0 cuts a regular hexagon of side sqrt(2)
        let plane =
            Triangle::from_point_normal(Point3D::origin(), Vector3D::new(1.0, 1.0, 1.0)).unwrap();
        let section = intersect_hull_plane(hull.triangles(), &plane).unwrap();
        let expected = 3.0 * 3.0_f64.sqrt() / 2.0 * 2.0;
        assert_relative_eq!(polygon_area_3d(&section), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_plane_missing_hull() {
        let hull = cube(2.0);
        assert!(intersect_hull_plane(hull.triangles(), &horizontal(5.0)).is_none());
    }

    #[test]
    fn test_triangle_clipped_to_hull() {
        let hull = cube(2.0);
        // Large triangle in z = 0 covering the whole section
        let big = Triangle::new(
            Point3D::new(-10.0, -10.0, 0.0),
            Point3D::new(10.0, -10.0, 0.0),
            Point3D::new(0.0, 10.0, 0.0),
        );
        let area = polygon_area_3d(&intersect_hull_triangle(hull.triangles(), &big).unwrap());
        assert_relative_eq!(area, 4.0, epsilon = 1e-9);

        // Small triangle fully inside the section
        let small = Triangle::new(
            Point3D::new(0.0, 0.0, 0.0),
            Point3D::new(0.5, 0.0, 0.0),
            Point3D::new(0.0, 0.5, 0.0),
        );
        let area = polygon_area_3d(&intersect_hull_triangle(hull.triangles(), &small).unwrap());
        assert_relative_eq!(area, 0.125, epsilon = 1e-9);

        // Triangle crossing the side x = 1
        let half = Triangle::new(
            Point3D::new(0.0, -0.5, 0.0),
            Point3D::new(2.0, -0.5, 0.0),
            Point3D::new(0.0, 0.5, 0.0),
        );
        let area = polygon_area_3d(&intersect_hull_triangle(hull.triangles(), &half).unwrap());
        // Full triangle area 1 minus the corner beyond x = 1 (area 0.25)
        assert_relative_eq!(area, 0.75, epsilon = 1e-9);
    }
}
