//! Barycentric coordinates and triangle intersections

use crate::math::EPSILON;
use crate::parallel::parallel_enumerate_filter_map;
use crate::triangle::Triangle;
use crate::types::{Point3D, Vector3D};

use super::line::closest_point_segment_point;
use super::plane::{plane_plane, plane_ray};

/// Outcome of intersecting a triangle with a plane or another triangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TriangleIntersection {
    None,
    /// The shapes only touch at one point
    Point(Point3D),
    Segment(Point3D, Point3D),
}

impl TriangleIntersection {
    pub fn is_none(&self) -> bool {
        matches!(self, TriangleIntersection::None)
    }

    /// The segment endpoints, if the intersection has extent
    pub fn segment(&self) -> Option<(Point3D, Point3D)> {
        match self {
            TriangleIntersection::Segment(a, b) => Some((*a, *b)),
            _ => None,
        }
    }
}

/// Barycentric `(u, v)` with `point = P0 + u·(P2 - P0) + v·(P1 - P0)`
///
/// `u` runs along the edge to `point2` and `v` along the edge to `point1`.
/// Points off the plane are projected implicitly. `None` for a degenerate
/// triangle.
pub fn to_barycentric(triangle: &Triangle, point: &Point3D) -> Option<(f64, f64)> {
    let v0 = triangle.point2 - triangle.point0;
    let v1 = triangle.point1 - triangle.point0;
    let v2 = *point - triangle.point0;

    let dot00 = v0.dot(&v0);
    let dot01 = v0.dot(&v1);
    let dot02 = v0.dot(&v2);
    let dot11 = v1.dot(&v1);
    let dot12 = v1.dot(&v2);

    let denom = dot00 * dot11 - dot01 * dot01;
    if denom.abs() <= EPSILON * dot00 * dot11 || denom == 0.0 {
        return None;
    }

    let u = (dot11 * dot02 - dot01 * dot12) / denom;
    let v = (dot00 * dot12 - dot01 * dot02) / denom;
    Some((u, v))
}

/// Inverse of [`to_barycentric`]
pub fn from_barycentric(triangle: &Triangle, u: f64, v: f64) -> Point3D {
    let p0 = triangle.point0;
    p0 + (triangle.point2 - p0) * u + (triangle.point1 - p0) * v
}

/// `u >= 0, v >= 0, u + v <= 1` (within `EPSILON`)
pub fn is_inside_barycentric(u: f64, v: f64) -> bool {
    u >= -EPSILON && v >= -EPSILON && u + v <= 1.0 + EPSILON
}

/// Inside and on one of the three edges
pub fn is_on_edge_barycentric(u: f64, v: f64) -> bool {
    is_inside_barycentric(u, v)
        && (u.abs() <= EPSILON || v.abs() <= EPSILON || (u + v - 1.0).abs() <= EPSILON)
}

/// Hit point of a ray with a triangle (either face)
pub fn ray_triangle(triangle: &Triangle, origin: Point3D, direction: Vector3D) -> Option<Point3D> {
    let hit = plane_ray(triangle, origin, direction)?;
    let (u, v) = to_barycentric(triangle, &hit)?;
    is_inside_barycentric(u, v).then_some(hit)
}

/// Every triangle a ray hits, as `(index, hit point)` sorted nearest first
///
/// Fans out over rayon for large triangle sets.
pub fn ray_triangles(
    triangles: &[Triangle],
    origin: Point3D,
    direction: Vector3D,
) -> Vec<(usize, Point3D)> {
    let mut hits = parallel_enumerate_filter_map(triangles, |i, t| {
        ray_triangle(t, origin, direction).map(|p| (i, p))
    });
    hits.sort_by(|a, b| {
        a.1.distance_squared(&origin)
            .total_cmp(&b.1.distance_squared(&origin))
    });
    hits
}

/// Closest point on a (filled) triangle to `point`
pub fn closest_point_triangle_point(triangle: &Triangle, point: &Point3D) -> Point3D {
    if !triangle.is_degenerate() {
        let projected = triangle.project_point(point);
        if let Some((u, v)) = to_barycentric(triangle, &projected)
            && is_inside_barycentric(u, v)
        {
            return projected;
        }
    }

    let [a, b, c] = triangle.points();
    [
        closest_point_segment_point(&a, &b, point),
        closest_point_segment_point(&b, &c, point),
        closest_point_segment_point(&c, &a, point),
    ]
    .into_iter()
    .min_by(|x, y| x.distance_squared(point).total_cmp(&y.distance_squared(point)))
    .unwrap_or(a)
}

/// Where a triangle crosses a plane
///
/// Vertices lying on the plane count as crossing points. A triangle lying in
/// the plane, or entirely on one side, gives [`TriangleIntersection::None`].
pub fn triangle_plane(triangle: &Triangle, plane: &Triangle) -> TriangleIntersection {
    let Some(n) = plane.normal_unit() else {
        return TriangleIntersection::None;
    };
    let pts = triangle.points();
    let scale = pts
        .iter()
        .map(|p| p.distance(&plane.point0))
        .fold(1.0_f64, f64::max);
    let eps = EPSILON * scale;
    let dist: [f64; 3] = [
        n.dot(&(pts[0] - plane.point0)),
        n.dot(&(pts[1] - plane.point0)),
        n.dot(&(pts[2] - plane.point0)),
    ];

    if dist.iter().all(|d| d.abs() <= eps) {
        return TriangleIntersection::None;
    }

    let mut hits: Vec<Point3D> = Vec::with_capacity(3);
    for i in 0..3 {
        let j = (i + 1) % 3;
        if dist[i].abs() <= eps {
            hits.push(pts[i]);
        } else if dist[j].abs() > eps && (dist[i] > 0.0) != (dist[j] > 0.0) {
            let t = dist[i] / (dist[i] - dist[j]);
            hits.push(pts[i].lerp(&pts[j], t));
        }
    }
    dedup_points(&mut hits, eps);

    match hits.as_slice() {
        [] => TriangleIntersection::None,
        [p] => TriangleIntersection::Point(*p),
        [a, b, ..] => TriangleIntersection::Segment(*a, *b),
    }
}

/// Segment shared by two triangles
///
/// Intersects the supporting planes, then clips that line to the part
/// inside both triangles. Coplanar or parallel triangles give
/// [`TriangleIntersection::None`].
pub fn triangle_triangle(a: &Triangle, b: &Triangle) -> TriangleIntersection {
    let Some((origin, dir)) = plane_plane(a, b) else {
        return TriangleIntersection::None;
    };
    let Some((lo_a, hi_a)) = line_interval(a, b, &origin, &dir) else {
        return TriangleIntersection::None;
    };
    let Some((lo_b, hi_b)) = line_interval(b, a, &origin, &dir) else {
        return TriangleIntersection::None;
    };

    let lo = lo_a.max(lo_b);
    let hi = hi_a.min(hi_b);
    let scale = a
        .points()
        .iter()
        .chain(b.points().iter())
        .map(|p| p.distance(&origin))
        .fold(1.0_f64, f64::max);
    let eps = EPSILON * scale;

    if lo > hi + eps {
        TriangleIntersection::None
    } else if hi - lo <= eps {
        TriangleIntersection::Point(origin + dir * lo)
    } else {
        TriangleIntersection::Segment(origin + dir * lo, origin + dir * hi)
    }
}

/// Parameter range along `origin + t·dir` covered by `triangle`
fn line_interval(
    triangle: &Triangle,
    other_plane: &Triangle,
    origin: &Point3D,
    dir: &Vector3D,
) -> Option<(f64, f64)> {
    let (p, q) = match triangle_plane(triangle, other_plane) {
        TriangleIntersection::None => return None,
        TriangleIntersection::Point(p) => (p, p),
        TriangleIntersection::Segment(p, q) => (p, q),
    };
    let tp = (p - *origin).dot(dir);
    let tq = (q - *origin).dot(dir);
    Some((tp.min(tq), tp.max(tq)))
}

fn dedup_points(points: &mut Vec<Point3D>, eps: f64) {
    let mut unique: Vec<Point3D> = Vec::with_capacity(points.len());
    for p in points.drain(..) {
        if !unique.iter().any(|u| u.distance(&p) <= eps) {
            unique.push(p);
        }
    }
    *points = unique;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn xy_triangle() -> Triangle {
        Triangle::new(
            Point3D::new(0.0, 0.0, 0.0),
            Point3D::new(1.0, 0.0, 0.0),
            Point3D::new(0.0, 1.0, 0.0),
        )
    }

    #[test]
    fn test_barycentric_basis() {
        let t = xy_triangle();
        let (u, v) = to_barycentric(&t, &Point3D::new(0.0, 0.0, 0.0)).unwrap();
        assert_relative_eq!(u, 0.0);
        assert_relative_eq!(v, 0.0);
        let (u, v) = to_barycentric(&t, &Point3D::new(0.5, 0.0, 0.0)).unwrap();
        assert_relative_eq!(u, 0.0);
        assert_relative_eq!(v, 0.5);
        assert!(is_on_edge_barycentric(u, v));
        let (u, v) = to_barycentric(&t, &Point3D::new(0.0, 1.0, 0.0)).unwrap();
        assert_relative_eq!(u, 1.0);
        assert_relative_eq!(v, 0.0);
    }

    #[test]
    fn test_barycentric_inside_outside() {
        let t = xy_triangle();
        let (u, v) = to_barycentric(&t, &Point3D::new(0.2, 0.2, 0.0)).unwrap();
        assert!(is_inside_barycentric(u, v));
        assert!(!is_on_edge_barycentric(u, v));
        let (u, v) = to_barycentric(&t, &Point3D::new(0.8, 0.8, 0.0)).unwrap();
        assert!(!is_inside_barycentric(u, v));
    }

    #[test]
    fn test_barycentric_degenerate() {
        let t = Triangle::new(
            Point3D::new(0.0, 0.0, 0.0),
            Point3D::new(1.0, 0.0, 0.0),
            Point3D::new(2.0, 0.0, 0.0),
        );
        assert!(to_barycentric(&t, &Point3D::new(0.5, 0.0, 0.0)).is_none());
    }

    #[test]
    fn test_ray_triangle() {
        let t = xy_triangle();
        let hit = ray_triangle(&t, Point3D::new(0.25, 0.25, 1.0), -Vector3D::unit_z()).unwrap();
        assert_relative_eq!(hit.z, 0.0);
        assert!(ray_triangle(&t, Point3D::new(0.25, 0.25, 1.0), Vector3D::unit_z()).is_none());
        assert!(ray_triangle(&t, Point3D::new(2.0, 2.0, 1.0), -Vector3D::unit_z()).is_none());
    }

    #[test]
    fn test_ray_triangles_sorted() {
        let near = Triangle::new(
            Point3D::new(0.0, 0.0, 1.0),
            Point3D::new(1.0, 0.0, 1.0),
            Point3D::new(0.0, 1.0, 1.0),
        );
        let hits = ray_triangles(
            &[xy_triangle(), near],
            Point3D::new(0.1, 0.1, 5.0),
            -Vector3D::unit_z(),
        );
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].0, 1);
        assert_eq!(hits[1].0, 0);
    }

    #[test]
    fn test_closest_point_triangle_point() {
        let t = xy_triangle();
        let inside = closest_point_triangle_point(&t, &Point3D::new(0.2, 0.2, 3.0));
        assert_relative_eq!(inside.distance(&Point3D::new(0.2, 0.2, 0.0)), 0.0, epsilon = 1e-12);
        let corner = closest_point_triangle_point(&t, &Point3D::new(-1.0, -1.0, 0.0));
        assert_relative_eq!(corner.distance(&Point3D::origin()), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_triangle_plane_segment() {
        let vertical = Triangle::new(
            Point3D::new(0.5, -1.0, -1.0),
            Point3D::new(0.5, 1.0, -1.0),
            Point3D::new(0.5, 0.0, 1.0),
        );
        match triangle_plane(&vertical, &xy_triangle()) {
            TriangleIntersection::Segment(a, b) => {
                assert_relative_eq!(a.z, 0.0, epsilon = 1e-12);
                assert_relative_eq!(b.z, 0.0, epsilon = 1e-12);
                assert_relative_eq!(a.distance(&b), 1.0, epsilon = 1e-12);
            }
            other => panic!("expected segment, got {:?}", other),
        }
    }

    #[test]
    fn test_triangle_plane_touching_vertex() {
        let t = Triangle::new(
            Point3D::new(0.0, 0.0, 0.0),
            Point3D::new(1.0, 0.0, 1.0),
            Point3D::new(0.0, 1.0, 1.0),
        );
        assert_eq!(
            triangle_plane(&t, &xy_triangle()),
            TriangleIntersection::Point(Point3D::origin())
        );
    }

    #[test]
    fn test_triangle_triangle() {
        let big = Triangle::new(
            Point3D::new(-2.0, -2.0, 0.0),
            Point3D::new(4.0, -2.0, 0.0),
            Point3D::new(-2.0, 4.0, 0.0),
        );
        let vertical = Triangle::new(
            Point3D::new(0.0, -1.0, -1.0),
            Point3D::new(0.0, 1.0, -1.0),
            Point3D::new(0.0, 0.0, 1.0),
        );
        let (a, b) = triangle_triangle(&big, &vertical).segment().unwrap();
        assert_relative_eq!(a.distance(&b), 1.0, epsilon = 1e-9);
        assert_relative_eq!(a.x, 0.0, epsilon = 1e-9);

        let far = Triangle::new(
            Point3D::new(10.0, -1.0, -1.0),
            Point3D::new(10.0, 1.0, -1.0),
            Point3D::new(10.0, 0.0, 1.0),
        );
        assert!(triangle_triangle(&big, &far).is_none());
    }
}
