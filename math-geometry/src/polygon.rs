//! Polygon helpers: plane projection, 2D hull, containment and clipping

use crate::math::EPSILON;
use crate::triangle::Triangle;
use crate::types::{Point2D, Point3D, Vector3D};

/// Orthonormal frame on a plane, used to rotate 3D data onto 2D
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneBasis {
    pub origin: Point3D,
    pub u: Vector3D,
    pub v: Vector3D,
    pub normal: Vector3D,
}

impl PlaneBasis {
    /// Frame with `normal` as its third axis; `None` for a zero normal
    pub fn new(origin: Point3D, normal: Vector3D) -> Option<Self> {
        let normal = normal.normalize()?;
        let u = normal.any_perpendicular()?;
        let v = normal.cross(&u);
        Some(Self {
            origin,
            u,
            v,
            normal,
        })
    }

    /// Frame on a triangle's plane, `None` if the triangle is degenerate
    pub fn from_triangle(plane: &Triangle) -> Option<Self> {
        Self::new(plane.point0, plane.normal())
    }

    /// In-plane coordinates (the normal component is dropped)
    pub fn to_2d(&self, p: &Point3D) -> Point2D {
        let r = *p - self.origin;
        Point2D::new(r.dot(&self.u), r.dot(&self.v))
    }

    /// Lift in-plane coordinates back to 3D
    pub fn to_3d(&self, p: &Point2D) -> Point3D {
        self.origin + self.u * p.x + self.v * p.y
    }
}

/// Signed area of a 2D polygon (positive when counter-clockwise)
pub fn polygon_area_2d(polygon: &[Point2D]) -> f64 {
    let n = polygon.len();
    if n < 3 {
        return 0.0;
    }
    let mut area = 0.0;
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        area += a.x * b.y - b.x * a.y;
    }
    area * 0.5
}

/// Indices of the 2D convex hull, counter-clockwise, collinear points dropped
///
/// Andrew's monotone chain. Returns fewer than three indices when the input
/// is degenerate.
pub fn convex_hull_2d(points: &[Point2D]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| {
        points[a]
            .x
            .total_cmp(&points[b].x)
            .then(points[a].y.total_cmp(&points[b].y))
    });
    order.dedup_by(|a, b| {
        (points[*a].x - points[*b].x).abs() <= EPSILON
            && (points[*a].y - points[*b].y).abs() <= EPSILON
    });
    if order.len() < 3 {
        return order;
    }

    let mut hull: Vec<usize> = Vec::with_capacity(order.len() * 2);
    for pass in 0..2 {
        let start = hull.len();
        let iter: Box<dyn Iterator<Item = &usize>> = if pass == 0 {
            Box::new(order.iter())
        } else {
            Box::new(order.iter().rev())
        };
        for &i in iter {
            while hull.len() >= start + 2 {
                let a = points[hull[hull.len() - 2]];
                let b = points[hull[hull.len() - 1]];
                if a.cross(&b, &points[i]) <= EPSILON {
                    hull.pop();
                } else {
                    break;
                }
            }
            hull.push(i);
        }
        // Last point of each chain is the first of the next
        hull.pop();
    }
    hull
}

/// Even-odd point-in-polygon test in 2D
pub fn is_point_in_polygon(point: &Point2D, polygon: &[Point2D]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = polygon[i];
        let pj = polygon[j];
        if (pi.y > point.y) != (pj.y > point.y) {
            let x_cross = (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Clip a planar 3D polygon by a plane, keeping the side opposite `normal`
///
/// Sutherland-Hodgman against the half-space `(p - plane_point) · normal <= 0`.
/// The result may have fewer than three points when the polygon lies
/// (almost) entirely on the discarded side.
pub fn clip_polygon_by_plane(
    polygon: &[Point3D],
    plane_point: &Point3D,
    normal: &Vector3D,
) -> Vec<Point3D> {
    let n = polygon.len();
    if n == 0 {
        return Vec::new();
    }
    let scale = normal.length();
    if scale <= EPSILON {
        return polygon.to_vec();
    }
    let dist: Vec<f64> = polygon
        .iter()
        .map(|p| (*p - *plane_point).dot(normal) / scale)
        .collect();

    let mut out = Vec::with_capacity(n + 2);
    for i in 0..n {
        let j = (i + 1) % n;
        let (a, b) = (polygon[i], polygon[j]);
        let (da, db) = (dist[i], dist[j]);
        let a_in = da <= EPSILON;
        let b_in = db <= EPSILON;
        if a_in {
            out.push(a);
        }
        if a_in != b_in && (da - db).abs() > EPSILON {
            let t = da / (da - db);
            if t > 0.0 && t < 1.0 {
                out.push(a.lerp(&b, t));
            }
        }
    }
    out.dedup_by(|a, b| a.distance(b) <= EPSILON);
    if out.len() > 1 && out[0].distance(&out[out.len() - 1]) <= EPSILON {
        out.pop();
    }
    out
}

/// Clip a 2D polygon by a convex counter-clockwise polygon
pub fn clip_convex_polygon_2d(subject: &[Point2D], clip: &[Point2D]) -> Vec<Point2D> {
    let mut output = subject.to_vec();
    let m = clip.len();
    for k in 0..m {
        if output.is_empty() {
            break;
        }
        let a = clip[k];
        let b = clip[(k + 1) % m];
        let input = std::mem::take(&mut output);
        let n = input.len();
        for i in 0..n {
            let p = input[i];
            let q = input[(i + 1) % n];
            let dp = a.cross(&b, &p);
            let dq = a.cross(&b, &q);
            let p_in = dp >= -EPSILON;
            let q_in = dq >= -EPSILON;
            if p_in {
                output.push(p);
            }
            if p_in != q_in && (dp - dq).abs() > EPSILON {
                let t = dp / (dp - dq);
                output.push(Point2D::new(p.x + (q.x - p.x) * t, p.y + (q.y - p.y) * t));
            }
        }
    }
    output.dedup_by(|a, b| a.distance(b) <= EPSILON);
    if output.len() > 1 && output[0].distance(&output[output.len() - 1]) <= EPSILON {
        output.pop();
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square() -> Vec<Point2D> {
        vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(1.0, 1.0),
            Point2D::new(0.0, 1.0),
        ]
    }

    #[test]
    fn test_convex_hull_2d_drops_interior() {
        let mut pts = square();
        pts.push(Point2D::new(0.5, 0.5));
        pts.push(Point2D::new(0.5, 0.0));
        let hull = convex_hull_2d(&pts);
        assert_eq!(hull.len(), 4);
        let poly: Vec<Point2D> = hull.iter().map(|&i| pts[i]).collect();
        assert_relative_eq!(polygon_area_2d(&poly), 1.0);
    }

    #[test]
    fn test_point_in_polygon() {
        let sq = square();
        assert!(is_point_in_polygon(&Point2D::new(0.5, 0.5), &sq));
        assert!(!is_point_in_polygon(&Point2D::new(1.5, 0.5), &sq));
    }

    #[test]
    fn test_plane_basis_round_trip() {
        let basis =
            PlaneBasis::new(Point3D::new(1.0, 2.0, 3.0), Vector3D::new(1.0, 1.0, 0.0)).unwrap();
        let p = Point3D::new(1.0, 2.0, 3.0) + basis.u * 2.0 - basis.v * 0.5;
        let q = basis.to_3d(&basis.to_2d(&p));
        assert_relative_eq!(p.distance(&q), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_clip_polygon_by_plane_halves_square() {
        let poly = vec![
            Point3D::new(0.0, 0.0, 0.0),
            Point3D::new(2.0, 0.0, 0.0),
            Point3D::new(2.0, 2.0, 0.0),
            Point3D::new(0.0, 2.0, 0.0),
        ];
        let clipped =
            clip_polygon_by_plane(&poly, &Point3D::new(1.0, 0.0, 0.0), &Vector3D::unit_x());
        assert_eq!(clipped.len(), 4);
        assert!(clipped.iter().all(|p| p.x <= 1.0 + 1e-12));
    }

    #[test]
    fn test_clip_polygon_fully_outside() {
        let poly = vec![
            Point3D::new(2.0, 0.0, 0.0),
            Point3D::new(3.0, 0.0, 0.0),
            Point3D::new(3.0, 1.0, 0.0),
        ];
        let clipped = clip_polygon_by_plane(&poly, &Point3D::origin(), &Vector3D::unit_x());
        assert!(clipped.is_empty());
    }

    #[test]
    fn test_clip_convex_2d() {
        let subject = vec![
            Point2D::new(0.5, 0.5),
            Point2D::new(1.5, 0.5),
            Point2D::new(1.5, 1.5),
            Point2D::new(0.5, 1.5),
        ];
        let clipped = clip_convex_polygon_2d(&subject, &square());
        assert_relative_eq!(polygon_area_2d(&clipped), 0.25, epsilon = 1e-12);
    }
}
