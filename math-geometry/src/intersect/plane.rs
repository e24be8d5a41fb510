//! Plane intersections with lines, rays, segments and other planes

use crate::math::EPSILON;
use crate::triangle::Triangle;
use crate::types::{Point3D, Vector3D};

/// Offset `t` along `p + t·d` where the line meets the plane
///
/// `None` for a degenerate plane or a line parallel to it.
fn plane_line_parameter(
    plane: &Triangle,
    line_point: &Point3D,
    direction: &Vector3D,
) -> Option<f64> {
    let n = plane.normal_unit()?;
    let denom = n.dot(direction);
    if denom.abs() <= EPSILON * direction.length().max(EPSILON) {
        return None;
    }
    let t = n.dot(&(plane.point0 - *line_point)) / denom;
    t.is_finite().then_some(t)
}

/// Intersection of an infinite line with a plane
pub fn plane_line(plane: &Triangle, line_point: Point3D, direction: Vector3D) -> Option<Point3D> {
    let t = plane_line_parameter(plane, &line_point, &direction)?;
    Some(line_point + direction * t)
}

/// Intersection of a ray with a plane, rejecting hits behind the origin
pub fn plane_ray(plane: &Triangle, origin: Point3D, direction: Vector3D) -> Option<Point3D> {
    let t = plane_line_parameter(plane, &origin, &direction)?;
    (t >= 0.0).then(|| origin + direction * t)
}

/// Intersection of segment `a`–`b` with a plane
pub fn plane_segment(plane: &Triangle, a: Point3D, b: Point3D) -> Option<Point3D> {
    let t = plane_line_parameter(plane, &a, &(b - a))?;
    (-EPSILON..=1.0 + EPSILON)
        .contains(&t)
        .then(|| a.lerp(&b, t.clamp(0.0, 1.0)))
}

/// Line shared by two planes as `(point, unit direction)`
///
/// `None` if either plane is degenerate or the planes are parallel (unit
/// normals with a dot product of ±1). The returned point is the one on the
/// line closest to the origin.
pub fn plane_plane(plane1: &Triangle, plane2: &Triangle) -> Option<(Point3D, Vector3D)> {
    let n1 = plane1.normal_unit()?;
    let n2 = plane2.normal_unit()?;
    let dot = n1.dot(&n2);
    if 1.0 - dot.abs() <= EPSILON {
        return None;
    }
    let direction = n1.cross(&n2);
    let d1 = plane1.distance_from_origin();
    let d2 = plane2.distance_from_origin();
    let det = 1.0 - dot * dot;
    let c1 = (d1 - d2 * dot) / det;
    let c2 = (d2 - d1 * dot) / det;
    let point = Point3D::origin() + n1 * c1 + n2 * c2;
    Some((point, direction.normalize()?))
}

/// Orthogonal projection of `point` onto a plane
pub fn closest_point_plane_point(plane: &Triangle, point: &Point3D) -> Point3D {
    plane.project_point(point)
}
