//! Closest points on lines, rays and segments

use crate::math::EPSILON;
use crate::types::{Point3D, Vector3D};

/// Parameter `t` of the point on `p + t·d` closest to `test`
///
/// `None` for a zero direction. `d` need not be unit length.
pub fn line_parameter(line_point: &Point3D, direction: &Vector3D, test: &Point3D) -> Option<f64> {
    let len2 = direction.length_squared();
    if len2 <= EPSILON * EPSILON {
        return None;
    }
    Some((*test - *line_point).dot(direction) / len2)
}

/// Closest point on an infinite line to `test`
pub fn closest_point_line_point(
    line_point: &Point3D,
    direction: &Vector3D,
    test: &Point3D,
) -> Option<Point3D> {
    let t = line_parameter(line_point, direction, test)?;
    Some(*line_point + *direction * t)
}

/// Closest point on a ray (`t >= 0`) to `test`
pub fn closest_point_ray_point(
    origin: &Point3D,
    direction: &Vector3D,
    test: &Point3D,
) -> Option<Point3D> {
    let t = line_parameter(origin, direction, test)?.max(0.0);
    Some(*origin + *direction * t)
}

/// Closest point on segment `a`–`b` to `test` (`a` if the segment is a point)
pub fn closest_point_segment_point(a: &Point3D, b: &Point3D, test: &Point3D) -> Point3D {
    match line_parameter(a, &(*b - *a), test) {
        Some(t) => a.lerp(b, t.clamp(0.0, 1.0)),
        None => *a,
    }
}

/// Closest points between two infinite lines
///
/// Returns `(on_line1, on_line2)`, or `None` when the lines are parallel
/// (or a direction is zero) and there is no unique answer. Callers treat
/// `None` as "parallel", not as an error.
pub fn closest_points_line_line(
    point1: &Point3D,
    direction1: &Vector3D,
    point2: &Point3D,
    direction2: &Vector3D,
) -> Option<(Point3D, Point3D)> {
    let w = *point1 - *point2;
    let a = direction1.dot(direction1);
    let b = direction1.dot(direction2);
    let c = direction2.dot(direction2);
    let d = direction1.dot(&w);
    let e = direction2.dot(&w);

    let denom = a * c - b * b;
    if denom.abs() <= EPSILON * a * c || a <= EPSILON * EPSILON || c <= EPSILON * EPSILON {
        return None;
    }

    let s = (b * e - c * d) / denom;
    let t = (a * e - b * d) / denom;
    let on1 = *point1 + *direction1 * s;
    let on2 = *point2 + *direction2 * t;
    if on1.is_finite() && on2.is_finite() {
        Some((on1, on2))
    } else {
        None
    }
}

/// Closest points between segments `a0`–`a1` and `b0`–`b1`
///
/// Always defined: parallel or point-like segments fall back to endpoint
/// tests.
pub fn closest_points_segment_segment(
    a0: &Point3D,
    a1: &Point3D,
    b0: &Point3D,
    b1: &Point3D,
) -> (Point3D, Point3D) {
    let da = *a1 - *a0;
    let db = *b1 - *b0;
    if let Some((pa, pb)) = closest_points_line_line(a0, &da, b0, &db) {
        let s = line_parameter(a0, &da, &pa).unwrap_or(0.0);
        let t = line_parameter(b0, &db, &pb).unwrap_or(0.0);
        if (0.0..=1.0).contains(&s) && (0.0..=1.0).contains(&t) {
            return (pa, pb);
        }
    }

    // Optimum sits on a boundary: test each endpoint against the other segment
    let candidates = [
        (*a0, closest_point_segment_point(b0, b1, a0)),
        (*a1, closest_point_segment_point(b0, b1, a1)),
        (closest_point_segment_point(a0, a1, b0), *b0),
        (closest_point_segment_point(a0, a1, b1), *b1),
    ];
    candidates
        .into_iter()
        .min_by(|x, y| x.0.distance_squared(&x.1).total_cmp(&y.0.distance_squared(&y.1)))
        .unwrap_or((*a0, *b0))
}
