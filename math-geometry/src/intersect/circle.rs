//! Closest points between round shapes (circle, cylinder, sphere) and lines
//!
//! Each query classifies the line against the shape and produces zero, one
//! or two candidate pairs. The caller's [`CircleLineMode`] decides which of
//! them come back. Cylinder and sphere queries are reduced to a circle
//! problem in a suitable plane.

use crate::math::EPSILON;
use crate::triangle::Triangle;
use crate::types::{Point3D, Vector3D};

use super::line::{closest_point_line_point, closest_points_line_line, line_parameter};

/// Iterations of alternating projection used to polish oblique candidates
const REFINE_ITERATIONS: usize = 32;

/// Which candidates a round-shape/line query returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CircleLineMode {
    /// Every candidate, nearest pair first
    #[default]
    AllPoints,
    /// The candidate whose shape point is nearest the line's origin point
    ClosestToRayOrigin,
    /// The candidate with the smallest shape-to-line distance
    ClosestPair,
}

/// One candidate: a point on the shape and the matching point on the line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestPair {
    pub on_shape: Point3D,
    pub on_line: Point3D,
}

impl ClosestPair {
    pub fn distance(&self) -> f64 {
        self.on_shape.distance(&self.on_line)
    }
}

/// Result of a round-shape/line query
///
/// `pairs` is empty only for degenerate input (zero direction, zero
/// radius). `ambiguous` is set when infinitely many shape points are
/// equally close, e.g. a line along a circle's axis; the pairs are then
/// representatives, not a unique answer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClosestPoints {
    pub pairs: Vec<ClosestPair>,
    pub ambiguous: bool,
}

impl ClosestPoints {
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Shape points of every pair
    pub fn shape_points(&self) -> Vec<Point3D> {
        self.pairs.iter().map(|p| p.on_shape).collect()
    }
}

/// Circle given by center, plane normal and radius
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Point3D,
    /// Unit normal of the circle's plane
    pub normal: Vector3D,
    pub radius: f64,
}

impl Circle {
    /// `None` for a zero normal or a non-positive radius
    pub fn new(center: Point3D, normal: Vector3D, radius: f64) -> Option<Self> {
        if radius.is_nan() || radius <= 0.0 {
            return None;
        }
        Some(Self {
            center,
            normal: normal.normalize()?,
            radius,
        })
    }

    /// Circle lying in `plane`, centered on `center` projected onto it
    pub fn from_plane(plane: &Triangle, center: Point3D, radius: f64) -> Option<Self> {
        Self::new(plane.project_point(&center), plane.normal_unit()?, radius)
    }

    /// Point on the circle nearest `point`; `None` on the axis
    pub fn closest_point(&self, point: &Point3D) -> Option<Point3D> {
        let radial = (*point - self.center).reject_from(&self.normal);
        Some(self.center + radial.normalize()? * self.radius)
    }
}

/// Closest point on a sphere's surface to `point`
///
/// `None` when `point` is the center (every surface point is equally close).
pub fn closest_point_sphere_point(
    center: &Point3D,
    radius: f64,
    point: &Point3D,
) -> Option<Point3D> {
    let dir = (*point - *center).normalize()?;
    Some(*center + dir * radius)
}

/// Closest point on a circle to `point`; `None` when `point` is on the axis
pub fn closest_point_circle_point(circle: &Circle, point: &Point3D) -> Option<Point3D> {
    circle.closest_point(point)
}

/// Closest points between a circle and an infinite line
///
/// Three regimes:
/// - line perpendicular to the circle's plane: one radial candidate, or two
///   antipodal points flagged `ambiguous` when the line runs through the
///   center
/// - line parallel to the plane: the chord intersections of the line's
///   projection with the circle, or the single radial point nearest the
///   projected line when it misses the disk
/// - oblique: the same candidates, refined by alternating projection
///   between circle and line
pub fn closest_points_circle_line(
    circle: &Circle,
    line_point: &Point3D,
    direction: &Vector3D,
    mode: CircleLineMode,
) -> ClosestPoints {
    let Some(dir) = direction.normalize() else {
        return ClosestPoints::default();
    };
    let n = circle.normal;
    let along_normal = dir.dot(&n);

    if 1.0 - along_normal.abs() <= EPSILON {
        return perpendicular_regime(circle, line_point, &dir, mode);
    }

    // Project the line into the circle's plane
    let offset = n * n.dot(&(*line_point - circle.center));
    let q0 = *line_point - offset;
    let dp = dir.reject_from(&n);
    let chord = chord_candidates(circle, &q0, &dp);

    let oblique = along_normal.abs() > EPSILON;
    let mut pairs: Vec<ClosestPair> = chord
        .into_iter()
        .filter_map(|s| {
            let s = if oblique {
                refine_circle_line(circle, s, line_point, &dir)
            } else {
                s
            };
            let on_line = closest_point_line_point(line_point, &dir, &s)?;
            Some(ClosestPair {
                on_shape: s,
                on_line,
            })
        })
        .collect();

    // Refinement may pull both chord candidates onto the same local minimum
    pairs.dedup_by(|a, b| a.on_shape.distance(&b.on_shape) <= EPSILON * circle.radius.max(1.0));

    select(pairs, false, line_point, mode)
}

/// Closest points between an infinite cylinder and an infinite line
///
/// The line is projected onto the cylinder's cross-section, solved as a
/// circle problem there, then each circle candidate is lifted back to the
/// closest point on its generatrix. A line parallel to the axis gives an
/// `ambiguous` answer (a whole generatrix is equally close).
pub fn closest_points_cylinder_line(
    axis_point: &Point3D,
    axis_direction: &Vector3D,
    radius: f64,
    line_point: &Point3D,
    direction: &Vector3D,
    mode: CircleLineMode,
) -> ClosestPoints {
    let (Some(k), Some(dir)) = (axis_direction.normalize(), direction.normalize()) else {
        return ClosestPoints::default();
    };
    let Some(cross_section) = Circle::new(*axis_point, k, radius) else {
        return ClosestPoints::default();
    };

    if 1.0 - dir.dot(&k).abs() <= EPSILON {
        // Line parallel to the axis: answer at the line point's axial height
        let Some(t) = line_parameter(axis_point, &k, line_point) else {
            return ClosestPoints::default();
        };
        let level = Circle {
            center: *axis_point + k * t,
            ..cross_section
        };
        let mut result = perpendicular_regime(&level, line_point, &dir, mode);
        result.ambiguous = true;
        return result;
    }

    let projected = closest_points_circle_line(
        &cross_section,
        line_point,
        &dir.reject_from(&k),
        CircleLineMode::AllPoints,
    );

    let pairs: Vec<ClosestPair> = projected
        .pairs
        .iter()
        .filter_map(|pair| {
            let (on_shape, on_line) =
                closest_points_line_line(&pair.on_shape, &k, line_point, &dir)?;
            Some(ClosestPair { on_shape, on_line })
        })
        .collect();

    select(pairs, false, line_point, mode)
}

/// Closest points between a sphere and an infinite line
///
/// Solved as a circle problem in the plane through the line and the
/// center. A line through the center returns its two surface crossings.
pub fn closest_points_sphere_line(
    center: &Point3D,
    radius: f64,
    line_point: &Point3D,
    direction: &Vector3D,
    mode: CircleLineMode,
) -> ClosestPoints {
    let Some(dir) = direction.normalize() else {
        return ClosestPoints::default();
    };
    if radius.is_nan() || radius <= 0.0 {
        return ClosestPoints::default();
    }
    let Some(nearest) = closest_point_line_point(line_point, &dir, center) else {
        return ClosestPoints::default();
    };

    let to_line = nearest - *center;
    let plane_normal = dir.cross(&to_line);
    let circle = match Circle::new(*center, plane_normal, radius) {
        Some(c) if to_line.length() > EPSILON * radius.max(1.0) => c,
        _ => {
            let pairs = [*center + dir * radius, *center - dir * radius]
                .into_iter()
                .map(|p| ClosestPair {
                    on_shape: p,
                    on_line: p,
                })
                .collect();
            return select(pairs, false, line_point, mode);
        }
    };

    closest_points_circle_line(&circle, line_point, &dir, mode)
}

/// Line along the circle's normal
fn perpendicular_regime(
    circle: &Circle,
    line_point: &Point3D,
    dir: &Vector3D,
    mode: CircleLineMode,
) -> ClosestPoints {
    let n = circle.normal;
    let pierce = *line_point - n * n.dot(&(*line_point - circle.center));
    let Some(on_line) = closest_point_line_point(line_point, dir, &pierce) else {
        return ClosestPoints::default();
    };

    match circle.closest_point(&pierce) {
        Some(on_shape) => select(
            vec![ClosestPair { on_shape, on_line }],
            false,
            line_point,
            mode,
        ),
        None => {
            // Through the center: every circle point is equally close
            let Some(u) = n.any_perpendicular() else {
                return ClosestPoints::default();
            };
            let pairs = vec![
                ClosestPair {
                    on_shape: circle.center + u * circle.radius,
                    on_line,
                },
                ClosestPair {
                    on_shape: circle.center - u * circle.radius,
                    on_line,
                },
            ];
            select(pairs, true, line_point, mode)
        }
    }
}

/// Circle points where the in-plane line `q0 + s·dp` crosses, or the single
/// radial point nearest it when it misses
fn chord_candidates(circle: &Circle, q0: &Point3D, dp: &Vector3D) -> Vec<Point3D> {
    let c = circle.center;
    let r = circle.radius;
    let Some(m) = closest_point_line_point(q0, dp, &c) else {
        return Vec::new();
    };
    let h2 = m.distance_squared(&c);
    let r2 = r * r;

    if h2 < r2 - EPSILON * r2 {
        let Some(u) = dp.normalize() else {
            return Vec::new();
        };
        let half = (r2 - h2).sqrt();
        return vec![m - u * half, m + u * half];
    }

    match circle.closest_point(&m) {
        Some(p) => vec![p],
        None => Vec::new(),
    }
}

/// Alternate circle-to-line and line-to-circle projections from `start`
fn refine_circle_line(
    circle: &Circle,
    start: Point3D,
    line_point: &Point3D,
    dir: &Vector3D,
) -> Point3D {
    let mut s = start;
    for _ in 0..REFINE_ITERATIONS {
        let Some(l) = closest_point_line_point(line_point, dir, &s) else {
            break;
        };
        let Some(next) = circle.closest_point(&l) else {
            break;
        };
        let moved = next.distance(&s);
        s = next;
        if moved <= EPSILON * circle.radius.max(1.0) {
            break;
        }
    }
    s
}

fn select(
    mut pairs: Vec<ClosestPair>,
    ambiguous: bool,
    line_point: &Point3D,
    mode: CircleLineMode,
) -> ClosestPoints {
    if pairs.is_empty() {
        return ClosestPoints::default();
    }
    match mode {
        CircleLineMode::AllPoints => {
            pairs.sort_by(|a, b| a.distance().total_cmp(&b.distance()));
        }
        CircleLineMode::ClosestToRayOrigin => {
            let best = pairs
                .iter()
                .copied()
                .min_by(|a, b| {
                    a.on_shape
                        .distance_squared(line_point)
                        .total_cmp(&b.on_shape.distance_squared(line_point))
                });
            pairs = best.into_iter().collect();
        }
        CircleLineMode::ClosestPair => {
            let best = pairs
                .iter()
                .copied()
                .min_by(|a, b| a.distance().total_cmp(&b.distance()));
            pairs = best.into_iter().collect();
        }
    }
    ClosestPoints { pairs, ambiguous }
}
