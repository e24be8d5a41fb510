//! Near-equality tests against the workspace-wide tolerance

use crate::types::{Point3D, Vector3D};

/// Numerical tolerance for floating-point comparisons
///
/// Used throughout the workspace for:
/// - Distance and side-of-plane tests
/// - Determinant / denominator checks
/// - Degeneracy detection
pub const EPSILON: f64 = 1e-10;

/// `|value| <= EPSILON`
#[inline]
pub fn is_nearly_zero(value: f64) -> bool {
    value.abs() <= EPSILON
}

/// `|a - b| <= EPSILON`
#[inline]
pub fn is_nearly_equal(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPSILON
}

/// Component-wise near equality of two points
#[inline]
pub fn is_nearly_equal_point(a: &Point3D, b: &Point3D) -> bool {
    is_nearly_equal(a.x, b.x) && is_nearly_equal(a.y, b.y) && is_nearly_equal(a.z, b.z)
}

/// Component-wise near equality of two vectors
#[inline]
pub fn is_nearly_equal_vector(a: &Vector3D, b: &Vector3D) -> bool {
    is_nearly_equal(a.x, b.x) && is_nearly_equal(a.y, b.y) && is_nearly_equal(a.z, b.z)
}

/// Scale-aware tolerance for a point cloud
///
/// `EPSILON` multiplied by the largest absolute coordinate (never less than
/// `EPSILON` itself), so side-of-plane tests behave the same for clouds in
/// millimetres and in kilometres.
pub fn relative_epsilon(points: &[Point3D]) -> f64 {
    let max_coord = points
        .iter()
        .map(|p| p.x.abs().max(p.y.abs()).max(p.z.abs()))
        .fold(0.0_f64, f64::max);
    EPSILON * max_coord.max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearly_zero() {
        assert!(is_nearly_zero(0.0));
        assert!(is_nearly_zero(-1e-12));
        assert!(!is_nearly_zero(1e-6));
    }

    #[test]
    fn test_nearly_equal_point() {
        let a = Point3D::new(1.0, 2.0, 3.0);
        let b = Point3D::new(1.0 + 1e-12, 2.0, 3.0 - 1e-12);
        assert!(is_nearly_equal_point(&a, &b));
        assert!(!is_nearly_equal_point(&a, &Point3D::new(1.0, 2.0, 3.1)));
    }

    #[test]
    fn test_relative_epsilon_scales() {
        let small = [Point3D::new(0.1, 0.2, 0.3)];
        let large = [Point3D::new(1000.0, -5000.0, 0.0)];
        assert_eq!(relative_epsilon(&small), EPSILON);
        assert!((relative_epsilon(&large) - 5000.0 * EPSILON).abs() < 1e-20);
    }
}
