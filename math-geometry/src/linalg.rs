//! Small dense solves: Gauss-Jordan, circumspheres and plane fitting

use ndarray::{Array1, Array2, array};

use crate::error::{GeometryError, Result};
use crate::math::EPSILON;
use crate::types::{Point3D, Vector3D};

/// Sphere through the four vertices of a tetrahedron
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circumsphere {
    pub center: Point3D,
    pub radius: f64,
}

impl Circumsphere {
    /// Returns `true` if `point` is strictly inside, with a relative margin
    ///
    /// `margin` is a fraction of the squared radius; points closer to the
    /// surface than that count as outside.
    pub fn contains(&self, point: &Point3D, margin: f64) -> bool {
        let r2 = self.radius * self.radius;
        self.center.distance_squared(point) < r2 * (1.0 - margin)
    }
}

/// Least-squares plane through a point set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneFit {
    pub centroid: Point3D,
    /// Unit normal (sign is arbitrary)
    pub normal: Vector3D,
}

/// Solve `A x = b` by Gauss-Jordan elimination with partial pivoting
///
/// Returns `None` if `A` is not square, the dimensions disagree, or the
/// matrix is singular relative to its largest entry.
pub fn gauss_jordan(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || b.len() != n {
        return None;
    }

    // Augmented matrix [A | b]
    let mut m = Array2::<f64>::zeros((n, n + 1));
    for i in 0..n {
        for j in 0..n {
            m[[i, j]] = a[[i, j]];
        }
        m[[i, n]] = b[i];
    }

    let scale = a.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if scale == 0.0 || !scale.is_finite() {
        return None;
    }
    let threshold = EPSILON * scale;

    for k in 0..n {
        // Find pivot
        let mut max_val = m[[k, k]].abs();
        let mut max_row = k;
        for i in (k + 1)..n {
            let val = m[[i, k]].abs();
            if val > max_val {
                max_val = val;
                max_row = i;
            }
        }

        if max_val <= threshold {
            return None;
        }

        if max_row != k {
            for j in 0..=n {
                m.swap([k, j], [max_row, j]);
            }
        }

        let pivot = m[[k, k]];
        for j in k..=n {
            m[[k, j]] /= pivot;
        }

        // Eliminate column k from every other row
        for i in 0..n {
            if i == k {
                continue;
            }
            let factor = m[[i, k]];
            if factor == 0.0 {
                continue;
            }
            for j in k..=n {
                let update = factor * m[[k, j]];
                m[[i, j]] -= update;
            }
        }
    }

    let x = m.column(n).to_owned();
    if x.iter().all(|v| v.is_finite()) {
        Some(x)
    } else {
        None
    }
}

/// Circumsphere of a tetrahedron
///
/// With `D = 2 (center - p0)`, each edge `e_i = p_i - p0` satisfies
/// `e_i · D = |e_i|²`, a 3×3 system solved by [`gauss_jordan`]. Returns
/// `None` for a degenerate (flat) tetrahedron.
pub fn tetrahedron_circumsphere(
    p0: &Point3D,
    p1: &Point3D,
    p2: &Point3D,
    p3: &Point3D,
) -> Option<Circumsphere> {
    let e1 = *p1 - *p0;
    let e2 = *p2 - *p0;
    let e3 = *p3 - *p0;

    let a = array![
        [e1.x, e1.y, e1.z],
        [e2.x, e2.y, e2.z],
        [e3.x, e3.y, e3.z],
    ];
    let b = array![e1.length_squared(), e2.length_squared(), e3.length_squared()];

    let d = gauss_jordan(&a, &b)?;
    let half = Vector3D::new(d[0], d[1], d[2]) * 0.5;
    let radius = half.length();
    if radius <= 0.0 || !radius.is_finite() {
        return None;
    }
    Some(Circumsphere {
        center: *p0 + half,
        radius,
    })
}

/// Best-fit plane through a point set
///
/// Builds the covariance matrix about the centroid and solves for the normal
/// along the axis whose 2×2 minor has the largest determinant. `None` for
/// fewer than three points or a collinear set.
pub fn best_fit_plane(points: &[Point3D]) -> Option<PlaneFit> {
    if points.len() < 3 {
        return None;
    }
    let centroid = Point3D::centroid(points)?;

    let (mut xx, mut xy, mut xz, mut yy, mut yz, mut zz) = (0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
    for p in points {
        let r = *p - centroid;
        xx += r.x * r.x;
        xy += r.x * r.y;
        xz += r.x * r.z;
        yy += r.y * r.y;
        yz += r.y * r.z;
        zz += r.z * r.z;
    }

    let det_x = yy * zz - yz * yz;
    let det_y = xx * zz - xz * xz;
    let det_z = xx * yy - xy * xy;
    let det_max = det_x.max(det_y).max(det_z);

    let spread = xx + yy + zz;
    if det_max <= EPSILON * spread * spread {
        return None;
    }

    let normal = if det_max == det_x {
        Vector3D::new(det_x, xz * yz - xy * zz, xy * yz - xz * yy)
    } else if det_max == det_y {
        Vector3D::new(xz * yz - xy * zz, det_y, xy * xz - yz * xx)
    } else {
        Vector3D::new(xy * yz - xz * yy, xy * xz - yz * xx, det_z)
    };

    Some(PlaneFit {
        centroid,
        normal: normal.normalize()?,
    })
}

/// Centroid with per-point weights
///
/// Falls back to the plain centroid when the weights sum to zero.
pub fn weighted_centroid(points: &[Point3D], weights: &[f64]) -> Result<Point3D> {
    if points.len() != weights.len() {
        return Err(GeometryError::LengthMismatch {
            expected: points.len(),
            got: weights.len(),
        });
    }
    if points.is_empty() {
        return Err(GeometryError::InsufficientPoints { needed: 1, got: 0 });
    }
    let total: f64 = weights.iter().sum();
    if total.abs() <= EPSILON {
        return Point3D::centroid(points).ok_or_else(|| {
            GeometryError::Internal("centroid of a non-empty set is undefined".to_string())
        });
    }
    let mut acc = Vector3D::zero();
    for (p, w) in points.iter().zip(weights) {
        acc += p.to_vector() * *w;
    }
    Ok(Point3D::origin() + acc / total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_gauss_jordan_solves() {
        let a = array![[2.0, 1.0, -1.0], [-3.0, -1.0, 2.0], [-2.0, 1.0, 2.0]];
        let b = array![8.0, -11.0, -3.0];
        let x = gauss_jordan(&a, &b).unwrap();
        assert_relative_eq!(x[0], 2.0, epsilon = 1e-10);
        assert_relative_eq!(x[1], 3.0, epsilon = 1e-10);
        assert_relative_eq!(x[2], -1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_gauss_jordan_needs_pivoting() {
        let a = array![[0.0, 1.0], [1.0, 0.0]];
        let b = array![3.0, 4.0];
        let x = gauss_jordan(&a, &b).unwrap();
        assert_relative_eq!(x[0], 4.0);
        assert_relative_eq!(x[1], 3.0);
    }

    #[test]
    fn test_gauss_jordan_singular() {
        let a = array![[1.0, 2.0], [2.0, 4.0]];
        let b = array![1.0, 2.0];
        assert!(gauss_jordan(&a, &b).is_none());
    }

    #[test]
    fn test_circumsphere_unit_tetrahedron() {
        let s = tetrahedron_circumsphere(
            &Point3D::new(0.0, 0.0, 0.0),
            &Point3D::new(1.0, 0.0, 0.0),
            &Point3D::new(0.0, 1.0, 0.0),
            &Point3D::new(0.0, 0.0, 1.0),
        )
        .unwrap();
        assert_relative_eq!(s.center.x, 0.5, epsilon = 1e-12);
        assert_relative_eq!(s.center.y, 0.5, epsilon = 1e-12);
        assert_relative_eq!(s.center.z, 0.5, epsilon = 1e-12);
        assert_relative_eq!(s.radius, 0.75_f64.sqrt(), epsilon = 1e-12);
        assert!(s.contains(&Point3D::new(0.2, 0.2, 0.2), 1e-9));
        assert!(!s.contains(&Point3D::new(1.0, 1.0, 1.0), 1e-9));
    }

    #[test]
    fn test_circumsphere_flat() {
        let s = tetrahedron_circumsphere(
            &Point3D::new(0.0, 0.0, 0.0),
            &Point3D::new(1.0, 0.0, 0.0),
            &Point3D::new(0.0, 1.0, 0.0),
            &Point3D::new(1.0, 1.0, 0.0),
        );
        assert!(s.is_none());
    }

    #[test]
    fn test_best_fit_plane_tilted() {
        // Points on z = x + 2y + 1
        let pts: Vec<Point3D> = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (2.0, 3.0), (-1.0, 0.5)]
            .iter()
            .map(|&(x, y)| Point3D::new(x, y, x + 2.0 * y + 1.0))
            .collect();
        let fit = best_fit_plane(&pts).unwrap();
        let expected = Vector3D::new(1.0, 2.0, -1.0).normalize().unwrap();
        assert_relative_eq!(fit.normal.dot(&expected).abs(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_weighted_centroid() {
        let pts = [Point3D::new(0.0, 0.0, 0.0), Point3D::new(4.0, 0.0, 0.0)];
        let c = weighted_centroid(&pts, &[3.0, 1.0]).unwrap();
        assert_relative_eq!(c.x, 1.0);
        let plain = weighted_centroid(&pts, &[0.0, 0.0]).unwrap();
        assert_relative_eq!(plain.x, 2.0);
        assert!(matches!(
            weighted_centroid(&pts, &[1.0]),
            Err(GeometryError::LengthMismatch { expected: 2, got: 1 })
        ));
        assert!(weighted_centroid(&[], &[]).is_err());
    }

    #[test]
    fn test_best_fit_plane_collinear() {
        let pts = [
            Point3D::new(0.0, 0.0, 0.0),
            Point3D::new(1.0, 1.0, 1.0),
            Point3D::new(2.0, 2.0, 2.0),
        ];
        assert!(best_fit_plane(&pts).is_none());
    }
}
