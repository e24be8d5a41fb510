//! Merging near-coincident points through a uniform grid hash
//!
//! Points are bucketed into cubic cells of the weld tolerance. A lookup scans
//! the 27 cells around the query, so any stored point within the tolerance is
//! found regardless of where the cell boundaries fall.

use std::collections::HashMap;

use crate::math::EPSILON;
use crate::types::Point3D;

type CellKey = (i64, i64, i64);

/// Deduplicates points into a growing list, returning stable indices
#[derive(Debug, Clone)]
pub struct PointWelder {
    tolerance: f64,
    inv_cell: f64,
    points: Vec<Point3D>,
    grid: HashMap<CellKey, Vec<usize>>,
}

impl PointWelder {
    /// Create a welder merging points closer than `tolerance`
    ///
    /// Non-positive or non-finite tolerances fall back to [`EPSILON`].
    pub fn new(tolerance: f64) -> Self {
        let tolerance = if tolerance.is_finite() && tolerance > 0.0 {
            tolerance
        } else {
            EPSILON
        };
        Self {
            tolerance,
            inv_cell: 1.0 / tolerance,
            points: Vec::new(),
            grid: HashMap::new(),
        }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    #[inline]
    fn floor_sat(x: f64) -> i64 {
        if !x.is_finite() {
            return if x.is_sign_positive() { i64::MAX } else { i64::MIN };
        }
        x.floor() as i64
    }

    fn key(&self, p: &Point3D) -> CellKey {
        (
            Self::floor_sat(p.x * self.inv_cell),
            Self::floor_sat(p.y * self.inv_cell),
            Self::floor_sat(p.z * self.inv_cell),
        )
    }

    /// Index of a stored point within the tolerance of `p`, nearest first
    pub fn find(&self, p: &Point3D) -> Option<usize> {
        let (kx, ky, kz) = self.key(p);
        let tol2 = self.tolerance * self.tolerance;
        let mut best: Option<(usize, f64)> = None;

        for dx in -1..=1_i64 {
            for dy in -1..=1_i64 {
                for dz in -1..=1_i64 {
                    let cell = (
                        kx.saturating_add(dx),
                        ky.saturating_add(dy),
                        kz.saturating_add(dz),
                    );
                    let Some(bucket) = self.grid.get(&cell) else {
                        continue;
                    };
                    for &i in bucket {
                        let d2 = self.points[i].distance_squared(p);
                        if d2 <= tol2 && best.is_none_or(|(_, bd)| d2 < bd) {
                            best = Some((i, d2));
                        }
                    }
                }
            }
        }

        best.map(|(i, _)| i)
    }

    /// Insert `p`, or return the index of the point it welds onto
    pub fn insert(&mut self, p: Point3D) -> usize {
        if let Some(existing) = self.find(&p) {
            return existing;
        }
        let index = self.points.len();
        self.points.push(p);
        let key = self.key(&p);
        self.grid.entry(key).or_default().push(index);
        index
    }

    pub fn points(&self) -> &[Point3D] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn into_points(self) -> Vec<Point3D> {
        self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weld_merges_close_points() {
        let mut welder = PointWelder::new(1e-6);
        let a = welder.insert(Point3D::new(1.0, 2.0, 3.0));
        let b = welder.insert(Point3D::new(1.0 + 4e-7, 2.0, 3.0 - 4e-7));
        let c = welder.insert(Point3D::new(1.0 + 1e-5, 2.0, 3.0));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(welder.len(), 2);
    }

    #[test]
    fn test_weld_across_cell_boundary() {
        // Straddles the x = 0 cell boundary
        let mut welder = PointWelder::new(1e-3);
        let a = welder.insert(Point3D::new(-1e-4, 0.0, 0.0));
        let b = welder.insert(Point3D::new(1e-4, 0.0, 0.0));
        assert_eq!(a, b);
    }

    #[test]
    fn test_find_prefers_nearest() {
        let mut welder = PointWelder::new(1.0);
        welder.insert(Point3D::new(0.0, 0.0, 0.0));
        let far = welder.insert(Point3D::new(1.5, 0.0, 0.0));
        assert_eq!(welder.find(&Point3D::new(1.2, 0.0, 0.0)), Some(far));
        assert_eq!(welder.find(&Point3D::new(5.0, 0.0, 0.0)), None);
    }

    #[test]
    fn test_bad_tolerance_falls_back() {
        let welder = PointWelder::new(f64::NAN);
        assert_eq!(welder.tolerance(), EPSILON);
        assert!(welder.is_empty());
    }
}
