//! Core value types: points, vectors and 2D points

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use crate::math::EPSILON;

/// A location in 3D space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// A displacement or direction in 3D space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// A location in a 2D plane (used after projecting onto a cutting plane)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point3D {
    /// Create a new point
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The origin
    pub const fn origin() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Create a point from spherical coordinates (azimuth, elevation in radians, radius)
    pub fn from_spherical(azimuth: f64, elevation: f64, radius: f64) -> Self {
        Self {
            x: radius * elevation.cos() * azimuth.cos(),
            y: radius * elevation.cos() * azimuth.sin(),
            z: radius * elevation.sin(),
        }
    }

    /// Position vector (displacement from the origin)
    pub fn to_vector(self) -> Vector3D {
        Vector3D::new(self.x, self.y, self.z)
    }

    /// Coordinates as an array
    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Distance to another point
    pub fn distance(&self, other: &Point3D) -> f64 {
        (*self - *other).length()
    }

    /// Squared distance to another point
    pub fn distance_squared(&self, other: &Point3D) -> f64 {
        (*self - *other).length_squared()
    }

    /// Midpoint between two points
    pub fn midpoint(&self, other: &Point3D) -> Point3D {
        Point3D::new(
            (self.x + other.x) * 0.5,
            (self.y + other.y) * 0.5,
            (self.z + other.z) * 0.5,
        )
    }

    /// Linear interpolation: `self + t * (other - self)`
    pub fn lerp(&self, other: &Point3D, t: f64) -> Point3D {
        *self + (*other - *self) * t
    }

    /// Average of a set of points, `None` when empty
    pub fn centroid(points: &[Point3D]) -> Option<Point3D> {
        if points.is_empty() {
            return None;
        }
        let sum = points
            .iter()
            .fold(Vector3D::zero(), |acc, p| acc + p.to_vector());
        Some(Point3D::origin() + sum / points.len() as f64)
    }

    /// Returns `true` if every coordinate is finite
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Coordinate by axis (0 = x, 1 = y, otherwise z)
    pub fn axis(&self, axis: usize) -> f64 {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }
}

impl Vector3D {
    /// Create a new vector
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The zero vector
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub const fn unit_x() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    pub const fn unit_y() -> Self {
        Self::new(0.0, 1.0, 0.0)
    }

    pub const fn unit_z() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }

    /// Dot product
    pub fn dot(&self, other: &Vector3D) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product (right-hand rule)
    pub fn cross(&self, other: &Vector3D) -> Vector3D {
        Vector3D {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Magnitude
    pub fn length(&self) -> f64 {
        self.length_squared().sqrt()
    }

    /// Squared magnitude
    pub fn length_squared(&self) -> f64 {
        self.dot(self)
    }

    /// Unit vector in the same direction, `None` for a (near) zero vector
    pub fn normalize(&self) -> Option<Vector3D> {
        let len = self.length();
        if len > EPSILON && len.is_finite() {
            Some(*self / len)
        } else {
            None
        }
    }

    /// Returns `true` if every component is finite
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Any unit vector perpendicular to this one
    ///
    /// Crosses with the world axis least aligned with `self`. Returns `None`
    /// for a zero vector.
    pub fn any_perpendicular(&self) -> Option<Vector3D> {
        let ax = self.x.abs();
        let ay = self.y.abs();
        let az = self.z.abs();
        let helper = if ax <= ay && ax <= az {
            Vector3D::unit_x()
        } else if ay <= az {
            Vector3D::unit_y()
        } else {
            Vector3D::unit_z()
        };
        self.cross(&helper).normalize()
    }

    /// Angle to another vector in radians (0 for zero vectors)
    pub fn angle_to(&self, other: &Vector3D) -> f64 {
        let denom = self.length() * other.length();
        if denom <= EPSILON {
            return 0.0;
        }
        (self.dot(other) / denom).clamp(-1.0, 1.0).acos()
    }

    /// Component of `self` perpendicular to the (not necessarily unit) `axis`
    pub fn reject_from(&self, axis: &Vector3D) -> Vector3D {
        let len2 = axis.length_squared();
        if len2 <= EPSILON * EPSILON {
            return *self;
        }
        *self - *axis * (self.dot(axis) / len2)
    }

    /// Coordinate by axis (0 = x, 1 = y, otherwise z)
    pub fn axis(&self, axis: usize) -> f64 {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }
}

impl Point2D {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// 2D cross product of `(a - self)` and `(b - self)`
    pub fn cross(&self, a: &Point2D, b: &Point2D) -> f64 {
        (a.x - self.x) * (b.y - self.y) - (a.y - self.y) * (b.x - self.x)
    }

    pub fn distance(&self, other: &Point2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

impl fmt::Display for Point3D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6}, {:.6})", self.x, self.y, self.z)
    }
}

impl fmt::Display for Vector3D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{:.6}, {:.6}, {:.6}>", self.x, self.y, self.z)
    }
}

impl Sub for Point3D {
    type Output = Vector3D;
    fn sub(self, other: Point3D) -> Vector3D {
        Vector3D::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Add<Vector3D> for Point3D {
    type Output = Point3D;
    fn add(self, v: Vector3D) -> Point3D {
        Point3D::new(self.x + v.x, self.y + v.y, self.z + v.z)
    }
}

impl Sub<Vector3D> for Point3D {
    type Output = Point3D;
    fn sub(self, v: Vector3D) -> Point3D {
        Point3D::new(self.x - v.x, self.y - v.y, self.z - v.z)
    }
}

impl AddAssign<Vector3D> for Point3D {
    fn add_assign(&mut self, v: Vector3D) {
        self.x += v.x;
        self.y += v.y;
        self.z += v.z;
    }
}

impl Add for Vector3D {
    type Output = Vector3D;
    fn add(self, other: Vector3D) -> Vector3D {
        Vector3D::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Vector3D {
    type Output = Vector3D;
    fn sub(self, other: Vector3D) -> Vector3D {
        Vector3D::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl AddAssign for Vector3D {
    fn add_assign(&mut self, other: Vector3D) {
        self.x += other.x;
        self.y += other.y;
        self.z += other.z;
    }
}

impl SubAssign for Vector3D {
    fn sub_assign(&mut self, other: Vector3D) {
        self.x -= other.x;
        self.y -= other.y;
        self.z -= other.z;
    }
}

impl Mul<f64> for Vector3D {
    type Output = Vector3D;
    fn mul(self, s: f64) -> Vector3D {
        Vector3D::new(self.x * s, self.y * s, self.z * s)
    }
}

impl Mul<Vector3D> for f64 {
    type Output = Vector3D;
    fn mul(self, v: Vector3D) -> Vector3D {
        v * self
    }
}

impl Div<f64> for Vector3D {
    type Output = Vector3D;
    fn div(self, s: f64) -> Vector3D {
        Vector3D::new(self.x / s, self.y / s, self.z / s)
    }
}

impl Neg for Vector3D {
    type Output = Vector3D;
    fn neg(self) -> Vector3D {
        Vector3D::new(-self.x, -self.y, -self.z)
    }
}

impl From<[f64; 3]> for Point3D {
    fn from(c: [f64; 3]) -> Self {
        Point3D::new(c[0], c[1], c[2])
    }
}

impl From<[f64; 3]> for Vector3D {
    fn from(c: [f64; 3]) -> Self {
        Vector3D::new(c[0], c[1], c[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_point_vector_arithmetic() {
        let a = Point3D::new(1.0, 2.0, 3.0);
        let b = Point3D::new(4.0, 6.0, 3.0);
        let d = b - a;
        assert_eq!(d, Vector3D::new(3.0, 4.0, 0.0));
        assert_relative_eq!(d.length(), 5.0);
        assert_eq!(a + d, b);
        assert_eq!(a.midpoint(&b), Point3D::new(2.5, 4.0, 3.0));
    }

    #[test]
    fn test_cross_right_hand_rule() {
        let z = Vector3D::unit_x().cross(&Vector3D::unit_y());
        assert_eq!(z, Vector3D::unit_z());
    }

    #[test]
    fn test_normalize_zero() {
        assert!(Vector3D::zero().normalize().is_none());
        let n = Vector3D::new(0.0, 3.0, 4.0).normalize().unwrap();
        assert_relative_eq!(n.length(), 1.0);
    }

    #[test]
    fn test_any_perpendicular() {
        for v in [
            Vector3D::unit_x(),
            Vector3D::new(1.0, 1.0, 1.0),
            Vector3D::new(0.0, -2.0, 0.1),
        ] {
            let p = v.any_perpendicular().unwrap();
            assert_relative_eq!(p.dot(&v), 0.0, epsilon = 1e-12);
            assert_relative_eq!(p.length(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_centroid() {
        let pts = [
            Point3D::new(0.0, 0.0, 0.0),
            Point3D::new(2.0, 0.0, 0.0),
            Point3D::new(0.0, 2.0, 2.0),
        ];
        let c = Point3D::centroid(&pts).unwrap();
        assert_relative_eq!(c.x, 2.0 / 3.0);
        assert!(Point3D::centroid(&[]).is_none());
    }
}
