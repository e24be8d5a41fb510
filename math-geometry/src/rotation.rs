//! Unit quaternions for rotating directions onto each other

use crate::math::EPSILON;
use crate::types::{Point3D, Vector3D};

/// Unit quaternion `w + xi + yj + zk`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}

impl Quaternion {
    pub const fn identity() -> Self {
        Self {
            w: 1.0,
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    /// Rotation of `angle` radians about `axis`, `None` for a zero axis
    pub fn from_axis_angle(axis: &Vector3D, angle: f64) -> Option<Self> {
        let axis = axis.normalize()?;
        let (s, c) = (angle * 0.5).sin_cos();
        Some(Self {
            w: c,
            x: axis.x * s,
            y: axis.y * s,
            z: axis.z * s,
        })
    }

    /// Shortest rotation taking the direction of `from` onto `to`
    ///
    /// Parallel directions give the identity; opposite directions give a half
    /// turn about an arbitrary perpendicular axis. A zero input also yields
    /// the identity.
    pub fn between(from: &Vector3D, to: &Vector3D) -> Self {
        let (Some(a), Some(b)) = (from.normalize(), to.normalize()) else {
            return Self::identity();
        };
        let dot = a.dot(&b);
        if dot >= 1.0 - EPSILON {
            return Self::identity();
        }
        if dot <= -1.0 + EPSILON {
            return match a.any_perpendicular() {
                Some(axis) => Self {
                    w: 0.0,
                    x: axis.x,
                    y: axis.y,
                    z: axis.z,
                },
                None => Self::identity(),
            };
        }
        let axis = a.cross(&b);
        Self {
            w: 1.0 + dot,
            x: axis.x,
            y: axis.y,
            z: axis.z,
        }
        .normalized()
    }

    pub fn norm(&self) -> f64 {
        (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    fn normalized(self) -> Self {
        let n = self.norm();
        if n <= EPSILON {
            return Self::identity();
        }
        Self {
            w: self.w / n,
            x: self.x / n,
            y: self.y / n,
            z: self.z / n,
        }
    }

    pub fn conjugate(&self) -> Self {
        Self {
            w: self.w,
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }

    /// Hamilton product `self * other` (apply `other` first)
    pub fn then(&self, other: &Quaternion) -> Quaternion {
        Quaternion {
            w: self.w * other.w - self.x * other.x - self.y * other.y - self.z * other.z,
            x: self.w * other.x + self.x * other.w + self.y * other.z - self.z * other.y,
            y: self.w * other.y - self.x * other.z + self.y * other.w + self.z * other.x,
            z: self.w * other.z + self.x * other.y - self.y * other.x + self.z * other.w,
        }
    }

    /// Rotation angle in radians, in `[0, π]`
    pub fn angle(&self) -> f64 {
        2.0 * self.w.abs().clamp(0.0, 1.0).acos()
    }

    /// Rotate a vector
    pub fn rotate(&self, v: &Vector3D) -> Vector3D {
        let q = Vector3D::new(self.x, self.y, self.z);
        let t = q.cross(v) * 2.0;
        *v + t * self.w + q.cross(&t)
    }

    /// Rotate a point about `center`
    pub fn rotate_point(&self, point: &Point3D, center: &Point3D) -> Point3D {
        *center + self.rotate(&(*point - *center))
    }
}
