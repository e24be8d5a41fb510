//! Triangle defined by three owned points, doubling as a plane

use serde::{Deserialize, Serialize};

use crate::math::EPSILON;
use crate::types::{Point3D, Vector3D};

/// A triangle given by three points
///
/// Also the workspace's plane representation: the plane through the three
/// points, with the side the (right-hand rule) normal points to being
/// "outside". Callers pick the vertex order to choose that side. The points
/// must not be collinear for the plane-derived quantities to be meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub point0: Point3D,
    pub point1: Point3D,
    pub point2: Point3D,
}

impl Triangle {
    pub const fn new(point0: Point3D, point1: Point3D, point2: Point3D) -> Self {
        Self {
            point0,
            point1,
            point2,
        }
    }

    /// Plane through `point` with the given normal
    ///
    /// Builds two in-plane points from a perpendicular basis so that the
    /// resulting normal points along `normal`. `None` for a zero normal.
    pub fn from_point_normal(point: Point3D, normal: Vector3D) -> Option<Self> {
        let n = normal.normalize()?;
        let u = n.any_perpendicular()?;
        let v = n.cross(&u);
        Some(Self::new(point, point + u, point + v))
    }

    /// Vertices as an array
    pub fn points(&self) -> [Point3D; 3] {
        [self.point0, self.point1, self.point2]
    }

    /// Vertex by index (0, 1 or 2)
    pub fn point(&self, index: usize) -> Point3D {
        match index {
            0 => self.point0,
            1 => self.point1,
            _ => self.point2,
        }
    }

    /// `(point1 - point0) × (point2 - point0)`, not normalized
    pub fn normal(&self) -> Vector3D {
        (self.point1 - self.point0).cross(&(self.point2 - self.point0))
    }

    /// Unit normal, `None` for collinear points
    pub fn normal_unit(&self) -> Option<Vector3D> {
        self.normal().normalize()
    }

    /// Triangle area
    pub fn area(&self) -> f64 {
        self.normal().length() * 0.5
    }

    /// Returns `true` if the three points are (nearly) collinear
    pub fn is_degenerate(&self) -> bool {
        self.normal_unit().is_none()
    }

    pub fn centroid(&self) -> Point3D {
        Point3D::new(
            (self.point0.x + self.point1.x + self.point2.x) / 3.0,
            (self.point0.y + self.point1.y + self.point2.y) / 3.0,
            (self.point0.z + self.point1.z + self.point2.z) / 3.0,
        )
    }

    /// Same triangle with opposite winding (flipped normal)
    pub fn reversed(&self) -> Triangle {
        Triangle::new(self.point0, self.point2, self.point1)
    }

    /// Edge lengths `[|p0p1|, |p1p2|, |p2p0|]`
    pub fn edge_lengths(&self) -> [f64; 3] {
        [
            self.point0.distance(&self.point1),
            self.point1.distance(&self.point2),
            self.point2.distance(&self.point0),
        ]
    }

    /// Signed distance from the plane (positive on the normal side)
    ///
    /// Returns 0 for a degenerate triangle.
    pub fn distance_from_plane(&self, point: &Point3D) -> f64 {
        match self.normal_unit() {
            Some(n) => n.dot(&(*point - self.point0)),
            None => 0.0,
        }
    }

    /// Signed distance of the plane from the origin along the unit normal
    ///
    /// The `d` of `n·x = d`. Returns 0 for a degenerate triangle.
    pub fn distance_from_origin(&self) -> f64 {
        match self.normal_unit() {
            Some(n) => n.dot(&self.point0.to_vector()),
            None => 0.0,
        }
    }

    /// Returns `true` if `point` is strictly on the normal side of the plane
    pub fn is_above(&self, point: &Point3D, epsilon: f64) -> bool {
        self.distance_from_plane(point) > epsilon
    }

    /// Returns `true` if `point` lies in the plane within `EPSILON`
    pub fn is_coplanar(&self, point: &Point3D) -> bool {
        self.distance_from_plane(point).abs() <= EPSILON
    }

    /// Orthogonal projection of a point onto the plane
    pub fn project_point(&self, point: &Point3D) -> Point3D {
        match self.normal_unit() {
            Some(n) => *point - n * n.dot(&(*point - self.point0)),
            None => *point,
        }
    }
}
