//! Voronoi edges: bounded segments, rays and full lines

use serde::{Deserialize, Serialize};

use math_geometry::intersect::{
    closest_point_line_point, closest_point_ray_point, closest_point_segment_point,
};
use math_geometry::{Point3D, PointArena, Vector3D, next_token};

/// Shape of an edge; the tag decides which accessors return values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EdgeKind {
    /// Bounded, between two edge points
    Segment { index1: usize },
    /// From an edge point to infinity along `direction` (unit length)
    Ray { direction: Vector3D },
    /// Infinite both ways through an edge point
    Line { direction: Vector3D },
}

/// An edge of the Voronoi diagram over the shared edge-point arena
#[derive(Debug, Clone)]
pub struct Edge3D {
    index0: usize,
    kind: EdgeKind,
    points: PointArena,
    token: u64,
}

impl Edge3D {
    pub fn segment(index0: usize, index1: usize, points: PointArena) -> Self {
        Self::with_kind(index0, EdgeKind::Segment { index1 }, points)
    }

    /// `None` for a zero direction
    pub fn ray(index0: usize, direction: Vector3D, points: PointArena) -> Option<Self> {
        let direction = direction.normalize()?;
        Some(Self::with_kind(index0, EdgeKind::Ray { direction }, points))
    }

    /// `None` for a zero direction
    pub fn line(index0: usize, direction: Vector3D, points: PointArena) -> Option<Self> {
        let direction = direction.normalize()?;
        Some(Self::with_kind(index0, EdgeKind::Line { direction }, points))
    }

    fn with_kind(index0: usize, kind: EdgeKind, points: PointArena) -> Self {
        Self {
            index0,
            kind,
            points,
            token: next_token(),
        }
    }

    pub fn kind(&self) -> EdgeKind {
        self.kind
    }

    pub fn index0(&self) -> usize {
        self.index0
    }

    /// Second endpoint index, segments only
    pub fn index1(&self) -> Option<usize> {
        match self.kind {
            EdgeKind::Segment { index1 } => Some(index1),
            _ => None,
        }
    }

    pub fn all_points(&self) -> &PointArena {
        &self.points
    }

    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn point0(&self) -> Point3D {
        self.points[self.index0]
    }

    /// Second endpoint, segments only
    pub fn point1(&self) -> Option<Point3D> {
        self.index1().map(|i| self.points[i])
    }

    pub fn is_segment(&self) -> bool {
        matches!(self.kind, EdgeKind::Segment { .. })
    }

    pub fn is_ray(&self) -> bool {
        matches!(self.kind, EdgeKind::Ray { .. })
    }

    pub fn is_line(&self) -> bool {
        matches!(self.kind, EdgeKind::Line { .. })
    }

    /// Unit direction; for a segment, from `point0` toward `point1`
    pub fn direction(&self) -> Option<Vector3D> {
        match self.kind {
            EdgeKind::Segment { index1 } => (self.points[index1] - self.point0()).normalize(),
            EdgeKind::Ray { direction } | EdgeKind::Line { direction } => Some(direction),
        }
    }

    /// Length of a segment, `None` for unbounded edges
    pub fn length(&self) -> Option<f64> {
        self.point1().map(|p1| self.point0().distance(&p1))
    }

    /// Returns `true` if `index` is an endpoint
    pub fn touches(&self, index: usize) -> bool {
        self.index0 == index || self.index1() == Some(index)
    }

    /// Point on the edge nearest to `test`
    pub fn closest_point(&self, test: &Point3D) -> Point3D {
        let p0 = self.point0();
        match self.kind {
            EdgeKind::Segment { index1 } => {
                closest_point_segment_point(&p0, &self.points[index1], test)
            }
            EdgeKind::Ray { direction } => {
                closest_point_ray_point(&p0, &direction, test).unwrap_or(p0)
            }
            EdgeKind::Line { direction } => {
                closest_point_line_point(&p0, &direction, test).unwrap_or(p0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn arena() -> PointArena {
        vec![Point3D::new(0.0, 0.0, 0.0), Point3D::new(2.0, 0.0, 0.0)].into()
    }

    #[test]
    fn test_segment_accessors() {
        let e = Edge3D::segment(0, 1, arena());
        assert!(e.is_segment());
        assert_eq!(e.point1(), Some(Point3D::new(2.0, 0.0, 0.0)));
        assert_relative_eq!(e.length().unwrap(), 2.0);
        assert!(e.touches(1));
        let c = e.closest_point(&Point3D::new(5.0, 1.0, 0.0));
        assert_relative_eq!(c.x, 2.0);
    }

    #[test]
    fn test_ray_has_no_second_point() {
        let e = Edge3D::ray(1, Vector3D::new(0.0, 3.0, 0.0), arena()).unwrap();
        assert!(e.is_ray());
        assert_eq!(e.point1(), None);
        assert_eq!(e.length(), None);
        assert_relative_eq!(e.direction().unwrap().y, 1.0);

        // Behind the origin clamps to the origin
        let c = e.closest_point(&Point3D::new(2.0, -4.0, 0.0));
        assert_relative_eq!(c.distance(&Point3D::new(2.0, 0.0, 0.0)), 0.0);
    }

    #[test]
    fn test_line_extends_both_ways() {
        let e = Edge3D::line(0, Vector3D::new(0.0, 0.0, 1.0), arena()).unwrap();
        assert!(e.is_line());
        let c = e.closest_point(&Point3D::new(1.0, 0.0, -3.0));
        assert_relative_eq!(c.z, -3.0);
        assert!(Edge3D::line(0, Vector3D::zero(), arena()).is_none());
    }

    #[test]
    fn test_tokens_differ() {
        let a = Edge3D::segment(0, 1, arena());
        let b = Edge3D::segment(0, 1, arena());
        assert_ne!(a.token(), b.token());
    }
}
