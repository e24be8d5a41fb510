//! Triangles that index into a shared, immutable point arena

use std::sync::Arc;

use crate::error::{GeometryError, Result};
use crate::token::next_token;
use crate::triangle::Triangle;
use crate::types::{Point3D, Vector3D};

/// Shared point storage for one batch of triangles
///
/// The arena is immutable for the lifetime of the batch. Operations that
/// create points build a fresh arena and re-index the whole batch.
pub type PointArena = Arc<[Point3D]>;

/// A triangle stored as three indices into a [`PointArena`]
///
/// All triangles from one construction share the same arena instance, so
/// vertex identity is plain integer equality on the indices.
#[derive(Debug, Clone)]
pub struct IndexedTriangle {
    indices: [usize; 3],
    points: PointArena,
    token: u64,
}

impl IndexedTriangle {
    /// Create a triangle over `points`
    ///
    /// # Panics
    /// Panics if an index is out of bounds for the arena.
    pub fn new(index0: usize, index1: usize, index2: usize, points: PointArena) -> Self {
        assert!(
            index0 < points.len() && index1 < points.len() && index2 < points.len(),
            "triangle index out of bounds for arena of {} points",
            points.len()
        );
        Self {
            indices: [index0, index1, index2],
            points,
            token: next_token(),
        }
    }

    /// Build a batch of triangles over one freshly allocated arena
    pub fn batch(points: Vec<Point3D>, faces: &[[usize; 3]]) -> Vec<IndexedTriangle> {
        let arena: PointArena = points.into();
        faces
            .iter()
            .map(|f| IndexedTriangle::new(f[0], f[1], f[2], arena.clone()))
            .collect()
    }

    pub fn indices(&self) -> [usize; 3] {
        self.indices
    }

    pub fn index0(&self) -> usize {
        self.indices[0]
    }

    pub fn index1(&self) -> usize {
        self.indices[1]
    }

    pub fn index2(&self) -> usize {
        self.indices[2]
    }

    /// The shared point arena
    pub fn all_points(&self) -> &PointArena {
        &self.points
    }

    /// Unique identity token assigned at construction
    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn point0(&self) -> Point3D {
        self.points[self.indices[0]]
    }

    pub fn point1(&self) -> Point3D {
        self.points[self.indices[1]]
    }

    pub fn point2(&self) -> Point3D {
        self.points[self.indices[2]]
    }

    /// Vertex by corner (0, 1 or 2)
    pub fn point(&self, corner: usize) -> Point3D {
        self.points[self.indices[corner % 3]]
    }

    /// Owned copy of the geometry
    pub fn to_triangle(&self) -> Triangle {
        Triangle::new(self.point0(), self.point1(), self.point2())
    }

    /// Not normalized, right-hand rule
    pub fn normal(&self) -> Vector3D {
        self.to_triangle().normal()
    }

    pub fn normal_unit(&self) -> Option<Vector3D> {
        self.to_triangle().normal_unit()
    }

    pub fn area(&self) -> f64 {
        self.to_triangle().area()
    }

    pub fn centroid(&self) -> Point3D {
        self.to_triangle().centroid()
    }

    /// Returns `true` if `index` is one of the three vertices
    pub fn contains_index(&self, index: usize) -> bool {
        self.indices.contains(&index)
    }

    /// Corner holding `index`, if any
    pub fn corner_of(&self, index: usize) -> Option<usize> {
        self.indices.iter().position(|&i| i == index)
    }

    /// Vertex pairs of the three edges: `(i0,i1)`, `(i1,i2)`, `(i2,i0)`
    pub fn edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.indices;
        [(a, b), (b, c), (c, a)]
    }

    /// Same vertices, opposite winding, same arena
    pub fn reversed(&self) -> IndexedTriangle {
        IndexedTriangle::new(
            self.indices[0],
            self.indices[2],
            self.indices[1],
            self.points.clone(),
        )
    }
}

/// Returns the arena shared by every triangle of a batch
///
/// `None` for an empty batch; fails if the triangles are spread over more
/// than one arena.
pub fn same_arena(triangles: &[IndexedTriangle]) -> Result<Option<PointArena>> {
    let Some(first) = triangles.first() else {
        return Ok(None);
    };
    let arena = first.all_points().clone();
    if triangles
        .iter()
        .all(|t| Arc::ptr_eq(t.all_points(), &arena))
    {
        Ok(Some(arena))
    } else {
        Err(GeometryError::MixedPointArenas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_points() -> Vec<Point3D> {
        vec![
            Point3D::new(0.0, 0.0, 0.0),
            Point3D::new(1.0, 0.0, 0.0),
            Point3D::new(0.0, 1.0, 0.0),
            Point3D::new(0.0, 0.0, 1.0),
        ]
    }

    #[test]
    fn test_batch_shares_arena() {
        let tris = IndexedTriangle::batch(sample_points(), &[[0, 1, 2], [0, 3, 1]]);
        assert!(Arc::ptr_eq(tris[0].all_points(), tris[1].all_points()));
        assert!(same_arena(&tris).unwrap().is_some());
        assert_ne!(tris[0].token(), tris[1].token());
    }

    #[test]
    fn test_mixed_arenas_rejected() {
        let a = IndexedTriangle::batch(sample_points(), &[[0, 1, 2]]);
        let b = IndexedTriangle::batch(sample_points(), &[[0, 1, 3]]);
        let mixed = vec![a[0].clone(), b[0].clone()];
        assert!(matches!(
            same_arena(&mixed),
            Err(GeometryError::MixedPointArenas)
        ));
        assert!(same_arena(&[]).unwrap().is_none());
    }

    #[test]
    fn test_geometry_accessors() {
        let tris = IndexedTriangle::batch(sample_points(), &[[0, 1, 2]]);
        let t = &tris[0];
        assert_eq!(t.normal(), Vector3D::new(0.0, 0.0, 1.0));
        assert_eq!(t.corner_of(2), Some(2));
        assert_eq!(t.corner_of(3), None);
        assert_eq!(t.edges(), [(0, 1), (1, 2), (2, 0)]);
        assert_eq!(t.reversed().normal(), Vector3D::new(0.0, 0.0, -1.0));
    }

    #[test]
    #[should_panic]
    fn test_out_of_bounds_index_panics() {
        let _ = IndexedTriangle::batch(sample_points(), &[[0, 1, 9]]);
    }
}
