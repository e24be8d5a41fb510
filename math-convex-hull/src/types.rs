//! Hull result types

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use math_geometry::{
    IndexedTriangle, Point3D, PointArena, TriangleTopology, relative_epsilon, same_arena,
};

use crate::{ConvexHullError, Result};

/// The result of a convex hull computation
///
/// `points` is the arena built from the input cloud (all input points, not
/// only the hull vertices). Every triangle indexes into it and has an
/// outward-facing normal.
#[derive(Debug, Clone)]
pub struct ConvexHull3D {
    points: PointArena,
    triangles: Vec<IndexedTriangle>,
}

/// Plain, serializable copy of a hull: points plus face index triples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HullMesh {
    pub points: Vec<Point3D>,
    pub faces: Vec<[usize; 3]>,
}

impl ConvexHull3D {
    /// Create a hull from triangles sharing one arena
    pub(crate) fn new(points: PointArena, triangles: Vec<IndexedTriangle>) -> Self {
        Self { points, triangles }
    }

    /// Wrap an existing triangle batch as a hull
    ///
    /// No convexity check is made; the batch must share one arena.
    pub fn from_triangles(triangles: Vec<IndexedTriangle>) -> Result<Self> {
        let points = same_arena(&triangles)?
            .ok_or_else(|| ConvexHullError::InvalidFace("empty triangle batch".to_string()))?;
        Ok(Self { points, triangles })
    }

    /// Rebuild a hull from its plain form, validating face indices
    pub fn from_mesh(mesh: &HullMesh) -> Result<Self> {
        let n = mesh.points.len();
        if let Some(bad) = mesh.faces.iter().find(|f| f.iter().any(|&i| i >= n)) {
            return Err(ConvexHullError::InvalidFace(format!(
                "face {:?} references a point outside 0..{}",
                bad, n
            )));
        }
        let points: PointArena = mesh.points.clone().into();
        let triangles = mesh
            .faces
            .iter()
            .map(|f| IndexedTriangle::new(f[0], f[1], f[2], points.clone()))
            .collect();
        Ok(Self { points, triangles })
    }

    /// Build a hull, treating an empty result as a degenerate cloud
    pub fn build(points: &[Point3D]) -> Result<Self> {
        crate::quickhull::get_convex_hull(points)?.ok_or(ConvexHullError::DegenerateConfiguration)
    }

    /// The shared point arena
    pub fn points(&self) -> &PointArena {
        &self.points
    }

    /// Hull triangles
    pub fn triangles(&self) -> &[IndexedTriangle] {
        &self.triangles
    }

    pub fn into_triangles(self) -> Vec<IndexedTriangle> {
        self.triangles
    }

    /// Face index triples
    pub fn faces(&self) -> Vec<[usize; 3]> {
        self.triangles.iter().map(|t| t.indices()).collect()
    }

    /// Get the number of faces
    pub fn num_faces(&self) -> usize {
        self.triangles.len()
    }

    /// Number of distinct points used as hull vertices
    pub fn num_vertices(&self) -> usize {
        self.used_point_indices().len()
    }

    /// Sorted arena indices of the hull vertices
    pub fn used_point_indices(&self) -> Vec<usize> {
        let set: BTreeSet<usize> = self
            .triangles
            .iter()
            .flat_map(|t| t.indices())
            .collect();
        set.into_iter().collect()
    }

    /// Hull vertices, in arena order
    pub fn used_points(&self) -> Vec<Point3D> {
        self.used_point_indices()
            .into_iter()
            .map(|i| self.points[i])
            .collect()
    }

    /// Compute the volume of the convex hull
    pub fn volume(&self) -> f64 {
        let Some(reference) = self.triangles.first().map(|t| t.point0()) else {
            return 0.0;
        };
        let mut volume = 0.0;

        for t in &self.triangles {
            // Volume of tetrahedron formed by the reference point and face
            let a = t.point0() - reference;
            let b = t.point1() - reference;
            let c = t.point2() - reference;
            volume += a.dot(&b.cross(&c)) / 6.0;
        }

        volume.abs()
    }

    /// Compute the surface area of the convex hull
    pub fn surface_area(&self) -> f64 {
        self.triangles.iter().map(|t| t.area()).sum()
    }

    /// Neighbor table of the hull faces (slot `i` is triangle `i`)
    pub fn topology(&self) -> TriangleTopology {
        TriangleTopology::from_faces(&self.faces())
    }

    /// Returns `true` if every edge is shared by exactly two faces
    pub fn is_closed(&self) -> bool {
        let topology = self.topology();
        topology.is_closed() && topology.is_symmetric()
    }

    /// Returns `true` if `point` is inside or on the hull
    pub fn contains_point(&self, point: &Point3D) -> bool {
        let eps = relative_epsilon(&self.points);
        self.triangles
            .iter()
            .all(|t| t.to_triangle().distance_from_plane(point) <= eps)
    }

    /// Plain copy with the arena compacted to the hull vertices
    pub fn to_mesh(&self) -> HullMesh {
        let used = self.used_point_indices();
        let mut remap = vec![usize::MAX; self.points.len()];
        for (new, &old) in used.iter().enumerate() {
            remap[old] = new;
        }
        HullMesh {
            points: used.iter().map(|&i| self.points[i]).collect(),
            faces: self
                .triangles
                .iter()
                .map(|t| {
                    let [a, b, c] = t.indices();
                    [remap[a], remap[b], remap[c]]
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_tetra() -> ConvexHull3D {
        let points = vec![
            Point3D::new(0.0, 0.0, 0.0),
            Point3D::new(1.0, 0.0, 0.0),
            Point3D::new(0.0, 1.0, 0.0),
            Point3D::new(0.0, 0.0, 1.0),
            Point3D::new(0.1, 0.1, 0.1),
        ];
        let tris = IndexedTriangle::batch(points, &[[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]]);
        ConvexHull3D::from_triangles(tris).unwrap()
    }

    #[test]
    fn test_measures() {
        let hull = unit_tetra();
        assert_relative_eq!(hull.volume(), 1.0 / 6.0, epsilon = 1e-12);
        assert_relative_eq!(
            hull.surface_area(),
            1.5 + 3.0_f64.sqrt() / 2.0,
            epsilon = 1e-12
        );
        assert!(hull.is_closed());
        assert_eq!(hull.used_point_indices(), vec![0, 1, 2, 3]);
        assert_eq!(hull.num_vertices(), 4);
    }

    #[test]
    fn test_contains_point() {
        let hull = unit_tetra();
        assert!(hull.contains_point(&Point3D::new(0.1, 0.1, 0.1)));
        assert!(hull.contains_point(&Point3D::new(0.0, 0.0, 0.0)));
        assert!(!hull.contains_point(&Point3D::new(1.0, 1.0, 1.0)));
    }

    #[test]
    fn test_mesh_compacts_arena() {
        let mesh = unit_tetra().to_mesh();
        assert_eq!(mesh.points.len(), 4);
        assert!(mesh.faces.iter().all(|f| f.iter().all(|&i| i < 4)));
        let back = ConvexHull3D::from_mesh(&mesh).unwrap();
        assert_eq!(back.num_faces(), 4);
    }

    #[test]
    fn test_from_mesh_rejects_bad_index() {
        let mesh = HullMesh {
            points: vec![Point3D::origin(); 3],
            faces: vec![[0, 1, 5]],
        };
        assert!(matches!(
            ConvexHull3D::from_mesh(&mesh),
            Err(ConvexHullError::InvalidFace(_))
        ));
    }
}
