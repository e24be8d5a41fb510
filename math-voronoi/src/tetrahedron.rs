//! Tetrahedra over a shared point arena, with face-to-face neighbor links

use std::collections::HashMap;

use math_geometry::{
    Circumsphere, IndexedTriangle, Point3D, PointArena, next_token, tetrahedron_circumsphere,
};

use crate::{Result, VoronoiError};

/// Corners of face `k`, which is the face opposite vertex `k`
///
/// For a positively oriented tetrahedron each face winds so that its
/// right-hand normal points away from the opposite vertex.
pub const FACE_VERTICES: [[usize; 3]; 4] = [[1, 2, 3], [0, 3, 2], [0, 1, 3], [0, 2, 1]];

/// Signed volume times six of `(a, b, c, d)`
///
/// Positive when `d` lies on the side the right-hand normal of triangle
/// `(a, b, c)` points to.
#[inline]
pub fn orientation(a: &Point3D, b: &Point3D, c: &Point3D, d: &Point3D) -> f64 {
    (*b - *a).cross(&(*c - *a)).dot(&(*d - *a))
}

/// One Delaunay tetrahedron
///
/// Vertices are indices into the control-point arena. Face `k` is opposite
/// vertex `k` and its normal points outward; neighbor `k` is the tetrahedron
/// across that face, or `None` on the convex-hull boundary.
#[derive(Debug, Clone)]
pub struct Tetrahedron {
    indices: [usize; 4],
    faces: [IndexedTriangle; 4],
    neighbors: [Option<usize>; 4],
    token: u64,
}

impl Tetrahedron {
    /// Build a tetrahedron, flipping it to positive orientation if needed
    pub fn new(indices: [usize; 4], points: PointArena) -> Self {
        let mut indices = indices;
        let [a, b, c, d] = indices.map(|i| points[i]);
        if orientation(&a, &b, &c, &d) < 0.0 {
            indices.swap(1, 2);
        }
        let faces = FACE_VERTICES.map(|[i, j, k]| {
            IndexedTriangle::new(indices[i], indices[j], indices[k], points.clone())
        });
        Self {
            indices,
            faces,
            neighbors: [None; 4],
            token: next_token(),
        }
    }

    pub fn indices(&self) -> [usize; 4] {
        self.indices
    }

    pub fn index(&self, corner: usize) -> usize {
        self.indices[corner % 4]
    }

    /// The shared control-point arena
    pub fn all_points(&self) -> &PointArena {
        self.faces[0].all_points()
    }

    pub fn point(&self, corner: usize) -> Point3D {
        self.all_points()[self.index(corner)]
    }

    pub fn points(&self) -> [Point3D; 4] {
        self.indices.map(|i| self.all_points()[i])
    }

    /// Outward-facing triangles, face `k` opposite vertex `k`
    pub fn faces(&self) -> &[IndexedTriangle; 4] {
        &self.faces
    }

    pub fn face(&self, slot: usize) -> &IndexedTriangle {
        &self.faces[slot % 4]
    }

    pub fn neighbors(&self) -> [Option<usize>; 4] {
        self.neighbors
    }

    pub fn neighbor(&self, slot: usize) -> Option<usize> {
        self.neighbors[slot % 4]
    }

    /// Face slot shared with tetrahedron `neighbor`
    pub fn slot_of_neighbor(&self, neighbor: usize) -> Option<usize> {
        self.neighbors.iter().position(|&n| n == Some(neighbor))
    }

    /// Returns `true` if face `slot` lies on the convex hull of the cloud
    pub fn is_boundary_face(&self, slot: usize) -> bool {
        self.neighbor(slot).is_none()
    }

    pub fn token(&self) -> u64 {
        self.token
    }

    /// `None` for a flat tetrahedron
    pub fn circumsphere(&self) -> Option<Circumsphere> {
        let [a, b, c, d] = self.points();
        tetrahedron_circumsphere(&a, &b, &c, &d)
    }

    pub fn centroid(&self) -> Point3D {
        let [a, b, c, d] = self.points();
        let sum = a.to_vector() + b.to_vector() + c.to_vector() + d.to_vector();
        Point3D::origin() + sum / 4.0
    }

    pub fn volume(&self) -> f64 {
        let [a, b, c, d] = self.points();
        orientation(&a, &b, &c, &d).abs() / 6.0
    }

    pub fn contains_index(&self, index: usize) -> bool {
        self.indices.contains(&index)
    }

    /// Face slot opposite control point `index`
    pub fn slot_opposite(&self, index: usize) -> Option<usize> {
        self.indices.iter().position(|&i| i == index)
    }

    /// Sorted vertex triple of face `slot`
    pub fn face_key(&self, slot: usize) -> [usize; 3] {
        let mut key = self.faces[slot % 4].indices();
        key.sort_unstable();
        key
    }
}

/// Link every pair of tetrahedra sharing a vertex triple
///
/// Existing links are discarded. A triple shared by more than two
/// tetrahedra means the set is not a valid tetrahedralization.
pub fn link_tetrahedra(tetrahedra: &mut [Tetrahedron]) -> Result<()> {
    let mut by_face: HashMap<[usize; 3], Vec<(usize, usize)>> =
        HashMap::with_capacity(tetrahedra.len() * 2);
    for (t, tet) in tetrahedra.iter().enumerate() {
        for slot in 0..4 {
            by_face.entry(tet.face_key(slot)).or_default().push((t, slot));
        }
    }

    for tet in tetrahedra.iter_mut() {
        tet.neighbors = [None; 4];
    }
    for (key, sharing) in by_face {
        match sharing.as_slice() {
            [_] => {}
            [(t, slot), (u, other_slot)] => {
                tetrahedra[*t].neighbors[*slot] = Some(*u);
                tetrahedra[*u].neighbors[*other_slot] = Some(*t);
            }
            _ => {
                return Err(VoronoiError::Internal(format!(
                    "face {:?} is shared by {} tetrahedra",
                    key,
                    sharing.len()
                )));
            }
        }
    }
    Ok(())
}
