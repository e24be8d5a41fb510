//! Voronoi faces and their reconstruction from rings of Delaunay cells
//!
//! The face separating control points `a` and `b` is dual to the Delaunay
//! edge `a–b`. Its vertices are the circumcenters of the tetrahedra around
//! that edge, in ring order. An interior edge gives a closed ring of
//! segments; an edge on the convex hull gives an open chain that starts and
//! ends with the rays of the two hull faces meeting at the edge.

use std::collections::{HashMap, HashSet};

use log::debug;
use math_geometry::{EdgeKey, Point3D, PointArena, Vector3D, next_token};

use crate::edge::Edge3D;
use crate::tetrahedron::Tetrahedron;
use crate::voronoi::VoronoiAnomaly;

/// Rays closer to parallel than this bound no area
const PARALLEL_RAYS: f64 = 1e-9;

/// Relative mismatch allowed between a vertex's distances to the two sites
const BISECTOR_TOLERANCE: f64 = 1e-6;

/// Closed faces below this fraction of the squared site distance are dropped
const COLLAPSED_AREA: f64 = 1e-12;

/// A planar polygon between two Voronoi cells
#[derive(Debug, Clone)]
pub struct Face {
    edges: Vec<usize>,
    control_points: [usize; 2],
    vertices: Vec<usize>,
    rays: Option<[Vector3D; 2]>,
    points: PointArena,
    bisector_point: Point3D,
    bisector_normal: Vector3D,
    token: u64,
}

impl Face {
    /// Edge indices in walk order
    pub fn edges(&self) -> &[usize] {
        &self.edges
    }

    /// The two control points this face separates
    pub fn control_points(&self) -> [usize; 2] {
        self.control_points
    }

    /// The control point across the face from `control`
    pub fn other_control_point(&self, control: usize) -> Option<usize> {
        match self.control_points {
            [a, b] if a == control => Some(b),
            [a, b] if b == control => Some(a),
            _ => None,
        }
    }

    /// Edge-point indices in walk order
    pub fn vertices(&self) -> &[usize] {
        &self.vertices
    }

    /// Edge-point coordinates in walk order
    pub fn points(&self) -> Vec<Point3D> {
        self.vertices.iter().map(|&i| self.points[i]).collect()
    }

    /// Directions of the rays leaving the first and last vertex of an open face
    pub fn rays(&self) -> Option<[Vector3D; 2]> {
        self.rays
    }

    /// Returns `true` if every edge is a segment
    pub fn is_closed(&self) -> bool {
        self.rays.is_none()
    }

    pub fn token(&self) -> u64 {
        self.token
    }

    /// Unit normal of the bisector plane, pointing from the first control
    /// point toward the second
    pub fn normal(&self) -> Vector3D {
        self.bisector_normal
    }

    /// Largest distance of a vertex from the bisector plane of the two cells
    pub fn plane_deviation(&self) -> f64 {
        self.vertices
            .iter()
            .map(|&i| (self.points[i] - self.bisector_point).dot(&self.bisector_normal).abs())
            .fold(0.0, f64::max)
    }

    /// Returns `true` if every vertex lies on the bisector plane and every
    /// ray runs along it, within `tolerance`
    pub fn is_planar(&self, tolerance: f64) -> bool {
        let rays_in_plane = self
            .rays
            .is_none_or(|r| r.iter().all(|d| d.dot(&self.bisector_normal).abs() <= tolerance));
        rays_in_plane && self.plane_deviation() <= tolerance
    }

    /// Area of a closed face, `None` for open faces
    pub fn area(&self) -> Option<f64> {
        if !self.is_closed() {
            return None;
        }
        let pts = self.points();
        let first = *pts.first()?;
        let mut sum = Vector3D::zero();
        for w in pts.windows(2).skip(1) {
            sum += (w[0] - first).cross(&(w[1] - first));
        }
        Some(sum.length() / 2.0)
    }
}

/// The two face slots of `tet` that contain both `a` and `b`
fn ring_slots(tet: &Tetrahedron, a: usize, b: usize) -> [usize; 2] {
    let mut slots = [0; 2];
    let mut n = 0;
    for slot in 0..4 {
        let v = tet.index(slot);
        if v != a && v != b && n < 2 {
            slots[n] = slot;
            n += 1;
        }
    }
    slots
}

/// Inputs shared by every face walk
pub(crate) struct FaceBuilder<'a> {
    pub tetrahedra: &'a [Tetrahedron],
    /// Edge point of each tetrahedron
    pub tet_point: &'a [usize],
    /// Voronoi edge crossing each tetrahedron face, if any
    pub face_edges: &'a [[Option<usize>; 4]],
    pub edges: &'a [Edge3D],
    pub control_points: &'a PointArena,
    pub edge_points: &'a PointArena,
}

impl FaceBuilder<'_> {
    /// One face per Delaunay edge, minus degenerate and duplicate claims
    pub fn build(&self) -> (Vec<Face>, Vec<VoronoiAnomaly>) {
        let mut rings: HashMap<EdgeKey, Vec<usize>> = HashMap::new();
        for (t, tet) in self.tetrahedra.iter().enumerate() {
            let v = tet.indices();
            for i in 0..4 {
                for j in (i + 1)..4 {
                    rings.entry(EdgeKey::new(v[i], v[j])).or_default().push(t);
                }
            }
        }
        let mut keys: Vec<EdgeKey> = rings.keys().copied().collect();
        keys.sort_unstable();

        let mut faces = Vec::with_capacity(keys.len());
        let mut anomalies = Vec::new();
        for key in keys {
            match self.walk(key, &rings[&key]) {
                Ok(Some(face)) => faces.push(face),
                Ok(None) => {}
                Err(anomaly) => anomalies.push(anomaly),
            }
        }

        let removed = remove_extra_claims(&mut faces, self.edges, self.control_points);
        if removed > 0 {
            debug!("Voronoi faces: removed {} duplicate claims", removed);
        }
        (faces, anomalies)
    }

    fn ray_direction(&self, edge: Option<usize>) -> Option<Vector3D> {
        let e = &self.edges[edge?];
        if e.is_ray() { e.direction() } else { None }
    }

    /// Walk the ring of tetrahedra around Delaunay edge `key`
    ///
    /// `Ok(None)` for a face that collapses to no area. A face with a vertex
    /// off the bisector of its two sites is reported as an anomaly.
    fn walk(&self, key: EdgeKey, ring: &[usize]) -> Result<Option<Face>, VoronoiAnomaly> {
        let EdgeKey(a, b) = key;
        let tets = self.tetrahedra;
        let stuck = || VoronoiAnomaly::BrokenFaceRing { control_points: [a, b] };

        // Start at a hull face if the edge has one
        let hull_start = ring.iter().find_map(|&t| {
            ring_slots(&tets[t], a, b)
                .into_iter()
                .find(|&s| tets[t].is_boundary_face(s))
                .map(|s| (t, s))
        });
        let open = hull_start.is_some();
        let (start, start_slot) =
            hull_start.unwrap_or((ring[0], ring_slots(&tets[ring[0]], a, b)[0]));

        let mut vertices: Vec<usize> = Vec::with_capacity(ring.len());
        let mut edges: Vec<usize> = Vec::with_capacity(ring.len() + 1);
        let mut first_ray = None;
        let mut last_ray = None;

        if open {
            let e = self.face_edges[start][start_slot];
            first_ray = Some(self.ray_direction(e).ok_or_else(stuck)?);
            edges.extend(e);
        }

        let (mut current, mut entry) = (start, start_slot);
        let mut finished = false;
        for _ in 0..=ring.len() {
            vertices.push(self.tet_point[current]);
            let [s0, s1] = ring_slots(&tets[current], a, b);
            let exit = if s0 == entry { s1 } else { s0 };
            let crossing = self.face_edges[current][exit];

            match tets[current].neighbor(exit) {
                None => {
                    last_ray = Some(self.ray_direction(crossing).ok_or_else(stuck)?);
                    edges.extend(crossing);
                    finished = true;
                    break;
                }
                Some(next) => {
                    edges.extend(crossing);
                    if !open && next == start {
                        finished = true;
                        break;
                    }
                    entry = tets[next].slot_of_neighbor(current).ok_or_else(stuck)?;
                    current = next;
                }
            }
        }
        if !finished {
            return Err(stuck());
        }

        vertices.dedup();
        if !open && vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }

        let rays = match (first_ray, last_ray) {
            (Some(r0), Some(r1)) => Some([r0, r1]),
            _ => None,
        };
        let degenerate = match rays {
            None => vertices.len() < 3,
            Some([r0, r1]) => vertices.len() == 1 && r0.cross(&r1).length() <= PARALLEL_RAYS,
        };
        if degenerate {
            return Ok(None);
        }

        let pa = self.control_points[a];
        let pb = self.control_points[b];
        let separation = pa.distance(&pb);
        let off_bisector = vertices.iter().any(|&v| {
            let q = self.edge_points[v];
            let (da, db) = (q.distance(&pa), q.distance(&pb));
            (da - db).abs() > BISECTOR_TOLERANCE * da.max(db).max(separation)
        });
        if off_bisector {
            return Err(VoronoiAnomaly::OffBisectorFace { control_points: [a, b] });
        }
        let bisector_normal = (pb - pa).normalize().ok_or_else(stuck)?;

        let face = Face {
            edges,
            control_points: [a, b],
            vertices,
            rays,
            points: self.edge_points.clone(),
            bisector_point: pa.midpoint(&pb),
            bisector_normal,
            token: next_token(),
        };
        if face
            .area()
            .is_some_and(|area| area <= COLLAPSED_AREA * separation * separation)
        {
            return Ok(None);
        }
        Ok(Some(face))
    }
}

/// Drop faces claimed past the two a cell can have along one edge
///
/// Around a Voronoi edge, a cell borders exactly the two sites adjacent to
/// its own site in rotation about the edge. When more than two faces of one
/// cell share an edge, the sites are projected onto the plane perpendicular
/// to it and only the nearest in each rotational direction keep their face.
/// Returns the number of faces removed.
pub(crate) fn remove_extra_claims(
    faces: &mut Vec<Face>,
    edges: &[Edge3D],
    control_points: &PointArena,
) -> usize {
    let mut claims: HashMap<(usize, usize), Vec<usize>> = HashMap::new();
    for (i, face) in faces.iter().enumerate() {
        for c in face.control_points {
            for &e in &face.edges {
                claims.entry((c, e)).or_default().push(i);
            }
        }
    }

    let mut dropped: HashSet<usize> = HashSet::new();
    for (&(c, e), candidates) in &claims {
        if candidates.len() <= 2 {
            continue;
        }
        let edge = &edges[e];
        let Some(axis) = edge.direction() else {
            continue;
        };
        let base = edge.point0();
        let reference = (control_points[c] - base).reject_from(&axis);

        let mut ahead: Option<(f64, usize)> = None;
        let mut behind: Option<(f64, usize)> = None;
        for &f in candidates {
            let Some(other) = faces[f].other_control_point(c) else {
                continue;
            };
            let offset = (control_points[other] - base).reject_from(&axis);
            let angle = axis
                .dot(&reference.cross(&offset))
                .atan2(reference.dot(&offset));
            if angle >= 0.0 {
                if ahead.is_none_or(|(best, _)| angle < best) {
                    ahead = Some((angle, f));
                }
            } else if behind.is_none_or(|(best, _)| angle > best) {
                behind = Some((angle, f));
            }
        }

        let kept = [ahead, behind].map(|side| side.map(|(_, f)| f));
        dropped.extend(candidates.iter().filter(|&&f| !kept.contains(&Some(f))));
    }

    let before = faces.len();
    let mut index = 0;
    faces.retain(|_| {
        let keep = !dropped.contains(&index);
        index += 1;
        keep
    });
    before - faces.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_face(control_points: [usize; 2], offset: f64) -> Face {
        let points: PointArena = vec![
            Point3D::new(0.0, 0.0, offset),
            Point3D::new(1.0, 0.0, offset),
            Point3D::new(1.0, 1.0, offset),
            Point3D::new(0.0, 1.0, offset),
        ]
        .into();
        Face {
            edges: vec![0, 1, 2, 3],
            control_points,
            vertices: vec![0, 1, 2, 3],
            rays: None,
            points,
            bisector_point: Point3D::origin(),
            bisector_normal: Vector3D::unit_z(),
            token: next_token(),
        }
    }

    #[test]
    fn test_closed_face_queries() {
        let face = square_face([2, 5], 0.0);
        assert!(face.is_closed());
        assert_eq!(face.other_control_point(5), Some(2));
        assert_eq!(face.other_control_point(3), None);
        assert!((face.area().unwrap() - 1.0).abs() < 1e-12);
        assert!(face.is_planar(1e-12));
    }

    #[test]
    fn test_open_face_has_no_area() {
        let mut face = square_face([0, 1], 0.0);
        face.rays = Some([Vector3D::unit_x(), Vector3D::unit_y()]);
        assert!(!face.is_closed());
        assert_eq!(face.area(), None);
        assert!(face.is_planar(1e-12));

        face.rays = Some([Vector3D::unit_z(), Vector3D::unit_y()]);
        assert!(!face.is_planar(1e-6));
    }

    /// One face per site pair, all sharing a segment on the z axis
    fn claims_around_axis(pairs: &[[usize; 2]]) -> (Vec<Face>, Vec<Edge3D>) {
        let points: PointArena =
            vec![Point3D::new(0.0, 0.0, 0.0), Point3D::new(0.0, 0.0, 1.0)].into();
        let edges = vec![Edge3D::segment(0, 1, points.clone())];
        let faces = pairs
            .iter()
            .map(|&control_points| Face {
                edges: vec![0],
                control_points,
                vertices: vec![0, 1],
                rays: None,
                points: points.clone(),
                bisector_point: Point3D::origin(),
                bisector_normal: Vector3D::unit_x(),
                token: next_token(),
            })
            .collect();
        (faces, edges)
    }

    #[test]
    fn test_extra_claims_keep_rotational_neighbors() {
        // Site 0 on +x; sites 1, 2, 3 at 90, 180 and 270 degrees around z
        let sites: PointArena = vec![
            Point3D::new(1.0, 0.0, 0.5),
            Point3D::new(0.0, 1.0, 0.5),
            Point3D::new(-1.0, 0.0, 0.5),
            Point3D::new(0.0, -1.0, 0.5),
        ]
        .into();
        let (mut faces, edges) = claims_around_axis(&[[0, 1], [0, 2], [0, 3]]);
        let removed = remove_extra_claims(&mut faces, &edges, &sites);
        assert_eq!(removed, 1);
        let kept: Vec<[usize; 2]> = faces.iter().map(Face::control_points).collect();
        assert_eq!(kept, vec![[0, 1], [0, 3]]);
    }

    #[test]
    fn test_two_claims_are_left_alone() {
        let sites: PointArena = vec![
            Point3D::new(1.0, 0.0, 0.0),
            Point3D::new(0.0, 1.0, 0.0),
            Point3D::new(-1.0, 0.0, 0.0),
        ]
        .into();
        let (mut faces, edges) = claims_around_axis(&[[0, 1], [0, 2]]);
        assert_eq!(remove_extra_claims(&mut faces, &edges, &sites), 0);
        assert_eq!(faces.len(), 2);
    }
}
