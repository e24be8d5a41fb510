//! The Voronoi diagram as the dual of a Delaunay tetrahedralization

use std::collections::BTreeSet;

use log::{debug, warn};
use math_geometry::parallel::parallel_map;
use math_geometry::{Point3D, PointArena, PointWelder, relative_epsilon};

use crate::delaunay::get_delaunay;
use crate::edge::Edge3D;
use crate::face::{Face, FaceBuilder};
use crate::tetrahedron::Tetrahedron;
use crate::Result;

/// Circumcenters closer than this multiple of the cloud tolerance are merged
const WELD_FACTOR: f64 = 100.0;

/// A recoverable problem met while building the diagram
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoronoiAnomaly {
    /// The tetrahedron is flat; its centroid stands in for the circumcenter
    DegenerateCircumsphere { tetrahedron: usize },
    /// A hull face has no usable normal, so it produced no ray
    DegenerateBoundaryFace { tetrahedron: usize, face: usize },
    /// The cells around a Delaunay edge do not form a ring or a chain
    BrokenFaceRing { control_points: [usize; 2] },
    /// A face vertex is not equidistant from the face's two sites
    OffBisectorFace { control_points: [usize; 2] },
}

/// Control points, Voronoi vertices, edges and faces, with the Delaunay
/// tetrahedra they were derived from
#[derive(Debug, Clone)]
pub struct VoronoiResult {
    control_points: PointArena,
    edge_points: PointArena,
    edges: Vec<Edge3D>,
    faces: Vec<Face>,
    faces_by_control_point: Vec<Vec<usize>>,
    delaunay: Vec<Tetrahedron>,
    tetra_edge_point: Vec<usize>,
    anomalies: Vec<VoronoiAnomaly>,
}

impl VoronoiResult {
    /// The input sites
    pub fn control_points(&self) -> &PointArena {
        &self.control_points
    }

    /// Voronoi vertices (tetrahedron circumcenters, near-duplicates merged)
    pub fn edge_points(&self) -> &PointArena {
        &self.edge_points
    }

    pub fn edges(&self) -> &[Edge3D] {
        &self.edges
    }

    /// Empty unless faces were requested
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Indices into [`VoronoiResult::faces`] bounding the cell of `control`
    pub fn faces_by_control_point(&self, control: usize) -> &[usize] {
        self.faces_by_control_point
            .get(control)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn delaunay(&self) -> &[Tetrahedron] {
        &self.delaunay
    }

    /// Edge point of Delaunay tetrahedron `tetrahedron`
    pub fn tetra_edge_point(&self, tetrahedron: usize) -> usize {
        self.tetra_edge_point[tetrahedron]
    }

    pub fn anomalies(&self) -> &[VoronoiAnomaly] {
        &self.anomalies
    }

    /// Control points sharing a Delaunay edge with `control`, sorted
    pub fn neighbors(&self, control: usize) -> Vec<usize> {
        let set: BTreeSet<usize> = self
            .delaunay
            .iter()
            .filter(|t| t.contains_index(control))
            .flat_map(|t| t.indices())
            .filter(|&i| i != control)
            .collect();
        set.into_iter().collect()
    }

    /// Edge points of the cell of `control`, sorted
    pub fn cell_edge_points(&self, control: usize) -> Vec<usize> {
        let set: BTreeSet<usize> = self
            .delaunay
            .iter()
            .enumerate()
            .filter(|(_, t)| t.contains_index(control))
            .map(|(i, _)| self.tetra_edge_point[i])
            .collect();
        set.into_iter().collect()
    }

    /// Returns `true` if the cell of `control` is bounded
    ///
    /// A cell is unbounded exactly when its site lies on the convex hull,
    /// which shows up as a Delaunay boundary face touching the site.
    pub fn is_cell_bounded(&self, control: usize) -> bool {
        !self.delaunay.iter().any(|t| {
            t.contains_index(control)
                && (0..4).any(|slot| {
                    t.is_boundary_face(slot) && t.face(slot).contains_index(control)
                })
        })
    }
}

/// Build the Voronoi diagram of `points`
///
/// Each Delaunay tetrahedron contributes its circumcenter as an edge point.
/// Every face shared by two tetrahedra becomes a segment between their edge
/// points, unless both merged into one point. Every hull face of the
/// tetrahedralization becomes a ray along its outward normal. With
/// `build_faces`, the face between each pair of Delaunay neighbors is
/// reconstructed as well.
///
/// Flat tetrahedra and malformed faces are recorded in
/// [`VoronoiResult::anomalies`] instead of failing the whole construction.
pub fn get_voronoi(points: &[Point3D], build_faces: bool) -> Result<VoronoiResult> {
    let delaunay = get_delaunay(points)?;
    let control_points = delaunay[0].all_points().clone();
    let mut anomalies = Vec::new();

    // Edge points
    let centers = parallel_map(&delaunay, |t| t.circumsphere().map(|s| s.center));
    let mut welder = PointWelder::new(relative_epsilon(points) * WELD_FACTOR);
    let mut tetra_edge_point = Vec::with_capacity(delaunay.len());
    for (t, center) in centers.into_iter().enumerate() {
        let center = center.unwrap_or_else(|| {
            warn!("tetrahedron {} is flat, using its centroid", t);
            anomalies.push(VoronoiAnomaly::DegenerateCircumsphere { tetrahedron: t });
            delaunay[t].centroid()
        });
        tetra_edge_point.push(welder.insert(center));
    }
    let edge_points: PointArena = welder.into_points().into();

    // Segments across shared faces, rays out of hull faces
    let mut edges = Vec::new();
    let mut face_edges = vec![[None; 4]; delaunay.len()];
    for (t, tet) in delaunay.iter().enumerate() {
        for slot in 0..4 {
            match tet.neighbor(slot) {
                Some(u) if u > t => {
                    let (p, q) = (tetra_edge_point[t], tetra_edge_point[u]);
                    if p == q {
                        continue;
                    }
                    let Some(back) = delaunay[u].slot_of_neighbor(t) else {
                        continue;
                    };
                    face_edges[t][slot] = Some(edges.len());
                    face_edges[u][back] = Some(edges.len());
                    edges.push(Edge3D::segment(p, q, edge_points.clone()));
                }
                Some(_) => {}
                None => {
                    let face = tet.face(slot);
                    let direction = face.normal().normalize().map(|n| {
                        // Away from the cell it bounds
                        if n.dot(&(face.centroid() - tet.centroid())) < 0.0 { -n } else { n }
                    });
                    match direction
                        .and_then(|d| Edge3D::ray(tetra_edge_point[t], d, edge_points.clone()))
                    {
                        Some(ray) => {
                            face_edges[t][slot] = Some(edges.len());
                            edges.push(ray);
                        }
                        None => {
                            warn!("hull face {} of tetrahedron {} is degenerate", slot, t);
                            anomalies.push(VoronoiAnomaly::DegenerateBoundaryFace {
                                tetrahedron: t,
                                face: slot,
                            });
                        }
                    }
                }
            }
        }
    }

    let mut faces = Vec::new();
    let mut faces_by_control_point = vec![Vec::new(); control_points.len()];
    if build_faces {
        let builder = FaceBuilder {
            tetrahedra: &delaunay,
            tet_point: &tetra_edge_point,
            face_edges: &face_edges,
            edges: &edges,
            control_points: &control_points,
            edge_points: &edge_points,
        };
        let (built, face_anomalies) = builder.build();
        for anomaly in &face_anomalies {
            warn!("Voronoi face reconstruction: {:?}", anomaly);
        }
        anomalies.extend(face_anomalies);
        faces = built;
        for (i, face) in faces.iter().enumerate() {
            for c in face.control_points() {
                faces_by_control_point[c].push(i);
            }
        }
    }

    debug!(
        "Voronoi: {} control points, {} edge points, {} edges, {} faces, {} anomalies",
        control_points.len(),
        edge_points.len(),
        edges.len(),
        faces.len(),
        anomalies.len()
    );

    Ok(VoronoiResult {
        control_points,
        edge_points,
        edges,
        faces,
        faces_by_control_point,
        delaunay,
        tetra_edge_point,
        anomalies,
    })
}
