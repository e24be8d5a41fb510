//! Quickhull algorithm implementation for 3D convex hulls
//!
//! Faces live in a [`TriangleTopology`] so that the visible region around an
//! eye point is found by walking neighbor links from the face that owns it,
//! and the horizon falls out of that walk.
//!
//! Performance notes:
//! - Initial outside-set partition fans out over rayon for large clouds
//! - Each face tracks its furthest outside point
//! - Removed faces stay as dead slots instead of being shifted out

use std::collections::HashMap;

use math_geometry::parallel::parallel_map;
use math_geometry::{
    IndexedTriangle, Point3D, PointArena, TriangleTopology, Vector3D, relative_epsilon,
};

use crate::types::ConvexHull3D;
use crate::{ConvexHullError, Result};

/// Upper bound on refinement iterations before giving up
pub const MAX_ITERATIONS: usize = 100_000;

/// Working state of one hull face during construction
#[derive(Debug, Clone)]
struct HullFace {
    normal: Vector3D,
    d: f64, // Plane constant: normal.dot(v0), for faster distance computation
    outside_points: Vec<usize>,
    furthest: Option<(usize, f64)>,
}

impl HullFace {
    fn new(indices: [usize; 3], points: &[Point3D]) -> Self {
        let p0 = points[indices[0]];
        let e1 = points[indices[1]] - p0;
        let e2 = points[indices[2]] - p0;
        let normal = e1.cross(&e2).normalize().unwrap_or_else(Vector3D::unit_z);
        Self {
            normal,
            d: normal.dot(&p0.to_vector()),
            outside_points: Vec::new(),
            furthest: None,
        }
    }

    /// Fast signed distance from point to plane (positive = outside)
    #[inline]
    fn signed_distance(&self, point: &Point3D) -> f64 {
        self.normal.dot(&point.to_vector()) - self.d
    }

    fn assign_point(&mut self, point_idx: usize, distance: f64) {
        self.outside_points.push(point_idx);
        match self.furthest {
            Some((_, best)) if best >= distance => {}
            _ => self.furthest = Some((point_idx, distance)),
        }
    }

    fn forget_point(&mut self, point_idx: usize, points: &[Point3D]) {
        self.outside_points.retain(|&p| p != point_idx);
        self.furthest = None;
        for &idx in &self.outside_points {
            let distance = self.signed_distance(&points[idx]);
            if self.furthest.is_none_or(|(_, best)| distance > best) {
                self.furthest = Some((idx, distance));
            }
        }
    }
}

/// A horizon edge: `(a, b)` as oriented in the visible face, plus the
/// surviving neighbor across it
#[derive(Debug, Clone, Copy)]
struct HorizonEdge {
    a: usize,
    b: usize,
    neighbor: usize,
}

struct HullBuilder<'a> {
    points: &'a [Point3D],
    eps: f64,
    interior: Point3D,
    topology: TriangleTopology,
    faces: Vec<HullFace>,
}

impl<'a> HullBuilder<'a> {
    fn add_face(&mut self, indices: [usize; 3]) -> usize {
        let id = self.topology.add(indices);
        self.faces.push(HullFace::new(indices, self.points));
        debug_assert_eq!(self.faces.len(), self.topology.slot_count());
        id
    }

    fn is_visible(&self, id: usize, point: &Point3D) -> bool {
        self.faces[id].signed_distance(point) > self.eps
    }

    /// Face with the globally furthest outside point
    fn furthest_outside(&self) -> Option<(usize, usize)> {
        let mut best: Option<(usize, usize, f64)> = None;
        for id in self.topology.alive_ids() {
            if let Some((point_idx, distance)) = self.faces[id].furthest
                && best.is_none_or(|(_, _, d)| distance > d)
            {
                best = Some((id, point_idx, distance));
            }
        }
        best.map(|(id, point_idx, _)| (id, point_idx))
    }

    /// Flood fill over neighbors from `start`, collecting visible faces and
    /// the horizon around them
    fn visible_region(&self, start: usize, eye: &Point3D) -> (Vec<usize>, Vec<HorizonEdge>) {
        let mut visited = vec![false; self.topology.slot_count()];
        let mut visible = Vec::new();
        let mut horizon = Vec::new();
        let mut stack = vec![start];
        visited[start] = true;

        while let Some(id) = stack.pop() {
            visible.push(id);
            for slot in 0..3 {
                let Some(next) = self.topology.neighbor(id, slot) else {
                    continue;
                };
                // Only visible faces are marked
                if visited[next] {
                    continue;
                }
                if self.is_visible(next, eye) {
                    visited[next] = true;
                    stack.push(next);
                } else {
                    let (a, b) = self.topology.edge_vertices(id, slot);
                    horizon.push(HorizonEdge { a, b, neighbor: next });
                }
            }
        }
        (visible, horizon)
    }

    fn insert_point(&mut self, face_id: usize, eye_idx: usize) -> Result<()> {
        let eye = self.points[eye_idx];
        let (visible, horizon) = self.visible_region(face_id, &eye);

        if !is_closed_loop(&horizon) {
            // Eye is numerically coplanar with the region; nothing to add
            log::debug!(
                "discarding point {} (horizon of {} edges is not a simple loop)",
                eye_idx,
                horizon.len()
            );
            self.faces[face_id].forget_point(eye_idx, self.points);
            return Ok(());
        }

        let mut orphans: Vec<usize> = Vec::new();
        for &id in &visible {
            orphans.extend(self.faces[id].outside_points.drain(..));
            self.faces[id].furthest = None;
            self.topology.remove(id);
        }
        orphans.retain(|&p| p != eye_idx);

        let mut new_ids = Vec::with_capacity(horizon.len());
        for edge in &horizon {
            let mut indices = [edge.a, edge.b, eye_idx];
            let probe = HullFace::new(indices, self.points);
            if probe.signed_distance(&self.interior) > 0.0 {
                log::warn!(
                    "re-winding new face ({}, {}, {}) to keep its normal outward",
                    edge.a,
                    edge.b,
                    eye_idx
                );
                indices.swap(0, 1);
            }
            let id = self.add_face(indices);
            let slot = self.topology.find_edge(id, edge.a, edge.b);
            let back = self.topology.find_edge(edge.neighbor, edge.a, edge.b);
            match (slot, back) {
                (Some(slot), Some(back)) => self.topology.link(id, slot, edge.neighbor, back),
                _ => {
                    log::error!("horizon edge ({}, {}) lost its neighbor", edge.a, edge.b);
                    return Err(ConvexHullError::Internal(format!(
                        "horizon edge ({}, {}) not found on face {}",
                        edge.a, edge.b, edge.neighbor
                    )));
                }
            }
            new_ids.push(id);
        }
        self.topology.link_among(&new_ids);

        // New faces first, then any other live face
        for orphan in orphans {
            let p = self.points[orphan];
            let target = new_ids
                .iter()
                .copied()
                .find(|&id| self.is_visible(id, &p))
                .or_else(|| {
                    self.topology
                        .alive_ids()
                        .find(|&id| self.is_visible(id, &p))
                });
            if let Some(id) = target {
                let distance = self.faces[id].signed_distance(&p);
                self.faces[id].assign_point(orphan, distance);
            }
        }
        Ok(())
    }
}

/// Every horizon vertex starts exactly one edge and ends exactly one edge
fn is_closed_loop(horizon: &[HorizonEdge]) -> bool {
    if horizon.len() < 3 {
        return false;
    }
    let mut starts: HashMap<usize, usize> = HashMap::with_capacity(horizon.len());
    let mut ends: HashMap<usize, usize> = HashMap::with_capacity(horizon.len());
    for e in horizon {
        *starts.entry(e.a).or_default() += 1;
        *ends.entry(e.b).or_default() += 1;
    }
    starts.len() == horizon.len()
        && ends.len() == horizon.len()
        && starts.keys().all(|k| ends.contains_key(k))
}

/// Build the convex hull of a point cloud
///
/// Returns `Ok(None)` only when refinement consumes every face
/// (pathological, nearly coplanar input). Too few points is an error, not an
/// empty hull.
///
/// # Errors
/// - [`ConvexHullError::InsufficientVertices`] for fewer than four points
/// - [`ConvexHullError::InvalidFace`] for a non-finite coordinate
/// - [`ConvexHullError::DegenerateConfiguration`] when the cloud is flat or
///   collinear
pub fn get_convex_hull(points: &[Point3D]) -> Result<Option<ConvexHull3D>> {
    if points.len() < 4 {
        return Err(ConvexHullError::InsufficientVertices(points.len()));
    }
    if let Some(bad) = points.iter().position(|p| !p.is_finite()) {
        return Err(ConvexHullError::InvalidFace(format!(
            "point {} has a non-finite coordinate",
            bad
        )));
    }

    // Compute scale-aware epsilon for this input
    let eps = relative_epsilon(points);
    let seed = find_initial_simplex(points, eps)?;
    let interior = Point3D::centroid(&seed.map(|i| points[i]))
        .ok_or_else(|| ConvexHullError::Internal("empty seed".to_string()))?;

    let mut builder = HullBuilder {
        points,
        eps,
        interior,
        topology: TriangleTopology::with_capacity(points.len() * 2),
        faces: Vec::with_capacity(points.len() * 2),
    };

    let [v0, v1, v2, v3] = seed;
    for face in [[v0, v1, v2], [v0, v2, v3], [v0, v3, v1], [v1, v3, v2]] {
        let mut indices = face;
        // Ensure the normal points away from the seed centroid
        if HullFace::new(indices, points).signed_distance(&interior) > 0.0 {
            indices.swap(1, 2);
        }
        builder.add_face(indices);
    }
    builder.topology.link_all();

    assign_initial_points(&mut builder, &seed);

    let mut iterations = 0;
    while let Some((face_id, eye_idx)) = builder.furthest_outside() {
        iterations += 1;
        if iterations > MAX_ITERATIONS {
            log::error!(
                "Max iterations exceeded after {} iterations with {} faces",
                iterations,
                builder.topology.len()
            );
            return Err(ConvexHullError::MaxIterationsExceeded);
        }
        builder.insert_point(face_id, eye_idx)?;

        if iterations % 500 == 0 {
            let remaining: usize = builder
                .topology
                .alive_ids()
                .map(|id| builder.faces[id].outside_points.len())
                .sum();
            log::debug!(
                "Iteration {}: {} faces, {} outside points remaining",
                iterations,
                builder.topology.len(),
                remaining
            );
        }
    }

    if builder.topology.is_empty() {
        log::warn!("hull construction consumed every face");
        return Ok(None);
    }

    let arena: PointArena = points.to_vec().into();
    let triangles: Vec<IndexedTriangle> = builder
        .topology
        .alive_ids()
        .map(|id| {
            let [a, b, c] = builder.topology.indices(id);
            IndexedTriangle::new(a, b, c, arena.clone())
        })
        .collect();
    log::debug!(
        "hull of {} points: {} faces after {} iterations",
        points.len(),
        triangles.len(),
        iterations
    );

    Ok(Some(ConvexHull3D::new(arena, triangles)))
}

/// Partition the non-seed points into the seed faces' outside sets
///
/// Each point goes to the first face it lies strictly outside of.
fn assign_initial_points(builder: &mut HullBuilder<'_>, seed: &[usize; 4]) {
    let candidates: Vec<usize> = (0..builder.points.len())
        .filter(|i| !seed.contains(i))
        .collect();
    let face_ids: Vec<usize> = builder.topology.alive_ids().collect();

    let assignments: Vec<Option<(usize, f64)>> = {
        let faces = &builder.faces;
        let points = builder.points;
        let eps = builder.eps;
        parallel_map(&candidates, |&point_idx| {
            let p = &points[point_idx];
            face_ids.iter().find_map(|&id| {
                let distance = faces[id].signed_distance(p);
                (distance > eps).then_some((id, distance))
            })
        })
    };

    // Sequential: actually assign points (to maintain deterministic order)
    for (&point_idx, assignment) in candidates.iter().zip(assignments) {
        if let Some((id, distance)) = assignment {
            builder.faces[id].assign_point(point_idx, distance);
        }
    }
}

/// Find the initial simplex (tetrahedron) to start the algorithm
///
/// Minimum and maximum X, then the point furthest from their line, then the
/// point furthest from the plane of those three.
fn find_initial_simplex(points: &[Point3D], epsilon: f64) -> Result<[usize; 4]> {
    for axis in 0..3 {
        let (lo, hi) = points.iter().fold((f64::MAX, f64::MIN), |(lo, hi), p| {
            (lo.min(p.axis(axis)), hi.max(p.axis(axis)))
        });
        if hi - lo <= epsilon {
            log::debug!("cloud is flat along axis {}", axis);
            return Err(ConvexHullError::DegenerateConfiguration);
        }
    }

    let mut v0 = 0;
    let mut v1 = 0;
    for (i, p) in points.iter().enumerate() {
        if p.x < points[v0].x {
            v0 = i;
        }
        if p.x > points[v1].x {
            v1 = i;
        }
    }

    let line_dir = points[v1] - points[v0];
    let (v2, line_distance) = furthest(points, &[v0, v1], |p| {
        (*p - points[v0]).reject_from(&line_dir).length()
    });
    if line_distance <= epsilon {
        return Err(ConvexHullError::DegenerateConfiguration);
    }

    let normal = (points[v1] - points[v0])
        .cross(&(points[v2] - points[v0]))
        .normalize()
        .ok_or(ConvexHullError::DegenerateConfiguration)?;
    let (v3, plane_distance) = furthest(points, &[v0, v1, v2], |p| {
        normal.dot(&(*p - points[v0])).abs()
    });
    if plane_distance <= epsilon {
        return Err(ConvexHullError::DegenerateConfiguration);
    }

    Ok([v0, v1, v2, v3])
}

fn furthest<F>(points: &[Point3D], skip: &[usize], measure: F) -> (usize, f64)
where
    F: Fn(&Point3D) -> f64,
{
    let mut best = (0, 0.0);
    for (i, p) in points.iter().enumerate() {
        if skip.contains(&i) {
            continue;
        }
        let d = measure(p);
        if d > best.1 {
            best = (i, d);
        }
    }
    best
}
