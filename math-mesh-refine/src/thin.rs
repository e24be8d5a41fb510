//! Sliver removal
//!
//! A sliver is a triangle whose longest edge is almost as long as the other
//! two together, so its third vertex (the apex) sits close to that edge.
//! The apex is dropped from the mesh: every triangle around it is removed
//! and the hole left behind is filled again from the surrounding ring of
//! vertices. The fill is an ear clipping in the plane of the removed fan,
//! choosing the best-shaped ear each step and refusing diagonals that
//! already exist elsewhere in the mesh.

use std::collections::{HashMap, HashSet};

use log::debug;
use math_geometry::{
    EPSILON, EdgeKey, IndexedTriangle, PlaneBasis, Point2D, Point3D, TriangleTopology, Vector3D,
    polygon_area_2d, weighted_centroid,
};

use crate::mesh::split_batch;
use crate::{RefineError, Result};

/// `longest / (sum of the other two)`; 1 for a fully collapsed triangle
fn thinness(points: &[Point3D], face: [usize; 3]) -> Option<(f64, usize)> {
    let p = face.map(|i| points[i]);
    let lengths = [
        p[0].distance(&p[1]),
        p[1].distance(&p[2]),
        p[2].distance(&p[0]),
    ];
    let longest = (0..3).max_by(|&a, &b| lengths[a].total_cmp(&lengths[b]))?;
    let others = lengths[(longest + 1) % 3] + lengths[(longest + 2) % 3];
    if others <= EPSILON {
        return None;
    }
    // The apex is the corner across from the longest edge
    Some((lengths[longest] / others, (longest + 2) % 3))
}

/// Quality of a 2D triangle: 1 for equilateral, 0 for degenerate
fn ear_quality(a: Point2D, b: Point2D, c: Point2D) -> f64 {
    let area = a.cross(&b, &c) / 2.0;
    let sq = a.distance(&b).powi(2) + b.distance(&c).powi(2) + c.distance(&a).powi(2);
    if sq <= 0.0 {
        return 0.0;
    }
    4.0 * 3.0_f64.sqrt() * area / sq
}

fn inside_triangle(p: Point2D, a: Point2D, b: Point2D, c: Point2D) -> bool {
    a.cross(&b, &p) > EPSILON && b.cross(&c, &p) > EPSILON && c.cross(&a, &p) > EPSILON
}

/// Triangulate a counter-clockwise ring, returning triples of ring positions
///
/// `allowed` rejects diagonals between two ring positions. `None` if no
/// valid ear remains at some step.
fn ear_clip(ring: &[Point2D], allowed: impl Fn(usize, usize) -> bool) -> Option<Vec<[usize; 3]>> {
    let mut open: Vec<usize> = (0..ring.len()).collect();
    let mut out = Vec::with_capacity(ring.len().saturating_sub(2));
    while open.len() > 3 {
        let n = open.len();
        let mut best: Option<(f64, usize)> = None;
        for k in 0..n {
            let (i, j, l) = (open[(k + n - 1) % n], open[k], open[(k + 1) % n]);
            let (a, b, c) = (ring[i], ring[j], ring[l]);
            if a.cross(&b, &c) <= EPSILON || !allowed(i, l) {
                continue;
            }
            let blocked = open
                .iter()
                .filter(|&&m| m != i && m != j && m != l)
                .any(|&m| inside_triangle(ring[m], a, b, c));
            if blocked {
                continue;
            }
            let q = ear_quality(a, b, c);
            if best.is_none_or(|(bq, _)| q > bq) {
                best = Some((q, k));
            }
        }
        let (_, k) = best?;
        let n = open.len();
        out.push([open[(k + n - 1) % n], open[k], open[(k + 1) % n]]);
        open.remove(k);
    }
    if let &[a, b, c] = open.as_slice() {
        if ring[a].cross(&ring[b], &ring[c]) <= EPSILON {
            return None;
        }
        out.push([a, b, c]);
    }
    Some(out)
}

struct SliverRemover<'a> {
    points: &'a [Point3D],
    topology: TriangleTopology,
    edge_use: HashMap<EdgeKey, usize>,
}

impl SliverRemover<'_> {
    fn count_edges(&mut self, face: [usize; 3], add: bool) {
        for k in 0..3 {
            let key = EdgeKey::new(face[k], face[(k + 1) % 3]);
            let count = self.edge_use.entry(key).or_default();
            if add {
                *count += 1;
            } else {
                *count = count.saturating_sub(1);
            }
        }
    }

    /// Triangles around `apex`, starting at `start`, in counter-clockwise order
    ///
    /// `None` if the fan is open (the apex is on the mesh boundary) or not
    /// manifold.
    fn fan(&self, start: usize, apex: usize) -> Option<Vec<usize>> {
        let mut fan = vec![start];
        let mut current = start;
        for _ in 0..self.topology.slot_count() {
            let face = self.topology.indices(current);
            let corner = face.iter().position(|&v| v == apex)?;
            // Leave through the edge ending at the apex
            let next = self.topology.neighbor(current, (corner + 2) % 3)?;
            if next == start {
                return Some(fan);
            }
            if fan.contains(&next) || !self.topology.indices(next).contains(&apex) {
                return None;
            }
            fan.push(next);
            current = next;
        }
        None
    }

    /// Remove `apex` by re-filling its fan; `false` if the hole cannot be filled
    fn collapse(&mut self, sliver: usize, apex: usize) -> bool {
        let Some(fan) = self.fan(sliver, apex) else {
            return false;
        };

        // Vertex after the apex in each fan triangle
        let mut ring = Vec::with_capacity(fan.len());
        let mut outer = Vec::with_capacity(fan.len());
        let mut normal = Vector3D::zero();
        let mut centroids = Vec::with_capacity(fan.len());
        let mut areas = Vec::with_capacity(fan.len());
        for &id in &fan {
            let face = self.topology.indices(id);
            let Some(corner) = face.iter().position(|&v| v == apex) else {
                return false;
            };
            ring.push(face[(corner + 1) % 3]);
            outer.extend(self.topology.neighbor(id, (corner + 1) % 3));

            let [a, b, c] = face.map(|i| self.points[i]);
            let n = (b - a).cross(&(c - a));
            normal += n;
            areas.push(n.length() / 2.0);
            centroids.push(Point3D::centroid(&[a, b, c]).unwrap_or(a));
        }
        if ring.len() < 3 || ring.iter().collect::<HashSet<_>>().len() != ring.len() {
            return false;
        }

        let Ok(origin) = weighted_centroid(&centroids, &areas) else {
            return false;
        };
        let Some(basis) = PlaneBasis::new(origin, normal) else {
            return false;
        };
        let flat: Vec<Point2D> = ring.iter().map(|&v| basis.to_2d(&self.points[v])).collect();
        if polygon_area_2d(&flat) <= 0.0 {
            return false;
        }

        let edge_use = &self.edge_use;
        let Some(ears) = ear_clip(&flat, |i, j| {
            edge_use
                .get(&EdgeKey::new(ring[i], ring[j]))
                .is_none_or(|&count| count == 0)
        }) else {
            return false;
        };
        let patch: Vec<[usize; 3]> = ears.iter().map(|e| e.map(|k| ring[k])).collect();
        let facing = patch.iter().all(|f| {
            let [a, b, c] = f.map(|i| self.points[i]);
            (b - a).cross(&(c - a)).dot(&basis.normal) > 0.0
        });
        if !facing {
            return false;
        }

        for &id in &fan {
            let face = self.topology.indices(id);
            self.count_edges(face, false);
            self.topology.remove(id);
        }
        let mut relink = outer;
        for face in patch {
            self.count_edges(face, true);
            relink.push(self.topology.add(face));
        }
        relink.sort_unstable();
        relink.dedup();
        self.topology.link_among(&relink);
        true
    }
}

/// Remove slivers by dropping their apex and re-filling the hole
///
/// A triangle counts as a sliver when its longest edge divided by the sum of
/// the other two exceeds `ratio`. Apexes on the mesh boundary are left in
/// place, as are holes that cannot be re-filled without folding or
/// duplicating an edge. At most `max_iterations` slivers are attempted.
/// The output reuses the input arena; removed apexes stay in it unused.
pub fn remove_thin_triangles(
    triangles: &[IndexedTriangle],
    ratio: f64,
    max_iterations: usize,
) -> Result<Vec<IndexedTriangle>> {
    if !(ratio.is_finite() && ratio > 0.0 && ratio <= 1.0) {
        return Err(RefineError::InvalidConfig(format!(
            "thin ratio must be in (0, 1], got {}",
            ratio
        )));
    }
    let Some((arena, faces)) = split_batch(triangles)? else {
        return Ok(Vec::new());
    };

    let mut remover = SliverRemover {
        points: &arena,
        topology: TriangleTopology::from_faces(&faces),
        edge_use: HashMap::new(),
    };
    for &face in &faces {
        remover.count_edges(face, true);
    }

    let mut skipped: HashSet<usize> = HashSet::new();
    let mut removed = 0;
    let mut attempts = 0;
    while attempts < max_iterations {
        let candidate = remover.topology.alive_ids().find_map(|id| {
            if skipped.contains(&id) {
                return None;
            }
            let face = remover.topology.indices(id);
            let (thin, apex_corner) = thinness(&arena, face)?;
            (thin > ratio).then_some((id, face[apex_corner]))
        });
        let Some((id, apex)) = candidate else {
            break;
        };
        attempts += 1;
        if remover.collapse(id, apex) {
            removed += 1;
        } else {
            skipped.insert(id);
        }
    }

    debug!(
        "thin triangles: {} apexes removed, {} slivers kept, {} attempts",
        removed,
        skipped.len(),
        attempts
    );
    Ok(remover
        .topology
        .alive_ids()
        .map(|id| {
            let [a, b, c] = remover.topology.indices(id);
            IndexedTriangle::new(a, b, c, arena.clone())
        })
        .collect())
}
