//! Delaunay tetrahedralization by Bowyer-Watson insertion
//!
//! The triangulation starts from four spanning input points. Its hull is
//! closed by ghost cells, each joining one hull face to a symbolic vertex at
//! infinity, so no enclosing geometry is ever added and every tolerance
//! comes from the input itself. Each insertion removes the cavity of cells
//! in conflict with the new point, then fans the cavity boundary out to it.
//! A ghost is in conflict when the point sees its hull face from outside,
//! or lies in the face's plane inside its circumcircle. Ghost cells are
//! dropped at the end and the survivors are re-linked by shared vertex
//! triples.

use std::collections::{HashMap, HashSet};

use log::{debug, error, warn};
use math_geometry::{
    Circumsphere, EPSILON, Point3D, PointArena, relative_epsilon, tetrahedron_circumsphere,
};

use crate::tetrahedron::{FACE_VERTICES, Tetrahedron, link_tetrahedra};
use crate::{Result, VoronoiError};

/// Symbolic vertex at infinity shared by all ghost cells
const INFINITE: usize = usize::MAX;

/// Relative margin on the squared radius for in-sphere tests
const INSPHERE_MARGIN: f64 = EPSILON;

#[derive(Debug, Clone)]
struct Cell {
    vertices: [usize; 4],
    neighbors: [Option<usize>; 4],
    sphere: Option<Circumsphere>,
    alive: bool,
}

/// Circumcenter and squared radius of a triangle; `None` when collinear
fn circumcircle(a: &Point3D, b: &Point3D, c: &Point3D) -> Option<(Point3D, f64)> {
    let u = *b - *a;
    let v = *c - *a;
    let w = u.cross(&v);
    let w2 = w.length_squared();
    if w2 == 0.0 || !w2.is_finite() {
        return None;
    }
    let offset =
        (v.cross(&w) * u.length_squared() + w.cross(&u) * v.length_squared()) / (2.0 * w2);
    Some((*a + offset, offset.length_squared()))
}

/// Working triangulation over the input points plus ghost cells
struct BowyerWatson<'a> {
    points: &'a [Point3D],
    cells: Vec<Cell>,
    eps: f64,
    last: usize,
}

impl<'a> BowyerWatson<'a> {
    /// Seeds the triangulation with one tetrahedron and its four ghosts
    fn new(points: &'a [Point3D], eps: f64, seed: [usize; 4]) -> Self {
        let [a, b, c, d] = seed;
        let normal = (points[b] - points[a]).cross(&(points[c] - points[a]));
        let first = if normal.dot(&(points[d] - points[a])) < 0.0 {
            [a, c, b, d]
        } else {
            seed
        };

        let mut bw = Self {
            points,
            cells: Vec::new(),
            eps,
            last: 0,
        };
        let root = bw.add_cell(first);
        let mut open = HashMap::new();
        for slot in 0..4 {
            let [x, y, z] = bw.face_corners(root, slot);
            let ghost = bw.add_cell([x, y, z, INFINITE]);
            bw.cells[ghost].neighbors[3] = Some(root);
            bw.cells[root].neighbors[slot] = Some(ghost);
            bw.link_sides(ghost, &mut open);
        }
        bw
    }

    fn add_cell(&mut self, vertices: [usize; 4]) -> usize {
        let sphere = if vertices.contains(&INFINITE) {
            None
        } else {
            let [a, b, c, d] = vertices.map(|i| self.points[i]);
            tetrahedron_circumsphere(&a, &b, &c, &d)
        };
        self.cells.push(Cell {
            vertices,
            neighbors: [None; 4],
            sphere,
            alive: true,
        });
        self.cells.len() - 1
    }

    /// Pairs faces 0..3 of a new cell with earlier cells sharing them
    fn link_sides(&mut self, id: usize, open: &mut HashMap<[usize; 3], (usize, usize)>) {
        for s in 0..3 {
            let mut key = self.face_corners(id, s);
            key.sort_unstable();
            match open.remove(&key) {
                Some((other, other_slot)) => {
                    self.cells[id].neighbors[s] = Some(other);
                    self.cells[other].neighbors[other_slot] = Some(id);
                }
                None => {
                    open.insert(key, (id, s));
                }
            }
        }
    }

    fn face_corners(&self, cell: usize, slot: usize) -> [usize; 3] {
        let v = self.cells[cell].vertices;
        FACE_VERTICES[slot].map(|k| v[k])
    }

    /// Slot of the vertex at infinity, if `cell` is a ghost
    fn ghost_slot(&self, cell: usize) -> Option<usize> {
        self.cells[cell].vertices.iter().position(|&v| v == INFINITE)
    }

    /// Signed distance of `p` from the plane through three finite corners
    ///
    /// Positive on the side the corners' winding points to. A collapsed
    /// face reports zero.
    fn plane_distance(&self, corners: [usize; 3], p: &Point3D) -> f64 {
        let [a, b, c] = corners.map(|i| self.points[i]);
        let normal = (b - a).cross(&(c - a));
        let len = normal.length();
        if len == 0.0 || !len.is_finite() {
            return 0.0;
        }
        normal.dot(&(*p - a)) / len
    }

    /// Signed distance from face `slot` of a finite cell, positive outside
    fn face_distance(&self, cell: usize, slot: usize, p: &Point3D) -> f64 {
        self.plane_distance(self.face_corners(cell, slot), p)
    }

    fn encloses(&self, cell: usize, p: &Point3D) -> bool {
        self.ghost_slot(cell).is_none()
            && (0..4).all(|slot| self.face_distance(cell, slot, p) <= self.eps)
    }

    /// Whether `p` invalidates `cell`
    fn in_conflict(&self, cell: usize, p: &Point3D) -> bool {
        let Some(k) = self.ghost_slot(cell) else {
            return self.cells[cell]
                .sphere
                .is_some_and(|s| s.contains(p, INSPHERE_MARGIN));
        };
        let corners = self.face_corners(cell, k);
        // The hull face of a ghost winds inward
        let d = self.plane_distance(corners, p);
        if d < -self.eps {
            return true;
        }
        if d > self.eps {
            return false;
        }
        let [a, b, c] = corners.map(|i| self.points[i]);
        circumcircle(&a, &b, &c)
            .is_some_and(|(center, r2)| center.distance_squared(p) < r2 * (1.0 - INSPHERE_MARGIN))
    }

    fn alive_cells(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.cells.len()).filter(|&c| self.cells[c].alive)
    }

    /// Cell where the cavity of `p` starts
    ///
    /// Walks the finite cells from the last insertion, stepping onto a ghost
    /// only when it is in conflict. Falls back to scanning for an enclosing
    /// cell, then for the ghost whose hull face `p` sees most directly.
    fn locate(&self, p: &Point3D) -> Option<usize> {
        let mut current = self.last;
        if self.cells[current].alive && self.ghost_slot(current).is_none() {
            for _ in 0..self.cells.len() {
                let (slot, distance) = (0..4)
                    .map(|slot| (slot, self.face_distance(current, slot, p)))
                    .fold((0, f64::NEG_INFINITY), |best, cand| {
                        if cand.1 > best.1 { cand } else { best }
                    });
                if distance <= self.eps {
                    return Some(current);
                }
                match self.cells[current].neighbors[slot] {
                    Some(next) if self.ghost_slot(next).is_some() => {
                        if self.in_conflict(next, p) {
                            return Some(next);
                        }
                        break;
                    }
                    Some(next) => current = next,
                    None => break,
                }
            }
        }

        if let Some(c) = self.alive_cells().find(|&c| self.encloses(c, p)) {
            return Some(c);
        }
        self.alive_cells()
            .filter_map(|c| {
                let k = self.ghost_slot(c)?;
                self.in_conflict(c, p).then(|| (c, self.face_distance(c, k, p)))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(c, _)| c)
    }

    /// Whether fanning face `slot` of cavity cell `cell` to `index` is sound
    ///
    /// A finite face must see the point strictly from inside the cell. A
    /// face through infinity yields a new ghost, whose hull face must not
    /// collapse and must keep the hull convex against the neighbor `nb`.
    fn fan_is_valid(&self, cell: usize, slot: usize, index: usize, nb: Option<usize>) -> bool {
        let corners = self.face_corners(cell, slot);
        let p = self.points[index];
        if !corners.contains(&INFINITE) {
            return self.face_distance(cell, slot, &p) < -self.eps;
        }

        let [a, b, d] = corners;
        let fan = [b, a, d, index];
        let Some(k) = fan.iter().position(|&v| v == INFINITE) else {
            return false;
        };
        let hull = FACE_VERTICES[k].map(|i| fan[i]);
        let [x, y, z] = hull.map(|i| self.points[i]);
        let len = (y - x).cross(&(z - x)).length();
        let side = (y - x).length().max((z - x).length());
        if len <= self.eps * side || !len.is_finite() {
            return false;
        }

        let far = nb.and_then(|nb| {
            self.cells[nb]
                .vertices
                .into_iter()
                .find(|v| !corners.contains(v))
        });
        match far {
            Some(w) if w != INFINITE => self.plane_distance(hull, &self.points[w]) >= -self.eps,
            _ => true,
        }
    }

    /// Insert input point `index`; `false` if it duplicates a vertex
    fn insert(&mut self, index: usize) -> Result<bool> {
        let p = self.points[index];
        let start = self.locate(&p).ok_or_else(|| {
            error!("point {} is not inside the triangulation", index);
            VoronoiError::Internal(format!("could not locate point {}", index))
        })?;

        // Cells in conflict with p, connected to `start`
        let mut in_cavity: HashSet<usize> = HashSet::from([start]);
        let mut cavity = vec![start];
        let mut stack = vec![start];
        while let Some(c) = stack.pop() {
            for nb in self.cells[c].neighbors.into_iter().flatten() {
                if !in_cavity.contains(&nb) && self.in_conflict(nb, &p) {
                    in_cavity.insert(nb);
                    cavity.push(nb);
                    stack.push(nb);
                }
            }
        }

        if let Some(dup) = cavity
            .iter()
            .flat_map(|&c| self.cells[c].vertices)
            .find(|&v| v != INFINITE && self.points[v].distance(&p) <= self.eps)
        {
            debug!("skipping point {}: duplicates point {}", index, dup);
            return Ok(false);
        }

        // Grow until every boundary face can be fanned to p
        loop {
            let mut blocked = None;
            'scan: for &c in &cavity {
                for slot in 0..4 {
                    let nb = self.cells[c].neighbors[slot];
                    if nb.is_some_and(|nb| in_cavity.contains(&nb)) {
                        continue;
                    }
                    if !self.fan_is_valid(c, slot, index, nb) {
                        blocked = Some((c, nb));
                        break 'scan;
                    }
                }
            }
            match blocked {
                None => break,
                Some((_, Some(nb))) => {
                    in_cavity.insert(nb);
                    cavity.push(nb);
                }
                Some((c, None)) => {
                    error!("cell {} has an unlinked face", c);
                    return Err(VoronoiError::Internal(format!(
                        "triangulation is open at cell {}",
                        c
                    )));
                }
            }
        }

        let mut boundary = Vec::new();
        for &c in &cavity {
            for slot in 0..4 {
                let nb = self.cells[c].neighbors[slot];
                if !nb.is_some_and(|nb| in_cavity.contains(&nb)) {
                    boundary.push((c, slot, nb));
                }
            }
        }
        if boundary.is_empty() {
            error!("cavity of point {} swallowed the whole triangulation", index);
            return Err(VoronoiError::Internal(format!(
                "cavity of point {} has no boundary",
                index
            )));
        }

        let boundary_vertices: HashSet<usize> = boundary
            .iter()
            .flat_map(|&(c, slot, _)| self.face_corners(c, slot))
            .collect();
        let lost: Vec<usize> = cavity
            .iter()
            .flat_map(|&c| self.cells[c].vertices)
            .filter(|v| *v != INFINITE && !boundary_vertices.contains(v))
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        if !lost.is_empty() {
            warn!("inserting point {} swallowed vertices {:?}", index, lost);
        }

        // Fan the boundary to p
        let mut open = HashMap::new();
        let mut newest = None;
        for &(c, slot, nb) in &boundary {
            let [a, b, d] = self.face_corners(c, slot);
            let id = self.add_cell([b, a, d, index]);
            if self.ghost_slot(id).is_none() {
                newest = Some(id);
            }

            self.cells[id].neighbors[3] = nb;
            if let Some(nb) = nb {
                let back = self.cells[nb]
                    .neighbors
                    .iter()
                    .position(|&x| x == Some(c))
                    .ok_or_else(|| {
                        VoronoiError::Internal(format!(
                            "cells {} and {} are not mutual neighbors",
                            c, nb
                        ))
                    })?;
                self.cells[nb].neighbors[back] = Some(id);
            }
            self.link_sides(id, &mut open);
        }

        if !open.is_empty() {
            error!("cavity of point {} left {} unmatched faces", index, open.len());
            return Err(VoronoiError::Internal(format!(
                "cavity boundary of point {} is not closed",
                index
            )));
        }

        for &c in &cavity {
            self.cells[c].alive = false;
        }
        if let Some(id) = newest {
            self.last = id;
        }
        Ok(true)
    }

    /// Surviving finite cells
    fn into_cells(self) -> Vec<[usize; 4]> {
        self.cells
            .into_iter()
            .filter(|c| c.alive && !c.vertices.contains(&INFINITE))
            .map(|c| c.vertices)
            .collect()
    }
}

/// Index and score of the highest-scoring point
fn farthest(points: &[Point3D], score: impl Fn(&Point3D) -> f64) -> (usize, f64) {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| (i, score(p)))
        .fold((0, f64::NEG_INFINITY), |best, cand| {
            if cand.1 > best.1 { cand } else { best }
        })
}

/// Four points spanning the cloud; fails unless it is three-dimensional
fn spanning_points(points: &[Point3D], eps: f64) -> Result<[usize; 4]> {
    let p0 = points[0];

    let (i1, d1) = farthest(points, |p| p.distance(&p0));
    if d1 <= eps {
        return Err(VoronoiError::DegenerateConfiguration);
    }
    let axis = points[i1] - p0;

    let (i2, d2) = farthest(points, |p| (*p - p0).cross(&axis).length() / d1);
    if d2 <= eps {
        return Err(VoronoiError::DegenerateConfiguration);
    }
    let normal = axis.cross(&(points[i2] - p0));
    let len = normal.length();

    let (i3, d3) = farthest(points, |p| normal.dot(&(*p - p0)).abs() / len);
    if d3 <= eps {
        return Err(VoronoiError::DegenerateConfiguration);
    }
    Ok([0, i1, i2, i3])
}

/// Delaunay tetrahedralization of a point cloud
///
/// Every tetrahedron indexes into one arena holding the input points, in
/// input order, and records its face neighbors. Exactly four points give a
/// single tetrahedron. Points duplicating an earlier point are skipped and
/// appear in no tetrahedron. The tetrahedra tile the convex hull of the
/// cloud whatever its spread, since no enclosing vertices are added.
///
/// # Errors
/// - [`VoronoiError::InsufficientPoints`] for fewer than four points
/// - [`VoronoiError::InvalidPoint`] for a non-finite coordinate
/// - [`VoronoiError::DegenerateConfiguration`] if the cloud is flat
pub fn get_delaunay(points: &[Point3D]) -> Result<Vec<Tetrahedron>> {
    if points.len() < 4 {
        return Err(VoronoiError::InsufficientPoints(points.len()));
    }
    if let Some(i) = points.iter().position(|p| !p.is_finite()) {
        return Err(VoronoiError::InvalidPoint(i));
    }

    let eps = relative_epsilon(points);
    let seed = spanning_points(points, eps)?;
    let arena: PointArena = points.to_vec().into();

    if points.len() == 4 {
        return Ok(vec![Tetrahedron::new([0, 1, 2, 3], arena)]);
    }

    let mut bw = BowyerWatson::new(points, eps, seed);
    let mut skipped = 0;
    let mut inserted = 4;
    for i in (0..points.len()).filter(|i| !seed.contains(i)) {
        if !bw.insert(i)? {
            skipped += 1;
        }
        inserted += 1;
        if inserted % 1000 == 0 {
            debug!("Delaunay: inserted {} of {} points", inserted, points.len());
        }
    }

    let cells = bw.into_cells();
    if cells.is_empty() {
        warn!("Delaunay: no finite tetrahedron in the triangulation");
        return Err(VoronoiError::DegenerateConfiguration);
    }


    let mut tetrahedra: Vec<Tetrahedron> = cells
        .into_iter()
        .map(|v| Tetrahedron::new(v, arena.clone()))
        .collect();
    link_tetrahedra(&mut tetrahedra)?;

    debug!(
        "Delaunay: {} points ({} duplicates) -> {} tetrahedra",
        points.len(),
        skipped,
        tetrahedra.len()
    );
    Ok(tetrahedra)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_points(n: usize, seed: u64) -> Vec<Point3D> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|_| {
                Point3D::new(
                    rng.random_range(-1.0..1.0),
                    rng.random_range(-1.0..1.0),
                    rng.random_range(-1.0..1.0),
                )
            })
            .collect()
    }

    fn total_volume(tets: &[Tetrahedron]) -> f64 {
        tets.iter().map(Tetrahedron::volume).sum()
    }

    #[test]
    fn test_four_points_single_tetrahedron() {
        let points = vec![
            Point3D::new(0.0, 0.0, 0.0),
            Point3D::new(0.0, 1.0, 0.0),
            Point3D::new(1.0, 0.0, 0.0),
            Point3D::new(0.0, 0.0, 1.0),
        ];
        let tets = get_delaunay(&points).unwrap();
        assert_eq!(tets.len(), 1);
        assert_eq!(tets[0].neighbors(), [None; 4]);
        assert_relative_eq!(total_volume(&tets), 1.0 / 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_bipyramid_fills_hull() {
        let points = vec![
            Point3D::new(0.0, 0.0, 0.0),
            Point3D::new(1.0, 0.0, 0.0),
            Point3D::new(0.0, 1.0, 0.0),
            Point3D::new(0.3, 0.3, 1.0),
            Point3D::new(0.3, 0.3, -1.0),
        ];
        let tets = get_delaunay(&points).unwrap();
        assert!(tets.len() == 2 || tets.len() == 3);
        assert_relative_eq!(total_volume(&tets), 1.0 / 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_empty_circumsphere() {
        let points = random_points(60, 11);
        let tets = get_delaunay(&points).unwrap();
        for tet in &tets {
            let sphere = tet.circumsphere().unwrap();
            for (i, p) in points.iter().enumerate() {
                if tet.contains_index(i) {
                    continue;
                }
                assert!(
                    !sphere.contains(p, 1e-9),
                    "point {} inside circumsphere of {:?}",
                    i,
                    tet.indices()
                );
            }
        }
    }

    #[test]
    fn test_neighbors_are_symmetric() {
        let tets = get_delaunay(&random_points(40, 3)).unwrap();
        for (t, tet) in tets.iter().enumerate() {
            for slot in 0..4 {
                if let Some(u) = tet.neighbor(slot) {
                    let back: Vec<usize> = (0..4)
                        .filter(|&k| tets[u].neighbor(k) == Some(t))
                        .collect();
                    assert_eq!(back.len(), 1);
                    assert_eq!(tets[u].face_key(back[0]), tet.face_key(slot));
                }
            }
        }
    }

    #[test]
    fn test_duplicates_are_skipped() {
        let mut points = random_points(20, 5);
        points.push(points[4]);
        let tets = get_delaunay(&points).unwrap();
        assert!(tets.iter().all(|t| !t.contains_index(20)));
    }

    #[test]
    fn test_degenerate_inputs() {
        let three = random_points(3, 1);
        assert!(matches!(
            get_delaunay(&three),
            Err(VoronoiError::InsufficientPoints(3))
        ));

        let flat: Vec<Point3D> = (0..10)
            .map(|i| Point3D::new(i as f64, (i * i % 7) as f64, 0.0))
            .collect();
        assert!(matches!(
            get_delaunay(&flat),
            Err(VoronoiError::DegenerateConfiguration)
        ));

        let mut bad = random_points(6, 2);
        bad[2].y = f64::NAN;
        assert!(matches!(get_delaunay(&bad), Err(VoronoiError::InvalidPoint(2))));
    }

    #[test]
    fn test_far_outlier_keeps_hull() {
        let mut points = random_points(80, 21);
        points.push(Point3D::new(1000.0, 0.3, 0.1));
        let tets = get_delaunay(&points).unwrap();
        for i in 0..points.len() {
            assert!(tets.iter().any(|t| t.contains_index(i)), "point {} dropped", i);
        }
        assert!(tets.iter().all(|t| t.volume() > 0.0));
        for tet in &tets {
            let sphere = tet.circumsphere().unwrap();
            for (i, p) in points.iter().enumerate() {
                if !tet.contains_index(i) {
                    assert!(!sphere.contains(p, 1e-9));
                }
            }
        }
    }

    #[test]
    fn test_lattice_fills_cube() {
        let mut points = Vec::new();
        for z in 0..3 {
            for y in 0..3 {
                for x in 0..3 {
                    points.push(Point3D::new(x as f64, y as f64, z as f64));
                }
            }
        }
        let tets = get_delaunay(&points).unwrap();
        assert_relative_eq!(total_volume(&tets), 8.0, epsilon = 1e-9);
        assert!(tets.iter().all(|t| t.volume() > 1e-9));
        assert!(tets.iter().any(|t| t.contains_index(13)));
    }
}
