//! Subdivision of triangles with over-long edges
//!
//! Each triangle longer than the threshold is cut by one of three fixed
//! patterns, picked by the ratio of its shortest to its longest edge:
//!
//! | shortest / longest | edges bisected | children |
//! |--------------------|----------------|----------|
//! | > 0.75             | all three      | 4        |
//! | < 0.33             | two longest    | 3        |
//! | otherwise          | longest        | 2        |
//!
//! Children are cut again until short enough or `max_passes` deep. New
//! points are cached per edge, so two triangles sharing an edge always share
//! its split point. A final pass re-cuts every triangle whose edge was split
//! by a neighbor, which leaves no T-junctions behind.

use std::collections::HashMap;

use log::debug;
use math_geometry::{EdgeKey, IndexedTriangle, Point3D, Vector3D};

use crate::mesh::split_batch;
use crate::smooth::BezierMidpoints;
use crate::Result;

/// Ratio above which all three edges are bisected
const EQUILATERAL_RATIO: f64 = 0.75;
/// Ratio below which the two longest edges are bisected
const SKINNY_RATIO: f64 = 0.33;

/// Places the new point on a split edge
pub(crate) trait EdgeSplitter {
    /// Point splitting edge `a`–`b`; it is stored at `points.len()`
    fn split(&mut self, points: &[Point3D], a: usize, b: usize) -> Point3D;
}

/// Straight edge midpoints
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct LinearMidpoints;

impl EdgeSplitter for LinearMidpoints {
    fn split(&mut self, points: &[Point3D], a: usize, b: usize) -> Point3D {
        points[a].midpoint(&points[b])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pattern {
    Longest,
    TwoLongest,
    All,
}

fn choose_pattern(lengths: [f64; 3]) -> Pattern {
    let longest = lengths.iter().copied().fold(0.0, f64::max);
    let shortest = lengths.iter().copied().fold(f64::INFINITY, f64::min);
    let ratio = if longest > 0.0 { shortest / longest } else { 1.0 };
    if ratio > EQUILATERAL_RATIO {
        Pattern::All
    } else if ratio < SKINNY_RATIO {
        Pattern::TwoLongest
    } else {
        Pattern::Longest
    }
}

struct Slicer<S> {
    points: Vec<Point3D>,
    midpoints: HashMap<EdgeKey, usize>,
    splitter: S,
    max_edge_sq: f64,
    max_passes: usize,
}

impl<S: EdgeSplitter> Slicer<S> {
    fn edge_lengths_sq(&self, face: [usize; 3]) -> [f64; 3] {
        let p = face.map(|i| self.points[i]);
        [
            p[0].distance_squared(&p[1]),
            p[1].distance_squared(&p[2]),
            p[2].distance_squared(&p[0]),
        ]
    }

    fn normal(&self, face: [usize; 3]) -> Vector3D {
        let [a, b, c] = face.map(|i| self.points[i]);
        (b - a).cross(&(c - a))
    }

    fn midpoint(&mut self, a: usize, b: usize) -> usize {
        let key = EdgeKey::new(a, b);
        if let Some(&m) = self.midpoints.get(&key) {
            return m;
        }
        let (lo, hi) = (key.0, key.1);
        let p = self.splitter.split(&self.points, lo, hi);
        let index = self.points.len();
        self.points.push(p);
        self.midpoints.insert(key, index);
        index
    }

    /// Cut `face` along the edges flagged in `split`, using `mid` for each
    ///
    /// Children keep the winding of the parent.
    fn cut(&self, face: [usize; 3], split: [bool; 3], mid: [usize; 3]) -> Vec<[usize; 3]> {
        let count = split.iter().filter(|&&s| s).count();
        let rotation = match count {
            1 => split.iter().position(|&s| s).unwrap_or(0),
            2 => (split.iter().position(|&s| !s).unwrap_or(2) + 1) % 3,
            _ => 0,
        };
        let v = [0, 1, 2].map(|k| face[(k + rotation) % 3]);
        let m = [0, 1, 2].map(|k| mid[(k + rotation) % 3]);

        match count {
            0 => vec![face],
            1 => vec![[v[0], m[0], v[2]], [m[0], v[1], v[2]]],
            2 => {
                let tip = [m[0], v[1], m[1]];
                // Quad v0 m0 m1 v2, cut along its shorter diagonal
                let d_v0_m1 = self.points[v[0]].distance_squared(&self.points[m[1]]);
                let d_m0_v2 = self.points[m[0]].distance_squared(&self.points[v[2]]);
                if d_v0_m1 <= d_m0_v2 {
                    vec![tip, [v[0], m[0], m[1]], [v[0], m[1], v[2]]]
                } else {
                    vec![tip, [v[0], m[0], v[2]], [m[0], m[1], v[2]]]
                }
            }
            _ => vec![
                [v[0], m[0], m[2]],
                [m[0], v[1], m[1]],
                [m[2], m[1], v[2]],
                [m[0], m[1], m[2]],
            ],
        }
    }

    /// Flip children whose normal turned against the parent's
    fn orient(&self, children: &mut [[usize; 3]], parent: Vector3D) {
        for child in children.iter_mut() {
            if self.normal(*child).dot(&parent) < 0.0 {
                child.swap(1, 2);
            }
        }
    }

    /// Subdivide one input triangle down to the edge limit
    fn subdivide(&mut self, face: [usize; 3], out: &mut Vec<[usize; 3]>) {
        let parent = self.normal(face);
        let mut stack = vec![(face, 0usize)];
        while let Some((f, depth)) = stack.pop() {
            let lengths = self.edge_lengths_sq(f);
            let longest = lengths.iter().copied().fold(0.0, f64::max);
            if depth >= self.max_passes || longest <= self.max_edge_sq {
                out.push(f);
                continue;
            }

            let split = match choose_pattern(lengths.map(f64::sqrt)) {
                Pattern::All => [true; 3],
                Pattern::Longest => {
                    let k = longest_slot(lengths);
                    [k == 0, k == 1, k == 2]
                }
                Pattern::TwoLongest => {
                    let k = shortest_slot(lengths);
                    [k != 0, k != 1, k != 2]
                }
            };
            let mut mid = [usize::MAX; 3];
            for k in 0..3 {
                if split[k] {
                    mid[k] = self.midpoint(f[k], f[(k + 1) % 3]);
                }
            }
            let mut children = self.cut(f, split, mid);
            self.orient(&mut children, parent);
            stack.extend(children.into_iter().rev().map(|c| (c, depth + 1)));
        }
    }

    /// Re-cut faces whose edges were split by a neighbor until none remain
    fn conform(&self, faces: Vec<[usize; 3]>) -> (Vec<[usize; 3]>, usize) {
        let mut recut = 0;
        let mut pending = faces;
        let mut done = Vec::with_capacity(pending.len());
        while let Some(f) = pending.pop() {
            let mut split = [false; 3];
            let mut mid = [usize::MAX; 3];
            for k in 0..3 {
                if let Some(&m) = self.midpoints.get(&EdgeKey::new(f[k], f[(k + 1) % 3])) {
                    split[k] = true;
                    mid[k] = m;
                }
            }
            if !split.iter().any(|&s| s) {
                done.push(f);
                continue;
            }
            recut += 1;
            let mut children = self.cut(f, split, mid);
            self.orient(&mut children, self.normal(f));
            pending.extend(children);
        }
        (done, recut)
    }
}

fn longest_slot(lengths: [f64; 3]) -> usize {
    (0..3)
        .max_by(|&a, &b| lengths[a].total_cmp(&lengths[b]))
        .unwrap_or(0)
}

fn shortest_slot(lengths: [f64; 3]) -> usize {
    (0..3)
        .min_by(|&a, &b| lengths[a].total_cmp(&lengths[b]))
        .unwrap_or(0)
}

fn slice_with<S: EdgeSplitter>(
    points: Vec<Point3D>,
    faces: &[[usize; 3]],
    splitter: S,
    max_edge_length: f64,
    max_passes: usize,
) -> Vec<IndexedTriangle> {
    let original = points.len();
    let mut slicer = Slicer {
        points,
        midpoints: HashMap::new(),
        splitter,
        max_edge_sq: max_edge_length * max_edge_length,
        max_passes,
    };

    let mut sliced = Vec::with_capacity(faces.len() * 4);
    for &face in faces {
        slicer.subdivide(face, &mut sliced);
    }
    let (conforming, recut) = slicer.conform(sliced);

    debug!(
        "slicing: {} -> {} triangles, {} new points, {} re-cut for conformity",
        faces.len(),
        conforming.len(),
        slicer.points.len() - original,
        recut
    );
    IndexedTriangle::batch(slicer.points, &conforming)
}

fn check_max_edge(max_edge_length: f64) -> Result<()> {
    if max_edge_length.is_finite() && max_edge_length > 0.0 {
        Ok(())
    } else {
        Err(crate::RefineError::InvalidConfig(format!(
            "max_edge_length must be positive, got {}",
            max_edge_length
        )))
    }
}

/// Subdivide triangles with an edge longer than `max_edge_length`
///
/// New points are edge midpoints, so the surface, its area and its boundary
/// are unchanged. The output shares one new arena holding the input points
/// at their original indices followed by the new points. Triangles must
/// share one arena.
pub fn slice_large_triangles(
    triangles: &[IndexedTriangle],
    max_edge_length: f64,
    max_passes: usize,
) -> Result<Vec<IndexedTriangle>> {
    check_max_edge(max_edge_length)?;
    let Some((arena, faces)) = split_batch(triangles)? else {
        return Ok(Vec::new());
    };
    Ok(slice_with(
        arena.to_vec(),
        &faces,
        LinearMidpoints,
        max_edge_length,
        max_passes,
    ))
}

/// Like [`slice_large_triangles`], placing new points on curved edges
///
/// Every edge becomes a cubic Bezier curve whose inner control points lie
/// on the tangent planes of its end vertices, so subdividing a faceted
/// approximation of a smooth surface moves it toward that surface. Flat
/// regions stay flat.
pub fn slice_large_triangles_smooth(
    triangles: &[IndexedTriangle],
    max_edge_length: f64,
    max_passes: usize,
) -> Result<Vec<IndexedTriangle>> {
    check_max_edge(max_edge_length)?;
    let Some((arena, faces)) = split_batch(triangles)? else {
        return Ok(Vec::new());
    };
    let splitter = BezierMidpoints::new(&arena, &faces);
    Ok(slice_with(
        arena.to_vec(),
        &faces,
        splitter,
        max_edge_length,
        max_passes,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::total_area;
    use approx::assert_relative_eq;
    use math_geometry::TriangleTopology;

    fn right_triangle(size: f64) -> Vec<IndexedTriangle> {
        IndexedTriangle::batch(
            vec![
                Point3D::new(0.0, 0.0, 0.0),
                Point3D::new(size, 0.0, 0.0),
                Point3D::new(0.0, size, 0.0),
            ],
            &[[0, 1, 2]],
        )
    }

    #[test]
    fn test_pattern_choice() {
        assert_eq!(choose_pattern([1.0, 1.0, 1.0]), Pattern::All);
        assert_eq!(choose_pattern([1.0, 0.6, 0.8]), Pattern::Longest);
        assert_eq!(choose_pattern([1.0, 0.2, 0.9]), Pattern::TwoLongest);
    }

    #[test]
    fn test_short_triangles_untouched() {
        let tris = right_triangle(1.0);
        let out = slice_large_triangles(&tris, 2.0, 3).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].indices(), [0, 1, 2]);
    }

    #[test]
    fn test_zero_passes_is_identity() {
        let out = slice_large_triangles(&right_triangle(10.0), 0.5, 0).unwrap();
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_wide_base_splits_in_two() {
        // Edges 2, sqrt(2), sqrt(2): ratio 0.707
        let tris = right_triangle(2.0f64.sqrt());
        let out = slice_large_triangles(&tris, 1.9, 1).unwrap();
        assert_eq!(out.len(), 2);
        assert_relative_eq!(total_area(&out), 1.0, epsilon = 1e-12);
        assert_eq!(out[0].all_points().len(), 4);
    }

    #[test]
    fn test_children_keep_orientation() {
        let tris = right_triangle(4.0);
        let out = slice_large_triangles(&tris, 1.0, 4).unwrap();
        assert!(out.len() > 4);
        for t in &out {
            assert!(t.normal().z > 0.0);
            assert!(t.area() > 0.0);
        }
        assert_relative_eq!(total_area(&out), 8.0, epsilon = 1e-9);
    }

    #[test]
    fn test_shared_edge_stays_conforming() {
        // A large and a small triangle sharing the diagonal of a square
        let tris = IndexedTriangle::batch(
            vec![
                Point3D::new(0.0, 0.0, 0.0),
                Point3D::new(3.0, 0.0, 0.0),
                Point3D::new(3.0, 3.0, 0.0),
                Point3D::new(0.0, 3.0, 0.0),
            ],
            &[[0, 1, 2], [0, 2, 3]],
        );
        let out = slice_large_triangles(&tris, 1.0, 2).unwrap();
        let faces: Vec<[usize; 3]> = out.iter().map(|t| t.indices()).collect();
        let topology = TriangleTopology::from_faces(&faces);
        // Only the square's own four sides are open
        let open = topology.open_edges();
        let open_length: f64 = open
            .iter()
            .map(|&(id, slot)| {
                let (a, b) = topology.edge_vertices(id, slot);
                out[0].all_points()[a].distance(&out[0].all_points()[b])
            })
            .sum();
        assert_relative_eq!(open_length, 12.0, epsilon = 1e-9);
        assert!(topology.is_symmetric());
        assert_relative_eq!(total_area(&out), 9.0, epsilon = 1e-9);
    }

    #[test]
    fn test_invalid_edge_length() {
        assert!(slice_large_triangles(&right_triangle(1.0), 0.0, 3).is_err());
        assert!(slice_large_triangles(&[], 1.0, 3).unwrap().is_empty());
    }
}
