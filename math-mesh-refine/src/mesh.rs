//! Helpers shared by the refinement and intersection steps

use std::collections::HashSet;

use math_geometry::intersect::triangle_plane;
use math_geometry::parallel::parallel_filter_map;
use math_geometry::{
    EdgeKey, IndexedTriangle, Point3D, PointArena, PointWelder, Triangle, Vector3D, same_arena,
};

use crate::Result;

/// Weld tolerance for intersection endpoints, relative to the mesh extent
const SEGMENT_WELD: f64 = 1e-9;

/// Sum of triangle areas
pub fn total_area(triangles: &[IndexedTriangle]) -> f64 {
    triangles.iter().map(|t| t.area()).sum()
}

/// The arena and face list of a triangle batch
///
/// `None` for an empty batch.
pub(crate) fn split_batch(
    triangles: &[IndexedTriangle],
) -> Result<Option<(PointArena, Vec<[usize; 3]>)>> {
    let Some(arena) = same_arena(triangles)? else {
        return Ok(None);
    };
    let faces = triangles.iter().map(|t| t.indices()).collect();
    Ok(Some((arena, faces)))
}

/// Area of a planar 3D polygon
pub(crate) fn polygon_area_3d(polygon: &[Point3D]) -> f64 {
    let Some(&first) = polygon.first() else {
        return 0.0;
    };
    let mut sum = Vector3D::zero();
    for w in polygon.windows(2).skip(1) {
        sum += (w[0] - first).cross(&(w[1] - first));
    }
    sum.length() / 2.0
}

/// Segments where the triangles cross `plane`
///
/// Triangles lying in the plane or only touching it at a vertex add nothing.
pub(crate) fn intersection_segments(
    triangles: &[IndexedTriangle],
    plane: &Triangle,
) -> Vec<(Point3D, Point3D)> {
    parallel_filter_map(triangles, |t| {
        triangle_plane(&t.to_triangle(), plane).segment()
    })
}

/// A polyline walked out of a [`SegmentGraph`]
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Chain {
    pub points: Vec<Point3D>,
    pub closed: bool,
}

/// Intersection segments with welded endpoints and no duplicate edges
#[derive(Debug, Clone)]
pub(crate) struct SegmentGraph {
    points: Vec<Point3D>,
    adjacency: Vec<Vec<usize>>,
    edges: Vec<EdgeKey>,
}

impl SegmentGraph {
    pub fn new(segments: &[(Point3D, Point3D)]) -> Self {
        let extent = segments
            .iter()
            .flat_map(|(a, b)| [*a, *b])
            .map(|p| p.x.abs().max(p.y.abs()).max(p.z.abs()))
            .fold(1.0_f64, f64::max);
        let mut welder = PointWelder::new(SEGMENT_WELD * extent);
        let mut seen = HashSet::new();
        let mut edges = Vec::new();
        for (a, b) in segments {
            let (i, j) = (welder.insert(*a), welder.insert(*b));
            if i != j && seen.insert(EdgeKey::new(i, j)) {
                edges.push(EdgeKey::new(i, j));
            }
        }

        let points = welder.into_points();
        let mut adjacency = vec![Vec::new(); points.len()];
        for &EdgeKey(i, j) in &edges {
            adjacency[i].push(j);
            adjacency[j].push(i);
        }
        Self {
            points,
            adjacency,
            edges,
        }
    }

    pub fn points(&self) -> &[Point3D] {
        &self.points
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns `true` if every point joins exactly two segments
    pub fn is_two_regular(&self) -> bool {
        !self.points.is_empty() && self.adjacency.iter().all(|adj| adj.len() == 2)
    }

    /// Walk every segment into head-to-tail chains
    ///
    /// Open chains are walked first, starting at points of odd degree, so
    /// they are not split in the middle. Each segment is used once.
    pub fn chains(&self) -> Vec<Chain> {
        let mut used: HashSet<EdgeKey> = HashSet::with_capacity(self.edges.len());
        let mut chains = Vec::new();

        let odd = (0..self.points.len()).filter(|&i| self.adjacency[i].len() % 2 == 1);
        let even = (0..self.points.len()).filter(|&i| self.adjacency[i].len() % 2 == 0);
        for start in odd.chain(even) {
            while let Some(chain) = self.walk_from(start, &mut used) {
                chains.push(chain);
            }
        }
        chains
    }

    fn walk_from(&self, start: usize, used: &mut HashSet<EdgeKey>) -> Option<Chain> {
        let next_unused = |from: usize, used: &mut HashSet<EdgeKey>| {
            let to = *self.adjacency[from]
                .iter()
                .find(|&&to| !used.contains(&EdgeKey::new(from, to)))?;
            used.insert(EdgeKey::new(from, to));
            Some(to)
        };

        let mut current = next_unused(start, used)?;
        let mut indices = vec![start, current];
        while current != start {
            match next_unused(current, used) {
                Some(to) => {
                    indices.push(to);
                    current = to;
                }
                None => break,
            }
        }

        let closed = current == start;
        if closed {
            indices.pop();
        }
        Some(Chain {
            points: indices.iter().map(|&i| self.points[i]).collect(),
            closed,
        })
    }
}
