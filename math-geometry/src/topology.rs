//! Neighbor linking between triangles that share edges
//!
//! Triangles live in slots addressed by a stable id. Adjacency is kept in a
//! side table (`id -> [neighbor; 3]`) instead of owning references, so
//! A ↔ B links never form ownership cycles. Edge slot `k` of a triangle
//! `[i0, i1, i2]` is the edge from corner `k` to corner `k + 1`.

use std::collections::HashMap;

/// Undirected edge key (smaller index first)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey(pub usize, pub usize);

impl EdgeKey {
    #[inline]
    pub fn new(a: usize, b: usize) -> Self {
        if a < b { EdgeKey(a, b) } else { EdgeKey(b, a) }
    }
}

/// Triangle slots plus the neighbor side table
///
/// Invariant: if triangle A stores B across one of its edges, B stores A
/// across the same two vertices. [`TriangleTopology::remove`] breaks both
/// directions before freeing the slot.
#[derive(Debug, Clone, Default)]
pub struct TriangleTopology {
    faces: Vec<[usize; 3]>,
    neighbors: Vec<[Option<usize>; 3]>,
    alive: Vec<bool>,
    alive_count: usize,
}

impl TriangleTopology {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            faces: Vec::with_capacity(capacity),
            neighbors: Vec::with_capacity(capacity),
            alive: Vec::with_capacity(capacity),
            alive_count: 0,
        }
    }

    /// Build from a face list and link every shared edge
    pub fn from_faces(faces: &[[usize; 3]]) -> Self {
        let mut topology = Self::with_capacity(faces.len());
        for face in faces {
            topology.add(*face);
        }
        topology.link_all();
        topology
    }

    /// Add an unlinked triangle, returning its id
    pub fn add(&mut self, indices: [usize; 3]) -> usize {
        let id = self.faces.len();
        self.faces.push(indices);
        self.neighbors.push([None; 3]);
        self.alive.push(true);
        self.alive_count += 1;
        id
    }

    /// Remove a triangle, clearing the back-links held by its neighbors
    pub fn remove(&mut self, id: usize) {
        if !self.is_alive(id) {
            return;
        }
        for slot in 0..3 {
            if let Some(other) = self.neighbors[id][slot].take() {
                for back in self.neighbors[other].iter_mut() {
                    if *back == Some(id) {
                        *back = None;
                    }
                }
            }
        }
        self.alive[id] = false;
        self.alive_count -= 1;
    }

    pub fn is_alive(&self, id: usize) -> bool {
        self.alive.get(id).copied().unwrap_or(false)
    }

    /// Number of live triangles
    pub fn len(&self) -> usize {
        self.alive_count
    }

    pub fn is_empty(&self) -> bool {
        self.alive_count == 0
    }

    /// Total slots ever allocated (live and removed)
    pub fn slot_count(&self) -> usize {
        self.faces.len()
    }

    pub fn indices(&self, id: usize) -> [usize; 3] {
        self.faces[id]
    }

    /// Ids of all live triangles in insertion order
    pub fn alive_ids(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.faces.len()).filter(move |&id| self.alive[id])
    }

    pub fn neighbor(&self, id: usize, slot: usize) -> Option<usize> {
        self.neighbors[id][slot]
    }

    pub fn neighbors(&self, id: usize) -> [Option<usize>; 3] {
        self.neighbors[id]
    }

    /// Directed vertex pair of an edge slot
    pub fn edge_vertices(&self, id: usize, slot: usize) -> (usize, usize) {
        let f = self.faces[id];
        (f[slot], f[(slot + 1) % 3])
    }

    /// Edge slot of `id` joining vertices `a` and `b` (either direction)
    pub fn find_edge(&self, id: usize, a: usize, b: usize) -> Option<usize> {
        let key = EdgeKey::new(a, b);
        (0..3).find(|&slot| {
            let (u, v) = self.edge_vertices(id, slot);
            EdgeKey::new(u, v) == key
        })
    }

    /// Link two triangles across the given edge slots (both directions)
    pub fn link(&mut self, a: usize, slot_a: usize, b: usize, slot_b: usize) {
        self.neighbors[a][slot_a] = Some(b);
        self.neighbors[b][slot_b] = Some(a);
    }

    /// Link every pair among `ids` that shares exactly one edge
    ///
    /// Only the listed triangles are matched against each other; slots that
    /// find no partner keep their current value. When more than two
    /// triangles share an edge, partners with opposite edge direction are
    /// paired first.
    pub fn link_among(&mut self, ids: &[usize]) {
        let mut by_edge: HashMap<EdgeKey, Vec<(usize, usize)>> = HashMap::new();
        for &id in ids {
            if !self.is_alive(id) {
                continue;
            }
            for slot in 0..3 {
                let (u, v) = self.edge_vertices(id, slot);
                by_edge.entry(EdgeKey::new(u, v)).or_default().push((id, slot));
            }
        }

        for (key, mut entries) in by_edge {
            if entries.len() < 2 {
                continue;
            }
            if entries.len() > 2 {
                log::debug!(
                    "edge ({}, {}) shared by {} triangles",
                    key.0,
                    key.1,
                    entries.len()
                );
            }
            while entries.len() >= 2 {
                let (a, slot_a) = entries.remove(0);
                let dir_a = self.edge_vertices(a, slot_a);
                let partner = entries
                    .iter()
                    .position(|&(b, slot_b)| {
                        let dir_b = self.edge_vertices(b, slot_b);
                        b != a && dir_b == (dir_a.1, dir_a.0)
                    })
                    .or_else(|| entries.iter().position(|&(b, _)| b != a));
                let Some(pos) = partner else {
                    break;
                };
                let (b, slot_b) = entries.remove(pos);
                self.link(a, slot_a, b, slot_b);
            }
        }
    }

    /// Link every live triangle against every other
    pub fn link_all(&mut self) {
        let ids: Vec<usize> = self.alive_ids().collect();
        self.link_among(&ids);
    }

    /// `(id, slot)` of every live edge without a neighbor
    pub fn open_edges(&self) -> Vec<(usize, usize)> {
        self.alive_ids()
            .flat_map(|id| {
                (0..3)
                    .filter(move |&slot| self.neighbors[id][slot].is_none())
                    .map(move |slot| (id, slot))
            })
            .collect()
    }

    /// Returns `true` if every live edge has a neighbor
    pub fn is_closed(&self) -> bool {
        self.open_edges().is_empty()
    }

    /// Verify that every link is reciprocated across the same vertex pair
    pub fn is_symmetric(&self) -> bool {
        self.alive_ids().all(|id| {
            (0..3).all(|slot| match self.neighbors[id][slot] {
                None => true,
                Some(other) => {
                    if !self.is_alive(other) {
                        return false;
                    }
                    let (u, v) = self.edge_vertices(id, slot);
                    match self.find_edge(other, u, v) {
                        Some(back) => self.neighbors[other][back] == Some(id),
                        None => false,
                    }
                }
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tetrahedron_faces() -> Vec<[usize; 3]> {
        vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]]
    }

    #[test]
    fn test_link_tetrahedron_closed() {
        let topo = TriangleTopology::from_faces(&tetrahedron_faces());
        assert_eq!(topo.len(), 4);
        assert!(topo.is_closed());
        assert!(topo.is_symmetric());
        // face 0 edge (0,2) is shared with face 2
        let slot = topo.find_edge(0, 0, 2).unwrap();
        assert_eq!(topo.neighbor(0, slot), Some(2));
    }

    #[test]
    fn test_remove_breaks_links() {
        let mut topo = TriangleTopology::from_faces(&tetrahedron_faces());
        topo.remove(3);
        assert_eq!(topo.len(), 3);
        assert!(!topo.is_closed());
        assert!(topo.is_symmetric());
        assert_eq!(topo.open_edges().len(), 3);
        for id in topo.alive_ids() {
            assert!(!topo.neighbors(id).contains(&Some(3)));
        }
    }

    #[test]
    fn test_open_strip_leaves_null_slots() {
        let topo = TriangleTopology::from_faces(&[[0, 1, 2], [2, 1, 3]]);
        assert_eq!(topo.neighbor(0, 1), Some(1));
        assert_eq!(topo.neighbor(1, 0), Some(0));
        assert_eq!(topo.open_edges().len(), 4);
    }

    #[test]
    fn test_link_among_subset() {
        let mut topo = TriangleTopology::new();
        let a = topo.add([0, 1, 2]);
        let b = topo.add([2, 1, 3]);
        let c = topo.add([3, 1, 4]);
        topo.link_among(&[a, b]);
        assert_eq!(topo.neighbor(a, 1), Some(b));
        assert!(topo.neighbors(c).iter().all(|n| n.is_none()));
        topo.link_among(&[b, c]);
        assert_eq!(topo.neighbor(b, 1), Some(c));
        assert!(topo.is_symmetric());
    }
}
