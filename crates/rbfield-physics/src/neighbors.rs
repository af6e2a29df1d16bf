// ─────────────────────────────────────────────────────────────────────
// RBField — Neighbor Graph
// ─────────────────────────────────────────────────────────────────────
//! Symmetric adjacency of centers whose squared distance is below a
//! cutoff. Positions never move, so the graph only changes when centers
//! are added or removed: appends extend it in O(K), removals drop it and
//! the next sweep rebuilds it in O(K²).

use crate::field::Center;
use crate::primitives::sq_dist;

/// One adjacency entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    pub dist_sq: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NeighborGraph {
    cutoff_sq: f64,
    adjacency: Vec<Vec<Neighbor>>,
}

impl NeighborGraph {
    /// Build the full graph for `centers` (pairs with d² < `cutoff_sq`).
    pub fn build(centers: &[Center], cutoff_sq: f64) -> Self {
        let mut graph = Self {
            cutoff_sq,
            adjacency: Vec::with_capacity(centers.len()),
        };
        for k in 0..centers.len() {
            graph.push(&centers[..=k]);
        }
        graph
    }

    /// Extend the graph with the last center of `centers`.
    ///
    /// `centers` must be the graph's centers plus exactly one appended entry.
    pub(crate) fn push(&mut self, centers: &[Center]) {
        let k = self.adjacency.len();
        debug_assert_eq!(centers.len(), k + 1);
        let new = centers[k].position().coords();
        let mut own = Vec::new();
        for (j, other) in centers[..k].iter().enumerate() {
            let d2 = sq_dist(new, other.position().coords());
            if d2 < self.cutoff_sq {
                own.push(Neighbor { index: j, dist_sq: d2 });
                self.adjacency[j].push(Neighbor { index: k, dist_sq: d2 });
            }
        }
        self.adjacency.push(own);
    }

    pub fn cutoff_sq(&self) -> f64 {
        self.cutoff_sq
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Neighbors of center `k`, excluding `k` itself; empty when `k` is
    /// not a node of the graph.
    #[inline]
    pub fn neighbors(&self, k: usize) -> &[Neighbor] {
        self.adjacency.get(k).map(Vec::as_slice).unwrap_or_default()
    }

    /// Mean neighbor count k̄.
    pub fn mean_degree(&self) -> f64 {
        if self.adjacency.is_empty() {
            return 0.0;
        }
        let edges: usize = self.adjacency.iter().map(Vec::len).sum();
        edges as f64 / self.adjacency.len() as f64
    }
}
