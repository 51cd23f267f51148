//! Edge collapse simplification
//!
//! Progressive mesh reduction after Melax: every vertex caches the neighbour
//! it is cheapest to collapse into, where the cost of moving `u` onto `v` is
//! the edge length weighted by how much the surface around `u` bends away
//! from the triangles on that edge. The globally cheapest vertex is collapsed
//! until the target vertex count is reached.

use crate::graph::{Adjacency, MeshGraph, TriangleId, VertexId};
use crate::{log_reduction, MeshSimplifier, ReducedMesh};
use mapgen_core::{Error, MeshBuffers, Result};
use priority_queue::PriorityQueue;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::time::Instant;
use tracing::debug;

/// Cost assigned to a vertex without neighbours; always collapses first.
pub const ISOLATED_VERTEX_COST: f32 = -0.01;

// ============================================================
// Vertex Cost for Priority Queue
// ============================================================

#[derive(Debug, Clone, Copy)]
struct VertexCost {
    vertex: VertexId,
    cost: f32,
}

impl PartialEq for VertexCost {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for VertexCost {}

impl PartialOrd for VertexCost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VertexCost {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap: smallest cost first, lowest id on ties
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.vertex.cmp(&self.vertex))
    }
}

/// Cost of collapsing `u` onto its neighbour `v`.
pub fn collapse_cost(graph: &MeshGraph, u: VertexId, v: VertexId) -> f32 {
    let vu = graph.vertex(u);
    let edge_length = (graph.vertex(v).position() - vu.position()).norm();

    let sides: Vec<TriangleId> = vu
        .triangles()
        .iter()
        .copied()
        .filter(|&t| graph.triangle(t).has_vertex(v))
        .collect();

    let curvature = vu
        .triangles()
        .iter()
        .map(|&t| {
            let normal = graph.triangle(t).normal;
            sides
                .iter()
                .map(|&s| (1.0 - normal.dot(&graph.triangle(s).normal)) / 2.0)
                .fold(1.0f32, f32::min)
        })
        .fold(0.0f32, f32::max);

    edge_length * curvature
}

/// Recompute and cache the cheapest collapse of `u`
fn compute_vertex_cost(graph: &mut MeshGraph, u: VertexId) -> f32 {
    let mut best: Option<(VertexId, f32)> = None;
    for &n in graph.vertex(u).neighbors() {
        let cost = collapse_cost(graph, u, n);
        if best.map_or(true, |(_, c)| cost < c) {
            best = Some((n, cost));
        }
    }

    let vertex = graph.vertex_mut(u);
    match best {
        Some((target, cost)) => {
            vertex.collapse = Some(target);
            vertex.cost = cost;
        }
        None => {
            vertex.collapse = None;
            vertex.cost = ISOLATED_VERTEX_COST;
        }
    }
    vertex.cost
}

/// Statistics from one [`EdgeCollapseReducer::reduce`] run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollapseStats {
    pub initial_vertices: usize,
    pub final_vertices: usize,
    /// Vertices merged into a neighbour
    pub collapses: usize,
    /// Vertices without neighbours dropped outright
    pub removed_isolated: usize,
}

// ============================================================
// Edge Collapse Reducer
// ============================================================

/// Greedy minimum-cost edge collapse reducer.
///
/// With `collapse_enabled` off, costs and targets are still computed but
/// nothing is collapsed and the mesh is emitted unchanged (apart from vertex
/// deduplication).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeCollapseReducer {
    pub collapse_enabled: bool,
    /// Fraction of the source vertex count to keep (0.0 to 1.0)
    pub target_factor: f32,
}

impl Default for EdgeCollapseReducer {
    fn default() -> Self {
        Self {
            collapse_enabled: true,
            target_factor: 0.9,
        }
    }
}

impl EdgeCollapseReducer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(collapse_enabled: bool, target_factor: f32) -> Self {
        Self {
            collapse_enabled,
            target_factor,
        }
    }

    pub fn with_factor(mut self, target_factor: f32) -> Self {
        self.target_factor = target_factor;
        self
    }

    pub fn with_collapse_enabled(mut self, collapse_enabled: bool) -> Self {
        self.collapse_enabled = collapse_enabled;
        self
    }

    /// Compute the cached collapse cost and target of every vertex
    pub fn compute_costs(&self, graph: &mut MeshGraph) {
        let ids: Vec<VertexId> = graph.vertex_ids().collect();
        for v in ids {
            compute_vertex_cost(graph, v);
        }
    }

    /// Collapse vertices until `target_vertex_count` live vertices remain.
    ///
    /// The graph must track neighbours ([`Adjacency::Neighbors`]).
    pub fn reduce(&self, graph: &mut MeshGraph, target_vertex_count: usize) -> CollapseStats {
        assert_eq!(
            graph.adjacency(),
            Adjacency::Neighbors,
            "edge collapse needs neighbour tracking"
        );

        let mut stats = CollapseStats {
            initial_vertices: graph.live_vertex_count(),
            ..Default::default()
        };

        self.compute_costs(graph);

        if self.collapse_enabled {
            let mut queue: PriorityQueue<VertexId, VertexCost> = graph
                .vertex_ids()
                .map(|v| {
                    let cost = graph.vertex(v).cost;
                    (v, VertexCost { vertex: v, cost })
                })
                .collect();

            while graph.live_vertex_count() > target_vertex_count {
                let Some((u, _)) = queue.pop() else {
                    break;
                };

                let target = graph.vertex(u).collapse;
                match target {
                    None => {
                        graph.remove_vertex(u);
                        stats.removed_isolated += 1;
                    }
                    Some(v)
                        if graph.vertex(v).is_removed()
                            || !graph.vertex(u).neighbors().contains(&v) =>
                    {
                        // Stale target, re-queue with a fresh one
                        let cost = compute_vertex_cost(graph, u);
                        queue.push(u, VertexCost { vertex: u, cost });
                    }
                    Some(v) => {
                        for n in self.collapse(graph, u, v) {
                            let cost = compute_vertex_cost(graph, n);
                            queue.push(n, VertexCost { vertex: n, cost });
                        }
                        stats.collapses += 1;
                    }
                }
            }
        }

        stats.final_vertices = graph.live_vertex_count();
        debug!(
            initial = stats.initial_vertices,
            target = target_vertex_count,
            remaining = stats.final_vertices,
            collapses = stats.collapses,
            isolated = stats.removed_isolated,
            enabled = self.collapse_enabled,
            "Edge collapse finished"
        );
        stats
    }

    /// Merge `u` into `v`, returning the former neighbours of `u`
    fn collapse(&self, graph: &mut MeshGraph, u: VertexId, v: VertexId) -> Vec<VertexId> {
        let neighbors: Vec<VertexId> = graph.vertex(u).neighbors().iter().copied().collect();

        let owned: Vec<TriangleId> = graph.vertex(u).triangles().to_vec();
        for &t in owned.iter().rev() {
            if graph.triangle(t).has_vertex(v) {
                graph.remove_triangle(t);
            }
        }

        let remaining: Vec<TriangleId> = graph.vertex(u).triangles().to_vec();
        for &t in remaining.iter().rev() {
            graph.replace_vertex(t, u, v);
        }

        graph.remove_vertex(u);
        neighbors
    }
}

impl MeshSimplifier for EdgeCollapseReducer {
    fn simplify(&self, mesh: &MeshBuffers) -> Result<ReducedMesh> {
        if !(0.0..=1.0).contains(&self.target_factor) {
            return Err(Error::InvalidData(format!(
                "target factor {} must be between 0.0 and 1.0",
                self.target_factor
            )));
        }

        let start = Instant::now();
        let mut graph = MeshGraph::build(mesh, Adjacency::Neighbors)?;
        let target = (mesh.vertex_count() as f32 * self.target_factor) as usize;
        self.reduce(&mut graph, target);

        let reduced = graph.to_mesh();
        log_reduction("edge_collapse", mesh, &reduced, start.elapsed());
        Ok(ReducedMesh::new(reduced))
    }
}
