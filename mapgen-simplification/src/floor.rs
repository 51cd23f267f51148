//! Floor slab stripping
//!
//! Generated floor and roof meshes are closed slabs. Only the top surface is
//! ever seen, so everything near the bottom of the slab is removed.

use crate::graph::{Adjacency, MeshGraph, VertexId};
use crate::{log_reduction, MeshSimplifier, ReducedMesh};
use itertools::{Itertools, MinMaxResult};
use mapgen_core::{MeshBuffers, Result};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

/// Default height band above the slab bottom that is stripped
pub const DEFAULT_FLOOR_EPSILON: f32 = 2.0;

/// Removes the invisible underside of floor meshes.
///
/// Every vertex at or below `min_y + epsilon` is killed along with its
/// triangles. A mesh whose whole height range is inside that band is a
/// single slab and is left alone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloorStripReducer {
    pub epsilon: f32,
}

impl Default for FloorStripReducer {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_FLOOR_EPSILON,
        }
    }
}

impl FloorStripReducer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_epsilon(epsilon: f32) -> Self {
        Self { epsilon }
    }

    /// Kill the bottom band of the graph, returning the number of vertices killed
    pub fn strip(&self, graph: &mut MeshGraph) -> usize {
        let heights = graph
            .live_vertex_ids()
            .map(|v| graph.vertex(v).position().y)
            .minmax_by(|a, b| a.total_cmp(b));
        let (min_y, max_y) = match heights {
            MinMaxResult::NoElements => return 0,
            MinMaxResult::OneElement(y) => (y, y),
            MinMaxResult::MinMax(lo, hi) => (lo, hi),
        };

        let cutoff = min_y + self.epsilon;
        if max_y <= cutoff {
            debug!(min_y, max_y, epsilon = self.epsilon, "Floor mesh is a single slab, nothing to strip");
            return 0;
        }

        let doomed: Vec<VertexId> = graph
            .live_vertex_ids()
            .filter(|&v| graph.vertex(v).position().y <= cutoff)
            .collect();
        for &v in &doomed {
            graph.kill_vertex(v);
        }

        debug!(
            killed = doomed.len(),
            remaining = graph.live_vertex_count(),
            min_y,
            max_y,
            "Stripped floor underside"
        );
        doomed.len()
    }
}

impl MeshSimplifier for FloorStripReducer {
    fn simplify(&self, mesh: &MeshBuffers) -> Result<ReducedMesh> {
        let start = Instant::now();
        let mut graph = MeshGraph::build(mesh, Adjacency::Triangles)?;
        self.strip(&mut graph);

        let reduced = graph.to_mesh();
        log_reduction("floor_strip", mesh, &reduced, start.elapsed());
        Ok(ReducedMesh::new(reduced))
    }
}
