//! Mesh reduction for generated map geometry
//!
//! This crate turns raw source meshes into lighter ones before they are
//! combined:
//! - A deduplicated vertex/triangle graph ([`MeshGraph`])
//! - Curvature-driven edge collapse ([`EdgeCollapseReducer`])
//! - Floor slab stripping ([`FloorStripReducer`])
//! - Wall face rebuilding ([`WallRebuildReducer`])
//! - Dispatch by semantic type ([`TypeReducer`])

pub mod graph;
pub mod edge_collapse;
pub mod floor;
pub mod wall;
pub mod type_reducer;

pub use graph::*;
pub use edge_collapse::*;
pub use floor::*;
pub use wall::*;
pub use type_reducer::*;

use mapgen_core::{MeshBuffers, Result};
use std::time::Duration;
use tracing::info;

/// A reduced mesh together with its vertex count report
#[derive(Debug, Clone, PartialEq)]
pub struct ReducedMesh {
    pub mesh: MeshBuffers,
    pub vertex_count: usize,
}

impl ReducedMesh {
    pub fn new(mesh: MeshBuffers) -> Self {
        let vertex_count = mesh.vertex_count();
        Self { mesh, vertex_count }
    }
}

/// Reduce the complexity of a single source mesh
pub trait MeshSimplifier {
    /// Produce a reduced copy of `mesh`; the input is left untouched
    fn simplify(&self, mesh: &MeshBuffers) -> Result<ReducedMesh>;
}

pub(crate) fn log_reduction(strategy: &str, input: &MeshBuffers, output: &MeshBuffers, elapsed: Duration) {
    info!(
        strategy,
        vertices_in = input.vertex_count(),
        triangles_in = input.triangle_count(),
        vertices_out = output.vertex_count(),
        triangles_out = output.triangle_count(),
        elapsed_ms = elapsed.as_millis() as u64,
        "Reduced {}/{} to {}/{} in {}ms",
        input.vertex_count(),
        input.triangle_count(),
        output.vertex_count(),
        output.triangle_count(),
        elapsed.as_millis()
    );
}
