//! Post-combine flattening of water surfaces

use crate::materialize::CombinedMesh;
use mapgen_core::{Bounded, MeshBuffers, SemanticType};
use tracing::debug;

/// Snaps water meshes onto a single horizontal plane.
#[derive(Debug, Clone, Copy, Default)]
pub struct WaterFlattener;

impl WaterFlattener {
    pub fn new() -> Self {
        Self
    }

    /// Set every vertex height to the lowest height in the mesh.
    ///
    /// Returns the water level, or `None` for an empty mesh.
    pub fn flatten(&self, mesh: &mut MeshBuffers) -> Option<f32> {
        if mesh.positions.is_empty() {
            return None;
        }
        let (min, max) = mesh.bounding_box();
        for p in &mut mesh.positions {
            p.y = min.y;
        }
        debug!(level = min.y, range = max.y - min.y, vertices = mesh.vertex_count(), "Flattened water");
        Some(min.y)
    }

    /// Flatten every combined mesh tagged [`SemanticType::Water`]
    pub fn apply(&self, meshes: &mut [CombinedMesh]) -> usize {
        let mut flattened = 0;
        for combined in meshes.iter_mut().filter(|m| m.semantic == SemanticType::Water) {
            if self.flatten(&mut combined.mesh).is_some() {
                flattened += 1;
            }
        }
        flattened
    }
}
