//! Concatenation of a combined group into world-space buffers

use crate::combiner::CombinedGroup;
use mapgen_core::{MeshBuffers, SemanticType, Transform3D, Transformable};

/// Final buffers of one combined group
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedMesh {
    pub semantic: SemanticType,
    pub mesh: MeshBuffers,
    /// Source index and transform of every entry, in placement order
    pub sources: Vec<(usize, Transform3D)>,
}

impl CombinedGroup {
    /// Concatenate all entries into one mesh in world space.
    ///
    /// Positions and normals go through each entry's transform and indices
    /// are offset by the vertices emitted before it. An optional attribute
    /// present on any entry is emitted for all of them, zero-filled where an
    /// entry lacks it.
    pub fn materialize(self) -> CombinedMesh {
        let semantic = self.semantic();
        let vertex_count = self.vertex_count();
        let has_normals = self.entries.iter().any(|e| e.mesh.normals.is_some());
        let has_colors = self.entries.iter().any(|e| e.mesh.colors.is_some());
        let has_uvs = self.entries.iter().any(|e| e.mesh.uvs.is_some());

        let mut combined = MeshBuffers {
            positions: Vec::with_capacity(vertex_count),
            normals: has_normals.then(|| Vec::with_capacity(vertex_count)),
            colors: has_colors.then(|| Vec::with_capacity(vertex_count)),
            uvs: has_uvs.then(|| Vec::with_capacity(vertex_count)),
            indices: Vec::new(),
        };
        let mut sources = Vec::with_capacity(self.entries.len());

        for entry in self.entries {
            let mut mesh = entry.mesh;
            mesh.transform(&entry.transform);
            let offset = combined.positions.len() as u32;
            let n = mesh.vertex_count();

            if let Some(normals) = combined.normals.as_mut() {
                normals.extend((0..n).map(|i| mesh.normal(i)));
            }
            if let Some(colors) = combined.colors.as_mut() {
                colors.extend((0..n).map(|i| mesh.color(i)));
            }
            if let Some(uvs) = combined.uvs.as_mut() {
                uvs.extend((0..n).map(|i| mesh.uv(i)));
            }
            combined.positions.extend_from_slice(&mesh.positions);
            combined.indices.extend(mesh.indices.iter().map(|i| i + offset));
            sources.push((entry.source_index, entry.transform));
        }

        CombinedMesh {
            semantic,
            mesh: combined,
            sources,
        }
    }
}
