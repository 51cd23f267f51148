//! Flat mesh buffers exchanged with the host

use crate::error::{Error, Result};
use crate::point::*;
use serde::{Deserialize, Serialize};

/// A triangle mesh stored as flat, renderer-shaped buffers.
///
/// `indices` holds consecutive triples, one per triangle. Optional attribute
/// buffers, when present, have one entry per position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshBuffers {
    pub positions: Vec<Point3f>,
    pub normals: Option<Vec<Vector3f>>,
    pub colors: Option<Vec<Color>>,
    pub uvs: Option<Vec<Uv>>,
    pub indices: Vec<u32>,
}

impl MeshBuffers {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            positions: Vec::new(),
            normals: None,
            colors: None,
            uvs: None,
            indices: Vec::new(),
        }
    }

    /// Create a mesh from positions and a flat index list
    pub fn from_positions_and_indices(positions: Vec<Point3f>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            normals: None,
            colors: None,
            uvs: None,
            indices,
        }
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Get the number of complete index triples
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.indices.is_empty()
    }

    /// Iterate over complete index triples
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Set vertex normals
    pub fn set_normals(&mut self, normals: Vec<Vector3f>) {
        if normals.len() == self.positions.len() {
            self.normals = Some(normals);
        }
    }

    /// Set vertex colors
    pub fn set_colors(&mut self, colors: Vec<Color>) {
        if colors.len() == self.positions.len() {
            self.colors = Some(colors);
        }
    }

    /// Set texture coordinates
    pub fn set_uvs(&mut self, uvs: Vec<Uv>) {
        if uvs.len() == self.positions.len() {
            self.uvs = Some(uvs);
        }
    }

    /// Normal of vertex `i`, zero when the mesh carries no normals
    pub fn normal(&self, i: usize) -> Vector3f {
        self.normals.as_ref().map_or_else(Vector3f::zeros, |n| n[i])
    }

    /// Color of vertex `i`, zero when the mesh carries no colors
    pub fn color(&self, i: usize) -> Color {
        self.colors.as_ref().map_or([0.0; 4], |c| c[i])
    }

    /// Texture coordinate of vertex `i`, zero when the mesh carries no uvs
    pub fn uv(&self, i: usize) -> Uv {
        self.uvs.as_ref().map_or([0.0; 2], |u| u[i])
    }

    /// Check attribute buffer lengths and index ranges.
    ///
    /// Does not check the index count; see [`MeshBuffers::triangles`].
    pub fn validate(&self) -> Result<()> {
        let n = self.positions.len();
        let check_len = |name: &str, len: Option<usize>| match len {
            Some(len) if len != n => Err(Error::InvalidData(format!(
                "{name} buffer has {len} entries for {n} positions"
            ))),
            _ => Ok(()),
        };
        check_len("normal", self.normals.as_ref().map(Vec::len))?;
        check_len("color", self.colors.as_ref().map(Vec::len))?;
        check_len("uv", self.uvs.as_ref().map(Vec::len))?;

        if let Some(&bad) = self.indices.iter().find(|&&i| i as usize >= n) {
            return Err(Error::InvalidData(format!(
                "index {bad} out of range for {n} positions"
            )));
        }
        Ok(())
    }

    /// Indices narrowed to the 16-bit format used by the renderer
    pub fn indices_u16(&self) -> Result<Vec<u16>> {
        self.indices
            .iter()
            .map(|&i| {
                u16::try_from(i).map_err(|_| {
                    Error::InvalidData(format!("index {i} does not fit a 16-bit index buffer"))
                })
            })
            .collect()
    }

    /// Calculate face normals
    pub fn calculate_face_normals(&self) -> Vec<Vector3f> {
        self.triangles()
            .map(|[a, b, c]| {
                let v0 = self.positions[a as usize];
                let v1 = self.positions[b as usize];
                let v2 = self.positions[c as usize];

                let edge1 = v1 - v0;
                let edge2 = v2 - v0;

                edge1
                    .cross(&edge2)
                    .try_normalize(f32::EPSILON)
                    .unwrap_or_else(Vector3f::zeros)
            })
            .collect()
    }
}

impl Default for MeshBuffers {
    fn default() -> Self {
        Self::new()
    }
}
