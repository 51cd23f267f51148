//! Reduction strategy selection by semantic type

use crate::edge_collapse::EdgeCollapseReducer;
use crate::floor::FloorStripReducer;
use crate::graph::checked_triangles;
use crate::wall::{DegenerateFacePolicy, WallRebuildReducer};
use crate::{MeshSimplifier, ReducedMesh};
use mapgen_core::{MeshBuffers, Result, SemanticType};
use serde::{Deserialize, Serialize};

/// Settings for every reduction strategy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReducerConfig {
    /// When false every mesh passes through unchanged
    pub enable_reduction: bool,
    pub edge_collapse: EdgeCollapseReducer,
    pub floor: FloorStripReducer,
    pub wall: WallRebuildReducer,
}

impl Default for ReducerConfig {
    fn default() -> Self {
        Self {
            enable_reduction: true,
            edge_collapse: EdgeCollapseReducer::default(),
            floor: FloorStripReducer::default(),
            wall: WallRebuildReducer::default(),
        }
    }
}

impl ReducerConfig {
    pub fn disabled() -> Self {
        Self {
            enable_reduction: false,
            ..Self::default()
        }
    }

    pub fn with_target_factor(mut self, factor: f32) -> Self {
        self.edge_collapse.target_factor = factor;
        self
    }

    pub fn with_floor_epsilon(mut self, epsilon: f32) -> Self {
        self.floor.epsilon = epsilon;
        self
    }

    pub fn with_degenerate_faces(mut self, policy: DegenerateFacePolicy) -> Self {
        self.wall.on_degenerate = policy;
        self
    }
}

/// The reducer applied to one source mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeReducer {
    Identity,
    EdgeCollapse(EdgeCollapseReducer),
    FloorStrip(FloorStripReducer),
    WallRebuild(WallRebuildReducer),
}

impl TypeReducer {
    /// Select the strategy for a semantic type
    pub fn for_semantic(semantic: SemanticType, config: &ReducerConfig) -> Self {
        if !config.enable_reduction {
            return TypeReducer::Identity;
        }
        match semantic {
            SemanticType::Generic | SemanticType::Other => TypeReducer::EdgeCollapse(config.edge_collapse),
            SemanticType::Water => TypeReducer::Identity,
            SemanticType::Floor => TypeReducer::FloorStrip(config.floor),
            SemanticType::Wall => TypeReducer::WallRebuild(config.wall),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TypeReducer::Identity => "identity",
            TypeReducer::EdgeCollapse(_) => "edge_collapse",
            TypeReducer::FloorStrip(_) => "floor_strip",
            TypeReducer::WallRebuild(_) => "wall_rebuild",
        }
    }
}

impl MeshSimplifier for TypeReducer {
    fn simplify(&self, mesh: &MeshBuffers) -> Result<ReducedMesh> {
        match self {
            TypeReducer::Identity => identity(mesh),
            TypeReducer::EdgeCollapse(reducer) => reducer.simplify(mesh),
            TypeReducer::FloorStrip(reducer) => reducer.simplify(mesh),
            TypeReducer::WallRebuild(reducer) => reducer.simplify(mesh),
        }
    }
}

/// Pass the buffers through unreduced, keeping only well-formed triangles
fn identity(mesh: &MeshBuffers) -> Result<ReducedMesh> {
    let triangles = checked_triangles(mesh)?;
    let mut out = mesh.clone();
    out.indices = triangles.into_iter().flat_map(|(_, indices)| indices).collect();
    Ok(ReducedMesh::new(out))
}
