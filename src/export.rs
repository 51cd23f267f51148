//! Batch driver turning tagged source meshes into combined render meshes

use mapgen_combine::{wastage, CombineInput, CombinedGroup, CombinedMesh, CombinerConfig, MeshCombiner, WaterFlattener};
use mapgen_core::{MeshBuffers, Result, SemanticType, Transform3D};
use mapgen_simplification::{MeshSimplifier, ReducerConfig, TypeReducer};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{info, warn};

/// Name prefix of helper nodes that carry no visible geometry
pub const INFO_NODE_PREFIX: &str = "info Node";

/// Settings for one export batch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub reducer: ReducerConfig,
    pub combiner: CombinerConfig,
    /// Drop sources whose name starts with [`INFO_NODE_PREFIX`]
    pub filter_info_nodes: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            reducer: ReducerConfig::default(),
            combiner: CombinerConfig::default(),
            filter_info_nodes: true,
        }
    }
}

impl ExportConfig {
    pub fn with_reducer(mut self, reducer: ReducerConfig) -> Self {
        self.reducer = reducer;
        self
    }

    pub fn with_combiner(mut self, combiner: CombinerConfig) -> Self {
        self.combiner = combiner;
        self
    }

    pub fn with_filter_info_nodes(mut self, filter_info_nodes: bool) -> Self {
        self.filter_info_nodes = filter_info_nodes;
        self
    }
}

/// A named, tagged mesh placed in the world
#[derive(Debug, Clone, PartialEq)]
pub struct SourceMesh {
    pub name: String,
    pub mesh: MeshBuffers,
    pub transform: Transform3D,
    pub semantic: SemanticType,
}

impl SourceMesh {
    pub fn new(name: impl Into<String>, mesh: MeshBuffers, transform: Transform3D, semantic: SemanticType) -> Self {
        Self {
            name: name.into(),
            mesh,
            transform,
            semantic,
        }
    }

    pub fn is_info_node(&self) -> bool {
        self.name.starts_with(INFO_NODE_PREFIX)
    }
}

/// Result of one export batch
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOutput {
    pub meshes: Vec<CombinedMesh>,
    /// Unused vertex capacity summed over all combined meshes
    pub wastage: usize,
}

/// Reduces, combines and post-processes one batch of source meshes.
///
/// Sources are reduced in parallel and then packed in their original order,
/// so the output does not depend on thread scheduling. The source index
/// recorded in each [`CombinedMesh`] is the position in the input slice.
/// When several sources fail to reduce, the error of the first one in input
/// order is returned.
#[derive(Debug, Clone, Default)]
pub struct ExportBatch {
    config: ExportConfig,
}

impl ExportBatch {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn run(&self, sources: &[SourceMesh]) -> Result<ExportOutput> {
        let start = Instant::now();

        let kept: Vec<(usize, &SourceMesh)> = sources
            .iter()
            .enumerate()
            .filter(|(index, source)| {
                let skip = self.config.filter_info_nodes && source.is_info_node();
                if skip {
                    warn!(source = index, name = %source.name, "Skipping info node");
                }
                !skip
            })
            .collect();

        let results: Vec<Result<CombineInput>> = kept
            .par_iter()
            .map(|&(index, source)| self.reduce(index, source))
            .collect();
        let reduced = results.into_iter().collect::<Result<Vec<_>>>()?;

        let capacity = self.config.combiner.capacity;
        let groups = MeshCombiner::new(self.config.combiner).pack(reduced)?;
        let wastage = wastage(&groups, capacity);

        let mut meshes: Vec<CombinedMesh> = groups.into_iter().map(CombinedGroup::materialize).collect();
        let flattened = WaterFlattener::new().apply(&mut meshes);

        info!(
            sources = sources.len(),
            reduced = kept.len(),
            meshes = meshes.len(),
            water = flattened,
            wastage,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Exported {} sources into {} meshes, wastage {}",
            kept.len(),
            meshes.len(),
            wastage
        );
        Ok(ExportOutput { meshes, wastage })
    }

    fn reduce(&self, index: usize, source: &SourceMesh) -> Result<CombineInput> {
        let reducer = TypeReducer::for_semantic(source.semantic, &self.config.reducer);
        let reduced = reducer.simplify(&source.mesh).map_err(|err| {
            warn!(
                source = index,
                name = %source.name,
                strategy = reducer.name(),
                "Reduction failed: {err}"
            );
            err
        })?;
        Ok(CombineInput::new(index, reduced.mesh, source.transform, source.semantic))
    }
}
