//! Greedy first-fit mesh combiner

use mapgen_core::{Error, MeshBuffers, Result, SemanticType, Transform3D, MAX_MESH_VERTICES};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Combiner settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombinerConfig {
    /// Maximum vertex count of one combined mesh
    pub capacity: usize,
    /// Only combine meshes of the same semantic type
    pub partition_by_type: bool,
}

impl Default for CombinerConfig {
    fn default() -> Self {
        Self {
            capacity: MAX_MESH_VERTICES,
            partition_by_type: true,
        }
    }
}

impl CombinerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(capacity: usize, partition_by_type: bool) -> Self {
        Self {
            capacity,
            partition_by_type,
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_partition_by_type(mut self, partition_by_type: bool) -> Self {
        self.partition_by_type = partition_by_type;
        self
    }
}

/// One reduced source mesh waiting to be combined
#[derive(Debug, Clone, PartialEq)]
pub struct CombineInput {
    /// Position of the source in the caller's batch
    pub source_index: usize,
    pub mesh: MeshBuffers,
    pub transform: Transform3D,
    pub semantic: SemanticType,
}

impl CombineInput {
    pub fn new(source_index: usize, mesh: MeshBuffers, transform: Transform3D, semantic: SemanticType) -> Self {
        Self {
            source_index,
            mesh,
            transform,
            semantic,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.mesh.vertex_count()
    }
}

/// Source meshes destined for one combined mesh
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedGroup {
    semantic: SemanticType,
    vertex_count: usize,
    pub(crate) entries: Vec<CombineInput>,
}

impl CombinedGroup {
    fn new(semantic: SemanticType) -> Self {
        Self {
            semantic,
            vertex_count: 0,
            entries: Vec::new(),
        }
    }

    /// Type tag; [`SemanticType::Generic`] once types have been mixed
    pub fn semantic(&self) -> SemanticType {
        self.semantic
    }

    /// Running vertex total of all entries
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn entries(&self) -> &[CombineInput] {
        &self.entries
    }

    pub fn source_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.iter().map(|e| e.source_index)
    }

    pub fn spare_capacity(&self, capacity: usize) -> usize {
        capacity.saturating_sub(self.vertex_count)
    }

    fn push(&mut self, item: CombineInput) {
        if item.semantic != self.semantic {
            self.semantic = SemanticType::Generic;
        }
        self.vertex_count += item.vertex_count();
        self.entries.push(item);
    }
}

/// Accumulates source meshes into capacity-bounded groups.
///
/// Each item goes into the first existing group, in creation order, that
/// accepts its type and still has room for all of its vertices. Items are
/// never reordered or split.
#[derive(Debug, Clone, Default)]
pub struct MeshCombiner {
    config: CombinerConfig,
    groups: Vec<CombinedGroup>,
}

impl MeshCombiner {
    pub fn new(config: CombinerConfig) -> Self {
        Self {
            config,
            groups: Vec::new(),
        }
    }

    pub fn config(&self) -> &CombinerConfig {
        &self.config
    }

    pub fn groups(&self) -> &[CombinedGroup] {
        &self.groups
    }

    /// Place one item, returning the index of the group it joined
    pub fn add(&mut self, item: CombineInput) -> Result<usize> {
        let count = item.vertex_count();
        let capacity = self.config.capacity;
        if count > capacity {
            return Err(Error::OversizedMesh {
                source_index: item.source_index,
                vertex_count: count,
                capacity,
            });
        }

        let partition = self.config.partition_by_type;
        let slot = self.groups.iter().position(|group| {
            (!partition || group.semantic == item.semantic) && group.vertex_count + count <= capacity
        });

        let index = match slot {
            Some(index) => index,
            None => {
                self.groups.push(CombinedGroup::new(item.semantic));
                info!(
                    group = self.groups.len() - 1,
                    semantic = %item.semantic,
                    "Opened combined group"
                );
                self.groups.len() - 1
            }
        };

        debug!(
            source = item.source_index,
            vertices = count,
            group = index,
            "Placed source mesh"
        );
        self.groups[index].push(item);
        Ok(index)
    }

    /// Hand over the accumulated groups
    pub fn finish(self) -> Vec<CombinedGroup> {
        info!(
            groups = self.groups.len(),
            wastage = wastage(&self.groups, self.config.capacity),
            "Combined meshes"
        );
        self.groups
    }

    /// Place every item in order and finish
    pub fn pack<I>(mut self, items: I) -> Result<Vec<CombinedGroup>>
    where
        I: IntoIterator<Item = CombineInput>,
    {
        for item in items {
            self.add(item)?;
        }
        Ok(self.finish())
    }
}

/// Total unused vertex capacity across `groups`
pub fn wastage(groups: &[CombinedGroup], capacity: usize) -> usize {
    groups.iter().map(|g| g.spare_capacity(capacity)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapgen_core::Point3f;

    /// Unconnected points; only the vertex count matters to the combiner
    fn item(source_index: usize, vertices: usize, semantic: SemanticType) -> CombineInput {
        let positions = (0..vertices).map(|i| Point3f::new(i as f32, 0.0, 0.0)).collect();
        CombineInput::new(
            source_index,
            MeshBuffers::from_positions_and_indices(positions, Vec::new()),
            Transform3D::identity(),
            semantic,
        )
    }

    fn sources(groups: &[CombinedGroup]) -> Vec<Vec<usize>> {
        groups.iter().map(|g| g.source_indices().collect()).collect()
    }

    #[test]
    fn test_first_fit_placement() {
        let combiner = MeshCombiner::new(CombinerConfig::new().with_capacity(10));
        let items = [6, 5, 4, 3]
            .into_iter()
            .enumerate()
            .map(|(i, n)| item(i, n, SemanticType::Generic));
        let groups = combiner.pack(items).unwrap();

        // 6+4 fills the first group; 5+3 lands in the second
        assert_eq!(sources(&groups), vec![vec![0, 2], vec![1, 3]]);
        assert_eq!(groups[0].vertex_count(), 10);
        assert_eq!(groups[1].vertex_count(), 8);
        assert_eq!(wastage(&groups, 10), 2);
    }

    #[test]
    fn test_exact_fit_is_accepted() {
        let mut combiner = MeshCombiner::new(CombinerConfig::new().with_capacity(8));
        assert_eq!(combiner.add(item(0, 5, SemanticType::Wall)).unwrap(), 0);
        assert_eq!(combiner.add(item(1, 3, SemanticType::Wall)).unwrap(), 0);
        assert_eq!(combiner.add(item(2, 1, SemanticType::Wall)).unwrap(), 1);
        assert_eq!(combiner.groups()[0].spare_capacity(8), 0);
    }

    #[test]
    fn test_partition_by_type() {
        let combiner = MeshCombiner::new(CombinerConfig::default());
        let groups = combiner
            .pack(vec![
                item(0, 10, SemanticType::Water),
                item(1, 10, SemanticType::Generic),
                item(2, 10, SemanticType::Water),
                item(3, 10, SemanticType::Floor),
            ])
            .unwrap();

        assert_eq!(sources(&groups), vec![vec![0, 2], vec![1], vec![3]]);
        let tags: Vec<_> = groups.iter().map(|g| g.semantic()).collect();
        assert_eq!(tags, [SemanticType::Water, SemanticType::Generic, SemanticType::Floor]);
    }

    #[test]
    fn test_mixed_group_becomes_generic() {
        let config = CombinerConfig::with_params(100, false);
        let groups = MeshCombiner::new(config)
            .pack(vec![
                item(0, 10, SemanticType::Water),
                item(1, 10, SemanticType::Water),
                item(2, 10, SemanticType::Wall),
            ])
            .unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].semantic(), SemanticType::Generic);

        let groups = MeshCombiner::new(config)
            .pack(vec![item(0, 10, SemanticType::Water), item(1, 10, SemanticType::Water)])
            .unwrap();
        assert_eq!(groups[0].semantic(), SemanticType::Water);
    }

    #[test]
    fn test_oversized_mesh_rejected() {
        let mut combiner = MeshCombiner::new(CombinerConfig::new().with_capacity(4));
        combiner.add(item(0, 4, SemanticType::Generic)).unwrap();
        let err = combiner.add(item(7, 5, SemanticType::Generic)).unwrap_err();
        assert_eq!(
            err,
            Error::OversizedMesh {
                source_index: 7,
                vertex_count: 5,
                capacity: 4
            }
        );
        // The failed item left no trace
        assert_eq!(combiner.groups().len(), 1);
    }

    #[test]
    fn test_default_capacity_is_16_bit_limit() {
        let config = CombinerConfig::default();
        assert_eq!(config.capacity, 65534);
        assert!(config.partition_by_type);

        let config: CombinerConfig = serde_json::from_str(r#"{ "capacity": 1000 }"#).unwrap();
        assert_eq!(config, CombinerConfig::with_params(1000, true));
    }

    #[test]
    fn test_empty_input() {
        let groups = MeshCombiner::new(CombinerConfig::default()).pack(Vec::new()).unwrap();
        assert!(groups.is_empty());
        assert_eq!(wastage(&groups, 65534), 0);
    }
}
