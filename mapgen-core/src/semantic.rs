//! Semantic classification of source meshes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a source mesh in the generated map.
///
/// The tag is supplied by the caller and selects the reduction strategy
/// applied to the mesh and the combined group it may join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SemanticType {
    /// Plain geometry (roads, building bodies, props)
    Generic,
    /// Water surfaces, flattened after combining
    Water,
    /// Floor and roof slabs with an invisible underside
    Floor,
    /// Vertical walls tessellated as many coplanar triangles
    Wall,
    /// Anything the caller could not classify
    #[default]
    Other,
}

impl SemanticType {
    /// All semantic types, in declaration order
    pub const ALL: [SemanticType; 5] = [
        SemanticType::Generic,
        SemanticType::Water,
        SemanticType::Floor,
        SemanticType::Wall,
        SemanticType::Other,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SemanticType::Generic => "generic",
            SemanticType::Water => "water",
            SemanticType::Floor => "floor",
            SemanticType::Wall => "wall",
            SemanticType::Other => "other",
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
