//! # mapgen
//!
//! Mesh reduction and combination for procedurally generated maps.
//!
//! This is the umbrella crate that ties the workspace together. Use it to get
//! everything in one place, or depend on the individual crates for more
//! granular control over dependencies.
//!
//! ## Crates
//!
//! - **Core**: Mesh buffers, semantic tags, transforms and the error type
//! - **Simplification**: The vertex/triangle graph and per-type reducers
//! - **Combine**: First-fit packing into 16-bit indexed meshes and water flattening
//!
//! ## Quick Start
//!
//! ```rust
//! use mapgen::prelude::*;
//!
//! let quad = MeshBuffers::from_positions_and_indices(
//!     vec![
//!         Point3f::new(0.0, 0.0, 0.0),
//!         Point3f::new(0.0, 0.0, 1.0),
//!         Point3f::new(1.0, 0.0, 0.0),
//!         Point3f::new(1.0, 0.0, 1.0),
//!     ],
//!     vec![0, 1, 2, 2, 1, 3],
//! );
//! let sources = vec![SourceMesh::new("pond", quad, Transform3D::identity(), SemanticType::Water)];
//!
//! let output = ExportBatch::new(ExportConfig::default()).run(&sources).unwrap();
//! assert_eq!(output.meshes.len(), 1);
//! assert_eq!(output.meshes[0].mesh.vertex_count(), 4);
//! ```

// Re-export core functionality
pub use mapgen_core::*;

// Re-export sub-crates
pub use mapgen_combine as combine;
pub use mapgen_simplification as simplification;

pub mod export;

pub use export::*;

/// Convenient imports for common use cases
pub mod prelude {
    pub use mapgen_core::*;

    pub use mapgen_simplification::{
        DegenerateFacePolicy, EdgeCollapseReducer, FloorStripReducer, MeshSimplifier, ReducedMesh,
        ReducerConfig, TypeReducer, WallRebuildReducer,
    };

    pub use mapgen_combine::{
        wastage, CombineInput, CombinedGroup, CombinedMesh, CombinerConfig, MeshCombiner, WaterFlattener,
    };

    pub use crate::export::*;
}
