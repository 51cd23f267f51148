//! Mesh combination for generated map geometry
//!
//! Reduced source meshes are packed into groups that each fit one 16-bit
//! indexed render mesh, then concatenated into world-space buffers.

pub mod combiner;
pub mod materialize;
pub mod water;

pub use combiner::*;
pub use materialize::*;
pub use water::*;
