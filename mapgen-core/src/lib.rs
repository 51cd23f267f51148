//! Core data structures and traits for mapgen
//!
//! This crate provides the fundamental types shared by the reduction and
//! combination stages: flat mesh buffers, semantic type tags, transforms,
//! and the common error type.

pub mod point;
pub mod mesh;
pub mod semantic;
pub mod traits;
pub mod transform;
pub mod error;

pub use point::*;
pub use mesh::*;
pub use semantic::*;
pub use traits::*;
pub use transform::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3, Matrix3, Matrix4};

/// Largest vertex count a single output mesh may hold.
///
/// The downstream renderer addresses vertices with 16-bit indices.
pub const MAX_MESH_VERTICES: usize = 65534;
