//! Error types for mapgen

use thiserror::Error;

/// Main error type for mesh reduction and combination
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Degenerate input: index count {index_count} is not a multiple of 3")]
    DegenerateInput { index_count: usize },

    #[error("Degenerate triangle {triangle}: repeated vertex index in {indices:?}")]
    DegenerateTriangle { triangle: usize, indices: [u32; 3] },

    #[error("Degenerate face with normal {normal:?}: width {width}, height {height}")]
    DegenerateFace {
        normal: [f32; 3],
        width: f32,
        height: f32,
    },

    #[error("Oversized mesh: source {source_index} has {vertex_count} vertices, capacity is {capacity}")]
    OversizedMesh {
        source_index: usize,
        vertex_count: usize,
        capacity: usize,
    },

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Result type alias for mapgen operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::DegenerateInput { index_count: 7 };
        assert!(err.to_string().contains("7"));

        let err = Error::OversizedMesh {
            source_index: 3,
            vertex_count: 70000,
            capacity: 65534,
        };
        let msg = err.to_string();
        assert!(msg.contains("70000"));
        assert!(msg.contains("65534"));
    }
}
