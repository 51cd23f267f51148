//! Point and attribute types

use nalgebra::{Point3, Vector3};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;

/// RGBA vertex color with floating point channels
pub type Color = [f32; 4];

/// Texture coordinate pair
pub type Uv = [f32; 2];

/// Map `-0.0` to `0.0` so that bit patterns agree with IEEE equality.
#[inline]
pub fn canonical_bits(value: f32) -> u32 {
    (value + 0.0).to_bits()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_zero_shares_bits() {
        assert_eq!(canonical_bits(-0.0), canonical_bits(0.0));
        assert_ne!(canonical_bits(1.0), canonical_bits(-1.0));
    }
}
