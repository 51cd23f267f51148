//! Source-to-world transforms

use nalgebra::{Matrix3, Matrix4, Point3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Affine transform placing a source mesh in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform3D {
    pub matrix: Matrix4<f32>,
}

impl Transform3D {
    /// Create an identity transformation
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Create a translation transformation
    pub fn translation(translation: Vector3<f32>) -> Self {
        Self {
            matrix: Matrix4::new_translation(&translation),
        }
    }

    /// Create a rotation transformation from a quaternion
    pub fn rotation(rotation: UnitQuaternion<f32>) -> Self {
        Self {
            matrix: rotation.to_homogeneous(),
        }
    }

    /// Create a uniform scaling transformation
    pub fn uniform_scaling(scale: f32) -> Self {
        Self {
            matrix: Matrix4::new_scaling(scale),
        }
    }

    /// Apply the transformation to a point
    pub fn transform_point(&self, point: &Point3<f32>) -> Point3<f32> {
        let homogeneous = self.matrix * point.to_homogeneous();
        Point3::from_homogeneous(homogeneous).unwrap_or(*point)
    }

    /// Apply the linear part of the transformation to a vector
    pub fn transform_vector(&self, vector: &Vector3<f32>) -> Vector3<f32> {
        self.linear() * vector
    }

    /// Transform a surface normal and renormalize it.
    ///
    /// Uses the inverse transpose of the linear part so non-uniform scales
    /// keep normals perpendicular to their surface.
    pub fn transform_normal(&self, normal: &Vector3<f32>) -> Vector3<f32> {
        let linear = self.linear();
        let n = match linear.try_inverse() {
            Some(inv) => inv.transpose() * normal,
            None => linear * normal,
        };
        n.try_normalize(f32::EPSILON).unwrap_or(*normal)
    }

    fn linear(&self) -> Matrix3<f32> {
        self.matrix.fixed_view::<3, 3>(0, 0).into_owned()
    }

    /// Compose this transformation with another
    pub fn compose(self, other: Self) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Check if this is approximately the identity transformation
    pub fn is_identity(&self, epsilon: f32) -> bool {
        let identity = Matrix4::identity();
        (self.matrix - identity).norm() < epsilon
    }
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::ops::Mul for Transform3D {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        self.compose(rhs)
    }
}

impl From<Matrix4<f32>> for Transform3D {
    fn from(matrix: Matrix4<f32>) -> Self {
        Self { matrix }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_translation_moves_points_not_vectors() {
        let t = Transform3D::translation(Vector3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(
            t.transform_point(&Point3::origin()),
            Point3::new(1.0, 2.0, 3.0)
        );
        assert_relative_eq!(
            t.transform_vector(&Vector3::x()),
            Vector3::x()
        );
    }

    #[test]
    fn test_rotation_normal() {
        let t = Transform3D::rotation(UnitQuaternion::from_axis_angle(&Vector3::y_axis(), FRAC_PI_2));
        let n = t.transform_normal(&Vector3::x());
        assert_relative_eq!(n, Vector3::new(0.0, 0.0, -1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_normal_under_non_uniform_scale() {
        let t = Transform3D::from(Matrix4::new_nonuniform_scaling(&Vector3::new(4.0, 1.0, 1.0)));
        // Plane x = y has normal (1, -1, 0) / sqrt(2); stretched along X it tilts toward -Y.
        let n = t.transform_normal(&Vector3::new(1.0, -1.0, 0.0).normalize());
        assert!(n.y.abs() > n.x.abs());
        assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_compose_and_identity() {
        let a = Transform3D::translation(Vector3::new(1.0, 0.0, 0.0));
        let b = Transform3D::uniform_scaling(2.0);
        let p = (a * b).transform_point(&Point3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(p, Point3::new(3.0, 2.0, 2.0));
        assert!(Transform3D::default().is_identity(1e-6));
    }
}
