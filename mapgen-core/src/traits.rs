//! Core traits for mapgen

use crate::{mesh::MeshBuffers, point::*, transform::Transform3D};

/// Trait for objects with an axis-aligned extent
pub trait Bounded {
    /// Get the bounding box of the object
    fn bounding_box(&self) -> (Point3f, Point3f);

    /// Get the center point of the object
    fn center(&self) -> Point3f {
        let (min, max) = self.bounding_box();
        Point3f::new(
            (min.x + max.x) / 2.0,
            (min.y + max.y) / 2.0,
            (min.z + max.z) / 2.0,
        )
    }
}

/// Trait for objects that can be transformed
pub trait Transformable {
    /// Apply a transformation to the object
    fn transform(&mut self, transform: &Transform3D);
}

impl Bounded for MeshBuffers {
    fn bounding_box(&self) -> (Point3f, Point3f) {
        if self.positions.is_empty() {
            return (Point3f::origin(), Point3f::origin());
        }

        let mut min = self.positions[0];
        let mut max = self.positions[0];

        for vertex in &self.positions {
            min.x = min.x.min(vertex.x);
            min.y = min.y.min(vertex.y);
            min.z = min.z.min(vertex.z);

            max.x = max.x.max(vertex.x);
            max.y = max.y.max(vertex.y);
            max.z = max.z.max(vertex.z);
        }

        (min, max)
    }
}

impl Transformable for MeshBuffers {
    fn transform(&mut self, transform: &Transform3D) {
        for p in &mut self.positions {
            *p = transform.transform_point(p);
        }
        if let Some(normals) = self.normals.as_mut() {
            for n in normals.iter_mut() {
                *n = transform.transform_normal(n);
            }
        }
    }
}
