//! Math utilities and types
//!
//! Provides the fundamental math types used by the draw and particle
//! subsystems, built on nalgebra.

pub use nalgebra::{
    Matrix3, Matrix4, Quaternion, Unit, Vector2, Vector3, Vector4,
};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Transform representing position, rotation, and scale
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Convert to a transformation matrix
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Rotate a vector by this transform's rotation (no translation or scale)
    pub fn rotate_vector(&self, vector: Vec3) -> Vec3 {
        self.rotation * vector
    }

    /// Interpolate between two transforms
    ///
    /// Position and scale are interpolated linearly, rotation is slerped.
    /// Used to reconstruct mid-frame emitter poses so particles spawned
    /// between two observed transforms get a smoothly interpolated origin.
    pub fn interpolate(from: &Self, to: &Self, alpha: f32) -> Self {
        let alpha = alpha.clamp(0.0, 1.0);
        Self {
            position: from.position.lerp(&to.position, alpha),
            rotation: from.rotation.slerp(&to.rotation, alpha),
            scale: from.scale.lerp(&to.scale, alpha),
        }
    }
}

/// Axis-Aligned Bounding Box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// An AABB containing only the given point
    pub fn from_point(point: Vec3) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Grow the AABB to contain a point
    pub fn expand_to_point(&mut self, point: Vec3) {
        self.min = self.min.inf(&point);
        self.max = self.max.sup(&point);
    }

    /// Check if this AABB contains a point
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_transform_interpolate_endpoints() {
        let a = Transform::from_position(Vec3::new(0.0, 0.0, 0.0));
        let b = Transform::from_position(Vec3::new(10.0, 0.0, 0.0));

        let at_start = Transform::interpolate(&a, &b, 0.0);
        let at_end = Transform::interpolate(&a, &b, 1.0);
        let mid = Transform::interpolate(&a, &b, 0.5);

        assert_relative_eq!(at_start.position.x, 0.0);
        assert_relative_eq!(at_end.position.x, 10.0);
        assert_relative_eq!(mid.position.x, 5.0);
    }

    #[test]
    fn test_transform_interpolate_clamps_alpha() {
        let a = Transform::from_position(Vec3::new(0.0, 0.0, 0.0));
        let b = Transform::from_position(Vec3::new(10.0, 0.0, 0.0));

        let before = Transform::interpolate(&a, &b, -1.0);
        let after = Transform::interpolate(&a, &b, 2.0);

        assert_relative_eq!(before.position.x, 0.0);
        assert_relative_eq!(after.position.x, 10.0);
    }

    #[test]
    fn test_aabb_expand_to_point() {
        let mut aabb = Aabb::from_point(Vec3::new(1.0, 1.0, 1.0));
        aabb.expand_to_point(Vec3::new(-2.0, 0.5, 3.0));

        assert_relative_eq!(aabb.min.x, -2.0);
        assert_relative_eq!(aabb.min.y, 0.5);
        assert_relative_eq!(aabb.max.x, 1.0);
        assert_relative_eq!(aabb.max.z, 3.0);
        assert!(aabb.contains_point(Vec3::new(0.0, 0.75, 2.0)));
        assert!(!aabb.contains_point(Vec3::new(0.0, 0.0, 4.0)));
    }
}
