//! Pose snapshots
//!
//! A [`Pose`] captures the transform channels a transition animates:
//! position, scale, and orientation. Cameras additionally carry a field of
//! view, handled by the camera transition controller one level up.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Snapshot of an object's animatable transform channels
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// World position
    pub position: Vec3,
    /// Local scale
    pub scale: Vec3,
    /// Orientation as quaternion
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            scale: Vec3::ONE,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Pose {
    /// Create a pose at the origin with unit scale and identity orientation
    pub fn new() -> Self {
        Self::default()
    }

    /// Set position
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Set scale
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Set uniform scale
    pub fn with_uniform_scale(mut self, s: f32) -> Self {
        self.scale = Vec3::splat(s);
        self
    }

    /// Set orientation
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pose() {
        let pose = Pose::default();
        assert_eq!(pose.position, Vec3::ZERO);
        assert_eq!(pose.scale, Vec3::ONE);
        assert_eq!(pose.rotation, Quat::IDENTITY);
    }

    #[test]
    fn test_builder() {
        let pose = Pose::new()
            .with_position(Vec3::new(1.0, 2.0, 3.0))
            .with_uniform_scale(2.0);
        assert_eq!(pose.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(pose.scale, Vec3::splat(2.0));
    }
}
