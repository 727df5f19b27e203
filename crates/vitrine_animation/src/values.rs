//! Animatable value types
//!
//! Traits for values that can be interpolated during a transition, with
//! implementations for the pose channels (scalars, vectors, quaternions).

use glam::{Quat, Vec3};

/// Trait for values that can be linearly interpolated
pub trait Interpolate: Clone {
    /// Linearly interpolate between self and other by factor t (0.0 to 1.0)
    fn lerp(&self, other: &Self, t: f32) -> Self;

    /// Check if two values are approximately equal
    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool;
}

/// Trait for values that use spherical interpolation (orientations)
pub trait SphericalInterpolate: Clone {
    /// Spherically interpolate between self and other by factor t (0.0 to 1.0)
    fn slerp(&self, other: &Self, t: f32) -> Self;

    /// Check if two values are approximately equal
    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool;
}

impl Interpolate for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self - other).abs() < epsilon
    }
}

impl Interpolate for Vec3 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Vec3::lerp(*self, *other, t)
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.abs_diff_eq(*other, epsilon)
    }
}

impl SphericalInterpolate for Quat {
    fn slerp(&self, other: &Self, t: f32) -> Self {
        Quat::slerp(*self, *other, t)
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        // q and -q represent the same rotation
        self.dot(*other).abs() > 1.0 - epsilon
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_float_interpolation() {
        assert!((0.0_f32.lerp(&1.0, 0.5) - 0.5).abs() < 1e-6);
        assert!((10.0_f32.lerp(&20.0, 0.25) - 12.5).abs() < 1e-6);
    }

    #[test]
    fn test_vec3_interpolation() {
        let a = Vec3::ZERO;
        let b = Vec3::new(10.0, 20.0, 30.0);
        let mid = Interpolate::lerp(&a, &b, 0.5);

        assert!((mid.x - 5.0).abs() < 1e-6);
        assert!((mid.y - 10.0).abs() < 1e-6);
        assert!((mid.z - 15.0).abs() < 1e-6);
    }

    #[test]
    fn test_quat_slerp_endpoints() {
        let start = Quat::IDENTITY;
        let end = Quat::from_axis_angle(Vec3::Y, PI / 2.0);

        let q = SphericalInterpolate::slerp(&start, &end, 0.0);
        assert!(SphericalInterpolate::approx_eq(&q, &start, 1e-4));

        let q = SphericalInterpolate::slerp(&start, &end, 1.0);
        assert!(SphericalInterpolate::approx_eq(&q, &end, 1e-4));
    }

    #[test]
    fn test_quat_double_cover_equality() {
        let q = Quat::from_axis_angle(Vec3::Y, 1.0);
        let negated = Quat::from_xyzw(-q.x, -q.y, -q.z, -q.w);
        assert!(SphericalInterpolate::approx_eq(&q, &negated, 1e-4));
    }
}
