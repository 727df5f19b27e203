//! Pose tweening
//!
//! [`PoseTween`] drives one transition leg for one object: it interpolates
//! between a `from` and a `to` pose over a fixed duration, applying
//! position and scale as **incremental deltas** so that concurrent mutation
//! of the same channel (a user dragging the object mid-transition) is
//! preserved rather than overwritten. Orientation is slerped absolutely,
//! since nothing else is expected to touch it during a transition.

use crate::easing::Easing;
use crate::pose::Pose;
use crate::values::{Interpolate, SphericalInterpolate};
use thiserror::Error;

/// Errors raised when configuring a tween
#[derive(Debug, Error, PartialEq)]
pub enum TweenError {
    /// Duration must be strictly positive; progress is `elapsed / total`
    #[error("tween duration must be positive, got {0} ms")]
    NonPositiveDuration(f32),
}

/// Time-driven interpolation between two poses
///
/// A tween is created once per owning object and reset (never reallocated)
/// on each transition leg. Channels with no travel (`from == to`) are left
/// untouched, so a tween configured only for scale will not disturb an
/// object's position.
#[derive(Clone, Debug)]
pub struct PoseTween {
    total_ms: f32,
    elapsed_ms: f32,
    easing: Easing,
    looping: bool,
    /// Pose at progress 0
    pub from: Pose,
    /// Pose at progress 1
    pub to: Pose,
    last: Pose,
}

impl PoseTween {
    /// Create a tween with the given duration in milliseconds.
    ///
    /// Fails if the duration is not strictly positive: a zero-length tween
    /// would divide by zero on the first tick.
    pub fn new(total_ms: f32) -> Result<Self, TweenError> {
        if total_ms <= 0.0 {
            return Err(TweenError::NonPositiveDuration(total_ms));
        }
        Ok(Self {
            total_ms,
            elapsed_ms: 0.0,
            easing: Easing::Linear,
            looping: false,
            from: Pose::default(),
            to: Pose::default(),
            last: Pose::default(),
        })
    }

    /// Set the easing curve (builder)
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Set looping (builder)
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Set the start pose (builder)
    pub fn with_from(mut self, from: Pose) -> Self {
        self.from = from;
        self
    }

    /// Set the end pose (builder)
    pub fn with_to(mut self, to: Pose) -> Self {
        self.to = to;
        self
    }

    /// Change the duration of an existing tween
    pub fn set_duration(&mut self, total_ms: f32) -> Result<(), TweenError> {
        if total_ms <= 0.0 {
            return Err(TweenError::NonPositiveDuration(total_ms));
        }
        self.total_ms = total_ms;
        Ok(())
    }

    /// Duration in milliseconds
    pub fn total_ms(&self) -> f32 {
        self.total_ms
    }

    /// Elapsed time in milliseconds
    pub fn elapsed_ms(&self) -> f32 {
        self.elapsed_ms
    }

    /// Whether this tween wraps instead of stopping
    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Current eased progress in `[0, 1]`
    pub fn progress(&self) -> f32 {
        self.easing.apply((self.elapsed_ms / self.total_ms).min(1.0))
    }

    /// Capture the starting state for a new leg.
    ///
    /// Resets elapsed time, snaps the interpolation cursor to `from`, and
    /// moves the target onto `from` for every channel that has travel.
    /// Channels without travel are skipped entirely.
    pub fn init(&mut self, target: &mut Pose) {
        self.elapsed_ms = 0.0;
        self.last = self.from;
        if self.from.position != self.to.position {
            target.position = self.from.position;
        }
        if self.from.scale != self.to.scale {
            target.scale = self.from.scale;
        }
        if self.from.rotation != self.to.rotation {
            target.rotation = self.from.rotation;
        }
    }

    /// Advance by `dt_ms` and apply the resulting motion to `target`.
    ///
    /// Returns `true` when the tween crossed its end this tick. Each
    /// crossing fires exactly once: the tween resets (elapsed back to zero,
    /// or wrapped modulo the duration when looping) before returning.
    pub fn advance(&mut self, dt_ms: f32, target: &mut Pose) -> bool {
        self.elapsed_ms += dt_ms;
        let t = self
            .easing
            .apply((self.elapsed_ms / self.total_ms).min(1.0));

        if self.from.position != self.to.position {
            let current = Interpolate::lerp(&self.from.position, &self.to.position, t);
            target.position += current - self.last.position;
            self.last.position = current;
        }
        if self.from.scale != self.to.scale {
            let current = Interpolate::lerp(&self.from.scale, &self.to.scale, t);
            target.scale += current - self.last.scale;
            self.last.scale = current;
        }
        if self.from.rotation != self.to.rotation {
            target.rotation = SphericalInterpolate::slerp(&self.from.rotation, &self.to.rotation, t);
        }

        if self.elapsed_ms > self.total_ms {
            self.reset();
            return true;
        }
        false
    }

    /// Rewind after a completed crossing
    fn reset(&mut self) {
        if self.looping {
            self.elapsed_ms %= self.total_ms;
        } else {
            self.elapsed_ms = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};
    use std::f32::consts::PI;

    fn scale_up_tween() -> PoseTween {
        PoseTween::new(1000.0)
            .unwrap()
            .with_from(Pose::new().with_uniform_scale(0.0))
            .with_to(Pose::new().with_uniform_scale(2.0))
    }

    #[test]
    fn test_zero_duration_rejected() {
        assert_eq!(
            PoseTween::new(0.0).unwrap_err(),
            TweenError::NonPositiveDuration(0.0)
        );
        assert!(PoseTween::new(-5.0).is_err());

        let mut tween = PoseTween::new(100.0).unwrap();
        assert!(tween.set_duration(0.0).is_err());
        assert!(tween.set_duration(250.0).is_ok());
    }

    #[test]
    fn test_init_snaps_travelling_channels_only() {
        let mut tween = scale_up_tween();
        let mut pose = Pose::new()
            .with_position(Vec3::new(5.0, 0.0, 0.0))
            .with_uniform_scale(2.0);
        tween.init(&mut pose);

        // Scale has travel: snapped to `from`. Position has none: untouched.
        assert_eq!(pose.scale, Vec3::ZERO);
        assert_eq!(pose.position, Vec3::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn test_advance_reaches_target() {
        let mut tween = scale_up_tween();
        let mut pose = Pose::default();
        tween.init(&mut pose);

        for _ in 0..10 {
            tween.advance(100.0, &mut pose);
        }
        assert!(pose.scale.abs_diff_eq(Vec3::splat(2.0), 1e-4));
    }

    #[test]
    fn test_completion_fires_once_per_crossing() {
        let mut tween = scale_up_tween();
        let mut pose = Pose::default();
        tween.init(&mut pose);

        let mut completions = 0;
        for _ in 0..12 {
            if tween.advance(100.0, &mut pose) {
                completions += 1;
            }
        }
        // Crosses at tick 11 (elapsed 1100 > 1000); elapsed then resets to 0
        // and the remaining tick stays below the threshold.
        assert_eq!(completions, 1);
        assert_eq!(tween.elapsed_ms(), 100.0);
    }

    #[test]
    fn test_non_loop_resets_elapsed_to_zero() {
        let mut tween = scale_up_tween();
        let mut pose = Pose::default();
        tween.init(&mut pose);

        assert!(!tween.advance(1000.0, &mut pose));
        assert!(tween.advance(50.0, &mut pose));
        assert_eq!(tween.elapsed_ms(), 0.0);
    }

    #[test]
    fn test_loop_wraps_elapsed() {
        let mut tween = scale_up_tween().looping(true);
        let mut pose = Pose::default();
        tween.init(&mut pose);

        assert!(tween.advance(1250.0, &mut pose));
        // Wrap, not reset: elapsed_before - total
        assert!((tween.elapsed_ms() - 250.0).abs() < 1e-3);
    }

    #[test]
    fn test_delta_application_preserves_concurrent_motion() {
        let mut tween = PoseTween::new(1000.0)
            .unwrap()
            .with_from(Pose::new().with_position(Vec3::ZERO))
            .with_to(Pose::new().with_position(Vec3::new(10.0, 0.0, 0.0)));
        let mut pose = Pose::default();
        tween.init(&mut pose);

        tween.advance(500.0, &mut pose);
        // A drag moves the object sideways mid-flight.
        pose.position.y += 3.0;
        for _ in 0..5 {
            tween.advance(100.0, &mut pose);
        }

        // Tween finished its x travel; the external y offset survived.
        assert!((pose.position.x - 10.0).abs() < 1e-3);
        assert!((pose.position.y - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_rotation_is_absolute() {
        let end = Quat::from_axis_angle(Vec3::Y, PI / 2.0);
        let mut tween = PoseTween::new(1000.0)
            .unwrap()
            .with_to(Pose::new().with_rotation(end));
        let mut pose = Pose::default();
        tween.init(&mut pose);

        for _ in 0..10 {
            tween.advance(100.0, &mut pose);
        }
        assert!(SphericalInterpolate::approx_eq(&pose.rotation, &end, 1e-4));
    }

    #[test]
    fn test_no_travel_is_a_no_op() {
        let mut tween = PoseTween::new(1000.0).unwrap();
        let mut pose = Pose::new().with_position(Vec3::new(1.0, 2.0, 3.0));
        let before = pose;
        tween.init(&mut pose);
        tween.advance(500.0, &mut pose);
        assert_eq!(pose, before);
    }
}
