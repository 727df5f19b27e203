//! Vitrine Animation
//!
//! Time-driven interpolation primitives for screen transitions.
//!
//! # Features
//!
//! - **Easing**: transfer functions mapping linear progress to eased progress
//! - **Interpolation Traits**: linear and spherical interpolation for
//!   animatable value types
//! - **Pose Tweening**: incremental pose animation that coexists with
//!   concurrent mutation of the same channels (e.g. user drag)
//!
//! All durations are in milliseconds; the sole driver of progress is the
//! per-frame delta passed to [`PoseTween::advance`].

pub mod easing;
pub mod pose;
pub mod tween;
pub mod values;

pub use easing::Easing;
pub use pose::Pose;
pub use tween::{PoseTween, TweenError};
pub use values::{Interpolate, SphericalInterpolate};
