//! Transition legs
//!
//! Each object carries three animation slots: an entrance tween, an exit
//! tween, and a shared-screen transition. The tween slots are created once
//! and reset per leg (never reallocated); the shared leg does not tween
//! between fixed poses but interpolates between the two screens' configured
//! targets, sampled live each tick by the manager.

use crate::events::EventListeners;
use crate::manager::ScreenManager;
use crate::ObjectId;
use crate::ScreenId;
use glam::Vec3;
use vitrine_animation::{Easing, Pose, PoseTween, TweenError};

/// Default entrance duration in milliseconds
pub const TRANSITION_IN_MS: f32 = 600.0;
/// Default exit duration in milliseconds
pub const TRANSITION_OUT_MS: f32 = 600.0;
/// Default shared-screen transition duration in milliseconds
pub const SHARED_TRANSITION_MS: f32 = 1200.0;

/// Which transition leg an object is currently running
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionKind {
    /// Entrance animation
    In,
    /// Exit animation
    Out,
    /// Shared-screen transition (object stays visible across the cut)
    Shared,
}

/// A pose tween plus its completion listeners
pub struct TransitionSlot {
    /// The tween driving this leg
    pub tween: PoseTween,
    /// Fired once per completed leg with the owning object's id
    pub complete: EventListeners<ScreenManager, ObjectId>,
}

impl TransitionSlot {
    fn new(tween: PoseTween) -> Self {
        Self {
            tween,
            complete: EventListeners::new(),
        }
    }
}

/// The three animation slots of one object
pub struct TransitionSet {
    /// Entrance leg; scales up from zero by default
    pub transition_in: TransitionSlot,
    /// Exit leg; scales down to zero by default
    pub transition_out: TransitionSlot,
    /// Shared-screen leg
    pub shared: SharedTransition,
}

impl Default for TransitionSet {
    fn default() -> Self {
        Self {
            // Entrances grow from zero scale to the object's own (or the
            // screen-configured) scale; exits shrink back to zero.
            transition_in: TransitionSlot::new(
                default_tween(TRANSITION_IN_MS)
                    .with_easing(Easing::EaseOutBack)
                    .with_from(Pose::new().with_scale(Vec3::ZERO)),
            ),
            transition_out: TransitionSlot::new(
                default_tween(TRANSITION_OUT_MS)
                    .with_easing(Easing::EaseOutExpo)
                    .with_to(Pose::new().with_scale(Vec3::ZERO)),
            ),
            shared: SharedTransition::new(SHARED_TRANSITION_MS, Easing::EaseOutExpo),
        }
    }
}

fn default_tween(total_ms: f32) -> PoseTween {
    match PoseTween::new(total_ms) {
        Ok(tween) => tween,
        // The built-in durations are compile-time positive constants.
        Err(_) => unreachable!("default transition durations are positive"),
    }
}

/// Timing state of a shared-screen transition
///
/// The leg is bound to a (from, to) screen pair when it starts; target
/// resolution against the two screens' configs happens at tick time, so a
/// config edited mid-flight is picked up immediately.
pub struct SharedTransition {
    total_ms: f32,
    elapsed_ms: f32,
    easing: Easing,
    running: bool,
    pub(crate) from_screen: Option<ScreenId>,
    pub(crate) to_screen: Option<ScreenId>,
    pub(crate) character: Option<String>,
}

impl SharedTransition {
    pub(crate) fn new(total_ms: f32, easing: Easing) -> Self {
        Self {
            total_ms,
            elapsed_ms: 0.0,
            easing,
            running: false,
            from_screen: None,
            to_screen: None,
            character: None,
        }
    }

    /// Change the duration of the leg
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

    /// Set the easing curve
    pub fn set_easing(&mut self, easing: Easing) {
        self.easing = easing;
    }

    /// Whether the leg is between `begin` and completion
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Screen the leg interpolates from
    pub fn from_screen(&self) -> Option<ScreenId> {
        self.from_screen
    }

    /// Screen the leg interpolates toward
    pub fn to_screen(&self) -> Option<ScreenId> {
        self.to_screen
    }

    /// Bind the leg to a screen pair and restart its clock
    pub(crate) fn begin(
        &mut self,
        from: ScreenId,
        to: ScreenId,
        character: Option<String>,
    ) {
        self.elapsed_ms = 0.0;
        self.running = true;
        self.from_screen = Some(from);
        self.to_screen = Some(to);
        self.character = character;
    }

    /// Advance the clock; returns the eased progress and whether the leg
    /// completed this tick.
    pub(crate) fn advance(&mut self, dt_ms: f32) -> (f32, bool) {
        self.elapsed_ms += dt_ms;
        let t = self
            .easing
            .apply((self.elapsed_ms / self.total_ms).min(1.0));
        let completed = self.elapsed_ms >= self.total_ms;
        if completed {
            self.running = false;
        }
        (t, completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_slots_have_source_durations() {
        let set = TransitionSet::default();
        assert_eq!(set.transition_in.tween.total_ms(), 600.0);
        assert_eq!(set.transition_out.tween.total_ms(), 600.0);
        assert_eq!(set.shared.total_ms(), 1200.0);
    }

    #[test]
    fn test_default_legs_travel_through_zero_scale() {
        let set = TransitionSet::default();
        assert_eq!(set.transition_in.tween.from.scale, Vec3::ZERO);
        assert_eq!(set.transition_out.tween.to.scale, Vec3::ZERO);
    }

    #[test]
    fn test_shared_transition_clock() {
        let mut shared = SharedTransition::new(1000.0, Easing::Linear);
        let from = ScreenId::default();
        let to = ScreenId::default();
        shared.begin(from, to, None);
        assert!(shared.is_running());

        let (t, completed) = shared.advance(400.0);
        assert!((t - 0.4).abs() < 1e-5);
        assert!(!completed);

        let (t, completed) = shared.advance(700.0);
        assert_eq!(t, 1.0);
        assert!(completed);
        assert!(!shared.is_running());
    }

    #[test]
    fn test_shared_duration_validation() {
        let mut shared = SharedTransition::new(1000.0, Easing::Linear);
        assert!(shared.set_duration(-1.0).is_err());
        assert!(shared.set_duration(800.0).is_ok());
        assert_eq!(shared.total_ms(), 800.0);
    }
}
