//! Stage camera and its transition controller
//!
//! There is exactly one camera and it is always "shared": every screen
//! change glides it from the outgoing screen's framing to the incoming one.
//! The camera transition mirrors the shared object leg but additionally
//! interpolates the field of view; any fov write raises a projection-dirty
//! flag the host drains to refresh its projection matrix.

use crate::events::EventListeners;
use crate::manager::ScreenManager;
use crate::transition::SharedTransition;
use vitrine_animation::{Easing, Pose};

/// Default camera glide duration in milliseconds
pub const CAMERA_TRANSITION_MS: f32 = 1200.0;

/// Listener tables of the stage camera
#[derive(Default)]
pub struct CameraListeners {
    /// Camera glide completed
    pub transition_finished: EventListeners<ScreenManager, ()>,
    /// Fired every tick with the frame delta in milliseconds
    pub update: EventListeners<ScreenManager, f32>,
}

/// The singleton presentation camera
pub struct StageCamera {
    /// Live camera pose (scale is unused but kept for channel symmetry)
    pub pose: Pose,
    fov: f32,
    aspect: f32,
    projection_dirty: bool,
    pub(crate) transition: SharedTransition,
    /// Event listener tables
    pub listeners: CameraListeners,
}

impl StageCamera {
    /// Create a camera with a vertical field of view (radians) and aspect
    /// ratio
    pub fn new(fov: f32, aspect: f32) -> Self {
        Self {
            pose: Pose::default(),
            fov,
            aspect,
            projection_dirty: true,
            transition: SharedTransition::new(CAMERA_TRANSITION_MS, Easing::EaseOutExpo),
            listeners: CameraListeners::default(),
        }
    }

    /// Vertical field of view in radians
    pub fn fov(&self) -> f32 {
        self.fov
    }

    /// Set the field of view, marking the projection dirty on change
    pub fn set_fov(&mut self, fov: f32) {
        if (self.fov - fov).abs() > f32::EPSILON {
            self.fov = fov;
            self.projection_dirty = true;
        }
    }

    /// Aspect ratio (width / height)
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Set the aspect ratio (the host calls this on viewport resize)
    pub fn set_aspect(&mut self, aspect: f32) {
        if (self.aspect - aspect).abs() > f32::EPSILON {
            self.aspect = aspect;
            self.projection_dirty = true;
        }
    }

    /// The camera glide controller
    pub fn transition(&self) -> &SharedTransition {
        &self.transition
    }

    /// The camera glide controller, mutably (duration/easing tuning)
    pub fn transition_mut(&mut self) -> &mut SharedTransition {
        &mut self.transition
    }

    /// Take and clear the projection-dirty flag.
    ///
    /// Returns true when fov or aspect changed since the last call; the
    /// host then recomputes its projection matrix.
    pub fn take_projection_dirty(&mut self) -> bool {
        std::mem::take(&mut self.projection_dirty)
    }
}

impl Default for StageCamera {
    fn default() -> Self {
        Self::new(std::f32::consts::FRAC_PI_4, 16.0 / 9.0)
    }
}
