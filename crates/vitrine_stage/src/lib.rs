//! # Vitrine Stage
//!
//! Screens, scene objects, and the transition state machine of the Vitrine
//! presentation engine.
//!
//! A presentation is a set of named [`Screen`]s, each holding a collection
//! of [`SceneObject`]s and a camera framing. [`ScreenManager::transition_to`]
//! sequences the move between screens — exit animations, the camera glide,
//! entrance animations — while "shared" objects persist visually across the
//! cut and glide between the two screens' configured poses instead of being
//! destroyed and recreated.
//!
//! Rendering, asset loading, and raw input stay outside: the host drives
//! the stage with [`ScreenManager::update`] once per frame, draws the
//! [`LiveScene`] through its own [`Renderer`], and reports ray-cast hits
//! back via the pointer emit methods.
//!
//! ## Quick start
//!
//! ```rust
//! use vitrine_stage::{Screen, SceneObject, ScreenManager};
//!
//! let mut stage = ScreenManager::default();
//! let intro = stage.add_screen(Screen::new("intro"));
//! let detail = stage.add_screen(Screen::new("detail"));
//!
//! let statue = stage.register_object(SceneObject::new("statue"));
//! stage.add_object_to_screen(intro, statue).unwrap();
//! stage.share_object_between(statue, intro, detail).unwrap();
//!
//! stage.transition_to(intro, None).unwrap();
//! // Host loop:
//! stage.update(16.0);
//! ```

pub mod camera;
pub mod config;
pub mod error;
pub mod events;
pub mod manager;
pub mod node;
pub mod object;
pub mod renderer;
pub mod screen;
pub mod transition;

use slotmap::new_key_type;

new_key_type! {
    /// Stable identity of a screen within the manager's arena
    pub struct ScreenId;
    /// Stable identity of a scene object within the manager's arena
    pub struct ObjectId;
}

pub use camera::{CameraListeners, StageCamera, CAMERA_TRANSITION_MS};
pub use config::{CameraConfig, PoseConfig, SharedObjectConfig};
pub use error::StageError;
pub use events::{EventListeners, Listener};
pub use manager::{ScreenManager, TransitionPhase};
pub use node::{NodeKey, NodeTree, PointerEventKind, PointerInfo, SceneNode};
pub use object::{ObjectListeners, SceneObject};
pub use renderer::{LiveScene, Renderer};
pub use screen::{ExitPartition, Screen, ScreenListeners};
pub use transition::{
    SharedTransition, TransitionKind, TransitionSet, TransitionSlot, SHARED_TRANSITION_MS,
    TRANSITION_IN_MS, TRANSITION_OUT_MS,
};

/// Listener receiving an object id (transition completion events)
pub type ObjectListener = Listener<ScreenManager, ObjectId>;
/// Listener receiving a screen id (screen-level transition events)
pub type ScreenListener = Listener<ScreenManager, ScreenId>;
/// Listener receiving pointer data (click/hover events)
pub type PointerListener = Listener<ScreenManager, PointerInfo>;
/// Listener receiving the frame delta in milliseconds (update events)
pub type UpdateListener = Listener<ScreenManager, f32>;
