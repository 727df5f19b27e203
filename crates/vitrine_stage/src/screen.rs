//! Screens and transition partitioning
//!
//! A screen is a named collection of scene objects plus a camera framing.
//! On every transition the screen splits its collection: entering screens
//! select which objects must animate in, exiting screens separate the
//! objects that leave from the objects that stay visible and glide to the
//! next screen's configuration.
//!
//! The per-leg completion gate is a pending *set* rather than a counter:
//! each object's completion removes its id, the gate fires when the set
//! drains. That keeps the gate correct even when a completion listener
//! mutates screen membership re-entrantly.

use crate::config::{CameraConfig, SharedObjectConfig};
use crate::events::EventListeners;
use crate::manager::ScreenManager;
use crate::object::SceneObject;
use crate::renderer::LiveScene;
use crate::{ObjectId, ScreenId};
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use slotmap::SlotMap;

/// Listener tables of a screen, one per event
#[derive(Default)]
pub struct ScreenListeners {
    /// Entrance sequence began
    pub transition_in_started: EventListeners<ScreenManager, ScreenId>,
    /// Every selected entering object finished its entrance
    pub transition_in_finished: EventListeners<ScreenManager, ScreenId>,
    /// Exit sequence began
    pub transition_out_started: EventListeners<ScreenManager, ScreenId>,
    /// Every exiting object finished; shared objects may still be gliding
    pub transition_out_finished: EventListeners<ScreenManager, ScreenId>,
    /// Screen content finished loading/building
    pub initialization_finished: EventListeners<ScreenManager, ScreenId>,
    /// Fired every tick this screen is active, with the frame delta
    pub update: EventListeners<ScreenManager, f32>,
}

/// Result of an exit partition: disjoint, and together the full collection
pub struct ExitPartition {
    /// Objects that animate out and leave the scene
    pub exiting: Vec<ObjectId>,
    /// Objects shared with the next screen; those currently live glide to
    /// the next screen's configured pose, hidden ones are left untouched
    pub shared: Vec<ObjectId>,
}

/// One stage of the presentation
pub struct Screen {
    name: String,
    pub(crate) objects: IndexMap<String, ObjectId>,
    pub(crate) shared_object_configs: IndexMap<String, SharedObjectConfig>,
    camera_config: Option<CameraConfig>,
    pub(crate) is_initialization_finished: bool,
    /// Event listener tables
    pub listeners: ScreenListeners,
    pub(crate) pending_in: FxHashSet<ObjectId>,
    pub(crate) pending_out: FxHashSet<ObjectId>,
}

impl Screen {
    /// Create an empty screen
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            objects: IndexMap::new(),
            shared_object_configs: IndexMap::new(),
            camera_config: None,
            is_initialization_finished: false,
            listeners: ScreenListeners::default(),
            pending_in: FxHashSet::default(),
            pending_out: FxHashSet::default(),
        }
    }

    /// Screen name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Iterate the collection as (name, id) pairs in insertion order
    pub fn objects(&self) -> impl Iterator<Item = (&str, ObjectId)> + '_ {
        self.objects.iter().map(|(name, &id)| (name.as_str(), id))
    }

    /// Iterate object ids in insertion order
    pub fn object_ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.objects.values().copied()
    }

    /// Number of objects in the collection
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Look up an object id by name
    pub fn object_id(&self, name: &str) -> Option<ObjectId> {
        self.objects.get(name).copied()
    }

    /// Whether the collection holds an object of that name
    pub fn contains_object(&self, name: &str) -> bool {
        self.objects.contains_key(name)
    }

    /// Set the target pose for a (shared) object on this screen
    pub fn set_shared_object_config(
        &mut self,
        name: impl Into<String>,
        config: SharedObjectConfig,
    ) {
        self.shared_object_configs.insert(name.into(), config);
    }

    /// Target pose config for an object, if any
    pub fn shared_object_config(&self, name: &str) -> Option<&SharedObjectConfig> {
        self.shared_object_configs.get(name)
    }

    /// Set this screen's camera framing
    pub fn set_camera_config(&mut self, config: CameraConfig) {
        self.camera_config = Some(config);
    }

    /// This screen's camera framing, if any
    pub fn camera_config(&self) -> Option<&CameraConfig> {
        self.camera_config.as_ref()
    }

    /// Whether the screen reported its content ready
    pub fn is_initialization_finished(&self) -> bool {
        self.is_initialization_finished
    }

    /// Select the objects that must animate in when this screen is entered
    /// from `previous`.
    ///
    /// An object is selected when any of the following holds:
    /// 1. it is not shared at all;
    /// 2. it is shared but records no adjacency for the previous screen
    ///    (or there is no previous screen), and it either has no registered
    ///    entry points or this screen is one of them — this entry is its
    ///    appearance;
    /// 3. its adjacency for the previous screen does not link to this
    ///    screen, and this screen is one of its entry points;
    /// 4. its adjacency does link here, this screen is an entry point, and
    ///    the object is currently absent from the live scene (it was hidden
    ///    earlier and must reappear).
    ///
    /// Everything not selected is either waiting for its entry point or
    /// already on stage, carried across the cut by the shared transition.
    pub fn partition_enter(
        &self,
        self_id: ScreenId,
        previous: Option<ScreenId>,
        objects: &SlotMap<ObjectId, SceneObject>,
        live: &LiveScene,
    ) -> Vec<ObjectId> {
        self.objects
            .values()
            .copied()
            .filter(|&id| {
                let Some(object) = objects.get(id) else {
                    return false;
                };
                if !object.is_shared() {
                    return true;
                }
                let first_sight =
                    object.entry_points().is_empty() || object.is_entry_point(self_id);
                let Some(previous) = previous else {
                    return first_sight;
                };
                if !object.has_adjacency(previous) {
                    return first_sight;
                }
                let links_here = object.shared_with(previous).contains(&self_id);
                if !links_here {
                    return object.is_entry_point(self_id);
                }
                object.is_entry_point(self_id) && !live.contains(id)
            })
            .collect()
    }

    /// Split the collection for an exit toward `next`.
    ///
    /// Objects whose adjacency for this screen links to `next` are shared;
    /// everything else exits. The two sides are disjoint and exhaustive.
    pub fn partition_exit(
        &self,
        self_id: ScreenId,
        next: ScreenId,
        objects: &SlotMap<ObjectId, SceneObject>,
    ) -> ExitPartition {
        let mut exiting = Vec::new();
        let mut shared = Vec::new();
        for &id in self.objects.values() {
            let Some(object) = objects.get(id) else {
                continue;
            };
            if object.shared_with(self_id).contains(&next) {
                shared.push(id);
            } else {
                exiting.push(id);
            }
        }
        ExitPartition { exiting, shared }
    }
}
