//! Top-level transition state machine
//!
//! [`ScreenManager`] owns every screen, every scene object, the live scene,
//! and the camera, and sequences transitions between screens: exit first,
//! then swap the active screen, then enter. Only one transition sequence
//! runs at a time; requests arriving mid-flight never start a second exit —
//! the latest request simply becomes the destination (last request wins).
//!
//! Everything is single-threaded and tick-driven. `update(dt)` advances the
//! animations that were running at the start of the frame, reacts to each
//! completion immediately (gates, screen swap, next leg), and then drains
//! the event queue so listeners observe a settled state machine. Listeners
//! receive `&mut ScreenManager` and may call [`transition_to`]
//! re-entrantly; a dispatching guard routes events they raise into the
//! ongoing drain instead of nesting.
//!
//! [`transition_to`]: ScreenManager::transition_to

use crate::camera::StageCamera;
use crate::config::PoseConfig;
use crate::error::StageError;
use crate::node::{NodeKey, PointerEventKind, PointerInfo};
use crate::object::SceneObject;
use crate::renderer::{LiveScene, Renderer};
use crate::screen::Screen;
use crate::transition::TransitionKind;
use crate::{ObjectId, ScreenId};
use rustc_hash::FxHashSet;
use slotmap::SlotMap;
use smallvec::SmallVec;
use std::collections::VecDeque;
use vitrine_animation::{Interpolate, SphericalInterpolate};

/// Where the manager is in its transition sequence
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransitionPhase {
    /// No transition in flight
    #[default]
    Idle,
    /// The outgoing screen's exit animations are running
    Out,
    /// The incoming screen's entrance animations are running
    In,
}

/// Internal event queued during state settlement, dispatched afterwards
pub(crate) enum StageEvent {
    SlotComplete(ObjectId, TransitionKind),
    ObjectInFinished(ObjectId),
    ObjectOutFinished(ObjectId),
    ObjectSharedFinished(ObjectId),
    ObjectUpdate(ObjectId, f32),
    ObjectClick(ObjectId, PointerInfo),
    ObjectHover(ObjectId, PointerInfo),
    NodeClick(ObjectId, NodeKey, PointerInfo),
    NodeHover(ObjectId, NodeKey, PointerInfo),
    ScreenInStarted(ScreenId),
    ScreenInFinished(ScreenId),
    ScreenOutStarted(ScreenId),
    ScreenOutFinished(ScreenId),
    ScreenInitialized(ScreenId),
    ScreenUpdate(ScreenId, f32),
    CameraUpdate(f32),
    CameraTransitionFinished,
}

struct PendingTransition {
    screen: ScreenId,
    character: Option<String>,
}

/// Owner of all stage state and the transition sequencer
pub struct ScreenManager {
    screens: SlotMap<ScreenId, Screen>,
    objects: SlotMap<ObjectId, SceneObject>,
    live: LiveScene,
    camera: StageCamera,
    phase: TransitionPhase,
    active: Option<ScreenId>,
    next: Option<ScreenId>,
    pending: Option<PendingTransition>,
    character: Option<String>,
    queue: VecDeque<StageEvent>,
    dispatching: bool,
}

impl Default for ScreenManager {
    fn default() -> Self {
        Self::new(StageCamera::default())
    }
}

impl ScreenManager {
    /// Create a manager around the presentation camera
    pub fn new(camera: StageCamera) -> Self {
        Self {
            screens: SlotMap::with_key(),
            objects: SlotMap::with_key(),
            live: LiveScene::new(),
            camera,
            phase: TransitionPhase::Idle,
            active: None,
            next: None,
            pending: None,
            character: None,
            queue: VecDeque::new(),
            dispatching: false,
        }
    }

    // === Setup ===

    /// Register a screen
    pub fn add_screen(&mut self, screen: Screen) -> ScreenId {
        self.screens.insert(screen)
    }

    /// Register a scene object
    pub fn register_object(&mut self, object: SceneObject) -> ObjectId {
        self.objects.insert(object)
    }

    /// Put an object into a screen's collection.
    ///
    /// A screen that already holds an object under that name keeps its
    /// existing registration (re-wrapping must be a no-op); listener tables
    /// are never reset by a duplicate insertion.
    pub fn add_object_to_screen(
        &mut self,
        screen: ScreenId,
        object: ObjectId,
    ) -> Result<(), StageError> {
        let name = self
            .objects
            .get(object)
            .ok_or(StageError::ObjectNotFound(object))?
            .name()
            .to_string();
        let screen_ref = self
            .screens
            .get_mut(screen)
            .ok_or(StageError::ScreenNotFound(screen))?;
        match screen_ref.objects.get(&name) {
            Some(_) => {
                tracing::debug!(%name, "screen already holds this object name, keeping the existing registration");
            }
            None => {
                screen_ref.objects.insert(name, object);
            }
        }
        Ok(())
    }

    /// Take an object out of a screen's collection, dropping any sharing
    /// that referenced the screen.
    pub fn remove_object_from_screen(
        &mut self,
        screen: ScreenId,
        object: ObjectId,
    ) -> Result<(), StageError> {
        let name = self
            .objects
            .get(object)
            .ok_or(StageError::ObjectNotFound(object))?
            .name()
            .to_string();
        let screen_ref = self
            .screens
            .get_mut(screen)
            .ok_or(StageError::ScreenNotFound(screen))?;
        screen_ref.objects.shift_remove(&name);
        if let Some(object) = self.objects.get_mut(object) {
            object.shared_between.remove(&screen);
            for neighbors in object.shared_between.values_mut() {
                neighbors.retain(|s| *s != screen);
            }
            object.shared_between.retain(|_, neighbors| !neighbors.is_empty());
        }
        Ok(())
    }

    /// Register mutual sharing of an object between two screens.
    ///
    /// Both adjacency directions are recorded (idempotently) and a screen
    /// seeing the object for the first time gets it inserted into its
    /// collection.
    pub fn share_object_between(
        &mut self,
        object: ObjectId,
        first: ScreenId,
        second: ScreenId,
    ) -> Result<(), StageError> {
        if !self.screens.contains_key(first) {
            return Err(StageError::ScreenNotFound(first));
        }
        if !self.screens.contains_key(second) {
            return Err(StageError::ScreenNotFound(second));
        }
        if first == second {
            tracing::debug!("sharing an object between a screen and itself is a no-op");
            return Ok(());
        }
        let name = {
            let obj = self
                .objects
                .get_mut(object)
                .ok_or(StageError::ObjectNotFound(object))?;
            obj.add_adjacency(first, second);
            obj.add_adjacency(second, first);
            obj.name().to_string()
        };
        for screen in [first, second] {
            if let Some(screen_ref) = self.screens.get_mut(screen) {
                screen_ref.objects.entry(name.clone()).or_insert(object);
            }
        }
        Ok(())
    }

    /// Remove the sharing edge between two screens.
    ///
    /// Removing an edge that was never added is a no-op; the object stays
    /// in both screens' collections either way.
    pub fn unshare_object_between(
        &mut self,
        object: ObjectId,
        first: ScreenId,
        second: ScreenId,
    ) -> Result<(), StageError> {
        let obj = self
            .objects
            .get_mut(object)
            .ok_or(StageError::ObjectNotFound(object))?;
        let removed_first = obj.remove_adjacency(first, second);
        let removed_second = obj.remove_adjacency(second, first);
        if !removed_first || !removed_second {
            tracing::debug!(
                ?first,
                ?second,
                "removing a screen sharing edge that was never added"
            );
        }
        Ok(())
    }

    /// Mark a screen as a reappearance point for a hidden shared object
    pub fn add_entry_point(
        &mut self,
        object: ObjectId,
        screen: ScreenId,
    ) -> Result<(), StageError> {
        if !self.screens.contains_key(screen) {
            return Err(StageError::ScreenNotFound(screen));
        }
        let obj = self
            .objects
            .get_mut(object)
            .ok_or(StageError::ObjectNotFound(object))?;
        if !obj.entry_points.contains(&screen) {
            obj.entry_points.push(screen);
        }
        Ok(())
    }

    // === Accessors ===

    /// Look up a screen
    pub fn screen(&self, id: ScreenId) -> Option<&Screen> {
        self.screens.get(id)
    }

    /// Look up a screen mutably (config and listener registration)
    pub fn screen_mut(&mut self, id: ScreenId) -> Option<&mut Screen> {
        self.screens.get_mut(id)
    }

    /// Iterate all screens
    pub fn screens(&self) -> impl Iterator<Item = (ScreenId, &Screen)> {
        self.screens.iter()
    }

    /// Look up an object
    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(id)
    }

    /// Look up an object mutably
    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.get_mut(id)
    }

    /// Iterate all objects
    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, &SceneObject)> {
        self.objects.iter()
    }

    /// The set of objects currently part of the scene
    pub fn live(&self) -> &LiveScene {
        &self.live
    }

    /// The presentation camera
    pub fn camera(&self) -> &StageCamera {
        &self.camera
    }

    /// The presentation camera, mutably
    pub fn camera_mut(&mut self) -> &mut StageCamera {
        &mut self.camera
    }

    /// The screen the presentation currently shows (the outgoing screen
    /// while an exit is running)
    pub fn active_screen(&self) -> Option<ScreenId> {
        self.active
    }

    /// Destination of the transition in flight, if any
    pub fn transition_target(&self) -> Option<ScreenId> {
        self.next
    }

    /// Current phase of the sequencer
    pub fn phase(&self) -> TransitionPhase {
        self.phase
    }

    /// Whether an exit sequence is running
    pub fn is_transition_out_in_progress(&self) -> bool {
        self.phase == TransitionPhase::Out
    }

    /// Whether an entrance sequence is running
    pub fn is_transition_in_in_progress(&self) -> bool {
        self.phase == TransitionPhase::In
    }

    /// Active character of the transition in flight
    pub fn active_character(&self) -> Option<&str> {
        self.character.as_deref()
    }

    // === Initialization bookkeeping ===

    /// Record that a screen finished building its content
    pub fn mark_screen_initialized(&mut self, screen: ScreenId) -> Result<(), StageError> {
        let screen_ref = self
            .screens
            .get_mut(screen)
            .ok_or(StageError::ScreenNotFound(screen))?;
        if screen_ref.is_initialization_finished {
            tracing::debug!(?screen, "screen already marked initialized");
            return Ok(());
        }
        screen_ref.is_initialization_finished = true;
        self.queue.push_back(StageEvent::ScreenInitialized(screen));
        self.dispatch();
        Ok(())
    }

    /// Whether every registered screen reported ready
    pub fn all_screens_initialized(&self) -> bool {
        self.screens
            .values()
            .all(|screen| screen.is_initialization_finished)
    }

    // === Transitions ===

    /// Request a transition to `screen`.
    ///
    /// With no active screen the entry is immediate (no exit sequence).
    /// While a transition is in flight the request never starts a second
    /// exit: during the exit phase it replaces the destination, during the
    /// entrance phase it is parked and runs as a fresh transition once the
    /// entrance settles. Last request wins. Requesting the already-active
    /// screen while idle is a no-op.
    pub fn transition_to(
        &mut self,
        screen: ScreenId,
        character: Option<&str>,
    ) -> Result<(), StageError> {
        if !self.screens.contains_key(screen) {
            return Err(StageError::ScreenNotFound(screen));
        }
        let character = character.map(str::to_owned);
        match self.phase {
            TransitionPhase::Idle => {
                if self.active == Some(screen) {
                    tracing::debug!(?screen, "transition target is already active");
                    return Ok(());
                }
                self.character = character;
                self.start_transition(screen);
            }
            TransitionPhase::Out => {
                tracing::debug!(?screen, "transition requested mid-exit, retargeting");
                self.next = Some(screen);
                self.character = character;
            }
            TransitionPhase::In => {
                tracing::debug!(?screen, "transition requested mid-entrance, parking");
                self.pending = Some(PendingTransition { screen, character });
            }
        }
        self.dispatch();
        Ok(())
    }

    fn start_transition(&mut self, to: ScreenId) {
        self.next = Some(to);
        match self.active {
            Some(from) => {
                self.phase = TransitionPhase::Out;
                self.begin_transition_out(from, to);
            }
            None => {
                self.active = Some(to);
                self.phase = TransitionPhase::In;
                self.begin_transition_in(to, None);
            }
        }
    }

    fn begin_transition_out(&mut self, from: ScreenId, to: ScreenId) {
        self.queue.push_back(StageEvent::ScreenOutStarted(from));
        let partition = match self.screens.get(from) {
            Some(screen) => screen.partition_exit(from, to, &self.objects),
            None => return,
        };
        if let Some(screen) = self.screens.get_mut(from) {
            screen.pending_out = partition.exiting.iter().copied().collect();
        }

        for &id in &partition.exiting {
            if let Some(object) = self.objects.get_mut(id) {
                object.transitions.transition_out.tween.from.scale = object.pose.scale;
                object.transitions.transition_out.tween.init(&mut object.pose);
                object.running = Some(TransitionKind::Out);
            }
        }
        for &id in &partition.shared {
            // Hidden shared objects have nothing to glide; they stay put
            // until an entry point brings them back.
            if !self.live.contains(id) {
                continue;
            }
            if let Some(object) = self.objects.get_mut(id) {
                object
                    .transitions
                    .shared
                    .begin(from, to, self.character.clone());
                object.running = Some(TransitionKind::Shared);
            }
        }

        // The camera is always shared: one glide per screen change.
        self.camera.transition.begin(from, to, None);

        if partition.exiting.is_empty() {
            self.finish_transition_out(from);
        }
    }

    fn finish_transition_out(&mut self, from: ScreenId) {
        self.queue.push_back(StageEvent::ScreenOutFinished(from));
        let Some(to) = self.next else {
            self.phase = TransitionPhase::Idle;
            return;
        };
        self.active = Some(to);
        self.phase = TransitionPhase::In;
        self.begin_transition_in(to, Some(from));
    }

    fn begin_transition_in(&mut self, screen_id: ScreenId, previous: Option<ScreenId>) {
        self.queue.push_back(StageEvent::ScreenInStarted(screen_id));
        let Some(screen) = self.screens.get(screen_id) else {
            return;
        };
        let selected = screen.partition_enter(screen_id, previous, &self.objects, &self.live);
        let character = self.character.as_deref();
        let entering: Vec<(ObjectId, Option<PoseConfig>)> = selected
            .into_iter()
            .map(|id| {
                let config = self.objects.get(id).and_then(|object| {
                    screen
                        .shared_object_configs
                        .get(object.name())
                        .map(|config| config.for_character(character).clone())
                });
                (id, config)
            })
            .collect();

        if let Some(screen) = self.screens.get_mut(screen_id) {
            screen.pending_in = entering.iter().map(|(id, _)| *id).collect();
        }

        let vacuous = entering.is_empty();
        for (id, config) in entering {
            self.live.add(id);
            let Some(object) = self.objects.get_mut(id) else {
                continue;
            };
            // The entrance lands on the object's own scale unless the
            // screen configures a target.
            object.transitions.transition_in.tween.to.scale = object.pose.scale;
            if let Some(config) = config {
                if let Some(position) = config.position {
                    object.transitions.transition_in.tween.to.position = position;
                }
                if let Some(scale) = config.scale {
                    object.transitions.transition_in.tween.to.scale = scale;
                }
                if let Some(rotation) = config.rotation {
                    object.transitions.transition_in.tween.to.rotation = rotation;
                }
            }
            object.visible = object.visible_override.unwrap_or(true);
            object.transitions.transition_in.tween.init(&mut object.pose);
            object.running = Some(TransitionKind::In);
        }

        if vacuous {
            self.finish_transition_in(screen_id);
        }
    }

    fn finish_transition_in(&mut self, screen_id: ScreenId) {
        // Shared objects that were hidden on earlier screens and entered
        // here get their visibility restored (or kept overridden).
        let ids: Vec<ObjectId> = self
            .screens
            .get(screen_id)
            .map(|screen| screen.object_ids().collect())
            .unwrap_or_default();
        for id in ids {
            if let Some(object) = self.objects.get_mut(id) {
                object.visible = object.visible_override.unwrap_or(true);
            }
        }
        self.phase = TransitionPhase::Idle;
        self.next = None;
        self.queue.push_back(StageEvent::ScreenInFinished(screen_id));
        if let Some(pending) = self.pending.take() {
            if Some(pending.screen) != self.active {
                self.character = pending.character;
                self.start_transition(pending.screen);
            }
        }
    }

    // === Tick ===

    /// Advance the stage by `dt_ms` milliseconds.
    ///
    /// Ticks every transition leg that was running at the start of the
    /// frame — the active screen's objects first in collection order, then
    /// any leg still settling from an earlier, retargeted transition (a
    /// started leg always runs to completion). Legs a completion cascade
    /// starts mid-frame wait for the next tick. The camera glide follows,
    /// then the events the frame produced are dispatched.
    pub fn update(&mut self, dt_ms: f32) {
        let mut running: Vec<(ObjectId, TransitionKind)> = Vec::new();
        let mut seen: FxHashSet<ObjectId> = FxHashSet::default();
        if let Some(active) = self.active {
            if let Some(screen) = self.screens.get(active) {
                if !screen.listeners.update.is_empty() {
                    self.queue.push_back(StageEvent::ScreenUpdate(active, dt_ms));
                }
                for id in screen.object_ids() {
                    if !seen.insert(id) {
                        continue;
                    }
                    if let Some(object) = self.objects.get(id) {
                        if !object.listeners.update.is_empty() {
                            self.queue.push_back(StageEvent::ObjectUpdate(id, dt_ms));
                        }
                        if let Some(kind) = object.running() {
                            running.push((id, kind));
                        }
                    }
                }
            }
        }
        for (id, object) in self.objects.iter() {
            if !seen.contains(&id) {
                if let Some(kind) = object.running() {
                    running.push((id, kind));
                }
            }
        }
        for (id, kind) in running {
            match kind {
                TransitionKind::In => self.tick_object_in(id, dt_ms),
                TransitionKind::Out => self.tick_object_out(id, dt_ms),
                TransitionKind::Shared => self.tick_object_shared(id, dt_ms),
            }
        }
        self.tick_camera(dt_ms);
        self.dispatch();
    }

    fn tick_object_in(&mut self, id: ObjectId, dt_ms: f32) {
        let Some(object) = self.objects.get_mut(id) else {
            return;
        };
        if object.running() != Some(TransitionKind::In) {
            return;
        }
        let completed = object
            .transitions
            .transition_in
            .tween
            .advance(dt_ms, &mut object.pose);
        object.visible = object.visible_override.unwrap_or(true);
        if completed {
            object.running = None;
            self.queue
                .push_back(StageEvent::SlotComplete(id, TransitionKind::In));
            self.queue.push_back(StageEvent::ObjectInFinished(id));
            self.settle_enter_gate(id);
        }
    }

    /// Remove a finished entrance from the active gate; the screen-level
    /// event fires once the last one drains.
    fn settle_enter_gate(&mut self, id: ObjectId) {
        if self.phase != TransitionPhase::In {
            return;
        }
        let Some(active) = self.active else {
            return;
        };
        let gate_cleared = match self.screens.get_mut(active) {
            Some(screen) => screen.pending_in.remove(&id) && screen.pending_in.is_empty(),
            None => false,
        };
        if gate_cleared {
            self.finish_transition_in(active);
        }
    }

    fn tick_object_out(&mut self, id: ObjectId, dt_ms: f32) {
        let Some(object) = self.objects.get_mut(id) else {
            return;
        };
        if object.running() != Some(TransitionKind::Out) {
            return;
        }
        let completed = object
            .transitions
            .transition_out
            .tween
            .advance(dt_ms, &mut object.pose);
        if completed {
            object.visible = false;
            // The exit shrank the object; restore its authored scale for
            // the next entrance.
            object.pose.scale = object.transitions.transition_out.tween.from.scale;
            object.running = None;
            self.live.remove(id);
            self.queue
                .push_back(StageEvent::SlotComplete(id, TransitionKind::Out));
            self.queue.push_back(StageEvent::ObjectOutFinished(id));
            self.settle_exit_gate(id);
        }
    }

    /// Remove a finished exit from the active gate; shared objects are not
    /// part of it, so the cut happens as soon as the last exiting object
    /// is gone.
    fn settle_exit_gate(&mut self, id: ObjectId) {
        if self.phase != TransitionPhase::Out {
            return;
        }
        let Some(active) = self.active else {
            return;
        };
        let gate_cleared = match self.screens.get_mut(active) {
            Some(screen) => screen.pending_out.remove(&id) && screen.pending_out.is_empty(),
            None => false,
        };
        if gate_cleared {
            self.finish_transition_out(active);
        }
    }

    fn tick_object_shared(&mut self, id: ObjectId, dt_ms: f32) {
        let Self {
            screens,
            objects,
            queue,
            ..
        } = self;
        let Some(object) = objects.get_mut(id) else {
            return;
        };
        if object.running() != Some(TransitionKind::Shared) {
            return;
        }
        let (t, completed) = object.transitions.shared.advance(dt_ms);
        if let (Some(from), Some(to)) = (
            object.transitions.shared.from_screen,
            object.transitions.shared.to_screen,
        ) {
            let character = object.transitions.shared.character.as_deref();
            let from_config = screens
                .get(from)
                .and_then(|screen| screen.shared_object_configs.get(object.name()))
                .map(|config| config.for_character(character));
            // A destination without a config keeps the object at the
            // outgoing screen's pose.
            let to_config = screens
                .get(to)
                .and_then(|screen| screen.shared_object_configs.get(object.name()))
                .map(|config| config.for_character(character))
                .or(from_config);
            if let (Some(from_config), Some(to_config)) = (from_config, to_config) {
                if let (Some(a), Some(b)) = (from_config.position, to_config.position) {
                    object.pose.position = Interpolate::lerp(&a, &b, t);
                }
                if let (Some(a), Some(b)) = (from_config.scale, to_config.scale) {
                    object.pose.scale = Interpolate::lerp(&a, &b, t);
                }
                if let (Some(a), Some(b)) = (from_config.rotation, to_config.rotation) {
                    object.pose.rotation = SphericalInterpolate::slerp(&a, &b, t);
                }
            }
        }
        if completed {
            object.running = None;
            queue.push_back(StageEvent::ObjectSharedFinished(id));
        }
    }

    fn tick_camera(&mut self, dt_ms: f32) {
        if !self.camera.listeners.update.is_empty() {
            self.queue.push_back(StageEvent::CameraUpdate(dt_ms));
        }
        if !self.camera.transition.is_running() {
            return;
        }
        let (t, completed) = self.camera.transition.advance(dt_ms);
        if let (Some(from), Some(to)) = (
            self.camera.transition.from_screen,
            self.camera.transition.to_screen,
        ) {
            let from_config = self.screens.get(from).and_then(Screen::camera_config);
            let to_config = self.screens.get(to).and_then(Screen::camera_config);
            if let (Some(from_config), Some(to_config)) = (from_config, to_config) {
                if let (Some(a), Some(b)) = (from_config.position, to_config.position) {
                    self.camera.pose.position = Interpolate::lerp(&a, &b, t);
                }
                if let (Some(a), Some(b)) = (from_config.rotation, to_config.rotation) {
                    self.camera.pose.rotation = SphericalInterpolate::slerp(&a, &b, t);
                }
                if let (Some(a), Some(b)) = (from_config.fov, to_config.fov) {
                    self.camera.set_fov(a + (b - a) * t);
                }
            }
        }
        if completed {
            self.queue.push_back(StageEvent::CameraTransitionFinished);
        }
    }

    // === Host input ===

    /// Fire a pointer event on an object (the host's ray-caster calls this
    /// after a hit test against the object's hierarchy).
    pub fn emit_object_pointer(
        &mut self,
        object: ObjectId,
        kind: PointerEventKind,
        info: PointerInfo,
    ) -> Result<(), StageError> {
        if !self.objects.contains_key(object) {
            return Err(StageError::ObjectNotFound(object));
        }
        self.queue.push_back(match kind {
            PointerEventKind::Click => StageEvent::ObjectClick(object, info),
            PointerEventKind::Hover => StageEvent::ObjectHover(object, info),
        });
        self.dispatch();
        Ok(())
    }

    /// Fire a pointer event on a specific node of an object's hierarchy
    pub fn emit_node_pointer(
        &mut self,
        object: ObjectId,
        node: NodeKey,
        kind: PointerEventKind,
        info: PointerInfo,
    ) -> Result<(), StageError> {
        if !self.objects.contains_key(object) {
            return Err(StageError::ObjectNotFound(object));
        }
        self.queue.push_back(match kind {
            PointerEventKind::Click => StageEvent::NodeClick(object, node, info),
            PointerEventKind::Hover => StageEvent::NodeHover(object, node, info),
        });
        self.dispatch();
        Ok(())
    }

    // === Renderer integration ===

    /// One-time GPU warm-up: render every object once so the renderer
    /// uploads meshes and textures before the first real frame, then
    /// restore visibility and scene membership exactly.
    pub fn warm_upload(&mut self, renderer: &mut dyn Renderer) {
        let saved_live: Vec<ObjectId> = self.live.iter().collect();
        let saved_visibility: Vec<(ObjectId, bool)> = self
            .objects
            .iter()
            .map(|(id, object)| (id, object.visible))
            .collect();

        {
            let Self { objects, live, .. } = self;
            for (id, object) in objects.iter_mut() {
                object.visible = true;
                live.add(id);
            }
        }
        renderer.render(self);
        renderer.clear();

        self.live.clear();
        for id in saved_live {
            self.live.add(id);
        }
        for (id, visible) in saved_visibility {
            if let Some(object) = self.objects.get_mut(id) {
                object.visible = visible;
            }
        }
    }

    // === Dispatch ===

    /// Drain the event queue, invoking listeners with a settled state
    /// machine. Re-entrant calls are folded into the ongoing drain.
    fn dispatch(&mut self) {
        if self.dispatching {
            return;
        }
        self.dispatching = true;
        while let Some(event) = self.queue.pop_front() {
            match event {
                StageEvent::SlotComplete(id, kind) => {
                    let handles = match self.objects.get_mut(id) {
                        Some(object) => match kind {
                            TransitionKind::In => {
                                object.transitions.transition_in.complete.collect()
                            }
                            TransitionKind::Out => {
                                object.transitions.transition_out.complete.collect()
                            }
                            TransitionKind::Shared => SmallVec::new(),
                        },
                        None => SmallVec::new(),
                    };
                    for handle in handles {
                        handle.call(self, &id);
                    }
                }
                StageEvent::ObjectInFinished(id) => {
                    let handles = self
                        .objects
                        .get_mut(id)
                        .map(|o| o.listeners.transition_in_finished.collect())
                        .unwrap_or_default();
                    for handle in handles {
                        handle.call(self, &id);
                    }
                }
                StageEvent::ObjectOutFinished(id) => {
                    let handles = self
                        .objects
                        .get_mut(id)
                        .map(|o| o.listeners.transition_out_finished.collect())
                        .unwrap_or_default();
                    for handle in handles {
                        handle.call(self, &id);
                    }
                }
                StageEvent::ObjectSharedFinished(id) => {
                    let handles = self
                        .objects
                        .get_mut(id)
                        .map(|o| o.listeners.shared_transition_finished.collect())
                        .unwrap_or_default();
                    for handle in handles {
                        handle.call(self, &id);
                    }
                }
                StageEvent::ObjectUpdate(id, dt) => {
                    let handles = self
                        .objects
                        .get_mut(id)
                        .map(|o| o.listeners.update.collect())
                        .unwrap_or_default();
                    for handle in handles {
                        handle.call(self, &dt);
                    }
                }
                StageEvent::ObjectClick(id, info) => {
                    let handles = self
                        .objects
                        .get_mut(id)
                        .map(|o| o.listeners.click.collect())
                        .unwrap_or_default();
                    for handle in handles {
                        handle.call(self, &info);
                    }
                }
                StageEvent::ObjectHover(id, info) => {
                    let handles = self
                        .objects
                        .get_mut(id)
                        .map(|o| o.listeners.hover.collect())
                        .unwrap_or_default();
                    for handle in handles {
                        handle.call(self, &info);
                    }
                }
                StageEvent::NodeClick(id, node, info) => {
                    let handles = self
                        .objects
                        .get_mut(id)
                        .and_then(|o| o.hierarchy_mut().get_mut(node))
                        .map(|n| n.listeners.click.collect())
                        .unwrap_or_default();
                    for handle in handles {
                        handle.call(self, &info);
                    }
                }
                StageEvent::NodeHover(id, node, info) => {
                    let handles = self
                        .objects
                        .get_mut(id)
                        .and_then(|o| o.hierarchy_mut().get_mut(node))
                        .map(|n| n.listeners.hover.collect())
                        .unwrap_or_default();
                    for handle in handles {
                        handle.call(self, &info);
                    }
                }
                StageEvent::ScreenInStarted(id) => {
                    let handles = self
                        .screens
                        .get_mut(id)
                        .map(|s| s.listeners.transition_in_started.collect())
                        .unwrap_or_default();
                    for handle in handles {
                        handle.call(self, &id);
                    }
                }
                StageEvent::ScreenInFinished(id) => {
                    let handles = self
                        .screens
                        .get_mut(id)
                        .map(|s| s.listeners.transition_in_finished.collect())
                        .unwrap_or_default();
                    for handle in handles {
                        handle.call(self, &id);
                    }
                }
                StageEvent::ScreenOutStarted(id) => {
                    let handles = self
                        .screens
                        .get_mut(id)
                        .map(|s| s.listeners.transition_out_started.collect())
                        .unwrap_or_default();
                    for handle in handles {
                        handle.call(self, &id);
                    }
                }
                StageEvent::ScreenOutFinished(id) => {
                    let handles = self
                        .screens
                        .get_mut(id)
                        .map(|s| s.listeners.transition_out_finished.collect())
                        .unwrap_or_default();
                    for handle in handles {
                        handle.call(self, &id);
                    }
                }
                StageEvent::ScreenInitialized(id) => {
                    let handles = self
                        .screens
                        .get_mut(id)
                        .map(|s| s.listeners.initialization_finished.collect())
                        .unwrap_or_default();
                    for handle in handles {
                        handle.call(self, &id);
                    }
                }
                StageEvent::ScreenUpdate(id, dt) => {
                    let handles = self
                        .screens
                        .get_mut(id)
                        .map(|s| s.listeners.update.collect())
                        .unwrap_or_default();
                    for handle in handles {
                        handle.call(self, &dt);
                    }
                }
                StageEvent::CameraUpdate(dt) => {
                    let handles = self.camera.listeners.update.collect();
                    for handle in handles {
                        handle.call(self, &dt);
                    }
                }
                StageEvent::CameraTransitionFinished => {
                    let handles = self.camera.listeners.transition_finished.collect();
                    for handle in handles {
                        handle.call(self, &());
                    }
                }
            }
        }
        self.dispatching = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager_with_screens(count: usize) -> (ScreenManager, Vec<ScreenId>) {
        let mut manager = ScreenManager::default();
        let screens = (0..count)
            .map(|i| manager.add_screen(Screen::new(format!("screen-{i}"))))
            .collect();
        (manager, screens)
    }

    #[test]
    fn test_unknown_screen_is_an_error() {
        let (mut manager, _) = manager_with_screens(1);
        let stale = ScreenId::default();
        assert_eq!(
            manager.transition_to(stale, None),
            Err(StageError::ScreenNotFound(stale))
        );
    }

    #[test]
    fn test_first_transition_enters_immediately() {
        let (mut manager, screens) = manager_with_screens(2);
        let object = manager.register_object(SceneObject::new("prop"));
        manager.add_object_to_screen(screens[0], object).unwrap();

        manager.transition_to(screens[0], None).unwrap();
        // No previous screen: the exit phase is skipped entirely.
        assert_eq!(manager.active_screen(), Some(screens[0]));
        assert!(manager.is_transition_in_in_progress());
        assert!(manager.live().contains(object));

        // 600 ms entrance at 60 fps.
        for _ in 0..40 {
            manager.update(16.0);
        }
        assert_eq!(manager.phase(), TransitionPhase::Idle);
        assert!(manager.object(object).unwrap().visible);
    }

    #[test]
    fn test_empty_screen_settles_synchronously() {
        let (mut manager, screens) = manager_with_screens(1);
        manager.transition_to(screens[0], None).unwrap();
        // Nothing to animate: both gates clear inside the call.
        assert_eq!(manager.phase(), TransitionPhase::Idle);
        assert_eq!(manager.active_screen(), Some(screens[0]));
    }

    #[test]
    fn test_transition_to_active_screen_is_noop() {
        let (mut manager, screens) = manager_with_screens(1);
        manager.transition_to(screens[0], None).unwrap();
        manager.transition_to(screens[0], None).unwrap();
        assert_eq!(manager.phase(), TransitionPhase::Idle);
    }

    #[test]
    fn test_duplicate_object_registration_is_noop() {
        let (mut manager, screens) = manager_with_screens(1);
        let first = manager.register_object(SceneObject::new("prop"));
        let second = manager.register_object(SceneObject::new("prop"));
        manager.add_object_to_screen(screens[0], first).unwrap();
        manager.add_object_to_screen(screens[0], second).unwrap();

        // The screen keeps the first registration for the name.
        assert_eq!(
            manager.screen(screens[0]).unwrap().object_id("prop"),
            Some(first)
        );
        assert_eq!(manager.screen(screens[0]).unwrap().object_count(), 1);
    }

    #[test]
    fn test_sharing_inserts_into_both_screens() {
        let (mut manager, screens) = manager_with_screens(2);
        let object = manager.register_object(SceneObject::new("statue"));
        manager.add_object_to_screen(screens[0], object).unwrap();
        manager
            .share_object_between(object, screens[0], screens[1])
            .unwrap();

        assert!(manager.screen(screens[0]).unwrap().contains_object("statue"));
        assert!(manager.screen(screens[1]).unwrap().contains_object("statue"));
        let object_ref = manager.object(object).unwrap();
        assert!(object_ref.is_shared());
        assert_eq!(object_ref.shared_with(screens[0]), &[screens[1]]);
        assert_eq!(object_ref.shared_with(screens[1]), &[screens[0]]);
    }

    #[test]
    fn test_unshare_missing_edge_is_noop() {
        let (mut manager, screens) = manager_with_screens(2);
        let object = manager.register_object(SceneObject::new("statue"));
        // Never shared: the call must not fail.
        manager
            .unshare_object_between(object, screens[0], screens[1])
            .unwrap();
        assert!(!manager.object(object).unwrap().is_shared());
    }

    #[test]
    fn test_warm_upload_restores_state() {
        struct CountingRenderer {
            renders: usize,
            clears: usize,
            seen_live: usize,
        }
        impl Renderer for CountingRenderer {
            fn render(&mut self, stage: &ScreenManager) {
                self.renders += 1;
                self.seen_live = stage.live().len();
            }
            fn clear(&mut self) {
                self.clears += 1;
            }
        }

        let (mut manager, screens) = manager_with_screens(1);
        let shown = manager.register_object(SceneObject::new("shown"));
        let hidden = manager.register_object(SceneObject::new("hidden"));
        manager.add_object_to_screen(screens[0], shown).unwrap();
        manager.add_object_to_screen(screens[0], hidden).unwrap();
        manager.object_mut(shown).unwrap().visible = true;
        manager.live.add(shown);

        let mut renderer = CountingRenderer {
            renders: 0,
            clears: 0,
            seen_live: 0,
        };
        manager.warm_upload(&mut renderer);

        assert_eq!(renderer.renders, 1);
        assert_eq!(renderer.clears, 1);
        // Both objects were live for the warm-up render.
        assert_eq!(renderer.seen_live, 2);
        // State restored exactly afterwards.
        assert!(manager.object(shown).unwrap().visible);
        assert!(!manager.object(hidden).unwrap().visible);
        assert!(manager.live().contains(shown));
        assert!(!manager.live().contains(hidden));
    }
}
