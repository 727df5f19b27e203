//! Scene object wrapper
//!
//! [`SceneObject`] turns an externally-instanced renderer node into a
//! participant of the transition system: it owns the transition animation
//! slots, the shared-screen adjacency bookkeeping, and the typed listener
//! tables. The stage assumes nothing about the renderer beyond "has a pose,
//! a visibility flag, and a child hierarchy".
//!
//! Objects live in the manager's arena and are referenced by
//! [`ObjectId`](crate::ObjectId); screens hold name-to-id entries rather
//! than owning the objects, which is what lets a shared object appear in
//! several screens' collections at once.

use crate::events::{EventListeners, Listener};
use crate::manager::ScreenManager;
use crate::node::{NodeTree, PointerEventKind, PointerInfo};
use crate::transition::{TransitionKind, TransitionSet};
use crate::ScreenId;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use vitrine_animation::Pose;

/// Listener tables of a scene object, one per event
#[derive(Default)]
pub struct ObjectListeners {
    /// Entrance animation completed
    pub transition_in_finished: EventListeners<ScreenManager, crate::ObjectId>,
    /// Exit animation completed (object is now hidden and off the scene)
    pub transition_out_finished: EventListeners<ScreenManager, crate::ObjectId>,
    /// Shared-screen transition completed
    pub shared_transition_finished: EventListeners<ScreenManager, crate::ObjectId>,
    /// Host ray-caster reported a click on this object
    pub click: EventListeners<ScreenManager, PointerInfo>,
    /// Host ray-caster reported a hover over this object
    pub hover: EventListeners<ScreenManager, PointerInfo>,
    /// Fired every tick with the frame delta in milliseconds
    pub update: EventListeners<ScreenManager, f32>,
}

/// A renderer node augmented with transition state
pub struct SceneObject {
    name: String,
    /// Live pose; transitions apply deltas here, hosts may mutate it too
    pub pose: Pose,
    /// Render visibility
    pub visible: bool,
    /// When set, wins over the default "visible after entering" behavior;
    /// lets a screen keep a shared object hidden past its entrance
    pub visible_override: Option<bool>,
    hierarchy: NodeTree,
    pub(crate) shared_between: FxHashMap<ScreenId, SmallVec<[ScreenId; 2]>>,
    pub(crate) entry_points: SmallVec<[ScreenId; 2]>,
    /// Animation slots
    pub transitions: TransitionSet,
    /// Event listener tables
    pub listeners: ObjectListeners,
    pub(crate) running: Option<TransitionKind>,
    has_leaf_click: bool,
    has_leaf_hover: bool,
}

impl SceneObject {
    /// Wrap a single-node hierarchy.
    ///
    /// Objects start hidden; a screen's entrance makes them visible.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_hierarchy(name, NodeTree::single())
    }

    /// Wrap an externally-built hierarchy
    pub fn with_hierarchy(name: impl Into<String>, hierarchy: NodeTree) -> Self {
        Self {
            name: name.into(),
            pose: Pose::default(),
            visible: false,
            visible_override: None,
            hierarchy,
            shared_between: FxHashMap::default(),
            entry_points: SmallVec::new(),
            transitions: TransitionSet::default(),
            listeners: ObjectListeners::default(),
            running: None,
            has_leaf_click: false,
            has_leaf_hover: false,
        }
    }

    /// Object name, unique within each screen's collection
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The wrapped hierarchy
    pub fn hierarchy(&self) -> &NodeTree {
        &self.hierarchy
    }

    /// The wrapped hierarchy, mutably
    pub fn hierarchy_mut(&mut self) -> &mut NodeTree {
        &mut self.hierarchy
    }

    /// Derived shared flag: true while any adjacency edge exists
    pub fn is_shared(&self) -> bool {
        !self.shared_between.is_empty()
    }

    /// Screens this object is shared with, seen from `screen`.
    ///
    /// Empty when no sharing is recorded for that screen.
    pub fn shared_with(&self, screen: ScreenId) -> &[ScreenId] {
        self.shared_between
            .get(&screen)
            .map(|neighbors| neighbors.as_slice())
            .unwrap_or(&[])
    }

    /// Whether any sharing is recorded for `screen`
    pub fn has_adjacency(&self, screen: ScreenId) -> bool {
        self.shared_between.contains_key(&screen)
    }

    /// Screens at which this object, if hidden, should reappear
    pub fn entry_points(&self) -> &[ScreenId] {
        &self.entry_points
    }

    /// Whether `screen` is one of the object's entry points
    pub fn is_entry_point(&self, screen: ScreenId) -> bool {
        self.entry_points.contains(&screen)
    }

    /// The transition leg currently driving this object, if any
    pub fn running(&self) -> Option<TransitionKind> {
        self.running
    }

    /// Record one direction of a sharing edge. Returns whether the
    /// adjacency list changed.
    pub(crate) fn add_adjacency(&mut self, screen: ScreenId, neighbor: ScreenId) -> bool {
        let neighbors = self.shared_between.entry(screen).or_default();
        if neighbors.contains(&neighbor) {
            return false;
        }
        neighbors.push(neighbor);
        true
    }

    /// Remove one direction of a sharing edge. Returns whether the
    /// adjacency list changed. Empty lists are dropped so `is_shared`
    /// stays a pure derivation.
    pub(crate) fn remove_adjacency(&mut self, screen: ScreenId, neighbor: ScreenId) -> bool {
        let Some(neighbors) = self.shared_between.get_mut(&screen) else {
            return false;
        };
        let Some(index) = neighbors.iter().position(|&s| s == neighbor) else {
            return false;
        };
        neighbors.remove(index);
        if neighbors.is_empty() {
            self.shared_between.remove(&screen);
        }
        true
    }

    /// Attach a pointer listener to every leaf of the wrapped hierarchy.
    ///
    /// With `include_object` the listener is also registered on the object's
    /// own table, so a hit anywhere in the hierarchy and a hit reported
    /// against the object both reach it. Registration is idempotent per
    /// node.
    pub fn add_leaf_listener(
        &mut self,
        kind: PointerEventKind,
        listener: &Listener<ScreenManager, PointerInfo>,
        include_object: bool,
    ) {
        for key in self.hierarchy.leaves() {
            if let Some(node) = self.hierarchy.get_mut(key) {
                match kind {
                    PointerEventKind::Click => node.listeners.click.add(listener),
                    PointerEventKind::Hover => node.listeners.hover.add(listener),
                };
            }
        }
        if include_object {
            match kind {
                PointerEventKind::Click => self.listeners.click.add(listener),
                PointerEventKind::Hover => self.listeners.hover.add(listener),
            };
        }
        match kind {
            PointerEventKind::Click => self.has_leaf_click = true,
            PointerEventKind::Hover => self.has_leaf_hover = true,
        }
    }

    /// Detach a pointer listener from the same leaf set
    /// [`add_leaf_listener`](Self::add_leaf_listener) attached it to.
    pub fn remove_leaf_listener(
        &mut self,
        kind: PointerEventKind,
        listener: &Listener<ScreenManager, PointerInfo>,
    ) {
        for key in self.hierarchy.leaves() {
            if let Some(node) = self.hierarchy.get_mut(key) {
                match kind {
                    PointerEventKind::Click => node.listeners.click.remove(listener),
                    PointerEventKind::Hover => node.listeners.hover.remove(listener),
                };
            }
        }
        match kind {
            PointerEventKind::Click => {
                self.listeners.click.remove(listener);
                self.has_leaf_click = false;
            }
            PointerEventKind::Hover => {
                self.listeners.hover.remove(listener);
                self.has_leaf_hover = false;
            }
        }
    }

    /// Whether any leaf currently listens for `kind`; the host ray-caster
    /// uses this to skip objects that cannot react.
    pub fn has_leaf_listener(&self, kind: PointerEventKind) -> bool {
        match kind {
            PointerEventKind::Click => self.has_leaf_click,
            PointerEventKind::Hover => self.has_leaf_hover,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::SceneNode;
    use slotmap::KeyData;

    fn screen_id(n: u64) -> ScreenId {
        ScreenId::from(KeyData::from_ffi(n))
    }

    #[test]
    fn test_objects_start_hidden_and_unshared() {
        let object = SceneObject::new("pillar");
        assert!(!object.visible);
        assert!(!object.is_shared());
        assert!(object.running().is_none());
    }

    #[test]
    fn test_adjacency_is_idempotent() {
        let mut object = SceneObject::new("pillar");
        let (a, b) = (screen_id(1), screen_id(2));

        assert!(object.add_adjacency(a, b));
        assert!(!object.add_adjacency(a, b));
        assert_eq!(object.shared_with(a), &[b]);
        assert!(object.is_shared());
    }

    #[test]
    fn test_remove_adjacency_recomputes_shared() {
        let mut object = SceneObject::new("pillar");
        let (a, b) = (screen_id(1), screen_id(2));
        object.add_adjacency(a, b);
        object.add_adjacency(b, a);

        assert!(object.remove_adjacency(a, b));
        assert!(object.is_shared());
        assert!(object.remove_adjacency(b, a));
        assert!(!object.is_shared());

        // Removing an edge that is not there is a no-op.
        assert!(!object.remove_adjacency(a, b));
    }

    #[test]
    fn test_leaf_listener_propagation_and_inverse() {
        let mut tree = NodeTree::single();
        let branch = tree.add_child(tree.root(), SceneNode::new()).unwrap();
        let leaf_a = tree.add_child(branch, SceneNode::new()).unwrap();
        let leaf_b = tree.add_child(tree.root(), SceneNode::new()).unwrap();

        let mut object = SceneObject::with_hierarchy("statue", tree);
        let listener = Listener::new(|_: &mut ScreenManager, _: &PointerInfo| {});

        object.add_leaf_listener(PointerEventKind::Click, &listener, true);
        assert!(object.has_leaf_listener(PointerEventKind::Click));
        assert!(object.listeners.click.contains(&listener));
        for key in [leaf_a, leaf_b] {
            assert!(object.hierarchy().get(key).unwrap().listeners.click.contains(&listener));
        }
        // Interior nodes are not part of the leaf set.
        assert!(!object.hierarchy().get(branch).unwrap().listeners.click.contains(&listener));

        object.remove_leaf_listener(PointerEventKind::Click, &listener);
        assert!(!object.has_leaf_listener(PointerEventKind::Click));
        assert!(!object.listeners.click.contains(&listener));
        for key in [leaf_a, leaf_b] {
            assert!(!object.hierarchy().get(key).unwrap().listeners.click.contains(&listener));
        }
    }
}
