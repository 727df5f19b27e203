//! Object hierarchies and pointer listener propagation
//!
//! A scene object wraps a small tree of renderer nodes. The stage never
//! looks inside the renderer's representation; it only needs the hierarchy
//! shape, because the host's ray-caster targets *leaf* nodes (the meshes
//! that actually intersect a ray) while transitions animate the root.
//!
//! Leaf listener attachment is split from traversal: [`NodeTree::leaves`]
//! returns the leaf set, and [`SceneObject`](crate::SceneObject) applies a
//! listener to it.

use crate::events::EventListeners;
use crate::manager::ScreenManager;
use glam::Vec2;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

new_key_type! {
    /// Key of a node within one object's hierarchy
    pub struct NodeKey;
}

/// Cursor state delivered with click/hover events
///
/// Coordinates are normalized device coordinates supplied by the host's
/// input layer; the delta is relative to the previous cursor sample.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerInfo {
    /// Cursor position in normalized device coordinates
    pub ndc: Vec2,
    /// Movement since the previous sample
    pub delta: Vec2,
}

/// The pointer interactions a node can listen for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerEventKind {
    /// Press and release without movement
    Click,
    /// Cursor passing over the node
    Hover,
}

/// Pointer listener tables of a single node
#[derive(Default)]
pub struct NodeListeners {
    /// Fired when the host ray-caster reports a click on this node
    pub click: EventListeners<ScreenManager, PointerInfo>,
    /// Fired when the host ray-caster reports a hover over this node
    pub hover: EventListeners<ScreenManager, PointerInfo>,
}

/// One node of an object's wrapped hierarchy
pub struct SceneNode {
    /// Node name, when the asset provides one
    pub name: Option<String>,
    parent: Option<NodeKey>,
    children: SmallVec<[NodeKey; 4]>,
    /// Pointer listeners attached to this node
    pub listeners: NodeListeners,
}

impl SceneNode {
    /// Create an unnamed node
    pub fn new() -> Self {
        Self {
            name: None,
            parent: None,
            children: SmallVec::new(),
            listeners: NodeListeners::default(),
        }
    }

    /// Create a named node
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new()
        }
    }

    /// Parent key, `None` for the root
    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    /// Child keys
    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }

    /// Whether this node has no children
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

impl Default for SceneNode {
    fn default() -> Self {
        Self::new()
    }
}

/// Arena-backed hierarchy owned by one scene object
pub struct NodeTree {
    nodes: SlotMap<NodeKey, SceneNode>,
    root: NodeKey,
}

impl NodeTree {
    /// Create a hierarchy consisting of a single root node
    pub fn single() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(SceneNode::new());
        Self { nodes, root }
    }

    /// Root key
    pub fn root(&self) -> NodeKey {
        self.root
    }

    /// Insert a node under `parent`.
    ///
    /// Returns `None` when the parent key is stale.
    pub fn add_child(&mut self, parent: NodeKey, mut node: SceneNode) -> Option<NodeKey> {
        if !self.nodes.contains_key(parent) {
            return None;
        }
        node.parent = Some(parent);
        let key = self.nodes.insert(node);
        self.nodes[parent].children.push(key);
        Some(key)
    }

    /// Look up a node
    pub fn get(&self, key: NodeKey) -> Option<&SceneNode> {
        self.nodes.get(key)
    }

    /// Look up a node mutably
    pub fn get_mut(&mut self, key: NodeKey) -> Option<&mut SceneNode> {
        self.nodes.get_mut(key)
    }

    /// Number of nodes in the hierarchy
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A hierarchy always contains at least its root
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Collect the leaf set in depth-first order.
    ///
    /// A childless root is its own leaf set.
    pub fn leaves(&self) -> Vec<NodeKey> {
        let mut leaves = Vec::new();
        let mut stack = vec![self.root];
        while let Some(key) = stack.pop() {
            let Some(node) = self.nodes.get(key) else {
                continue;
            };
            if node.children.is_empty() {
                leaves.push(key);
            } else {
                // Reverse keeps the depth-first order left-to-right.
                stack.extend(node.children.iter().rev().copied());
            }
        }
        leaves
    }

    /// Iterate over all node keys
    pub fn keys(&self) -> impl Iterator<Item = NodeKey> + '_ {
        self.nodes.keys()
    }
}

impl Default for NodeTree {
    fn default() -> Self {
        Self::single()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_root_is_leaf() {
        let tree = NodeTree::single();
        assert_eq!(tree.leaves(), vec![tree.root()]);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_leaves_skip_interior_nodes() {
        let mut tree = NodeTree::single();
        let branch = tree.add_child(tree.root(), SceneNode::new()).unwrap();
        let a = tree.add_child(branch, SceneNode::named("a")).unwrap();
        let b = tree.add_child(branch, SceneNode::named("b")).unwrap();
        let c = tree.add_child(tree.root(), SceneNode::named("c")).unwrap();

        let leaves = tree.leaves();
        assert_eq!(leaves, vec![a, b, c]);
        assert!(!leaves.contains(&tree.root()));
        assert!(!leaves.contains(&branch));
    }

    #[test]
    fn test_add_child_to_unknown_parent() {
        let mut tree = NodeTree::single();
        assert!(tree.add_child(NodeKey::default(), SceneNode::new()).is_none());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_parent_links() {
        let mut tree = NodeTree::single();
        let child = tree.add_child(tree.root(), SceneNode::new()).unwrap();
        assert_eq!(tree.get(child).unwrap().parent(), Some(tree.root()));
        assert_eq!(tree.get(tree.root()).unwrap().children(), &[child]);
    }
}
