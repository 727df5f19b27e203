//! Renderer boundary
//!
//! Rendering is an external collaborator: the stage decides *what* is live
//! and visible, the host decides how to draw it. [`LiveScene`] is the
//! membership set the transition machinery maintains — objects are added
//! when they enter and removed when their exit completes — and the host's
//! renderer walks it in insertion order each frame.

use crate::manager::ScreenManager;
use crate::ObjectId;
use indexmap::IndexSet;

/// Host-side renderer consumed through its interface only
pub trait Renderer {
    /// Draw the current live scene through the stage camera
    fn render(&mut self, stage: &ScreenManager);

    /// Clear the output target
    fn clear(&mut self);
}

/// Insertion-ordered set of the objects currently part of the scene
#[derive(Debug, Default)]
pub struct LiveScene {
    members: IndexSet<ObjectId>,
}

impl LiveScene {
    /// Empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object; re-adding is a no-op. Returns whether membership
    /// changed.
    pub fn add(&mut self, object: ObjectId) -> bool {
        self.members.insert(object)
    }

    /// Remove an object, keeping the order of the rest. Returns whether
    /// membership changed.
    pub fn remove(&mut self, object: ObjectId) -> bool {
        self.members.shift_remove(&object)
    }

    /// Whether an object is part of the scene
    pub fn contains(&self, object: ObjectId) -> bool {
        self.members.contains(&object)
    }

    /// Iterate members in insertion order
    pub fn iter(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.members.iter().copied()
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the scene is empty
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Remove every member
    pub fn clear(&mut self) {
        self.members.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::KeyData;

    fn object_id(n: u64) -> ObjectId {
        ObjectId::from(KeyData::from_ffi(n))
    }

    #[test]
    fn test_membership() {
        let mut scene = LiveScene::new();
        let (a, b) = (object_id(1), object_id(2));

        assert!(scene.add(a));
        assert!(!scene.add(a));
        assert!(scene.contains(a));
        assert!(!scene.contains(b));

        assert!(scene.remove(a));
        assert!(!scene.remove(a));
        assert!(scene.is_empty());
    }

    #[test]
    fn test_insertion_order_survives_removal() {
        let mut scene = LiveScene::new();
        let ids: Vec<_> = (1..=4).map(object_id).collect();
        for &id in &ids {
            scene.add(id);
        }
        scene.remove(ids[1]);

        let order: Vec<_> = scene.iter().collect();
        assert_eq!(order, vec![ids[0], ids[2], ids[3]]);
    }
}
