//! Typed event emitters
//!
//! Every entity in the stage exposes one [`EventListeners`] per enumerated
//! event, replacing string-keyed listener tables: there is no event name to
//! mistype, so registering for an unknown event is impossible by
//! construction.
//!
//! Listener identity is pointer identity (`Rc::ptr_eq`), so a handle can be
//! registered, checked, and removed the way a function reference can in a
//! dynamic language. Registration is idempotent and removal of an absent
//! handle is a no-op. One-shot listeners (`add_once`) are unregistered
//! before their single invocation, which is what the transition machinery
//! uses instead of closures that remove themselves from inside their own
//! call.
//!
//! The whole stage is single-threaded and cooperative, so listeners live in
//! `Rc<RefCell<..>>` and receive `&mut Ctx` (the screen manager) along with
//! the event payload; a completion handler may therefore request the next
//! transition directly.

use smallvec::SmallVec;
use std::cell::RefCell;
use std::rc::Rc;

/// A shared handle to an event callback
///
/// Cloning the handle clones the *identity*, not the callback: all clones
/// compare equal for registration purposes.
pub struct Listener<Ctx: 'static, E: 'static> {
    callback: Rc<RefCell<dyn FnMut(&mut Ctx, &E)>>,
}

impl<Ctx: 'static, E: 'static> Clone for Listener<Ctx, E> {
    fn clone(&self) -> Self {
        Self {
            callback: Rc::clone(&self.callback),
        }
    }
}

impl<Ctx: 'static, E: 'static> std::fmt::Debug for Listener<Ctx, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Listener({:p})", Rc::as_ptr(&self.callback))
    }
}

impl<Ctx: 'static, E: 'static> Listener<Ctx, E> {
    /// Wrap a callback in a registerable handle
    pub fn new<F>(callback: F) -> Self
    where
        F: FnMut(&mut Ctx, &E) + 'static,
    {
        Self {
            callback: Rc::new(RefCell::new(callback)),
        }
    }

    /// Invoke the callback
    pub fn call(&self, ctx: &mut Ctx, event: &E) {
        (self.callback.borrow_mut())(ctx, event);
    }

    fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.callback, &other.callback)
    }
}

struct Entry<Ctx: 'static, E: 'static> {
    listener: Listener<Ctx, E>,
    once: bool,
}

/// Listener table for a single event
pub struct EventListeners<Ctx: 'static, E: 'static> {
    entries: Vec<Entry<Ctx, E>>,
}

impl<Ctx: 'static, E: 'static> Default for EventListeners<Ctx, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Ctx: 'static, E: 'static> EventListeners<Ctx, E> {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register a listener. Re-adding a registered handle is a no-op.
    ///
    /// Returns whether the handle was newly registered.
    pub fn add(&mut self, listener: &Listener<Ctx, E>) -> bool {
        if self.contains(listener) {
            return false;
        }
        self.entries.push(Entry {
            listener: listener.clone(),
            once: false,
        });
        true
    }

    /// Register a listener that fires at most once.
    ///
    /// The entry is removed *before* the invocation, so the callback sees a
    /// table it is no longer part of.
    pub fn add_once(&mut self, listener: &Listener<Ctx, E>) -> bool {
        if self.contains(listener) {
            return false;
        }
        self.entries.push(Entry {
            listener: listener.clone(),
            once: true,
        });
        true
    }

    /// Unregister a listener. Removing an absent handle is a no-op.
    ///
    /// Returns whether a registration was removed.
    pub fn remove(&mut self, listener: &Listener<Ctx, E>) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| !e.listener.ptr_eq(listener));
        self.entries.len() != before
    }

    /// Check whether a handle is registered
    pub fn contains(&self, listener: &Listener<Ctx, E>) -> bool {
        self.entries.iter().any(|e| e.listener.ptr_eq(listener))
    }

    /// Number of registered listeners
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all registrations
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Snapshot the handles for dispatch, consuming one-shot entries.
    ///
    /// Dispatching from a snapshot keeps the table free for mutation while
    /// the callbacks run (a listener may add or remove listeners, including
    /// itself).
    pub(crate) fn collect(&mut self) -> SmallVec<[Listener<Ctx, E>; 2]> {
        let handles = self.entries.iter().map(|e| e.listener.clone()).collect();
        self.entries.retain(|e| !e.once);
        handles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Table = EventListeners<u32, ()>;

    #[test]
    fn test_add_is_idempotent() {
        let mut table = Table::new();
        let listener = Listener::new(|count: &mut u32, _: &()| *count += 1);

        assert!(table.add(&listener));
        assert!(!table.add(&listener.clone()));
        assert_eq!(table.len(), 1);

        let mut count = 0;
        for handle in table.collect() {
            handle.call(&mut count, &());
        }
        assert_eq!(count, 1);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut table = Table::new();
        let registered = Listener::new(|_: &mut u32, _: &()| {});
        let stranger = Listener::new(|_: &mut u32, _: &()| {});

        table.add(&registered);
        assert!(!table.remove(&stranger));
        assert_eq!(table.len(), 1);
        assert!(table.remove(&registered));
        assert!(table.is_empty());
    }

    #[test]
    fn test_distinct_handles_have_distinct_identity() {
        let mut table = Table::new();
        let a = Listener::new(|count: &mut u32, _: &()| *count += 1);
        let b = Listener::new(|count: &mut u32, _: &()| *count += 10);

        table.add(&a);
        table.add(&b);
        assert_eq!(table.len(), 2);

        let mut count = 0;
        for handle in table.collect() {
            handle.call(&mut count, &());
        }
        assert_eq!(count, 11);
    }

    #[test]
    fn test_once_listener_is_consumed_before_firing() {
        let mut table = Table::new();
        let listener = Listener::new(|count: &mut u32, _: &()| *count += 1);
        table.add_once(&listener);

        let handles = table.collect();
        assert!(table.is_empty());
        let mut count = 0;
        for handle in &handles {
            handle.call(&mut count, &());
        }
        assert_eq!(count, 1);

        // A second dispatch finds nothing.
        assert!(table.collect().is_empty());
    }

    #[test]
    fn test_persistent_listener_survives_dispatch() {
        let mut table = Table::new();
        let listener = Listener::new(|count: &mut u32, _: &()| *count += 1);
        table.add(&listener);

        let mut count = 0;
        for _ in 0..3 {
            for handle in table.collect() {
                handle.call(&mut count, &());
            }
        }
        assert_eq!(count, 3);
        assert_eq!(table.len(), 1);
    }
}
