//! Deferred-mutation register for the live object set
//!
//! Add/remove calls only stage; [`DeferredObjectRegister::process`]
//! commits at the frame's safe point. This lets the narrow phase iterate
//! the live list as a stable snapshot while game logic stages membership
//! changes mid-frame.

use std::collections::HashSet;

use crate::collision::object::ObjectKey;

/// Lifecycle event reported while committing staged changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectEvent {
    /// The object became live
    Added,
    /// The object left the live set
    Removed,
}

/// Staged live set of collidable objects
///
/// The live list preserves insertion order so the narrow phase scans
/// objects deterministically in sequential mode.
#[derive(Default)]
pub struct DeferredObjectRegister {
    live: Vec<ObjectKey>,
    live_set: HashSet<ObjectKey>,
    pending_add: Vec<ObjectKey>,
    pending_add_set: HashSet<ObjectKey>,
    pending_remove: Vec<ObjectKey>,
    pending_remove_set: HashSet<ObjectKey>,
}

impl DeferredObjectRegister {
    /// Creates an empty register
    pub fn new() -> Self {
        Self::default()
    }

    /// The committed live set, in insertion order
    pub fn live(&self) -> &[ObjectKey] {
        &self.live
    }

    /// Whether the key is currently committed live
    pub fn is_live(&self, key: ObjectKey) -> bool {
        self.live_set.contains(&key)
    }

    /// Number of committed live objects
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Whether no objects are committed live
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Stage a key for addition at the next commit
    ///
    /// Re-adding a live key whose removal is staged cancels the pending
    /// removal and returns `true`; the key stays live and no lifecycle
    /// event fires for it at commit. Returns `false` when the key is
    /// already live or already staged for addition.
    pub fn add(&mut self, key: ObjectKey) -> bool {
        if self.pending_remove_set.contains(&key) {
            self.pending_remove_set.remove(&key);
            self.pending_remove.retain(|k| *k != key);
            return true;
        }
        if self.live_set.contains(&key) || self.pending_add_set.contains(&key) {
            return false;
        }
        self.pending_add_set.insert(key);
        self.pending_add.push(key);
        true
    }

    /// Stage several keys for addition
    pub fn add_range(&mut self, keys: impl IntoIterator<Item = ObjectKey>) -> usize {
        keys.into_iter().filter(|&key| self.add(key)).count()
    }

    /// Stage a key for removal at the next commit
    ///
    /// Removing a key that is only staged for addition cancels the add:
    /// the key never becomes live and no lifecycle event ever fires for
    /// it. Returns `false` for unknown or already-staged keys.
    pub fn remove(&mut self, key: ObjectKey) -> bool {
        if self.pending_add_set.remove(&key) {
            self.pending_add.retain(|k| *k != key);
            return true;
        }
        if self.live_set.contains(&key) && !self.pending_remove_set.contains(&key) {
            self.pending_remove_set.insert(key);
            self.pending_remove.push(key);
            return true;
        }
        false
    }

    /// Stage several keys for removal
    pub fn remove_range(&mut self, keys: impl IntoIterator<Item = ObjectKey>) -> usize {
        keys.into_iter().filter(|&key| self.remove(key)).count()
    }

    /// Commit staged changes into the live set
    ///
    /// Removals apply first, then additions, with `hook` fired once per
    /// committed object. This is the only place the live set mutates.
    pub fn process(&mut self, mut hook: impl FnMut(ObjectEvent, ObjectKey)) {
        for key in std::mem::take(&mut self.pending_remove) {
            self.pending_remove_set.remove(&key);
            if self.live_set.remove(&key) {
                self.live.retain(|k| *k != key);
                hook(ObjectEvent::Removed, key);
            }
        }
        for key in std::mem::take(&mut self.pending_add) {
            self.pending_add_set.remove(&key);
            if self.live_set.insert(key) {
                self.live.push(key);
                hook(ObjectEvent::Added, key);
            }
        }
    }

    /// Drop everything, firing a removal event per live object
    ///
    /// Staged-but-uncommitted additions never fire any event. Calling
    /// `clear` twice in a row fires nothing the second time.
    pub fn clear(&mut self, mut on_removed: impl FnMut(ObjectKey)) {
        for key in std::mem::take(&mut self.live) {
            on_removed(key);
        }
        self.live_set.clear();
        self.pending_add.clear();
        self.pending_add_set.clear();
        self.pending_remove.clear();
        self.pending_remove_set.clear();
    }
}
