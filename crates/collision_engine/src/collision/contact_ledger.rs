//! Bipartite first-contact tracking
//!
//! A [`ContactLedger`] records which entities a given entity is touching.
//! [`DoubleBufferedLedger`] keeps two generations — last frame's result
//! (active) and this frame's in-progress result (temp) — and derives
//! contact-begin and contact-end transitions from the two without storing
//! an explicit per-frame diff.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Who-is-touching-whom snapshot, keyed entity -> set of entities
///
/// Never stores self-loops and never keeps an entity mapped to an empty
/// set; the entry is pruned on last removal.
#[derive(Debug, Clone)]
pub struct ContactLedger<K: Copy + Eq + Hash> {
    entries: HashMap<K, HashSet<K>>,
}

impl<K: Copy + Eq + Hash> Default for ContactLedger<K> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K: Copy + Eq + Hash> ContactLedger<K> {
    /// Creates an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `entity` touches `other`
    ///
    /// Returns whether the pair was newly recorded. Self-loops are
    /// rejected.
    pub fn add_entry(&mut self, entity: K, other: K) -> bool {
        if entity == other {
            return false;
        }
        self.entries.entry(entity).or_default().insert(other)
    }

    /// Forget that `entity` touches `other`
    ///
    /// Returns whether the pair was present. A set emptied by the removal
    /// is pruned immediately.
    pub fn remove_entry(&mut self, entity: K, other: K) -> bool {
        let Some(set) = self.entries.get_mut(&entity) else {
            return false;
        };
        let removed = set.remove(&other);
        if set.is_empty() {
            self.entries.remove(&entity);
        }
        removed
    }

    /// Whether the pair is recorded
    pub fn contains(&self, entity: K, other: K) -> bool {
        self.entries.get(&entity).is_some_and(|set| set.contains(&other))
    }

    /// Number of entities with at least one recorded contact
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate recorded (entity, touched-set) pairs
    pub fn iter(&self) -> impl Iterator<Item = (K, &HashSet<K>)> {
        self.entries.iter().map(|(k, set)| (*k, set))
    }

    /// Drain all recorded pairs
    pub fn drain(&mut self) -> impl Iterator<Item = (K, HashSet<K>)> + '_ {
        self.entries.drain()
    }

    /// Remove everything
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Two ledger generations plus the per-frame contact protocol
///
/// Per observed overlap, [`register_contact`](Self::register_contact)
/// consumes the pair out of the active (previous-frame) generation and
/// records it into temp; whatever is left in active when the frame ends
/// is exactly the set of pairs that stopped touching.
#[derive(Debug, Clone)]
pub struct DoubleBufferedLedger<K: Copy + Eq + Hash> {
    active: ContactLedger<K>,
    temp: ContactLedger<K>,
}

impl<K: Copy + Eq + Hash> Default for DoubleBufferedLedger<K> {
    fn default() -> Self {
        Self {
            active: ContactLedger::new(),
            temp: ContactLedger::new(),
        }
    }
}

impl<K: Copy + Eq + Hash> DoubleBufferedLedger<K> {
    /// Creates an empty ledger pair
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an observed overlap; returns whether it is a first contact
    ///
    /// A pair already present in active was touching last frame, so it is
    /// not a first contact; removing it from active marks it still
    /// current. A pair already in temp was counted earlier this frame (a
    /// second collider of the same owners), which also is not a first
    /// contact.
    pub fn register_contact(&mut self, entity: K, other: K) -> bool {
        let removed = self.active.remove_entry(entity, other);
        let added = self.temp.add_entry(entity, other);
        !removed && added
    }

    /// Finish the frame: report ended contacts, then swap generations
    ///
    /// Everything still in active stopped touching this frame; `on_ended`
    /// fires per (entity, other) pair. Temp becomes the next frame's
    /// active, the drained active becomes the new empty temp.
    pub fn finish_frame(&mut self, mut on_ended: impl FnMut(K, K)) {
        for (entity, others) in self.active.drain() {
            for other in others {
                on_ended(entity, other);
            }
        }
        std::mem::swap(&mut self.active, &mut self.temp);
    }

    /// Last frame's generation
    pub fn active(&self) -> &ContactLedger<K> {
        &self.active
    }

    /// Mutable access to last frame's generation (parallel narrow phase
    /// temporarily moves it behind a lock)
    #[cfg(feature = "parallel")]
    pub(crate) fn active_mut(&mut self) -> &mut ContactLedger<K> {
        &mut self.active
    }

    /// This frame's in-progress generation
    pub fn temp(&self) -> &ContactLedger<K> {
        &self.temp
    }

    /// Mutable access to this frame's in-progress generation (used by the
    /// serial merge after a parallel narrow phase)
    #[cfg(feature = "parallel")]
    pub(crate) fn temp_mut(&mut self) -> &mut ContactLedger<K> {
        &mut self.temp
    }

    /// Drop both generations
    pub fn clear(&mut self) {
        self.active.clear();
        self.temp.clear();
    }
}
