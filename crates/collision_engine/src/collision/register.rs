//! Per-frame collision accumulation
//!
//! During the narrow phase each colliding object builds a
//! [`CollisionRegister`] aggregating everything it hit, keyed by the
//! other object. The [`CollisionStack`] maps resolver objects to their
//! registers and is walked exactly once per frame to dispatch
//! resolution callbacks.

use std::collections::HashMap;

use slotmap::Key;

use crate::collision::object::{ColliderId, ObjectKey};
use crate::geometry::IntersectionPoint;

/// One overlapping collider pair observed this frame
#[derive(Debug, Clone)]
pub struct Collision {
    /// The resolver's collider
    pub self_collider: ColliderId,
    /// The collider it overlapped
    pub other_collider: ColliderId,
    /// Whether this specific collider pair started touching this frame
    pub first_contact: bool,
    /// Boundary crossing points, empty unless the collider requested
    /// intersection computation
    pub points: Vec<IntersectionPoint>,
}

/// Aggregate of all collisions between one resolver and one other object
/// this frame
#[derive(Debug, Clone)]
pub struct CollisionInformation {
    /// The other object
    pub other: ObjectKey,
    /// Whether the two objects started touching this frame
    pub first_contact: bool,
    /// Every collider-pair collision contributing to this aggregate, in
    /// detection order
    pub collisions: Vec<Collision>,
    /// Representative point synthesized by the resolver's filter policy
    /// right before dispatch; `None` when filtering is off or no points
    /// exist
    pub representative_point: Option<IntersectionPoint>,
}

impl CollisionInformation {
    fn new(other: ObjectKey, first_contact: bool) -> Self {
        Self {
            other,
            first_contact,
            collisions: Vec::new(),
            representative_point: None,
        }
    }

    /// Total number of collision points across all collisions
    pub fn total_points(&self) -> usize {
        self.collisions.iter().map(|c| c.points.len()).sum()
    }

    /// Iterate all collision points across all collisions
    pub fn points(&self) -> impl Iterator<Item = &IntersectionPoint> {
        self.collisions.iter().flat_map(|c| c.points.iter())
    }
}

/// Everything one object hit this frame, aggregated per other object
///
/// Aggregates are created lazily on the first real collision, so the
/// register never holds an empty [`CollisionInformation`].
#[derive(Debug, Default, Clone)]
pub struct CollisionRegister {
    by_other: HashMap<ObjectKey, usize>,
    infos: Vec<CollisionInformation>,
}

impl CollisionRegister {
    /// Creates an empty register
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a collision to the aggregate for its other object
    ///
    /// `first_contact_object` seeds the aggregate's object-level
    /// first-contact flag only when the aggregate is created. Returns
    /// `false` (and drops the collision) if either side carries a null
    /// owner — a stale reference callers should have filtered upstream.
    pub fn add_collision(&mut self, collision: Collision, first_contact_object: bool) -> bool {
        if collision.self_collider.object.is_null() || collision.other_collider.object.is_null() {
            return false;
        }
        let other = collision.other_collider.object;
        let index = match self.by_other.get(&other) {
            Some(&index) => index,
            None => {
                self.infos.push(CollisionInformation::new(other, first_contact_object));
                self.by_other.insert(other, self.infos.len() - 1);
                self.infos.len() - 1
            }
        };
        self.infos[index].collisions.push(collision);
        true
    }

    /// Number of other objects hit
    pub fn len(&self) -> usize {
        self.infos.len()
    }

    /// Whether nothing was hit
    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    /// Iterate aggregates in creation order
    pub fn iter(&self) -> impl Iterator<Item = &CollisionInformation> {
        self.infos.iter()
    }

    fn iter_mut(&mut self) -> impl Iterator<Item = &mut CollisionInformation> {
        self.infos.iter_mut()
    }
}

/// Resolver object -> collision register dispatch table
///
/// Insertion-ordered so sequential-mode dispatch is deterministic.
#[derive(Debug, Default)]
pub struct CollisionStack {
    order: Vec<ObjectKey>,
    registers: HashMap<ObjectKey, CollisionRegister>,
}

impl CollisionStack {
    /// Creates an empty stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an owner's collisions for this frame
    ///
    /// Empty registers are refused, as is a second register for an owner
    /// that already has one this frame (an owner accumulates into exactly
    /// one register per frame).
    pub fn add_collision_register(&mut self, owner: ObjectKey, register: CollisionRegister) -> bool {
        if register.is_empty() || self.registers.contains_key(&owner) {
            return false;
        }
        self.order.push(owner);
        self.registers.insert(owner, register);
        true
    }

    /// Number of resolvers with collisions this frame
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether no collisions were recorded this frame
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Walk and drain the stack, invoking `dispatch` once per
    /// (resolver, other-object) aggregate
    pub fn process(&mut self, mut dispatch: impl FnMut(ObjectKey, &mut CollisionInformation)) {
        for owner in std::mem::take(&mut self.order) {
            let Some(mut register) = self.registers.remove(&owner) else {
                continue;
            };
            for info in register.iter_mut() {
                dispatch(owner, info);
            }
        }
    }

    /// Drop everything without dispatching
    pub fn clear(&mut self) {
        self.order.clear();
        self.registers.clear();
    }
}
