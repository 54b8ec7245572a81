//! Collidable object trait and identity types

use std::any::Any;

use slotmap::new_key_type;

use crate::collision::collider::{Collider, CollisionPointFilter};
use crate::collision::register::CollisionInformation;
use crate::foundation::math::Vec2;

new_key_type! {
    /// Stable generational key for an object registered with the handler
    ///
    /// Keys stay valid across add/remove staging; a key whose object has
    /// been committed out of the handler simply stops resolving.
    pub struct ObjectKey;
}

/// Identity of a single collider: owning object plus its index in the
/// owner's collider list
///
/// Collider indices are positional, so reordering an object's collider
/// list mid-simulation changes identities and resets contact tracking for
/// those colliders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColliderId {
    /// Owning object
    pub object: ObjectKey,
    /// Index into the owner's collider list
    pub index: u32,
}

impl ColliderId {
    /// Creates a collider id
    pub fn new(object: ObjectKey, index: u32) -> Self {
        Self { object, index }
    }
}

/// A participant in collision detection
///
/// Implementors own their colliders and receive resolution callbacks.
/// State accessors are split from callbacks: accessors are read during
/// the (possibly parallel) narrow phase, callbacks only ever fire from
/// the single-threaded resolve phase.
pub trait CollisionObject: Send + Sync {
    /// Whether this object takes part in collision detection at all
    fn enabled(&self) -> bool {
        true
    }

    /// Passive objects defer intersection-point computation to the other
    /// shape's convention (candidate-against-self instead of
    /// self-against-candidate)
    fn passive(&self) -> bool {
        false
    }

    /// Whether the narrow phase should sweep this object's colliders
    /// along its velocity before testing
    fn project_shape(&self) -> bool {
        false
    }

    /// Velocity in world units per second, used for shape projection
    fn velocity(&self) -> Vec2 {
        Vec2::zeros()
    }

    /// World position of the object, used as the reference for collision
    /// point filtering
    fn position(&self) -> Vec2;

    /// The object's colliders, in a stable order
    fn colliders(&self) -> &[Collider];

    /// Mutable access to the object's colliders
    fn colliders_mut(&mut self) -> &mut [Collider];

    /// Whether a single representative collision point should be
    /// synthesized before [`resolve_collision`](Self::resolve_collision)
    fn filter_collision_points(&self) -> bool {
        false
    }

    /// Policy used to pick the representative collision point
    fn collision_points_filter(&self) -> CollisionPointFilter {
        CollisionPointFilter::Closest
    }

    /// Called when this object is committed into a collision handler
    fn on_collision_system_entered(&mut self, _key: ObjectKey) {}

    /// Called when this object is committed out of a collision handler
    fn on_collision_system_left(&mut self, _key: ObjectKey) {}

    /// One aggregate callback per other object this object collided with
    /// this frame
    fn resolve_collision(&mut self, _info: &CollisionInformation) {}

    /// Fired when an object this one was touching stopped touching it
    fn resolve_contact_ended(&mut self, _other: ObjectKey) {}

    /// Fired per collider pair that stopped touching
    fn resolve_collider_contact_ended(&mut self, _own: ColliderId, _other: ColliderId) {}

    /// Downcast to Any for type-specific access
    fn as_any(&self) -> &dyn Any;

    /// Downcast to Any for mutable type-specific access
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
