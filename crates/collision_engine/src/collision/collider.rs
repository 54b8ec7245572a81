//! Collider data and collision layer filtering
//!
//! Layer filtering follows the usual bit scheme: a collider lives on a
//! single layer bit and carries a mask of the layers it is willing to
//! test against.

use crate::foundation::math::Vec2;
use crate::geometry::ColliderShape;

/// Collision layer definitions using bit constants for efficient filtering
pub struct CollisionLayers;

impl CollisionLayers {
    /// No collision layer
    pub const NONE: u32 = 0;

    /// All collision layers
    pub const ALL: u32 = 0xFFFF_FFFF;

    /// Player character layer
    pub const PLAYER: u32 = 1 << 0;

    /// Enemy character layer
    pub const ENEMY: u32 = 1 << 1;

    /// Projectiles (bullets, missiles, etc.)
    pub const PROJECTILE: u32 = 1 << 2;

    /// Static environment geometry
    pub const ENVIRONMENT: u32 = 1 << 3;

    /// Trigger volumes (no physical response)
    pub const TRIGGER: u32 = 1 << 4;

    /// Debris and small physics objects
    pub const DEBRIS: u32 = 1 << 5;
}

/// Bit set of layers a collider tests against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionMask(pub u32);

impl CollisionMask {
    /// Mask matching every layer
    pub const ALL: Self = Self(CollisionLayers::ALL);

    /// Mask matching no layer
    pub const NONE: Self = Self(CollisionLayers::NONE);

    /// Build a mask from a list of layer bits
    pub fn from_layers(layers: &[u32]) -> Self {
        Self(layers.iter().fold(0, |acc, &layer| acc | layer))
    }

    /// Check whether the given layer is in this mask
    pub fn has(&self, layer: u32) -> bool {
        (self.0 & layer) != 0
    }
}

impl Default for CollisionMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// Policy for picking the single representative collision point handed to
/// a resolver that requests point filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPointFilter {
    /// The point closest to the resolver's position
    #[default]
    Closest,
    /// The point furthest from the resolver's position
    Furthest,
    /// The average of all points, with an averaged normal
    Combined,
}

/// A single shape attached to a collidable object
#[derive(Debug, Clone)]
pub struct Collider {
    /// World-space shape, kept current by the owning object
    pub shape: ColliderShape,
    /// The shape's reference position on the previous frame, used as the
    /// anchor for synthetic contact points when one shape contains the
    /// other
    pub prev_position: Vec2,
    /// The single layer bit this collider lives on
    pub layer: u32,
    /// Layers this collider tests against
    pub mask: CollisionMask,
    /// Disabled colliders are skipped by fill, narrow phase and queries
    pub enabled: bool,
    /// Whether the narrow phase should compute intersection points for
    /// this collider's overlaps
    pub compute_intersections: bool,
}

impl Collider {
    /// Creates an enabled collider on the given layer matching all layers
    pub fn new(shape: ColliderShape, layer: u32) -> Self {
        Self {
            shape,
            prev_position: shape.center(),
            layer,
            mask: CollisionMask::ALL,
            enabled: true,
            compute_intersections: false,
        }
    }

    /// Sets the collision mask
    pub fn with_mask(mut self, mask: CollisionMask) -> Self {
        self.mask = mask;
        self
    }

    /// Enables intersection-point computation
    pub fn with_intersections(mut self) -> Self {
        self.compute_intersections = true;
        self
    }

    /// Move the shape to a new world position, remembering the previous
    /// one as the synthetic-contact anchor
    pub fn set_position(&mut self, position: Vec2) {
        self.prev_position = self.shape.center();
        self.shape = self.shape.translated(position - self.shape.center());
    }
}
