//! # Collision Engine
//!
//! Broadphase-driven collision detection and contact lifecycle tracking
//! for 2D games.
//!
//! ## Features
//!
//! - **Two-phase detection**: spatial-hash broadphase pruning plus exact
//!   narrow-phase shape tests
//! - **Contact lifecycle**: begin/persist/end transitions tracked per
//!   object pair and per collider pair across frames
//! - **Deferred membership**: objects can be staged for add/remove
//!   mid-frame without invalidating the in-flight scan
//! - **Space queries**: cast and intersect queries over the same
//!   broadphase
//! - **Optional parallelism**: a rayon-backed narrow phase behind the
//!   `parallel` feature
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use collision_engine::prelude::*;
//!
//! let mut handler = CollisionHandler::with_grid(SpatialHashConfig::default())?;
//! // handler.add(...) game objects implementing CollisionObject, then
//! // drive one frame per simulation tick:
//! for _ in 0..3 {
//!     handler.update(1.0 / 60.0);
//! }
//! # Ok::<(), collision_engine::broadphase::BroadphaseError>(())
//! ```
//!
//! Objects implement [`CollisionObject`](collision::CollisionObject):
//! they own their colliders and receive `resolve_collision` /
//! `resolve_contact_ended` callbacks during each frame's resolve phase.

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod broadphase;
pub mod collision;
pub mod debug;
pub mod foundation;
pub mod geometry;

/// Common imports for collision engine users
pub mod prelude {
    pub use crate::broadphase::{Broadphase, SpatialHashConfig, SpatialHashGrid};
    pub use crate::collision::{
        CastSpaceResult, Collider, ColliderId, Collision, CollisionHandler, CollisionInformation,
        CollisionLayers, CollisionMask, CollisionObject, CollisionPipelineConfig,
        CollisionPointFilter, IntersectSpaceResult, NarrowPhaseMode, ObjectKey,
    };
    pub use crate::debug::{Color, DebugDrawSink};
    pub use crate::foundation::math::{Transform2D, Vec2};
    pub use crate::geometry::{Circle, ColliderShape, IntersectionPoint, Rect, Segment};
}
