//! Collision detection and contact lifecycle
//!
//! The [`handler::CollisionHandler`] orchestrates the per-frame pipeline
//! over four standalone registries:
//!
//! - [`object_register`] — deferred add/remove staging of the live set
//! - [`contact_ledger`] — double-buffered first-contact tracking
//! - [`register`] — per-frame collision aggregation and dispatch table
//! - [`queries`] — read-only cast/intersect queries over the broadphase

pub mod collider;
pub mod contact_ledger;
pub mod handler;
pub mod object;
pub mod object_register;
pub mod queries;
pub mod register;

#[cfg(feature = "parallel")]
pub(crate) mod parallel;

#[cfg(test)]
pub(crate) mod testing;

pub use collider::{Collider, CollisionLayers, CollisionMask, CollisionPointFilter};
pub use contact_ledger::{ContactLedger, DoubleBufferedLedger};
pub use handler::{CollisionHandler, CollisionPipelineConfig, NarrowPhaseMode};
pub use object::{ColliderId, CollisionObject, ObjectKey};
pub use object_register::{DeferredObjectRegister, ObjectEvent};
pub use queries::{CastSpaceResult, IntersectSpaceEntry, IntersectSpaceResult};
pub use register::{Collision, CollisionInformation, CollisionRegister, CollisionStack};
