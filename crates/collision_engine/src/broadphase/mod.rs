//! Abstract broadphase interface for collision candidate pruning
//!
//! The broadphase buckets collider proxies spatially so the narrow phase
//! only tests a shape against the colliders sharing its buckets. The
//! abstraction allows swapping partitioning schemes (uniform hash grid,
//! quadtree, BVH, ...) without touching the collision pipeline.
//!
//! Contract: the index is mutated only by [`Broadphase::fill`], which the
//! handler calls exactly once per frame before any narrow-phase or query
//! reads. All other methods are read-only and safe for concurrent readers.

pub mod grid;

use crate::collision::object::ColliderId;
use crate::debug::{Color, DebugDrawSink};
use crate::geometry::Rect;

pub use grid::{BroadphaseError, SpatialHashConfig, SpatialHashGrid};

/// Identifies one bucket within a broadphase for the current frame
///
/// Bucket ids are only meaningful until the next [`Broadphase::fill`].
pub type BucketId = usize;

/// One collider as registered into the broadphase for this frame
#[derive(Debug, Clone, Copy)]
pub struct BroadphaseItem {
    /// Collider identity
    pub id: ColliderId,
    /// Cached layer bit for cheap mask rejection
    pub layer: u32,
    /// World-space bounds the collider should be bucketed under
    pub bounds: Rect,
}

/// Candidate entry stored inside a bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColliderProxy {
    /// Collider identity
    pub id: ColliderId,
    /// Cached layer bit for cheap mask rejection
    pub layer: u32,
}

/// Spatial index used for broad-phase candidate pruning
pub trait Broadphase: Send + Sync {
    /// Rebuild the index from this frame's collider set
    fn fill(&mut self, items: &[BroadphaseItem]);

    /// Append the ids of every non-empty bucket overlapping `bounds`
    ///
    /// `out` is caller-owned scratch and is cleared before use; the same
    /// bucket id is never appended twice in one call.
    fn candidate_buckets(&self, bounds: &Rect, out: &mut Vec<BucketId>);

    /// The candidates stored in a bucket returned by
    /// [`candidate_buckets`](Self::candidate_buckets)
    fn bucket(&self, id: BucketId) -> &[ColliderProxy];

    /// Drop this frame's contents, keeping allocations for reuse
    fn clear(&mut self);

    /// Release all resources; the broadphase stays usable but empty
    fn close(&mut self);

    /// Visualize occupied buckets
    fn debug_draw(&self, sink: &mut dyn DebugDrawSink, border: Color, fill: Color);
}
