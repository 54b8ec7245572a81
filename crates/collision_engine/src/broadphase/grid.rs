//! Uniform spatial-hash grid broadphase
//!
//! Unbounded 2D grid: cell coordinates are hashed into bucket slots, so
//! the grid needs no world bounds up front. Two distinct cells can hash
//! to the same bucket; that only ever adds candidates, which the narrow
//! phase filters out again, so correctness is unaffected.

use std::collections::HashMap;

use crate::broadphase::{Broadphase, BroadphaseItem, BucketId, ColliderProxy};
use crate::debug::{Color, DebugDrawSink};
use crate::foundation::math::{sequence_hash, Vec2};
use crate::geometry::Rect;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Configuration for the spatial hash grid
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct SpatialHashConfig {
    /// Side length of one square cell in world units
    ///
    /// Should be on the order of a typical collider's size: much smaller
    /// and shapes span many cells, much larger and buckets stop pruning.
    pub cell_size: f32,

    /// Bucket capacity to pre-reserve per cell
    pub expected_colliders_per_cell: usize,
}

impl Default for SpatialHashConfig {
    fn default() -> Self {
        Self {
            cell_size: 32.0,
            expected_colliders_per_cell: 8,
        }
    }
}

/// Errors constructing a broadphase
#[derive(thiserror::Error, Debug)]
pub enum BroadphaseError {
    /// Cell size must be a finite positive number
    #[error("invalid spatial hash cell size: {0}")]
    InvalidCellSize(f32),
}

/// Uniform grid broadphase keyed by hashed cell coordinates
pub struct SpatialHashGrid {
    config: SpatialHashConfig,
    /// Hashed cell coordinates -> bucket slot
    index: HashMap<u64, usize>,
    /// Bucket storage, reused across frames
    buckets: Vec<Vec<ColliderProxy>>,
    /// Cell coordinates per live bucket, for debug drawing
    coords: Vec<(i64, i64)>,
    /// Buckets in use this frame; slots beyond this are free capacity
    live_buckets: usize,
}

impl SpatialHashGrid {
    /// Creates a grid with the given configuration
    pub fn new(config: SpatialHashConfig) -> Result<Self, BroadphaseError> {
        if !config.cell_size.is_finite() || config.cell_size <= 0.0 {
            return Err(BroadphaseError::InvalidCellSize(config.cell_size));
        }
        Ok(Self {
            config,
            index: HashMap::new(),
            buckets: Vec::new(),
            coords: Vec::new(),
            live_buckets: 0,
        })
    }

    /// The grid's configuration
    pub fn config(&self) -> &SpatialHashConfig {
        &self.config
    }

    /// Number of occupied buckets this frame
    pub fn bucket_count(&self) -> usize {
        self.live_buckets
    }

    /// Inclusive cell coordinate range covered by `bounds`
    fn cell_range(&self, bounds: &Rect) -> (i64, i64, i64, i64) {
        let inv = 1.0 / self.config.cell_size;
        (
            (bounds.min.x * inv).floor() as i64,
            (bounds.min.y * inv).floor() as i64,
            (bounds.max.x * inv).floor() as i64,
            (bounds.max.y * inv).floor() as i64,
        )
    }

    fn slot_for(&mut self, ix: i64, iy: i64) -> usize {
        let key = sequence_hash([ix, iy]);
        if let Some(&slot) = self.index.get(&key) {
            return slot;
        }
        let slot = self.live_buckets;
        if slot == self.buckets.len() {
            self.buckets
                .push(Vec::with_capacity(self.config.expected_colliders_per_cell));
            self.coords.push((ix, iy));
        } else {
            self.coords[slot] = (ix, iy);
        }
        self.live_buckets += 1;
        self.index.insert(key, slot);
        slot
    }
}

impl Broadphase for SpatialHashGrid {
    fn fill(&mut self, items: &[BroadphaseItem]) {
        self.index.clear();
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.live_buckets = 0;

        for item in items {
            let (x0, y0, x1, y1) = self.cell_range(&item.bounds);
            for iy in y0..=y1 {
                for ix in x0..=x1 {
                    let slot = self.slot_for(ix, iy);
                    self.buckets[slot].push(ColliderProxy {
                        id: item.id,
                        layer: item.layer,
                    });
                }
            }
        }
    }

    fn candidate_buckets(&self, bounds: &Rect, out: &mut Vec<BucketId>) {
        out.clear();
        let (x0, y0, x1, y1) = self.cell_range(bounds);
        for iy in y0..=y1 {
            for ix in x0..=x1 {
                let key = sequence_hash([ix, iy]);
                if let Some(&slot) = self.index.get(&key) {
                    // Hash collisions can map several cells in range onto
                    // one bucket; report it once
                    if !self.buckets[slot].is_empty() && !out.contains(&slot) {
                        out.push(slot);
                    }
                }
            }
        }
    }

    fn bucket(&self, id: BucketId) -> &[ColliderProxy] {
        self.buckets.get(id).map_or(&[], Vec::as_slice)
    }

    fn clear(&mut self) {
        self.index.clear();
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.live_buckets = 0;
    }

    fn close(&mut self) {
        self.index = HashMap::new();
        self.buckets = Vec::new();
        self.coords = Vec::new();
        self.live_buckets = 0;
    }

    fn debug_draw(&self, sink: &mut dyn DebugDrawSink, border: Color, fill: Color) {
        let size = Vec2::new(self.config.cell_size, self.config.cell_size);
        for slot in 0..self.live_buckets {
            if self.buckets[slot].is_empty() {
                continue;
            }
            let (ix, iy) = self.coords[slot];
            let min = Vec2::new(ix as f32 * self.config.cell_size, iy as f32 * self.config.cell_size);
            sink.draw_rect(&Rect::new(min, min + size), border, fill);
        }
    }
}
