//! Data-parallel narrow phase
//!
//! The per-object scan fans out across rayon workers. Each worker rents a
//! scratch bundle (candidate buckets, seen set, a private delta ledger
//! pair, local collision results) from a shared pool; the only
//! cross-worker mutation is consuming pairs out of the two shared active
//! ledgers, guarded by one lock per ledger. After the join, worker deltas
//! are merged into the temp ledgers and the collision stack on the
//! calling thread.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rayon::prelude::*;

use crate::broadphase::BucketId;
use crate::collision::contact_ledger::ContactLedger;
use crate::collision::handler::CollisionHandler;
use crate::collision::object::{ColliderId, ObjectKey};
use crate::collision::register::CollisionRegister;

/// Reusable per-worker narrow-phase state
#[derive(Default)]
pub(crate) struct NarrowPhaseScratch {
    buckets: Vec<BucketId>,
    seen: HashSet<ColliderId>,
    delta_objects: ContactLedger<ObjectKey>,
    delta_colliders: ContactLedger<ColliderId>,
    results: Vec<(ObjectKey, CollisionRegister)>,
}

/// Pool of scratch bundles rented per parallel batch
///
/// Bundles are exclusively owned by one worker while rented; the pool
/// lock is only touched at rent/return time.
#[derive(Default)]
pub(crate) struct ScratchPool {
    bundles: Mutex<Vec<NarrowPhaseScratch>>,
}

impl ScratchPool {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn rent(&self) -> NarrowPhaseScratch {
        lock(&self.bundles).pop().unwrap_or_default()
    }

    fn hand_back(&self, mut scratch: NarrowPhaseScratch) {
        scratch.buckets.clear();
        scratch.seen.clear();
        scratch.delta_objects.clear();
        scratch.delta_colliders.clear();
        scratch.results.clear();
        lock(&self.bundles).push(scratch);
    }
}

/// A worker's private narrow-phase output, merged serially after the join
struct WorkerOutput {
    delta_objects: ContactLedger<ObjectKey>,
    delta_colliders: ContactLedger<ColliderId>,
    results: Vec<(ObjectKey, CollisionRegister)>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl CollisionHandler {
    /// Narrow phase over the live snapshot using a rayon worker pool
    pub(crate) fn process_objects_parallel(&mut self, dt: f32) {
        self.snapshot_scratch.clear();
        self.snapshot_scratch.extend_from_slice(self.live_objects());
        let live = std::mem::take(&mut self.snapshot_scratch);
        if live.is_empty() {
            self.snapshot_scratch = live;
            return;
        }

        let chunk_size = (live.len() / rayon::current_num_threads().max(1)).max(1);

        // The active generations are the one shared mutation point of the
        // parallel phase; move them behind per-ledger locks for its
        // duration
        let active_objects = Mutex::new(std::mem::take(self.object_contacts.active_mut()));
        let active_colliders = Mutex::new(std::mem::take(self.collider_contacts.active_mut()));

        let objects = &self.objects;
        let broadphase = self.broadphase.as_ref();
        let pool = &self.scratch_pool;

        let outputs: Vec<WorkerOutput> = live
            .par_chunks(chunk_size)
            .map(|keys| {
                let mut scratch = pool.rent();
                let NarrowPhaseScratch {
                    buckets,
                    seen,
                    delta_objects,
                    delta_colliders,
                    results,
                } = &mut scratch;

                for &key in keys {
                    let register = Self::scan_object(
                        objects,
                        broadphase,
                        key,
                        dt,
                        buckets,
                        seen,
                        &mut |a, b| {
                            let removed = lock(&active_objects).remove_entry(a, b);
                            let added = delta_objects.add_entry(a, b);
                            !removed && added
                        },
                        &mut |a, b| {
                            let removed = lock(&active_colliders).remove_entry(a, b);
                            let added = delta_colliders.add_entry(a, b);
                            !removed && added
                        },
                    );
                    if let Some(register) = register {
                        results.push((key, register));
                    }
                }

                let output = WorkerOutput {
                    delta_objects: std::mem::take(delta_objects),
                    delta_colliders: std::mem::take(delta_colliders),
                    results: std::mem::take(results),
                };
                pool.hand_back(scratch);
                output
            })
            .collect();

        *self.object_contacts.active_mut() =
            active_objects.into_inner().unwrap_or_else(PoisonError::into_inner);
        *self.collider_contacts.active_mut() =
            active_colliders.into_inner().unwrap_or_else(PoisonError::into_inner);

        // Single-threaded merge of every worker's private results
        for mut output in outputs {
            for (entity, others) in output.delta_objects.drain() {
                for other in others {
                    self.object_contacts.temp_mut().add_entry(entity, other);
                }
            }
            for (entity, others) in output.delta_colliders.drain() {
                for other in others {
                    self.collider_contacts.temp_mut().add_entry(entity, other);
                }
            }
            for (owner, register) in output.results {
                self.stack.add_collision_register(owner, register);
            }
        }

        self.snapshot_scratch = live;
    }
}
