//! Collision handler: the per-frame pipeline orchestrator
//!
//! One [`CollisionHandler::update`] call runs Fill (rebuild the
//! broadphase) -> Process (narrow phase) -> Resolve (commit staged
//! membership, dispatch resolution callbacks, fire contact-ended
//! transitions, swap ledger generations). No other state persists across
//! frames beyond the ledger generations and the register's staging sets.

use std::cmp::Ordering;
use std::collections::HashSet;

use log::{debug, trace};
use slotmap::SlotMap;

use crate::broadphase::{Broadphase, BroadphaseItem, BucketId, SpatialHashConfig, SpatialHashGrid};
use crate::collision::collider::{Collider, CollisionPointFilter};
use crate::collision::contact_ledger::DoubleBufferedLedger;
use crate::collision::object::{ColliderId, CollisionObject, ObjectKey};
use crate::collision::object_register::{DeferredObjectRegister, ObjectEvent};
use crate::collision::register::{Collision, CollisionInformation, CollisionRegister, CollisionStack};
use crate::debug::{draw_shape, Color, DebugDrawSink};
use crate::foundation::math::Vec2;
use crate::geometry::IntersectionPoint;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Narrow-phase execution strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum NarrowPhaseMode {
    /// Scan objects one after another on the calling thread
    #[default]
    Sequential,
    /// Fan the per-object scan out across a worker pool
    ///
    /// The detected contact *set* matches sequential mode; the order in
    /// which resolvers are dispatched does not, since workers finish in
    /// nondeterministic order.
    #[cfg(feature = "parallel")]
    Parallel,
}

/// Configuration for the collision pipeline
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct CollisionPipelineConfig {
    /// Narrow-phase execution strategy
    pub narrow_phase: NarrowPhaseMode,

    /// Below this many live objects the parallel mode falls back to a
    /// sequential scan; fan-out overhead dominates tiny scenes
    #[cfg(feature = "parallel")]
    pub min_parallel_objects: usize,
}

impl Default for CollisionPipelineConfig {
    fn default() -> Self {
        Self {
            narrow_phase: NarrowPhaseMode::default(),
            #[cfg(feature = "parallel")]
            min_parallel_objects: 16,
        }
    }
}

pub(crate) type ObjectMap = SlotMap<ObjectKey, Box<dyn CollisionObject>>;

/// Owns the live object set and runs collision detection over it
///
/// The four supporting registries (deferred register, the two contact
/// ledgers, the collision stack) are standalone components composed by
/// value; the handler only wires them together.
pub struct CollisionHandler {
    pub(crate) objects: ObjectMap,
    register: DeferredObjectRegister,
    pub(crate) broadphase: Box<dyn Broadphase>,
    pub(crate) object_contacts: DoubleBufferedLedger<ObjectKey>,
    pub(crate) collider_contacts: DoubleBufferedLedger<ColliderId>,
    pub(crate) stack: CollisionStack,
    config: CollisionPipelineConfig,
    pub(crate) filled: bool,

    // Reused per-frame scratch
    fill_scratch: Vec<BroadphaseItem>,
    bucket_scratch: Vec<BucketId>,
    seen_scratch: HashSet<ColliderId>,
    pub(crate) snapshot_scratch: Vec<ObjectKey>,
    removed_scratch: Vec<ObjectKey>,

    #[cfg(feature = "parallel")]
    pub(crate) scratch_pool: crate::collision::parallel::ScratchPool,
}

impl CollisionHandler {
    /// Creates a handler over the given broadphase with default pipeline
    /// configuration
    pub fn new(broadphase: Box<dyn Broadphase>) -> Self {
        Self::with_config(broadphase, CollisionPipelineConfig::default())
    }

    /// Creates a handler over a spatial hash grid broadphase
    pub fn with_grid(
        grid: SpatialHashConfig,
    ) -> Result<Self, crate::broadphase::BroadphaseError> {
        Ok(Self::new(Box::new(SpatialHashGrid::new(grid)?)))
    }

    /// Creates a handler with an explicit pipeline configuration
    pub fn with_config(broadphase: Box<dyn Broadphase>, config: CollisionPipelineConfig) -> Self {
        Self {
            objects: SlotMap::with_key(),
            register: DeferredObjectRegister::new(),
            broadphase,
            object_contacts: DoubleBufferedLedger::new(),
            collider_contacts: DoubleBufferedLedger::new(),
            stack: CollisionStack::new(),
            config,
            filled: false,
            fill_scratch: Vec::new(),
            bucket_scratch: Vec::new(),
            seen_scratch: HashSet::new(),
            snapshot_scratch: Vec::new(),
            removed_scratch: Vec::new(),
            #[cfg(feature = "parallel")]
            scratch_pool: crate::collision::parallel::ScratchPool::new(),
        }
    }

    /// Stage an object for addition; it becomes live at the end of the
    /// next [`update`](Self::update)
    pub fn add(&mut self, object: Box<dyn CollisionObject>) -> ObjectKey {
        let key = self.objects.insert(object);
        self.register.add(key);
        trace!("staged object {key:?} for addition");
        key
    }

    /// Stage several objects for addition
    pub fn add_range(
        &mut self,
        objects: impl IntoIterator<Item = Box<dyn CollisionObject>>,
    ) -> Vec<ObjectKey> {
        objects.into_iter().map(|object| self.add(object)).collect()
    }

    /// Stage an object for removal; it leaves the live set at the end of
    /// the next [`update`](Self::update)
    ///
    /// Removing an object that was added but never committed cancels the
    /// addition outright: it never becomes live and no lifecycle callback
    /// fires for it.
    pub fn remove(&mut self, key: ObjectKey) -> bool {
        let was_live = self.register.is_live(key);
        let removed = self.register.remove(key);
        if removed && !was_live {
            self.objects.remove(key);
        }
        removed
    }

    /// Stage several objects for removal
    pub fn remove_range(&mut self, keys: impl IntoIterator<Item = ObjectKey>) -> usize {
        keys.into_iter().filter(|&key| self.remove(key)).count()
    }

    /// Number of committed live objects
    pub fn object_count(&self) -> usize {
        self.register.len()
    }

    /// Whether the key refers to a committed live object
    pub fn is_live(&self, key: ObjectKey) -> bool {
        self.register.is_live(key)
    }

    /// Borrow an object (live or staged)
    pub fn get(&self, key: ObjectKey) -> Option<&dyn CollisionObject> {
        self.objects.get(key).map(AsRef::as_ref)
    }

    /// Mutably borrow an object (live or staged)
    pub fn get_mut(&mut self, key: ObjectKey) -> Option<&mut (dyn CollisionObject + 'static)> {
        self.objects.get_mut(key).map(|object| &mut **object)
    }

    /// Borrow a collider by id
    pub fn collider(&self, id: ColliderId) -> Option<&Collider> {
        self.objects.get(id.object)?.colliders().get(id.index as usize)
    }

    /// The broadphase backing this handler
    pub fn broadphase(&self) -> &dyn Broadphase {
        self.broadphase.as_ref()
    }

    /// Drive one simulation frame
    pub fn update(&mut self, dt: f32) {
        self.fill_broadphase();
        match self.config.narrow_phase {
            NarrowPhaseMode::Sequential => self.process_objects_sequential(dt),
            #[cfg(feature = "parallel")]
            NarrowPhaseMode::Parallel => {
                if self.register.len() >= self.config.min_parallel_objects {
                    self.process_objects_parallel(dt);
                } else {
                    self.process_objects_sequential(dt);
                }
            }
        }
        self.resolve();
    }

    /// Remove every object, firing its left-callback, and wipe all
    /// per-frame state
    ///
    /// Staged-but-uncommitted additions are dropped without any callback.
    /// Calling `clear` twice in a row is a no-op the second time.
    pub fn clear(&mut self) {
        debug!("clearing collision handler ({} live objects)", self.register.len());
        let objects = &mut self.objects;
        self.register.clear(|key| {
            if let Some(object) = objects.get_mut(key) {
                object.on_collision_system_left(key);
            }
        });
        self.objects.clear();
        self.object_contacts.clear();
        self.collider_contacts.clear();
        self.stack.clear();
        self.broadphase.clear();
        self.filled = false;
    }

    /// Tear down: [`clear`](Self::clear) plus broadphase resource release
    pub fn close(&mut self) {
        self.clear();
        self.broadphase.close();
    }

    /// Visualize broadphase occupancy and every live collider shape
    pub fn debug_draw(&self, sink: &mut dyn DebugDrawSink, border: Color, fill: Color) {
        self.broadphase.debug_draw(sink, border, fill);
        for &key in self.live_objects() {
            let Some(object) = self.objects.get(key) else {
                continue;
            };
            for collider in object.colliders() {
                if collider.enabled {
                    draw_shape(sink, &collider.shape, border, fill);
                }
            }
        }
    }

    // ---- Fill ----

    fn fill_broadphase(&mut self) {
        self.fill_scratch.clear();
        for &key in self.register.live() {
            let Some(object) = self.objects.get(key) else {
                continue;
            };
            if !object.enabled() {
                continue;
            }
            for (index, collider) in object.colliders().iter().enumerate() {
                if !collider.enabled {
                    continue;
                }
                self.fill_scratch.push(BroadphaseItem {
                    id: ColliderId::new(key, index as u32),
                    layer: collider.layer,
                    bounds: collider.shape.bounding_box(),
                });
            }
        }
        self.broadphase.fill(&self.fill_scratch);
        self.filled = true;
        trace!("broadphase filled with {} colliders", self.fill_scratch.len());
    }

    // ---- Process (narrow phase) ----

    fn process_objects_sequential(&mut self, dt: f32) {
        self.snapshot_scratch.clear();
        self.snapshot_scratch.extend_from_slice(self.register.live());
        let snapshot = std::mem::take(&mut self.snapshot_scratch);

        for &key in &snapshot {
            let register = Self::scan_object(
                &self.objects,
                self.broadphase.as_ref(),
                key,
                dt,
                &mut self.bucket_scratch,
                &mut self.seen_scratch,
                &mut |a, b| self.object_contacts.register_contact(a, b),
                &mut |a, b| self.collider_contacts.register_contact(a, b),
            );
            if let Some(register) = register {
                self.stack.add_collision_register(key, register);
            }
        }

        self.snapshot_scratch = snapshot;
    }

    /// Narrow-phase scan of one object's colliders against the broadphase
    /// candidates
    ///
    /// Contact bookkeeping is injected so the sequential path can write
    /// the shared ledgers directly while the parallel path routes through
    /// a lock plus a worker-private delta. Returns the object's collision
    /// register when anything was hit.
    #[allow(clippy::too_many_lines)]
    pub(crate) fn scan_object(
        objects: &ObjectMap,
        broadphase: &dyn Broadphase,
        key: ObjectKey,
        dt: f32,
        buckets: &mut Vec<BucketId>,
        seen: &mut HashSet<ColliderId>,
        object_contact: &mut dyn FnMut(ObjectKey, ObjectKey) -> bool,
        collider_contact: &mut dyn FnMut(ColliderId, ColliderId) -> bool,
    ) -> Option<CollisionRegister> {
        let object = objects.get(key)?;
        if !object.enabled() || object.colliders().is_empty() {
            return None;
        }
        let passive = object.passive();
        let displacement = if object.project_shape() {
            Some(object.velocity() * dt)
        } else {
            None
        };

        let mut register = CollisionRegister::new();

        for (index, collider) in object.colliders().iter().enumerate() {
            if !collider.enabled {
                continue;
            }
            let self_id = ColliderId::new(key, index as u32);

            // Motion-swept shape when requested; a shape with nothing to
            // project sits this frame out
            let query_shape = match displacement {
                Some(displacement) => match collider.shape.project(displacement) {
                    Some(projected) => projected,
                    None => continue,
                },
                None => collider.shape,
            };

            broadphase.candidate_buckets(&query_shape.bounding_box(), buckets);
            if buckets.is_empty() {
                continue;
            }

            seen.clear();
            for &bucket_id in buckets.iter() {
                for proxy in broadphase.bucket(bucket_id) {
                    if proxy.id == self_id {
                        continue;
                    }
                    // Colliders of one object never collide with each other
                    if proxy.id.object == key {
                        continue;
                    }
                    if !collider.mask.has(proxy.layer) {
                        continue;
                    }
                    let Some(other_object) = objects.get(proxy.id.object) else {
                        continue;
                    };
                    // A candidate shared between buckets is tested once
                    if !seen.insert(proxy.id) {
                        continue;
                    }
                    let Some(other_collider) = other_object.colliders().get(proxy.id.index as usize)
                    else {
                        continue;
                    };

                    if !query_shape.overlap(&other_collider.shape) {
                        continue;
                    }

                    let first_contact_object = object_contact(key, proxy.id.object);
                    let first_contact_collider = collider_contact(self_id, proxy.id);

                    let mut points = Vec::new();
                    if collider.compute_intersections {
                        // Passive objects defer to the candidate shape's
                        // intersection convention
                        points = if passive {
                            other_collider.shape.intersect(&query_shape)
                        } else {
                            query_shape.intersect(&other_collider.shape)
                        };
                        if points.is_empty() {
                            points.push(synthetic_contact(collider, other_collider));
                        }
                    }

                    register.add_collision(
                        Collision {
                            self_collider: self_id,
                            other_collider: proxy.id,
                            first_contact: first_contact_collider,
                            points,
                        },
                        first_contact_object,
                    );
                }
            }
        }

        if register.is_empty() {
            None
        } else {
            Some(register)
        }
    }

    // ---- Resolve ----

    fn resolve(&mut self) {
        self.commit_objects();

        let objects = &mut self.objects;

        self.stack.process(|owner, info| {
            let Some(object) = objects.get_mut(owner) else {
                return;
            };
            if object.filter_collision_points() && info.total_points() > 0 {
                info.representative_point = synthesize_point(
                    object.collision_points_filter(),
                    object.position(),
                    info,
                );
            }
            object.resolve_collision(info);
        });
        self.stack.clear();

        // Object-level contact ends fire before collider-level ones
        self.object_contacts.finish_frame(|entity, other| {
            if let Some(object) = objects.get_mut(entity) {
                object.resolve_contact_ended(other);
            }
        });
        self.collider_contacts.finish_frame(|own, other| {
            if let Some(object) = objects.get_mut(own.object) {
                object.resolve_collider_contact_ended(own, other);
            }
        });
    }

    fn commit_objects(&mut self) {
        let objects = &mut self.objects;
        let removed = &mut self.removed_scratch;
        removed.clear();

        self.register.process(|event, key| match event {
            ObjectEvent::Removed => {
                if let Some(object) = objects.get_mut(key) {
                    object.on_collision_system_left(key);
                }
                removed.push(key);
            }
            ObjectEvent::Added => {
                if let Some(object) = objects.get_mut(key) {
                    object.on_collision_system_entered(key);
                }
            }
        });

        for key in removed.drain(..) {
            objects.remove(key);
        }
    }

    pub(crate) fn live_objects(&self) -> &[ObjectKey] {
        self.register.live()
    }
}

/// Closest point on the candidate's boundary to the collider's
/// previous-frame position, used when one shape fully contains the other
/// and no boundary crossing exists
fn synthetic_contact(collider: &Collider, other: &Collider) -> IntersectionPoint {
    let anchor = other.shape.closest_boundary_point(collider.prev_position);
    let normal = (collider.prev_position - anchor)
        .try_normalize(f32::EPSILON)
        .unwrap_or_else(Vec2::zeros);
    IntersectionPoint::new(anchor, normal)
}

/// Pick the representative collision point per the resolver's policy
fn synthesize_point(
    filter: CollisionPointFilter,
    origin: Vec2,
    info: &CollisionInformation,
) -> Option<IntersectionPoint> {
    let distance = |p: &IntersectionPoint| (p.point - origin).magnitude_squared();
    match filter {
        CollisionPointFilter::Closest => info
            .points()
            .min_by(|a, b| distance(a).partial_cmp(&distance(b)).unwrap_or(Ordering::Equal))
            .copied(),
        CollisionPointFilter::Furthest => info
            .points()
            .max_by(|a, b| distance(a).partial_cmp(&distance(b)).unwrap_or(Ordering::Equal))
            .copied(),
        CollisionPointFilter::Combined => {
            let count = info.total_points();
            if count == 0 {
                return None;
            }
            let mut point = Vec2::zeros();
            let mut normal = Vec2::zeros();
            for ip in info.points() {
                point += ip.point;
                normal += ip.normal;
            }
            point /= count as f32;
            let normal = normal.try_normalize(f32::EPSILON).unwrap_or_else(Vec2::zeros);
            Some(IntersectionPoint::new(point, normal))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::collider::CollisionLayers;
    use crate::collision::testing::{drain, TestEvent, TestObject};
    use crate::geometry::ColliderShape;

    const DT: f32 = 1.0 / 60.0;

    fn handler() -> CollisionHandler {
        CollisionHandler::with_grid(SpatialHashConfig {
            cell_size: 10.0,
            ..SpatialHashConfig::default()
        })
        .unwrap()
    }

    fn circle_object(x: f32, y: f32, radius: f32) -> TestObject {
        TestObject::new(vec![Collider::new(
            ColliderShape::circle(Vec2::new(x, y), radius),
            CollisionLayers::PLAYER,
        )])
    }

    fn move_object(handler: &mut CollisionHandler, key: ObjectKey, position: Vec2) {
        let object = handler.get_mut(key).unwrap();
        let test = object.as_any_mut().downcast_mut::<TestObject>().unwrap();
        test.colliders[0].set_position(position);
        test.position = position;
    }

    fn collision_events(events: &[TestEvent]) -> Vec<(ObjectKey, bool)> {
        events
            .iter()
            .filter_map(|e| match e {
                TestEvent::Collision {
                    other, first_contact, ..
                } => Some((*other, *first_contact)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_basic_overlap_lifecycle() {
        let mut handler = handler();
        let a = circle_object(0.0, 0.0, 5.0);
        let b = circle_object(8.0, 0.0, 5.0);
        let log_a = a.log();
        let log_b = b.log();

        let key_a = handler.add(Box::new(a));
        let key_b = handler.add(Box::new(b));

        // Frame 0 commits the staged additions
        handler.update(DT);
        assert_eq!(drain(&log_a), vec![TestEvent::Entered(key_a)]);

        // Frame 1: overlap detected, first contact
        handler.update(DT);
        let events = drain(&log_a);
        assert_eq!(collision_events(&events), vec![(key_b, true)]);
        assert_eq!(collision_events(&drain(&log_b)), vec![(key_a, true)]);

        // Frame 2: still overlapping, no longer a first contact
        handler.update(DT);
        assert_eq!(collision_events(&drain(&log_a)), vec![(key_b, false)]);

        // Move B out of range; the contact ends exactly once
        move_object(&mut handler, key_b, Vec2::new(100.0, 0.0));
        drain(&log_b);
        handler.update(DT);
        let events = drain(&log_a);
        assert!(collision_events(&events).is_empty());
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, TestEvent::ContactEnded(other) if *other == key_b))
                .count(),
            1
        );

        // And never again
        handler.update(DT);
        let events = drain(&log_a);
        assert!(events
            .iter()
            .all(|e| !matches!(e, TestEvent::ContactEnded(_))));
    }

    #[test]
    fn test_collider_level_contact_end_fires() {
        let mut handler = handler();
        let a = circle_object(0.0, 0.0, 5.0);
        let b = circle_object(8.0, 0.0, 5.0);
        let log_a = a.log();

        let key_a = handler.add(Box::new(a));
        let key_b = handler.add(Box::new(b));

        handler.update(DT);
        handler.update(DT);
        move_object(&mut handler, key_b, Vec2::new(100.0, 0.0));
        drain(&log_a);
        handler.update(DT);

        let events = drain(&log_a);
        let expected = TestEvent::ColliderContactEnded(
            ColliderId::new(key_a, 0),
            ColliderId::new(key_b, 0),
        );
        assert_eq!(events.iter().filter(|e| **e == expected).count(), 1);
    }

    #[test]
    fn test_mask_filtering_blocks_geometric_overlap() {
        let mut handler = handler();
        let mut a = circle_object(0.0, 0.0, 5.0);
        a.colliders[0].mask = crate::collision::collider::CollisionMask::from_layers(&[
            CollisionLayers::ENEMY,
        ]);
        let b = circle_object(8.0, 0.0, 5.0); // PLAYER layer, not in A's mask
        let log_a = a.log();

        handler.add(Box::new(a));
        handler.add(Box::new(b));
        handler.update(DT);
        handler.update(DT);

        assert!(collision_events(&drain(&log_a)).is_empty());
    }

    #[test]
    fn test_no_self_pairing_between_own_colliders() {
        let mut handler = handler();
        let object = TestObject::new(vec![
            Collider::new(ColliderShape::circle(Vec2::new(0.0, 0.0), 5.0), CollisionLayers::PLAYER),
            Collider::new(ColliderShape::circle(Vec2::new(2.0, 0.0), 5.0), CollisionLayers::PLAYER),
        ]);
        let log = object.log();

        handler.add(Box::new(object));
        handler.update(DT);
        handler.update(DT);

        assert!(collision_events(&drain(&log)).is_empty());
    }

    #[test]
    fn test_object_level_first_contact_once_for_multi_collider_pair() {
        let mut handler = handler();
        // Two colliders on A, both overlapping B's single collider
        let a = TestObject::new(vec![
            Collider::new(ColliderShape::circle(Vec2::new(0.0, 0.0), 5.0), CollisionLayers::PLAYER),
            Collider::new(ColliderShape::circle(Vec2::new(1.0, 0.0), 5.0), CollisionLayers::PLAYER),
        ]);
        let b = circle_object(6.0, 0.0, 5.0);
        let log_a = a.log();

        let _key_a = handler.add(Box::new(a));
        let key_b = handler.add(Box::new(b));

        handler.update(DT);
        handler.update(DT);

        let events = drain(&log_a);
        let collisions: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                TestEvent::Collision {
                    other,
                    first_contact,
                    collisions,
                    ..
                } => Some((*other, *first_contact, *collisions)),
                _ => None,
            })
            .collect();
        // One aggregate, flagged first-contact once, carrying both
        // collider-pair collisions
        assert_eq!(collisions, vec![(key_b, true, 2)]);
    }

    #[test]
    fn test_duplicate_candidates_tested_once() {
        let mut handler = handler();
        // B's rect spans many 10-unit grid cells, so its proxy appears in
        // several of the buckets A queries
        let a = circle_object(0.0, 0.0, 6.0);
        let b = TestObject::new(vec![Collider::new(
            ColliderShape::rect(Vec2::new(0.0, 0.0), Vec2::new(50.0, 50.0)),
            CollisionLayers::ENVIRONMENT,
        )]);
        let log_a = a.log();

        handler.add(Box::new(a));
        let key_b = handler.add(Box::new(b));

        handler.update(DT);
        handler.update(DT);

        let events = drain(&log_a);
        let collisions: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                TestEvent::Collision { other, collisions, .. } => Some((*other, *collisions)),
                _ => None,
            })
            .collect();
        assert_eq!(collisions, vec![(key_b, 1)]);
    }

    #[test]
    fn test_add_then_remove_never_enters() {
        let mut handler = handler();
        let object = circle_object(0.0, 0.0, 5.0);
        let log = object.log();

        let key = handler.add(Box::new(object));
        assert!(handler.remove(key));
        handler.update(DT);

        assert_eq!(handler.object_count(), 0);
        assert!(drain(&log).is_empty());
        assert!(handler.get(key).is_none());
    }

    #[test]
    fn test_removal_fires_left_hook_and_ends_contacts() {
        let mut handler = handler();
        let a = circle_object(0.0, 0.0, 5.0);
        let b = circle_object(8.0, 0.0, 5.0);
        let log_a = a.log();
        let log_b = b.log();

        let _key_a = handler.add(Box::new(a));
        let key_b = handler.add(Box::new(b));
        handler.update(DT);
        handler.update(DT);
        drain(&log_a);
        drain(&log_b);

        handler.remove(key_b);
        handler.update(DT);

        let events_b = drain(&log_b);
        assert!(events_b.contains(&TestEvent::Left(key_b)));

        // B is gone; A's contact with it ends on the next frame
        handler.update(DT);
        let events_a = drain(&log_a);
        assert!(events_a.contains(&TestEvent::ContactEnded(key_b)));
    }

    #[test]
    fn test_clear_is_idempotent_on_hooks() {
        let mut handler = handler();
        let object = circle_object(0.0, 0.0, 5.0);
        let log = object.log();
        let key = handler.add(Box::new(object));
        handler.update(DT);
        drain(&log);

        handler.clear();
        let events = drain(&log);
        assert_eq!(events, vec![TestEvent::Left(key)]);

        handler.clear();
        assert!(drain(&log).is_empty());
        assert_eq!(handler.object_count(), 0);
    }

    #[test]
    fn test_disabled_objects_and_colliders_are_skipped() {
        let mut handler = handler();
        let mut a = circle_object(0.0, 0.0, 5.0);
        a.enabled = false;
        let b = circle_object(8.0, 0.0, 5.0);
        let log_a = a.log();
        let log_b = b.log();

        handler.add(Box::new(a));
        handler.add(Box::new(b));
        handler.update(DT);
        handler.update(DT);

        assert!(collision_events(&drain(&log_a)).is_empty());
        // Disabled objects are not filled into the broadphase either, so
        // B sees nothing
        assert!(collision_events(&drain(&log_b)).is_empty());
    }

    #[test]
    fn test_projection_sweeps_and_zero_velocity_skips() {
        let mut handler = handler();
        // Fast mover whose resting shape misses B, but whose swept hull
        // covers it
        let mut a = circle_object(0.0, 0.0, 1.0);
        a.project = true;
        a.velocity = Vec2::new(1200.0, 0.0); // 20 units in one tick
        let b = circle_object(10.0, 0.0, 1.0);
        let log_a = a.log();

        let key_b = handler.add(Box::new(b));
        handler.add(Box::new(a));
        handler.update(DT);
        handler.update(DT);
        assert_eq!(collision_events(&drain(&log_a)), vec![(key_b, true)]);

        // A projecting object with zero velocity has nothing to project
        // and sits the frame out, even while geometrically overlapping
        let mut handler = CollisionHandler::with_grid(SpatialHashConfig::default()).unwrap();
        let mut c = circle_object(0.0, 0.0, 5.0);
        c.project = true;
        let d = circle_object(3.0, 0.0, 5.0);
        let log_c = c.log();
        handler.add(Box::new(c));
        handler.add(Box::new(d));
        handler.update(DT);
        handler.update(DT);
        assert!(collision_events(&drain(&log_c)).is_empty());
    }

    #[test]
    fn test_intersection_points_computed_on_request() {
        let mut handler = handler();
        let mut a = circle_object(0.0, 0.0, 5.0);
        a.colliders[0].compute_intersections = true;
        let b = circle_object(8.0, 0.0, 5.0);
        let log_a = a.log();
        let log_b = b.log();

        handler.add(Box::new(a));
        handler.add(Box::new(b));
        handler.update(DT);
        handler.update(DT);

        let points_of = |events: &[TestEvent]| {
            events.iter().find_map(|e| match e {
                TestEvent::Collision { points, .. } => Some(*points),
                _ => None,
            })
        };
        // A requested intersections and gets the two circle crossings
        assert_eq!(points_of(&drain(&log_a)), Some(2));
        // B did not request them
        assert_eq!(points_of(&drain(&log_b)), Some(0));
    }

    #[test]
    fn test_contained_shape_gets_synthetic_contact_point() {
        let mut handler = handler();
        let mut a = circle_object(1.0, 0.0, 2.0);
        a.colliders[0].compute_intersections = true;
        let b = circle_object(0.0, 0.0, 10.0); // fully contains A
        let log_a = a.log();

        handler.add(Box::new(a));
        handler.add(Box::new(b));
        handler.update(DT);
        handler.update(DT);

        let events = drain(&log_a);
        let points = events
            .iter()
            .find_map(|e| match e {
                TestEvent::Collision { points, .. } => Some(*points),
                _ => None,
            })
            .unwrap();
        assert_eq!(points, 1);
    }

    #[test]
    fn test_point_filter_synthesizes_representative() {
        let mut handler = handler();
        let mut a = circle_object(0.0, 0.0, 5.0);
        a.colliders[0].compute_intersections = true;
        a.filter_points = true;
        a.filter = CollisionPointFilter::Closest;
        let b = circle_object(8.0, 0.0, 5.0);
        let log_a = a.log();

        handler.add(Box::new(a));
        handler.add(Box::new(b));
        handler.update(DT);
        handler.update(DT);

        let events = drain(&log_a);
        let representative = events
            .iter()
            .find_map(|e| match e {
                TestEvent::Collision { representative, .. } => Some(*representative),
                _ => None,
            })
            .unwrap();
        // Both circle crossings sit at x=4, equidistant from A's center
        let point = representative.unwrap();
        assert!((point.x - 4.0).abs() < 1e-3);
    }

    #[test]
    fn test_passive_object_defers_intersection_convention() {
        let mut handler = handler();
        // Passive circle against a rect: points carry the circle-side
        // convention (normals from the passive object's own shape, since
        // the candidate is intersected against it)
        let mut a = TestObject::new(vec![Collider::new(
            ColliderShape::circle(Vec2::new(-1.0, 5.0), 3.0),
            CollisionLayers::PLAYER,
        )
        .with_intersections()]);
        a.passive = true;
        let b = TestObject::new(vec![Collider::new(
            ColliderShape::rect(Vec2::new(5.0, 5.0), Vec2::new(10.0, 10.0)),
            CollisionLayers::ENVIRONMENT,
        )]);
        let log_a = a.log();

        handler.add(Box::new(a));
        handler.add(Box::new(b));
        handler.update(DT);
        handler.update(DT);

        // The crossings exist either way; what the passive flag changed
        // is which shape's convention produced them. Two crossings on the
        // rect's left edge.
        let events = drain(&log_a);
        let points = events
            .iter()
            .find_map(|e| match e {
                TestEvent::Collision { points, .. } => Some(*points),
                _ => None,
            })
            .unwrap();
        assert_eq!(points, 2);
    }

    #[test]
    fn test_queries_before_first_update_return_empty() {
        let handler = handler();
        let probe = ColliderShape::circle(Vec2::new(0.0, 0.0), 100.0);
        assert!(handler
            .cast_space_shape(&probe, crate::collision::collider::CollisionMask::ALL)
            .is_empty());
        assert_eq!(
            handler.cast_space_shape_count(&probe, crate::collision::collider::CollisionMask::ALL),
            0
        );
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_and_sequential_detect_identical_contact_sets() {
        use std::collections::HashSet as Set;

        fn run(mode: NarrowPhaseMode) -> Set<(u32, u32)> {
            let config = CollisionPipelineConfig {
                narrow_phase: mode,
                min_parallel_objects: 0,
            };
            let grid = SpatialHashGrid::new(SpatialHashConfig {
                cell_size: 10.0,
                ..SpatialHashConfig::default()
            })
            .unwrap();
            let mut handler = CollisionHandler::with_config(Box::new(grid), config);

            // A row of circles, each overlapping its neighbors
            let mut tagged = Vec::new();
            for i in 0..24u32 {
                let object = circle_object(i as f32 * 6.0, 0.0, 4.0);
                let log = object.log();
                let key = handler.add(Box::new(object));
                tagged.push((i, key, log));
            }
            handler.update(DT);
            for (_, _, log) in &tagged {
                drain(log);
            }
            handler.update(DT);

            let key_to_tag: std::collections::HashMap<_, _> =
                tagged.iter().map(|(i, key, _)| (*key, *i)).collect();
            let mut pairs = Set::new();
            for (i, _, log) in &tagged {
                for (other, _) in collision_events(&drain(log)) {
                    pairs.insert((*i, key_to_tag[&other]));
                }
            }
            pairs
        }

        let sequential = run(NarrowPhaseMode::Sequential);
        let parallel = run(NarrowPhaseMode::Parallel);
        assert_eq!(sequential, parallel);
        assert!(!sequential.is_empty());
    }
}
