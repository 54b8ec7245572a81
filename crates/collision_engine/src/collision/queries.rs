//! Read-only space queries against the current broadphase contents
//!
//! Stateless per call: every query builds its own result container and
//! scratch, reusing the broadphase exactly as the narrow phase does
//! (candidate buckets, then exact shape tests, deduplicated through a
//! seen-set). Queries issued before the first `update` see an unfilled
//! broadphase and return empty results.

use std::cmp::Ordering;
use std::collections::HashSet;

use log::debug;

use crate::collision::collider::CollisionMask;
use crate::collision::handler::CollisionHandler;
use crate::collision::object::{ColliderId, ObjectKey};
use crate::foundation::math::Vec2;
use crate::geometry::{ColliderShape, IntersectionPoint};

/// Flat, deduplicated list of colliders hit by a cast query
#[derive(Debug, Clone, Default)]
pub struct CastSpaceResult {
    /// Colliders overlapping the queried shape
    pub colliders: Vec<ColliderId>,
}

impl CastSpaceResult {
    /// Number of colliders hit
    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    /// Whether nothing was hit
    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    /// Iterate the hit colliders
    pub fn iter(&self) -> impl Iterator<Item = ColliderId> + '_ {
        self.colliders.iter().copied()
    }
}

/// Intersection points found against one other object
#[derive(Debug, Clone)]
pub struct IntersectSpaceEntry {
    /// The object whose colliders produced these points
    pub owner: ObjectKey,
    /// Collected boundary crossings, in detection order
    pub points: Vec<IntersectionPoint>,
}

/// Result of an intersect query, grouped per other object
#[derive(Debug, Clone)]
pub struct IntersectSpaceResult {
    /// Reference point queries were cast from; used for sorting
    pub origin: Vec2,
    /// Per-owner intersection entries
    pub entries: Vec<IntersectSpaceEntry>,
}

impl IntersectSpaceResult {
    fn new(origin: Vec2) -> Self {
        Self {
            origin,
            entries: Vec::new(),
        }
    }

    /// Whether any intersection was found
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of collected points across all entries
    pub fn total_points(&self) -> usize {
        self.entries.iter().map(|e| e.points.len()).sum()
    }

    /// Sort every entry's points, and the entries themselves, by distance
    /// to the result's origin (closest first)
    pub fn sort_closest_first(&mut self) {
        let origin = self.origin;
        let distance = |p: &IntersectionPoint| (p.point - origin).magnitude_squared();
        for entry in &mut self.entries {
            entry
                .points
                .sort_by(|a, b| distance(a).partial_cmp(&distance(b)).unwrap_or(Ordering::Equal));
        }
        // Entries always hold at least one point
        self.entries.sort_by(|a, b| {
            let da = a.points.first().map_or(f32::MAX, distance);
            let db = b.points.first().map_or(f32::MAX, distance);
            da.partial_cmp(&db).unwrap_or(Ordering::Equal)
        });
    }

    fn push(&mut self, owner: ObjectKey, points: Vec<IntersectionPoint>) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.owner == owner) {
            entry.points.extend(points);
        } else {
            self.entries.push(IntersectSpaceEntry { owner, points });
        }
    }
}

impl CollisionHandler {
    fn query_ready(&self) -> bool {
        if !self.filled {
            debug!("space query before first update; broadphase is empty");
        }
        self.filled
    }

    /// Walk broadphase candidates for `shape`, calling `visit` once per
    /// deduplicated, mask-matching, geometrically overlapping collider
    fn cast_candidates(
        &self,
        shape: &ColliderShape,
        mask: CollisionMask,
        skip_object: Option<ObjectKey>,
        seen: &mut HashSet<ColliderId>,
        visit: &mut dyn FnMut(ColliderId),
    ) {
        let mut buckets = Vec::new();
        self.broadphase.candidate_buckets(&shape.bounding_box(), &mut buckets);
        for &bucket in &buckets {
            for proxy in self.broadphase.bucket(bucket) {
                if Some(proxy.id.object) == skip_object {
                    continue;
                }
                if !mask.has(proxy.layer) {
                    continue;
                }
                if !seen.insert(proxy.id) {
                    continue;
                }
                let Some(collider) = self.collider(proxy.id) else {
                    continue;
                };
                if shape.overlap(&collider.shape) {
                    visit(proxy.id);
                }
            }
        }
    }

    /// Colliders overlapping an arbitrary shape
    pub fn cast_space_shape(&self, shape: &ColliderShape, mask: CollisionMask) -> CastSpaceResult {
        let mut result = CastSpaceResult::default();
        if !self.query_ready() {
            return result;
        }
        let mut seen = HashSet::new();
        self.cast_candidates(shape, mask, None, &mut seen, &mut |id| {
            result.colliders.push(id);
        });
        result
    }

    /// Number of colliders overlapping an arbitrary shape
    pub fn cast_space_shape_count(&self, shape: &ColliderShape, mask: CollisionMask) -> usize {
        let mut count = 0;
        if !self.query_ready() {
            return count;
        }
        let mut seen = HashSet::new();
        self.cast_candidates(shape, mask, None, &mut seen, &mut |_| count += 1);
        count
    }

    /// Colliders overlapping a registered collider, excluding its owner's
    /// own colliders
    pub fn cast_space_collider(&self, id: ColliderId) -> CastSpaceResult {
        let mut result = CastSpaceResult::default();
        if !self.query_ready() {
            return result;
        }
        let Some(collider) = self.collider(id) else {
            return result;
        };
        let (shape, mask) = (collider.shape, collider.mask);
        let mut seen = HashSet::new();
        self.cast_candidates(&shape, mask, Some(id.object), &mut seen, &mut |hit| {
            result.colliders.push(hit);
        });
        result
    }

    /// Number of colliders overlapping a registered collider
    pub fn cast_space_collider_count(&self, id: ColliderId) -> usize {
        self.cast_space_collider(id).len()
    }

    /// Colliders overlapping any of an object's enabled colliders,
    /// excluding the object's own
    pub fn cast_space_object(&self, key: ObjectKey) -> CastSpaceResult {
        let mut result = CastSpaceResult::default();
        if !self.query_ready() {
            return result;
        }
        let Some(object) = self.objects.get(key) else {
            return result;
        };
        let mut seen = HashSet::new();
        for collider in object.colliders().iter().filter(|c| c.enabled) {
            self.cast_candidates(&collider.shape, collider.mask, Some(key), &mut seen, &mut |hit| {
                result.colliders.push(hit);
            });
        }
        result
    }

    /// Number of colliders overlapping any of an object's enabled
    /// colliders
    pub fn cast_space_object_count(&self, key: ObjectKey) -> usize {
        self.cast_space_object(key).len()
    }

    /// Distance-sort a cast result by each collider's closest boundary
    /// point to `origin`
    pub fn sort_cast_result(&self, origin: Vec2, result: &mut CastSpaceResult) {
        let distance = |id: ColliderId| {
            self.collider(id).map_or(f32::MAX, |c| {
                (c.shape.closest_boundary_point(origin) - origin).magnitude_squared()
            })
        };
        result
            .colliders
            .sort_by(|&a, &b| distance(a).partial_cmp(&distance(b)).unwrap_or(Ordering::Equal));
    }

    /// Boundary crossings between an arbitrary shape and everything it
    /// overlaps, grouped per other object
    ///
    /// The result origin is the queried shape's center. Overlaps without
    /// boundary crossings (full containment) contribute no entry.
    pub fn intersect_space_shape(
        &self,
        shape: &ColliderShape,
        mask: CollisionMask,
    ) -> IntersectSpaceResult {
        let mut result = IntersectSpaceResult::new(shape.center());
        if !self.query_ready() {
            return result;
        }
        let mut seen = HashSet::new();
        self.cast_candidates(shape, mask, None, &mut seen, &mut |id| {
            let Some(collider) = self.collider(id) else {
                return;
            };
            let points = shape.intersect(&collider.shape);
            if !points.is_empty() {
                result.push(id.object, points);
            }
        });
        result
    }

    /// Boundary crossings for a registered collider against everything it
    /// overlaps, excluding its owner's colliders
    pub fn intersect_space_collider(&self, id: ColliderId) -> IntersectSpaceResult {
        let Some(collider) = self.collider(id) else {
            return IntersectSpaceResult::new(Vec2::zeros());
        };
        let (shape, mask) = (collider.shape, collider.mask);
        let mut result = IntersectSpaceResult::new(shape.center());
        if !self.query_ready() {
            return result;
        }
        let mut seen = HashSet::new();
        self.cast_candidates(&shape, mask, Some(id.object), &mut seen, &mut |hit| {
            let Some(other) = self.collider(hit) else {
                return;
            };
            let points = shape.intersect(&other.shape);
            if !points.is_empty() {
                result.push(hit.object, points);
            }
        });
        result
    }

    /// Boundary crossings for every enabled collider of an object,
    /// grouped per other object; the result origin is the object's
    /// position
    pub fn intersect_space_object(&self, key: ObjectKey) -> IntersectSpaceResult {
        let Some(object) = self.objects.get(key) else {
            return IntersectSpaceResult::new(Vec2::zeros());
        };
        let mut result = IntersectSpaceResult::new(object.position());
        if !self.query_ready() {
            return result;
        }
        let mut seen = HashSet::new();
        for collider in object.colliders().iter().filter(|c| c.enabled) {
            let shape = collider.shape;
            self.cast_candidates(&shape, collider.mask, Some(key), &mut seen, &mut |hit| {
                let Some(other) = self.collider(hit) else {
                    return;
                };
                let points = shape.intersect(&other.shape);
                if !points.is_empty() {
                    result.push(hit.object, points);
                }
            });
        }
        result
    }
}
