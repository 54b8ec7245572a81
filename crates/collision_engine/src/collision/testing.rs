//! Shared test double for collision pipeline tests

use std::any::Any;
use std::sync::{Arc, Mutex};

use crate::collision::collider::{Collider, CollisionPointFilter};
use crate::collision::object::{ColliderId, CollisionObject, ObjectKey};
use crate::collision::register::CollisionInformation;
use crate::foundation::math::Vec2;

/// Everything the pipeline reported to one test object
#[derive(Debug, Clone, PartialEq)]
pub enum TestEvent {
    Entered(ObjectKey),
    Left(ObjectKey),
    Collision {
        other: ObjectKey,
        first_contact: bool,
        collisions: usize,
        points: usize,
        representative: Option<Vec2>,
    },
    ContactEnded(ObjectKey),
    ColliderContactEnded(ColliderId, ColliderId),
}

pub type EventLog = Arc<Mutex<Vec<TestEvent>>>;

/// Configurable collision object recording every callback it receives
pub struct TestObject {
    pub colliders: Vec<Collider>,
    pub position: Vec2,
    pub enabled: bool,
    pub passive: bool,
    pub project: bool,
    pub velocity: Vec2,
    pub filter_points: bool,
    pub filter: CollisionPointFilter,
    pub events: EventLog,
}

impl TestObject {
    pub fn new(colliders: Vec<Collider>) -> Self {
        let position = colliders
            .first()
            .map_or_else(Vec2::zeros, |c| c.shape.center());
        Self {
            colliders,
            position,
            enabled: true,
            passive: false,
            project: false,
            velocity: Vec2::zeros(),
            filter_points: false,
            filter: CollisionPointFilter::Closest,
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn log(&self) -> EventLog {
        Arc::clone(&self.events)
    }
}

/// Drain a log into a plain Vec for assertions
pub fn drain(log: &EventLog) -> Vec<TestEvent> {
    log.lock().unwrap().drain(..).collect()
}

impl CollisionObject for TestObject {
    fn enabled(&self) -> bool {
        self.enabled
    }

    fn passive(&self) -> bool {
        self.passive
    }

    fn project_shape(&self) -> bool {
        self.project
    }

    fn velocity(&self) -> Vec2 {
        self.velocity
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn colliders(&self) -> &[Collider] {
        &self.colliders
    }

    fn colliders_mut(&mut self) -> &mut [Collider] {
        &mut self.colliders
    }

    fn filter_collision_points(&self) -> bool {
        self.filter_points
    }

    fn collision_points_filter(&self) -> CollisionPointFilter {
        self.filter
    }

    fn on_collision_system_entered(&mut self, key: ObjectKey) {
        self.events.lock().unwrap().push(TestEvent::Entered(key));
    }

    fn on_collision_system_left(&mut self, key: ObjectKey) {
        self.events.lock().unwrap().push(TestEvent::Left(key));
    }

    fn resolve_collision(&mut self, info: &CollisionInformation) {
        self.events.lock().unwrap().push(TestEvent::Collision {
            other: info.other,
            first_contact: info.first_contact,
            collisions: info.collisions.len(),
            points: info.total_points(),
            representative: info.representative_point.map(|p| p.point),
        });
    }

    fn resolve_contact_ended(&mut self, other: ObjectKey) {
        self.events.lock().unwrap().push(TestEvent::ContactEnded(other));
    }

    fn resolve_collider_contact_ended(&mut self, own: ColliderId, other: ColliderId) {
        self.events
            .lock()
            .unwrap()
            .push(TestEvent::ColliderContactEnded(own, other));
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
