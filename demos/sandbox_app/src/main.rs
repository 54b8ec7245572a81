//! Collision engine sandbox
//!
//! Two balls fly through each other while a wall sits in the way; the
//! contact begin/end transitions are logged as they happen. Run with
//! `RUST_LOG=info cargo run -p sandbox_app`.

use std::any::Any;

use log::info;

use collision_engine::prelude::*;

const DT: f32 = 1.0 / 60.0;

struct Ball {
    name: &'static str,
    colliders: Vec<Collider>,
    position: Vec2,
    velocity: Vec2,
}

impl Ball {
    fn new(name: &'static str, position: Vec2, velocity: Vec2) -> Self {
        let collider =
            Collider::new(ColliderShape::circle(position, 4.0), CollisionLayers::PLAYER)
                .with_intersections();
        Self {
            name,
            colliders: vec![collider],
            position,
            velocity,
        }
    }

    fn integrate(&mut self, dt: f32) {
        self.position += self.velocity * dt;
        self.colliders[0].set_position(self.position);
    }
}

impl CollisionObject for Ball {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn velocity(&self) -> Vec2 {
        self.velocity
    }

    fn colliders(&self) -> &[Collider] {
        &self.colliders
    }

    fn colliders_mut(&mut self) -> &mut [Collider] {
        &mut self.colliders
    }

    fn on_collision_system_entered(&mut self, _key: ObjectKey) {
        info!("{} entered the collision system", self.name);
    }

    fn resolve_collision(&mut self, collision: &CollisionInformation) {
        if collision.first_contact {
            info!(
                "{} started touching {:?} ({} point(s))",
                self.name,
                collision.other,
                collision.total_points()
            );
        }
    }

    fn resolve_contact_ended(&mut self, other: ObjectKey) {
        info!("{} stopped touching {:?}", self.name, other);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

struct Wall {
    colliders: Vec<Collider>,
    position: Vec2,
}

impl Wall {
    fn new(center: Vec2, size: Vec2) -> Self {
        let collider =
            Collider::new(ColliderShape::rect(center, size), CollisionLayers::ENVIRONMENT);
        Self {
            colliders: vec![collider],
            position: center,
        }
    }
}

impl CollisionObject for Wall {
    fn passive(&self) -> bool {
        true
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

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut handler = CollisionHandler::with_grid(SpatialHashConfig {
        cell_size: 16.0,
        ..SpatialHashConfig::default()
    })?;

    let left = handler.add(Box::new(Ball::new(
        "left ball",
        Vec2::new(-60.0, 0.0),
        Vec2::new(120.0, 0.0),
    )));
    let right = handler.add(Box::new(Ball::new(
        "right ball",
        Vec2::new(60.0, 2.0),
        Vec2::new(-120.0, 0.0),
    )));
    handler.add(Box::new(Wall::new(Vec2::new(0.0, 0.0), Vec2::new(6.0, 40.0))));

    for _ in 0..120 {
        for key in [left, right] {
            if let Some(object) = handler.get_mut(key) {
                if let Some(ball) = object.as_any_mut().downcast_mut::<Ball>() {
                    ball.integrate(DT);
                }
            }
        }
        handler.update(DT);
    }

    info!(
        "done; {} object(s) still registered",
        handler.object_count()
    );
    handler.close();
    Ok(())
}
