//! Foundation utilities shared by every other module

pub mod math;

pub use math::{sequence_hash, Transform2D, Vec2};
