//! Renderer-decoupled debug drawing
//!
//! The engine embedding this crate owns the actual renderer; collision
//! structures only push primitives into a [`DebugDrawSink`].

use crate::geometry::{Circle, ColliderShape, Rect, Segment};

/// 8-bit RGBA color for debug visualization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
    /// Alpha channel
    pub a: u8,
}

impl Color {
    /// Fully opaque white
    pub const WHITE: Self = Self::rgba(255, 255, 255, 255);

    /// Fully transparent
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    /// Creates a color from channel values
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Push a collider shape into a sink as its matching primitive
pub fn draw_shape(sink: &mut dyn DebugDrawSink, shape: &ColliderShape, border: Color, fill: Color) {
    match shape {
        ColliderShape::Circle(circle) => sink.draw_circle(circle, border, fill),
        ColliderShape::Rect(rect) => sink.draw_rect(rect, border, fill),
        ColliderShape::Segment(segment) => sink.draw_segment(segment, border),
    }
}

/// Receiver for debug primitives emitted by collision structures
pub trait DebugDrawSink {
    /// Draw a rectangle outline with an optional fill
    fn draw_rect(&mut self, rect: &Rect, border: Color, fill: Color);

    /// Draw a circle outline with an optional fill
    fn draw_circle(&mut self, circle: &Circle, border: Color, fill: Color);

    /// Draw a line segment
    fn draw_segment(&mut self, segment: &Segment, color: Color);
}
