//! High-level collider shape type
//!
//! [`ColliderShape`] is a closed union over the supported shape kinds with
//! one dispatch site per capability (overlap, intersect, project, closest
//! point, containment, bounds). Narrow-phase code never matches on the
//! shape tag itself.

use crate::foundation::math::Vec2;
use crate::geometry::primitives::{Circle, Rect, Segment};

/// A point where two shape boundaries cross
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionPoint {
    /// Crossing position in world space
    pub point: Vec2,
    /// Surface normal at the crossing, taken from the shape being
    /// intersected against (the `other` side of the call)
    pub normal: Vec2,
}

impl IntersectionPoint {
    /// Creates a new intersection point
    pub fn new(point: Vec2, normal: Vec2) -> Self {
        Self { point, normal }
    }
}

/// Shape attached to a collider
///
/// Closed set of shape kinds; adding a kind means extending every
/// capability method here, nowhere else.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderShape {
    /// A circle
    Circle(Circle),
    /// An axis-aligned rectangle
    Rect(Rect),
    /// A line segment
    Segment(Segment),
}

impl ColliderShape {
    /// Circle shape shorthand
    pub fn circle(center: Vec2, radius: f32) -> Self {
        Self::Circle(Circle::new(center, radius))
    }

    /// Rectangle shape shorthand
    pub fn rect(center: Vec2, size: Vec2) -> Self {
        Self::Rect(Rect::from_center_size(center, size))
    }

    /// Segment shape shorthand
    pub fn segment(start: Vec2, end: Vec2) -> Self {
        Self::Segment(Segment::new(start, end))
    }

    /// Axis-aligned bounding rectangle of the shape
    pub fn bounding_box(&self) -> Rect {
        match self {
            Self::Circle(c) => {
                let r = Vec2::new(c.radius, c.radius);
                Rect::new(c.center - r, c.center + r)
            }
            Self::Rect(r) => *r,
            Self::Segment(s) => Rect::new(s.start, s.end),
        }
    }

    /// Representative center of the shape
    pub fn center(&self) -> Vec2 {
        match self {
            Self::Circle(c) => c.center,
            Self::Rect(r) => r.center(),
            Self::Segment(s) => (s.start + s.end) * 0.5,
        }
    }

    /// This shape translated by `offset`
    pub fn translated(&self, offset: Vec2) -> Self {
        match self {
            Self::Circle(c) => Self::Circle(Circle::new(c.center + offset, c.radius)),
            Self::Rect(r) => Self::Rect(r.translated(offset)),
            Self::Segment(s) => Self::Segment(Segment::new(s.start + offset, s.end + offset)),
        }
    }

    /// Check whether two shapes overlap
    pub fn overlap(&self, other: &ColliderShape) -> bool {
        match (self, other) {
            (Self::Circle(a), Self::Circle(b)) => a.overlaps_circle(b),
            (Self::Circle(c), Self::Rect(r)) | (Self::Rect(r), Self::Circle(c)) => {
                r.overlaps_circle(c)
            }
            (Self::Circle(c), Self::Segment(s)) | (Self::Segment(s), Self::Circle(c)) => {
                s.distance_squared_to(c.center) <= c.radius * c.radius
            }
            (Self::Rect(a), Self::Rect(b)) => a.overlaps_rect(b),
            (Self::Rect(r), Self::Segment(s)) | (Self::Segment(s), Self::Rect(r)) => {
                r.overlaps_segment(s)
            }
            (Self::Segment(a), Self::Segment(b)) => a.intersect_segment(b).is_some(),
        }
    }

    /// Boundary crossing points between this shape and `other`
    ///
    /// Normals are taken from `other`'s surface at each crossing. A shape
    /// fully containing the other yields no points even though the shapes
    /// overlap; the narrow phase substitutes a synthetic contact in that
    /// case.
    pub fn intersect(&self, other: &ColliderShape) -> Vec<IntersectionPoint> {
        match (self, other) {
            (Self::Circle(a), Self::Circle(b)) => a
                .intersect_circle(b)
                .into_iter()
                .map(|p| IntersectionPoint::new(p, circle_normal(b, p)))
                .collect(),
            (Self::Circle(c), Self::Rect(r)) => rect_edge_crossings(r, |edge| edge.intersect_circle(c)),
            (Self::Circle(c), Self::Segment(s)) => s
                .intersect_circle(c)
                .into_iter()
                .map(|p| IntersectionPoint::new(p, s.normal()))
                .collect(),
            (Self::Rect(r), Self::Circle(c)) => r
                .edges()
                .iter()
                .flat_map(|edge| edge.intersect_circle(c))
                .map(|p| IntersectionPoint::new(p, circle_normal(c, p)))
                .collect(),
            (Self::Rect(a), Self::Rect(b)) => rect_edge_crossings(b, |other_edge| {
                a.edges()
                    .iter()
                    .filter_map(|own_edge| own_edge.intersect_segment(other_edge))
                    .collect()
            }),
            (Self::Rect(r), Self::Segment(s)) => r
                .edges()
                .iter()
                .filter_map(|edge| edge.intersect_segment(s))
                .map(|p| IntersectionPoint::new(p, s.normal()))
                .collect(),
            (Self::Segment(s), Self::Circle(c)) => s
                .intersect_circle(c)
                .into_iter()
                .map(|p| IntersectionPoint::new(p, circle_normal(c, p)))
                .collect(),
            (Self::Segment(s), Self::Rect(r)) => {
                rect_edge_crossings(r, |edge| s.intersect_segment(edge).into_iter().collect())
            }
            (Self::Segment(a), Self::Segment(b)) => a
                .intersect_segment(b)
                .map(|p| IntersectionPoint::new(p, b.normal()))
                .into_iter()
                .collect(),
        }
    }

    /// Conservative swept hull for a shape displaced by `displacement`
    ///
    /// Returns the union bounding rectangle of the shape at its current
    /// and displaced positions — a bounds-level sweep, not an exact swept
    /// volume. Returns `None` for a negligible displacement, which the
    /// narrow phase treats as "nothing to project this frame".
    pub fn project(&self, displacement: Vec2) -> Option<ColliderShape> {
        if displacement.magnitude_squared() <= f32::EPSILON {
            return None;
        }
        let bounds = self.bounding_box();
        Some(Self::Rect(bounds.union(&bounds.translated(displacement))))
    }

    /// Closest point on the shape's boundary to `point`
    pub fn closest_boundary_point(&self, point: Vec2) -> Vec2 {
        match self {
            Self::Circle(c) => c.closest_boundary_point(point),
            Self::Rect(r) => r.closest_boundary_point(point),
            Self::Segment(s) => s.closest_point(point),
        }
    }

    /// Check if the shape contains a point (segments never do)
    pub fn contains_point(&self, point: Vec2) -> bool {
        match self {
            Self::Circle(c) => c.contains_point(point),
            Self::Rect(r) => r.contains_point(point),
            Self::Segment(_) => false,
        }
    }
}

/// Outward normal of a circle at a boundary point
fn circle_normal(circle: &Circle, point: Vec2) -> Vec2 {
    (point - circle.center)
        .try_normalize(f32::EPSILON)
        .unwrap_or_else(Vec2::zeros)
}

/// Collect crossings against each edge of a rect, normals outward from
/// the rect. Edges wind counter-clockwise, so outward is the negated
/// left-hand edge normal.
fn rect_edge_crossings<F>(rect: &Rect, mut crossings: F) -> Vec<IntersectionPoint>
where
    F: FnMut(&Segment) -> Vec<Vec2>,
{
    let mut points = Vec::new();
    for edge in &rect.edges() {
        let outward = -edge.normal();
        for p in crossings(edge) {
            points.push(IntersectionPoint::new(p, outward));
        }
    }
    points
}
