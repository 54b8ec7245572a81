//! Basic 2D geometric primitives
//!
//! Circles, axis-aligned rectangles and line segments, together with the
//! pairwise overlap / intersection / closest-point math the narrow phase
//! and the query façade are built on.

use crate::foundation::math::Vec2;
use approx::abs_diff_eq;

/// A circle in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    /// Center position
    pub center: Vec2,
    /// Radius (non-negative)
    pub radius: f32,
}

impl Circle {
    /// Creates a new circle
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Check if this circle overlaps another
    pub fn overlaps_circle(&self, other: &Circle) -> bool {
        let distance_squared = (self.center - other.center).magnitude_squared();
        let radius_sum = self.radius + other.radius;
        distance_squared <= radius_sum * radius_sum
    }

    /// Check if a point lies inside (or on) the circle
    pub fn contains_point(&self, point: Vec2) -> bool {
        (point - self.center).magnitude_squared() <= self.radius * self.radius
    }

    /// Closest point on the circle's boundary to the given point
    ///
    /// A point at the exact center projects onto the boundary along +X.
    pub fn closest_boundary_point(&self, point: Vec2) -> Vec2 {
        let offset = point - self.center;
        match offset.try_normalize(f32::EPSILON) {
            Some(dir) => self.center + dir * self.radius,
            None => self.center + Vec2::new(self.radius, 0.0),
        }
    }

    /// Intersection points of two circle boundaries (0, 1 or 2 points)
    ///
    /// Classic two-circle construction: with d the center distance,
    /// a = (r0² - r1² + d²) / 2d locates the chord midpoint along the
    /// center line and h² = r0² - a² the half-chord length.
    pub fn intersect_circle(&self, other: &Circle) -> Vec<Vec2> {
        let delta = other.center - self.center;
        let d = delta.magnitude();
        let r_sum = self.radius + other.radius;
        let r_diff = (self.radius - other.radius).abs();

        // Separate, contained, or concentric: no boundary crossing
        if d > r_sum || d < r_diff || abs_diff_eq!(d, 0.0, epsilon = f32::EPSILON) {
            return Vec::new();
        }

        let a = (self.radius * self.radius - other.radius * other.radius + d * d) / (2.0 * d);
        let h_squared = self.radius * self.radius - a * a;
        let along = delta / d;
        let midpoint = self.center + along * a;

        if h_squared <= f32::EPSILON {
            // Tangent circles touch in a single point
            return vec![midpoint];
        }

        let h = h_squared.sqrt();
        let perp = Vec2::new(-along.y, along.x);
        vec![midpoint + perp * h, midpoint - perp * h]
    }
}

/// An axis-aligned rectangle in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Minimum corner
    pub min: Vec2,
    /// Maximum corner
    pub max: Vec2,
}

impl Rect {
    /// Creates a rectangle from two corners (normalized so min <= max)
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: Vec2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Vec2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Creates a rectangle from a center and full size
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self::new(center - half, center + half)
    }

    /// Center of the rectangle
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Width and height
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Smallest rectangle containing both `self` and `other`
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            min: Vec2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Vec2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    /// This rectangle translated by `offset`
    pub fn translated(&self, offset: Vec2) -> Rect {
        Rect {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Check if a point lies inside (or on the boundary of) the rectangle
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// Check if this rectangle overlaps another (separating axis on x and y)
    pub fn overlaps_rect(&self, other: &Rect) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Check if this rectangle overlaps a circle
    pub fn overlaps_circle(&self, circle: &Circle) -> bool {
        let clamped = self.clamp_point(circle.center);
        (clamped - circle.center).magnitude_squared() <= circle.radius * circle.radius
    }

    /// Check if this rectangle overlaps a segment
    pub fn overlaps_segment(&self, segment: &Segment) -> bool {
        if self.contains_point(segment.start) || self.contains_point(segment.end) {
            return true;
        }
        self.edges().iter().any(|edge| edge.intersect_segment(segment).is_some())
    }

    /// Clamp a point into the rectangle
    pub fn clamp_point(&self, point: Vec2) -> Vec2 {
        Vec2::new(
            point.x.clamp(self.min.x, self.max.x),
            point.y.clamp(self.min.y, self.max.y),
        )
    }

    /// Closest point on the rectangle's boundary to the given point
    ///
    /// Points inside the rectangle are pushed to the nearest edge.
    pub fn closest_boundary_point(&self, point: Vec2) -> Vec2 {
        if !self.contains_point(point) {
            return self.clamp_point(point);
        }
        // Interior: pick the edge with the smallest push-out distance
        let left = point.x - self.min.x;
        let right = self.max.x - point.x;
        let bottom = point.y - self.min.y;
        let top = self.max.y - point.y;
        let smallest = left.min(right).min(bottom).min(top);
        if smallest == left {
            Vec2::new(self.min.x, point.y)
        } else if smallest == right {
            Vec2::new(self.max.x, point.y)
        } else if smallest == bottom {
            Vec2::new(point.x, self.min.y)
        } else {
            Vec2::new(point.x, self.max.y)
        }
    }

    /// Boundary edges in counter-clockwise order
    ///
    /// With CCW winding, each edge's outward normal is its right-hand
    /// perpendicular.
    pub fn edges(&self) -> [Segment; 4] {
        let bl = self.min;
        let br = Vec2::new(self.max.x, self.min.y);
        let tr = self.max;
        let tl = Vec2::new(self.min.x, self.max.y);
        [
            Segment::new(bl, br),
            Segment::new(br, tr),
            Segment::new(tr, tl),
            Segment::new(tl, bl),
        ]
    }
}

/// A line segment in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Start point
    pub start: Vec2,
    /// End point
    pub end: Vec2,
}

impl Segment {
    /// Creates a new segment
    pub fn new(start: Vec2, end: Vec2) -> Self {
        Self { start, end }
    }

    /// Non-normalized direction vector (end - start)
    pub fn displacement(&self) -> Vec2 {
        self.end - self.start
    }

    /// Unit-length left-hand normal of the segment
    ///
    /// Degenerate (zero-length) segments yield the zero vector.
    pub fn normal(&self) -> Vec2 {
        let d = self.displacement();
        Vec2::new(-d.y, d.x).try_normalize(f32::EPSILON).unwrap_or_else(Vec2::zeros)
    }

    /// Closest point on the segment to the given point
    pub fn closest_point(&self, point: Vec2) -> Vec2 {
        let d = self.displacement();
        let len_sq = d.magnitude_squared();
        if len_sq <= f32::EPSILON {
            return self.start;
        }
        let t = ((point - self.start).dot(&d) / len_sq).clamp(0.0, 1.0);
        self.start + d * t
    }

    /// Squared distance from the segment to a point
    pub fn distance_squared_to(&self, point: Vec2) -> f32 {
        (self.closest_point(point) - point).magnitude_squared()
    }

    /// Segment-segment intersection point, if the segments cross
    ///
    /// Parametric form: p + t·r = q + u·s, solved with 2D cross products.
    /// Parallel and collinear segments report no discrete point.
    pub fn intersect_segment(&self, other: &Segment) -> Option<Vec2> {
        let r = self.displacement();
        let s = other.displacement();
        let denom = r.perp(&s);

        if abs_diff_eq!(denom, 0.0, epsilon = 1e-6) {
            return None;
        }

        let qp = other.start - self.start;
        let t = qp.perp(&s) / denom;
        let u = qp.perp(&r) / denom;

        if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
            Some(self.start + r * t)
        } else {
            None
        }
    }

    /// Intersection points of the segment with a circle boundary (0..=2)
    ///
    /// Substituting the segment's parametric form into the circle equation
    /// gives a quadratic in t; roots inside [0, 1] are crossings.
    pub fn intersect_circle(&self, circle: &Circle) -> Vec<Vec2> {
        let d = self.displacement();
        let f = self.start - circle.center;

        let a = d.magnitude_squared();
        if a <= f32::EPSILON {
            return Vec::new();
        }
        let b = 2.0 * f.dot(&d);
        let c = f.magnitude_squared() - circle.radius * circle.radius;

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return Vec::new();
        }

        let sqrt_d = discriminant.sqrt();
        let t1 = (-b - sqrt_d) / (2.0 * a);
        let t2 = (-b + sqrt_d) / (2.0 * a);

        let mut points = Vec::new();
        if (0.0..=1.0).contains(&t1) {
            points.push(self.start + d * t1);
        }
        if (0.0..=1.0).contains(&t2) && !abs_diff_eq!(t1, t2, epsilon = 1e-6) {
            points.push(self.start + d * t2);
        }
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_circle_overlap() {
        let a = Circle::new(Vec2::new(0.0, 0.0), 5.0);
        let b = Circle::new(Vec2::new(8.0, 0.0), 5.0);
        let c = Circle::new(Vec2::new(20.0, 0.0), 5.0);
        assert!(a.overlaps_circle(&b));
        assert!(!a.overlaps_circle(&c));
    }

    #[test]
    fn test_circle_intersection_two_points() {
        let a = Circle::new(Vec2::new(0.0, 0.0), 5.0);
        let b = Circle::new(Vec2::new(8.0, 0.0), 5.0);
        let points = a.intersect_circle(&b);
        assert_eq!(points.len(), 2);
        for p in points {
            assert_relative_eq!(p.x, 4.0, epsilon = 1e-4);
            assert_relative_eq!(p.y.abs(), 3.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_circle_contained_has_no_intersection() {
        let outer = Circle::new(Vec2::new(0.0, 0.0), 10.0);
        let inner = Circle::new(Vec2::new(1.0, 0.0), 2.0);
        assert!(outer.overlaps_circle(&inner));
        assert!(outer.intersect_circle(&inner).is_empty());
    }

    #[test]
    fn test_rect_overlap_and_containment() {
        let a = Rect::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0));
        let b = Rect::new(Vec2::new(5.0, 5.0), Vec2::new(15.0, 15.0));
        let c = Rect::new(Vec2::new(20.0, 20.0), Vec2::new(25.0, 25.0));
        assert!(a.overlaps_rect(&b));
        assert!(!a.overlaps_rect(&c));
        assert!(a.contains_point(Vec2::new(5.0, 5.0)));
        assert!(!a.contains_point(Vec2::new(11.0, 5.0)));
    }

    #[test]
    fn test_rect_circle_overlap_by_clamping() {
        let rect = Rect::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0));
        let near = Circle::new(Vec2::new(12.0, 5.0), 3.0);
        let far = Circle::new(Vec2::new(20.0, 5.0), 3.0);
        assert!(rect.overlaps_circle(&near));
        assert!(!rect.overlaps_circle(&far));
    }

    #[test]
    fn test_rect_interior_boundary_point() {
        let rect = Rect::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0));
        let p = rect.closest_boundary_point(Vec2::new(1.0, 5.0));
        assert_relative_eq!(p.x, 0.0);
        assert_relative_eq!(p.y, 5.0);
    }

    #[test]
    fn test_segment_segment_crossing() {
        let a = Segment::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0));
        let b = Segment::new(Vec2::new(0.0, 10.0), Vec2::new(10.0, 0.0));
        let p = a.intersect_segment(&b).unwrap();
        assert_relative_eq!(p.x, 5.0, epsilon = 1e-5);
        assert_relative_eq!(p.y, 5.0, epsilon = 1e-5);
    }

    #[test]
    fn test_segment_segment_parallel_no_point() {
        let a = Segment::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0));
        let b = Segment::new(Vec2::new(0.0, 1.0), Vec2::new(10.0, 1.0));
        assert!(a.intersect_segment(&b).is_none());
    }

    #[test]
    fn test_segment_circle_crossings() {
        let seg = Segment::new(Vec2::new(-10.0, 0.0), Vec2::new(10.0, 0.0));
        let circle = Circle::new(Vec2::new(0.0, 0.0), 5.0);
        let points = seg.intersect_circle(&circle);
        assert_eq!(points.len(), 2);
        assert_relative_eq!(points[0].x.abs(), 5.0, epsilon = 1e-4);
        assert_relative_eq!(points[1].x.abs(), 5.0, epsilon = 1e-4);
    }

    #[test]
    fn test_segment_closest_point_clamps_to_ends() {
        let seg = Segment::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0));
        assert_relative_eq!(seg.closest_point(Vec2::new(-5.0, 3.0)).x, 0.0);
        assert_relative_eq!(seg.closest_point(Vec2::new(15.0, 3.0)).x, 10.0);
        assert_relative_eq!(seg.closest_point(Vec2::new(4.0, 3.0)).x, 4.0);
    }
}
