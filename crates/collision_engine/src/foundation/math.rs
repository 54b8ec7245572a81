//! Math utilities and types
//!
//! Provides the fundamental 2D math types used throughout the collision
//! pipeline, plus the hashing helper shared by spatial structures.

use std::hash::{Hash, Hasher};

pub use nalgebra::{Matrix2, Vector2};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 2D point type
pub type Point2 = nalgebra::Point2<f32>;

/// 2x2 matrix type
pub type Mat2 = Matrix2<f32>;

/// Transform representing position, rotation and scale in 2D
#[derive(Debug, Clone, PartialEq)]
pub struct Transform2D {
    /// Position in world space
    pub position: Vec2,

    /// Rotation in radians
    pub rotation: f32,

    /// Uniform scale factor
    pub scale: f32,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self {
            position: Vec2::zeros(),
            rotation: 0.0,
            scale: 1.0,
        }
    }
}

impl Transform2D {
    /// Create a transform at the given position with no rotation or scaling
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }
}

/// Combine the hashes of a sequence of items into a single value.
///
/// Order-sensitive: `[a, b]` and `[b, a]` hash differently. Used by the
/// spatial hash grid to key cells by their integer coordinates; callers
/// that need a sequence hash take this function explicitly instead of
/// reaching for engine-global state.
pub fn sequence_hash<T, I>(items: I) -> u64
where
    T: Hash,
    I: IntoIterator<Item = T>,
{
    // FNV offset basis seed, combined per item in the boost hash_combine style
    let mut state: u64 = 0xcbf2_9ce4_8422_2325;
    for item in items {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        item.hash(&mut hasher);
        let value = hasher.finish();
        state ^= value
            .wrapping_add(0x9e37_79b9_7f4a_7c15)
            .wrapping_add(state << 6)
            .wrapping_add(state >> 2);
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_hash_order_sensitive() {
        let ab = sequence_hash([1i64, 2]);
        let ba = sequence_hash([2i64, 1]);
        assert_ne!(ab, ba);
    }

    #[test]
    fn test_sequence_hash_deterministic() {
        assert_eq!(sequence_hash([7i64, -3]), sequence_hash([7i64, -3]));
    }

    #[test]
    fn test_transform_default_is_identity() {
        let t = Transform2D::default();
        assert_eq!(t.position, Vec2::zeros());
        assert_eq!(t.rotation, 0.0);
        assert_eq!(t.scale, 1.0);
    }
}
