//! Geometric primitive library
//!
//! Shape types and the pairwise math consumed by the narrow phase and the
//! query façade. Shape geometry is intentionally small and closed: the
//! collision pipeline only ever talks to [`ColliderShape`]'s capability
//! methods.

pub mod primitives;
pub mod shape;

pub use primitives::{Circle, Rect, Segment};
pub use shape::{ColliderShape, IntersectionPoint};
