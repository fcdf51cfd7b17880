//! # Ashfall Common
//!
//! Common types, utilities, and shared abstractions for the Ashfall
//! simulation core.
//!
//! This crate provides foundational types used across all Ashfall crates:
//! - Geometry types (rectangles, facing direction)
//! - ID types (arena handles for actors)
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod geometry;
pub mod ids;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::geometry::*;
    pub use crate::ids::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_intersection() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        let c = Rect::new(10.0, 0.0, 10.0, 10.0);

        assert!(a.intersects(&b));
        // Touching edges do not overlap
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_actor_id_generations() {
        let first = ActorId::new(3, 0);
        let reused = first.next_generation();
        assert_eq!(first.index(), reused.index());
        assert_ne!(first, reused);
    }

    #[test]
    fn test_direction_sign() {
        assert_eq!(Direction::Right.sign(), 1.0);
        assert_eq!(Direction::Left.sign(), -1.0);
        assert_eq!(Direction::Left.flipped(), Direction::Right);
    }
}
