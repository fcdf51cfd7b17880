//! ID types for actors.

use serde::{Deserialize, Serialize};

/// Stable handle to an actor stored in the simulation arena.
///
/// The index addresses an arena slot; the generation is bumped every time the
/// slot is reused, so a handle to a despawned actor never aliases its
/// replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId {
    index: u32,
    generation: u32,
}

impl ActorId {
    /// Creates a handle from a slot index and generation.
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Returns the arena slot index.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Returns the slot generation.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }

    /// Returns the handle the same slot will carry after it is reused.
    #[must_use]
    pub const fn next_generation(self) -> Self {
        Self {
            index: self.index,
            generation: self.generation.wrapping_add(1),
        }
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}
