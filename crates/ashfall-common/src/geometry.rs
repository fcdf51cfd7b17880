//! Geometry types shared by the collision and combat layers.
//!
//! Screen coordinates: `x` grows to the right, `y` grows downward, so the
//! "top" of a rectangle is its smallest `y`.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct Rect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Rect {
    /// Creates a new rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Horizontal centre.
    #[must_use]
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Vertical centre.
    #[must_use]
    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    /// Checks if this rectangle overlaps another. Shared edges do not count.
    #[must_use]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Checks if `x` lies within the horizontal span (inclusive).
    #[must_use]
    pub fn spans_x(&self, x: f32) -> bool {
        x >= self.x && x <= self.right()
    }

    /// Returns the rectangle grown by `margin` on every side.
    #[must_use]
    pub fn expanded(&self, margin: f32) -> Self {
        Self {
            x: self.x - margin,
            y: self.y - margin,
            width: self.width + margin * 2.0,
            height: self.height + margin * 2.0,
        }
    }

    /// Squared distance between the centres of two rectangles.
    #[must_use]
    pub fn center_distance_sq(&self, other: &Rect) -> f32 {
        let dx = self.center_x() - other.center_x();
        let dy = self.center_y() - other.center_y();
        dx * dx + dy * dy
    }
}

/// Horizontal facing of an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Facing negative x
    Left,
    /// Facing positive x
    #[default]
    Right,
}

impl Direction {
    /// Unit sign along x (`-1.0` or `1.0`).
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }

    /// The opposite facing.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Facing implied by a horizontal velocity, if it is non-zero.
    #[must_use]
    pub fn from_velocity(vel_x: f32) -> Option<Self> {
        if vel_x > 0.0 {
            Some(Self::Right)
        } else if vel_x < 0.0 {
            Some(Self::Left)
        } else {
            None
        }
    }
}
