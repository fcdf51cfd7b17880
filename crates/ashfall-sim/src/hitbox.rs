//! Derived hitboxes.
//!
//! Every rectangle here is a pure function of an actor's current bounds and
//! must be recomputed each tick. The proportions are gameplay tuning:
//! - bottom / top: centred 3/5-width band, 1/5 of the height
//! - ground check: same 3/5-width band, a thin strip starting at the feet
//! - horizontal: 3/5 width, 3/5 height starting 1/5 down, shifted by the
//!   pending x velocity so fast movement meets walls before tunnelling
//! - attack: anchored at the horizontal centre, extending toward the facing

use ashfall_common::{Direction, Rect};
use serde::{Deserialize, Serialize};

/// One fifth of `extent`.
fn fifth(extent: f32) -> f32 {
    extent / 5.0
}

/// Three fifths of `extent`.
fn three_fifths(extent: f32) -> f32 {
    extent * 3.0 / 5.0
}

/// Lower fifth of the body, used for ground collision.
#[must_use]
pub fn bottom_band(bounds: &Rect) -> Rect {
    Rect::new(
        bounds.x + fifth(bounds.width),
        bounds.y + bounds.height * 4.0 / 5.0,
        three_fifths(bounds.width),
        fifth(bounds.height),
    )
}

/// Upper fifth of the body, used for ceiling collision.
#[must_use]
pub fn top_band(bounds: &Rect) -> Rect {
    Rect::new(
        bounds.x + fifth(bounds.width),
        bounds.y,
        three_fifths(bounds.width),
        fifth(bounds.height),
    )
}

/// Middle three fifths of the body, offset by the pending x velocity.
#[must_use]
pub fn horizontal_band(bounds: &Rect, vel_x: f32) -> Rect {
    Rect::new(
        bounds.x + vel_x,
        bounds.y + fifth(bounds.height),
        three_fifths(bounds.width),
        three_fifths(bounds.height),
    )
}

/// Thin strip directly beneath the feet. Only sets the grounded state.
#[must_use]
pub fn ground_check_band(bounds: &Rect, thickness: f32) -> Rect {
    Rect::new(
        bounds.x + fifth(bounds.width),
        bounds.bottom(),
        three_fifths(bounds.width),
        thickness,
    )
}

/// Shape of an attack hitbox relative to the wielder's bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackShape {
    /// Reach from the body's centre, as a fraction of the body width.
    pub width_fraction: f32,
    /// Height as a fraction of the body height.
    pub height_fraction: f32,
    /// Offset of the top edge below the body's top, as a fraction of height.
    pub vertical_offset_fraction: f32,
}

impl Default for AttackShape {
    fn default() -> Self {
        Self {
            width_fraction: 0.5,
            height_fraction: 1.0,
            vertical_offset_fraction: 0.0,
        }
    }
}

impl AttackShape {
    /// Creates a shape with full body height and the given reach fraction.
    #[must_use]
    pub fn reach(width_fraction: f32) -> Self {
        Self {
            width_fraction,
            ..Self::default()
        }
    }

    /// Sets the height fraction.
    #[must_use]
    pub fn with_height(mut self, height_fraction: f32, vertical_offset_fraction: f32) -> Self {
        self.height_fraction = height_fraction;
        self.vertical_offset_fraction = vertical_offset_fraction;
        self
    }
}

/// Attack hitbox on the facing side of the body.
#[must_use]
pub fn attack_box(bounds: &Rect, direction: Direction, shape: &AttackShape) -> Rect {
    let reach = bounds.width * shape.width_fraction;
    let x = match direction {
        Direction::Right => bounds.center_x(),
        Direction::Left => bounds.center_x() - reach,
    };
    Rect::new(
        x,
        bounds.y + bounds.height * shape.vertical_offset_fraction,
        reach,
        bounds.height * shape.height_fraction,
    )
}
